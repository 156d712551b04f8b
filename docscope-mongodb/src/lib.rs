//! MongoDB connector for docscope.
//!
//! This crate provides [`MongoConnector`], a `Connector` and `DocumentSource`
//! implementation built on MongoDB's async driver.
//!
//! To use this backend, keep the `mongodb` feature enabled in your `Cargo.toml`
//! (it is on by default):
//!
//! ```toml
//! [dependencies]
//! docscope = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The connector is built from a MongoDB connection string and only opens a client
//! when connected, either explicitly or on entry to a scoped block.
//!
//! # Example
//!
//! ```ignore
//! use docscope::{prelude::*, mongodb::MongoConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut connector = MongoConnector::new("mongodb://localhost:27017");
//!     let first = connector
//!         .scoped(async |connector| connector.find_one("TEST", "airbnb", Query::new()).await)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docscope_mongodb;

pub mod connector;
pub mod query;

pub use connector::MongoConnector;
