//! In-memory document source for docscope.
//!
//! This crate provides an in-process implementation of the `Connector` and
//! `DocumentSource` traits. It follows the same connect/disconnect lifecycle as the
//! MongoDB connector and evaluates queries locally, which makes it the backend of
//! choice for tests and offline runs.
//!
//! # Features
//!
//! - **Real lifecycle** - Connectors must be connected before querying and track open connections
//! - **Full query support** - Field comparisons, `$geoWithin` polygons, sorting and limits
//! - **Failure injection** - A server can be marked unavailable to exercise connection errors
//!
//! # Quick Start
//!
//! ```ignore
//! use docscope::{prelude::*, memory::InMemoryServer};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = InMemoryServer::new();
//!     server.insert_documents("TEST", "airbnb", vec![doc! { "name": "Loft" }]).await;
//!
//!     let json = first_document(&mut server.connector()).await.unwrap();
//!     println!("{json}");
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docscope_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryServer, InMemoryConnector};
