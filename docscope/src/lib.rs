//! Main docscope crate: scoped connections to a document database and two canned
//! queries over the `TEST.airbnb` listings collection.
//!
//! This crate is the primary entry point. It re-exports the core types from
//! `docscope-core`, exposes the available backends, and provides the query
//! functions, configuration loading and logging setup used by the `docscope` binary.
//!
//! # Features
//!
//! - **Scoped connections** - A connector is connected for exactly the duration of a block
//! - **Canned queries** - Cheapest listing inside Manhattan, and the first listing
//! - **Faithful JSON** - Dates become ISO 8601 strings, decimals keep every digit
//! - **Multiple backends** - MongoDB for real deployments, in-memory for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use docscope::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::from_env();
//!
//!     let json = docscope::queries::get_apartment_in_manhattan(&settings).await.unwrap();
//!     println!("{json}");
//! }
//! ```
//!
//! # Testing against memory
//!
//! The query functions are generic over any `DocumentSource`, so the in-memory
//! backend can stand in for MongoDB:
//!
//! ```ignore
//! use docscope::{prelude::*, memory::InMemoryServer};
//! use bson::doc;
//!
//! let server = InMemoryServer::new();
//! server.insert_documents("TEST", "airbnb", vec![doc! { "name": "Loft" }]).await;
//!
//! let json = first_document(&mut server.connector()).await?;
//! assert_eq!(server.open_connections(), 0);
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-process storage for development and testing
//! - [`mongodb`] - MongoDB connector (requires the `mongodb` feature, on by default)

pub mod config;
pub mod logging;
pub mod prelude;
pub mod queries;

pub use docscope_core::{connector, backend, query, json, error};

// Re-export BSON types for convenience
pub use bson;

/// In-memory backend implementations.
pub mod memory {
    pub use docscope_memory::{InMemoryServer, InMemoryConnector};
}

/// MongoDB backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docscope_mongodb::MongoConnector;
}
