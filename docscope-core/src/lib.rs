//! Core abstractions for scoped document database access.
//!
//! This crate is the core of the docscope project and provides:
//!
//! - **Connection lifecycle** ([`connector`]) - The `Connector` capability set and scoped
//!   acquisition
//! - **Read access** ([`backend`]) - The `DocumentSource` trait backends implement to answer
//!   queries
//! - **Query model** ([`query`]) - Filters (including geo polygons), sorting and limits
//! - **JSON output** ([`json`]) - BSON to JSON encoding with a fallback hook for non-native values
//! - **Error handling** ([`error`]) - The shared error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docscope_core::{connector::ConnectorExt, backend::DocumentSource, query::Query};
//!
//! let first = connector
//!     .scoped(async |connector| connector.find_one("TEST", "airbnb", Query::new()).await)
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docscope_core;

pub mod backend;
pub mod connector;
pub mod error;
pub mod json;
pub mod query;
