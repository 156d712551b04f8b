//! Read access to document collections through a connected [`Connector`].
//!
//! The [`DocumentSource`] trait is the only query surface the canned queries need:
//! select a database and a collection by name, run one `find`, and hand back the
//! fully materialized result. Backends translate the abstract [`Query`] into whatever
//! their client understands.

use async_trait::async_trait;
use bson::Document;

use crate::{connector::Connector, error::ConnectorResult, query::Query};

/// A connector that can run read queries against named collections.
///
/// # Materialization
///
/// `find` returns a `Vec`, never a cursor, so callers can drop the connection as
/// soon as it returns without leaving a half-read stream behind.
///
/// # Errors
///
/// Implementations return [`ConnectorError::NotConnected`] when called outside a
/// connected scope and [`ConnectorError::Query`] for backend-side failures.
///
/// [`ConnectorError::NotConnected`]: crate::error::ConnectorError::NotConnected
/// [`ConnectorError::Query`]: crate::error::ConnectorError::Query
#[async_trait]
pub trait DocumentSource: Connector {
    /// Runs `query` against `database.collection` and collects every matching document.
    ///
    /// # Arguments
    ///
    /// * `database` - The name of the database to select
    /// * `collection` - The name of the collection within that database
    /// * `query` - Filter, sort and limit to apply
    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: Query,
    ) -> ConnectorResult<Vec<Document>>;

    /// Returns the first document matched by `query`, if any.
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        query: Query,
    ) -> ConnectorResult<Option<Document>> {
        let mut query = query;
        query.limit = Some(1);

        Ok(self
            .find(database, collection, query)
            .await?
            .into_iter()
            .next())
    }
}
