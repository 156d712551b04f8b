//! The two canned queries against the `TEST.airbnb` listings collection.
//!
//! Both follow the same protocol: enter a connector scope, run a single `find`,
//! materialize the result, leave the scope (disconnecting), then encode to JSON.

use bson::Bson;
use tracing::debug;

use docscope_core::{
    backend::DocumentSource,
    connector::ConnectorExt,
    error::ConnectorResult,
    json::JsonEncoder,
    query::{Filter, Polygon, Position, Query, SortDirection},
};

pub const DATABASE_NAME: &str = "TEST";
pub const COLLECTION_NAME: &str = "airbnb";
pub const LOCATION_FIELD: &str = "address.location.coordinates";
pub const PRICE_FIELD: &str = "price";

/// What [`first_document`] returns for an empty collection.
pub const EMPTY_DOCUMENT: &str = "{}";

const MANHATTAN: [Position; 9] = [
    [-74.00699615478517, 40.70927151739564],
    [-73.97850036621095, 40.71083299030839],
    [-73.95858764648439, 40.748557450215635],
    [-73.93283843994142, 40.79223904263018],
    [-73.92734527587892, 40.81380923056961],
    [-73.95000457763673, 40.836151668569975],
    [-74.00974273681642, 40.75271883902363],
    [-74.01866912841798, 40.71577741296778],
    [-74.00699615478517, 40.70927151739564],
];

/// The closed polygon roughly outlining Manhattan.
pub fn manhattan() -> Polygon {
    Polygon::new(MANHATTAN)
}

/// Finds the cheapest listing located inside Manhattan.
///
/// Returns a JSON array holding at most one document.
pub async fn apartment_in_manhattan<C: DocumentSource>(
    connector: &mut C,
) -> ConnectorResult<String> {
    let query = Query::builder()
        .filter(Filter::geo_within(LOCATION_FIELD, manhattan()))
        .sort(PRICE_FIELD, SortDirection::Asc)
        .limit(1)
        .build();

    let documents = connector
        .scoped(async move |connector| connector.find(DATABASE_NAME, COLLECTION_NAME, query).await)
        .await?;
    debug!(count = documents.len(), "geo query finished");

    JsonEncoder::new().encode(&Bson::Array(
        documents
            .into_iter()
            .map(Bson::Document)
            .collect(),
    ))
}

/// Fetches the first document of the collection.
///
/// Returns the document as a JSON object, or [`EMPTY_DOCUMENT`] when the collection
/// is empty.
pub async fn first_document<C: DocumentSource>(connector: &mut C) -> ConnectorResult<String> {
    let document = connector
        .scoped(async |connector| {
            connector
                .find_one(DATABASE_NAME, COLLECTION_NAME, Query::new())
                .await
        })
        .await?;

    match document {
        Some(document) => JsonEncoder::new().encode(&Bson::Document(document)),
        None => Ok(EMPTY_DOCUMENT.to_string()),
    }
}

#[cfg(feature = "mongodb")]
mod mongo {
    use docscope_core::error::ConnectorResult;
    use docscope_mongodb::MongoConnector;

    use crate::config::Settings;

    /// [`super::apartment_in_manhattan`] against the MongoDB deployment in `settings`.
    pub async fn get_apartment_in_manhattan(settings: &Settings) -> ConnectorResult<String> {
        super::apartment_in_manhattan(&mut MongoConnector::new(settings.connection_string())).await
    }

    /// [`super::first_document`] against the MongoDB deployment in `settings`.
    pub async fn get_first_document(settings: &Settings) -> ConnectorResult<String> {
        super::first_document(&mut MongoConnector::new(settings.connection_string())).await
    }
}

#[cfg(feature = "mongodb")]
pub use mongo::{get_apartment_in_manhattan, get_first_document};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_ring_is_closed() {
        let polygon = manhattan();
        let ring = &polygon.rings()[0];

        assert_eq!(ring.first(), ring.last());
        assert!(ring.len() >= 4);
    }

    #[test]
    fn test_manhattan_contains_midtown_not_brooklyn() {
        assert!(manhattan().contains([-73.98, 40.75]));
        assert!(!manhattan().contains([-73.95, 40.65]));
    }
}
