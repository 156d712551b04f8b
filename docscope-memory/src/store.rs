//! In-memory server and connector implementation.
//!
//! This module provides an in-process stand-in for a document database: an
//! [`InMemoryServer`] that owns the data, and [`InMemoryConnector`]s that connect
//! to it with the same lifecycle as a networked client.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
    },
};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};
use tracing::{debug, info};

use docscope_core::{
    backend::DocumentSource,
    connector::Connector,
    error::{ConnectorError, ConnectorResult},
    query::{Query, SortDirection},
};

use crate::evaluator::{Comparable, DocumentEvaluator, lookup};

type CollectionMap = HashMap<String, Vec<Document>>;
type DatabaseMap = HashMap<String, CollectionMap>;


/// Shared in-memory data: database name -> collection name -> documents.
///
/// `InMemoryServer` is cloneable and every clone shares the same data, so a test can
/// seed a server, hand connectors to the code under test, and inspect the server
/// afterwards. Documents keep their insertion order.
///
/// # Example
///
/// ```ignore
/// use docscope_memory::InMemoryServer;
/// use bson::doc;
///
/// let server = InMemoryServer::new();
/// server.insert_documents("TEST", "airbnb", vec![doc! { "name": "Loft" }]).await;
///
/// let mut connector = server.connector();
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryServer {
    databases: Arc<RwLock<DatabaseMap>>,
    unavailable: Arc<AtomicBool>,
    open_connections: Arc<AtomicUsize>,
}

impl InMemoryServer {
    /// Creates a new empty, reachable server.
    pub fn new() -> Self {
        InMemoryServer::default()
    }

    /// Appends documents to `database.collection`, creating both if needed.
    pub async fn insert_documents(
        &self,
        database: &str,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) {
        self.databases
            .write()
            .await
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Makes subsequent connection attempts fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Number of connectors currently connected to this server.
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(AtomicOrdering::SeqCst)
    }

    /// Creates an unconnected connector for this server.
    pub fn connector(&self) -> InMemoryConnector {
        InMemoryConnector::new(self.clone())
    }
}


/// Client handle held by a connected [`InMemoryConnector`].
#[derive(Debug)]
struct InMemoryClient {
    databases: Arc<RwLock<DatabaseMap>>,
}

/// Connector to an [`InMemoryServer`].
#[derive(Debug)]
pub struct InMemoryConnector {
    server: InMemoryServer,
    client: Option<InMemoryClient>,
}

impl InMemoryConnector {
    pub fn new(server: InMemoryServer) -> Self {
        Self { server, client: None }
    }

    fn client(&self) -> ConnectorResult<&InMemoryClient> {
        self.client.as_ref().ok_or(ConnectorError::NotConnected)
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn connect(&mut self) -> ConnectorResult<()> {
        if self.client.is_some() {
            debug!("in-memory connector already connected");
            return Ok(());
        }
        if self.server.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(ConnectorError::Connection("in-memory server is unavailable".to_string()));
        }

        self.client = Some(InMemoryClient {
            databases: self.server.databases.clone(),
        });
        self.server.open_connections.fetch_add(1, AtomicOrdering::SeqCst);
        info!("connected to in-memory server");

        Ok(())
    }

    async fn disconnect(&mut self) -> ConnectorResult<()> {
        if self.client.take().is_some() {
            self.server.open_connections.fetch_sub(1, AtomicOrdering::SeqCst);
            info!("disconnected from in-memory server");
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl DocumentSource for InMemoryConnector {
    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: Query,
    ) -> ConnectorResult<Vec<Document>> {
        let databases = self.client()?.databases.read().await;
        let Some(documents) = databases
            .get(database)
            .and_then(|collections| collections.get(collection))
        else {
            return Ok(vec![]);
        };

        debug!(database, collection, ?query, "running in-memory find");

        let mut matched = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(documents, filter)?,
            None => documents.clone(),
        };

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_missing_first(
                    lookup(a, &sort.field),
                    lookup(b, &sort.field),
                );

                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(
            matched
                .into_iter()
                .take(query.limit.unwrap_or(usize::MAX))
                .collect()
        )
    }
}

/// Orders missing and null values before everything else, then follows MongoDB's
/// cross-type order so that any mix of kinds sorts deterministically.
fn compare_missing_first(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let left = left.map(Comparable::from).unwrap_or(Comparable::Null);
    let right = right.map(Comparable::from).unwrap_or(Comparable::Null);

    left.total_cmp(&right)
}
