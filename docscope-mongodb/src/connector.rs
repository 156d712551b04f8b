use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, doc};
use mongodb::{Client, options::{ClientOptions, FindOptions}};
use tracing::{debug, info};
use docscope_core::{
    backend::DocumentSource,
    connector::Connector,
    error::{ConnectorError, ConnectorResult},
    query::Query,
};

use crate::query::MongoQueryTranslator;


/// A [`Connector`] backed by the MongoDB driver.
///
/// Holds the connection string from construction and a [`Client`] only while
/// connected. Connecting parses the string, builds the client and pings the
/// deployment once, so an unreachable server surfaces at scope entry rather than at
/// the first query.
#[derive(Debug)]
pub struct MongoConnector {
    connection_string: String,
    client: Option<Client>,
}

impl MongoConnector {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            client: None,
        }
    }

    /// The live client, or [`ConnectorError::NotConnected`].
    pub fn client(&self) -> ConnectorResult<&Client> {
        self.client.as_ref().ok_or(ConnectorError::NotConnected)
    }

    async fn open_client(&self) -> ConnectorResult<Client> {
        if self.connection_string.trim().is_empty() {
            return Err(ConnectorError::Configuration("connection string is empty".to_string()));
        }

        let client = Client::with_options(
            ClientOptions::parse(&self.connection_string)
                .await
                .map_err(|e| ConnectorError::Configuration(e.to_string()))?,
        )
        .map_err(|e| ConnectorError::Connection(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectorError::Connection(e.to_string()))?;

        Ok(client)
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&mut self) -> ConnectorResult<()> {
        if self.client.is_some() {
            debug!("already connected to MongoDB");
            return Ok(());
        }

        self.client = Some(self.open_client().await?);
        info!("connected to MongoDB");

        Ok(())
    }

    async fn disconnect(&mut self) -> ConnectorResult<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("disconnected from MongoDB");
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl DocumentSource for MongoConnector {
    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: Query,
    ) -> ConnectorResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(MongoQueryTranslator::sort(sort));
        }

        let filter = MongoQueryTranslator::filter(query.filter.as_ref())?;
        debug!(database, collection, %filter, "running MongoDB find");

        self.client()?
            .database(database)
            .collection::<Document>(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| ConnectorError::Query(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| ConnectorError::Query(e.to_string()))
    }
}
