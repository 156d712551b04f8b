//! Error types and result types for connector and query operations.
//!
//! Every fallible operation in docscope returns [`ConnectorResult<T>`]. Nothing in
//! the core catches or retries; errors travel to the immediate caller unchanged.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised while connecting, querying or encoding.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The connection configuration is missing or rejected by the client library.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The client could not establish a connection to the backend.
    #[error("Connection error: {0}")]
    Connection(String),
    /// An operation that needs a live client was called on an unconnected connector.
    #[error("Connector is not connected")]
    NotConnected,
    /// The backend rejected or failed to execute a query.
    #[error("Query error: {0}")]
    Query(String),
    /// The JSON encoder met a value it has no representation for.
    /// The argument is the name of the concrete value type.
    #[error("Type {0} not serializable")]
    UnsupportedType(String),
    /// Serialization/deserialization error when converting between BSON and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

impl From<BsonError> for ConnectorError {
    fn from(err: BsonError) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for ConnectorError {
    fn from(err: SerdeJsonError) -> Self {
        ConnectorError::Serialization(err.to_string())
    }
}
