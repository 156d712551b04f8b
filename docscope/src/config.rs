//! Process configuration.
//!
//! Settings are read once at start-up and passed explicitly to whatever needs them.

use std::env;
use tracing::debug;

/// Environment variable holding the MongoDB connection string.
pub const CONNECTION_STRING_VAR: &str = "MONGO_CONN_STRING";

/// Runtime settings for the query functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    connection_string: String,
}

impl Settings {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    /// Loads a `.env` file from the working directory if one exists, then reads
    /// [`CONNECTION_STRING_VAR`].
    ///
    /// A missing variable yields an empty connection string; the connector rejects it
    /// when it tries to connect.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded .env from {}", path.display()),
            Err(err) => debug!("no .env loaded: {err}"),
        }

        Self::new(env::var(CONNECTION_STRING_VAR).unwrap_or_default())
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}
