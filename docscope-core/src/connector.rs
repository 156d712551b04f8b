//! Connection lifecycle abstraction.
//!
//! A [`Connector`] owns a client handle for some external resource and moves between
//! two states, unconnected and connected. The [`ConnectorExt::scoped`] helper wraps an
//! async body so that the connector is connected before the body runs and disconnected
//! after it finishes, whichever way it finishes.
//!
//! # Example
//!
//! ```ignore
//! use docscope::prelude::*;
//!
//! let mut connector = MongoConnector::new(settings.connection_string());
//! let documents = connector
//!     .scoped(async |connector| connector.find("TEST", "airbnb", Query::new()).await)
//!     .await?;
//! ```

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::warn;

use crate::error::ConnectorResult;

/// Capability set shared by every resource connection type.
///
/// Implementations hold their configuration from construction and an optional client
/// handle that only exists while connected. The handle is never shared beyond a borrow
/// of the connector itself.
#[async_trait]
pub trait Connector: Send + Sync + Debug {
    /// Establishes the underlying client connection from the stored configuration.
    ///
    /// Connecting an already connected connector is a no-op.
    async fn connect(&mut self) -> ConnectorResult<()>;

    /// Closes the underlying client handle and clears it.
    ///
    /// Safe to call when not connected; in that case nothing happens and `Ok(())` is
    /// returned. After a disconnect the connector can be connected again.
    async fn disconnect(&mut self) -> ConnectorResult<()>;

    /// Returns `true` while a client handle is held.
    fn is_connected(&self) -> bool;

    /// Scope entry: connects and yields the connector itself.
    async fn enter(&mut self) -> ConnectorResult<&mut Self>
    where
        Self: Sized,
    {
        self.connect().await?;
        Ok(self)
    }

    /// Scope exit: disconnects.
    async fn exit(&mut self) -> ConnectorResult<()> {
        self.disconnect().await
    }
}

/// Scoped acquisition for any [`Connector`].
///
/// This trait is automatically implemented for all connectors.
pub trait ConnectorExt: Connector + Sized {
    /// Runs `body` between [`Connector::enter`] and [`Connector::exit`].
    ///
    /// `exit` runs on every path once `enter` succeeded. When the body fails its error
    /// is returned after the disconnect, and a disconnect failure on that path is only
    /// logged. When the body succeeds a disconnect failure is returned instead of the
    /// body's value. When `enter` fails neither the body nor `exit` runs.
    fn scoped<T, F>(&mut self, body: F) -> impl Future<Output = ConnectorResult<T>>
    where
        F: AsyncFnOnce(&mut Self) -> ConnectorResult<T>;
}

impl<C: Connector> ConnectorExt for C {
    async fn scoped<T, F>(&mut self, body: F) -> ConnectorResult<T>
    where
        F: AsyncFnOnce(&mut Self) -> ConnectorResult<T>,
    {
        let outcome = match self.enter().await {
            Ok(connector) => body(connector).await,
            Err(err) => return Err(err),
        };
        let released = self.exit().await;

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(exit_err)) => {
                warn!(error = %exit_err, "disconnect failed while unwinding a failed scope");
                Err(err)
            }
        }
    }
}
