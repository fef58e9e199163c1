//! Collaborator interface between [`Database`](crate::Database) and the wire
use std::fmt;

use postgresql_protocol::query_arg::BoundParam;
use postgresql_protocol::server_message::ServerResponse;

use crate::builder::Config;
use crate::errors::Error;
use crate::raw::PgConnection;

/// A live connection able to run one statement at a time.
///
/// Server-side failures of a statement are returned as
/// [`ServerResponse::Error`]; `Err` means the transport or the protocol
/// failed. After an `Err` the connection may be left in an inconsistent
/// state, see [`Connection::is_consistent`].
pub trait Connection: fmt::Debug + Send {
    /// Run a statement without parameters.
    fn send_simple(&mut self, sql: &str) -> Result<ServerResponse, Error>;
    /// Run a statement with bound parameters for its `$N` placeholders.
    fn send_parameterized(
        &mut self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<ServerResponse, Error>;
    /// Gracefully terminate the session.
    fn close(&mut self) -> Result<(), Error>;
    /// Returns `false` if the connection can't be used for further
    /// statements.
    fn is_consistent(&self) -> bool;
}

/// Creates connections for a [`Config`].
pub trait Connector: fmt::Debug + Send + Sync {
    fn connect(&self, config: &Config) -> Result<Box<dyn Connection>, Error>;
}

/// Connector that opens a network connection to the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl Connector for PgConnector {
    fn connect(&self, config: &Config) -> Result<Box<dyn Connection>, Error> {
        Ok(Box::new(PgConnection::connect(config)?))
    }
}
