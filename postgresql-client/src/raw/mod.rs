//! Blocking implementation of the PostgreSQL v3 frontend protocol
mod connection;
mod queries;

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};

use bytes::BytesMut;
use snafu::{Backtrace, Snafu};

use postgresql_protocol::server_message::TransactionState;

use crate::errors::{ClientConnectionEosError, ConnectionError, Error, ErrorKind};
use crate::errors::{ProtocolEncodingError, ProtocolOutOfOrderError};

pub(crate) trait Transport: Read + Write + Send + fmt::Debug {}

impl<T: Read + Write + Send + fmt::Debug> Transport for T {}

/// Single connection to the server.
///
/// Statements are sent through the extended query protocol with all
/// parameters and results in binary format.
#[derive(Debug)]
pub struct PgConnection {
    peer: String,
    stream: Box<dyn Transport>,
    inbuf: BytesMut,
    outbuf: BytesMut,
    mode: Mode,
    backend_key: Option<BackendKey>,
    server_params: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy)]
#[allow(dead_code)] // needed for cancellation only
struct BackendKey {
    pid: i32,
    secret: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Idle(TransactionState),
    /// A request was started but not finished
    Dirty,
    Closed,
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
#[non_exhaustive]
pub(crate) enum ReadError {
    #[snafu(display("error decoding message"))]
    Decode { source: io::Error },
    #[snafu(display("error encoding message"))]
    Encode { source: io::Error },
    #[snafu(display("error transferring data"))]
    Io { source: io::Error },
    #[snafu(display("unexpected server message: {}", message))]
    OutOfOrder {
        message: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("end of stream"))]
    Eos,
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Error {
        match e {
            ReadError::Decode { .. } | ReadError::Encode { .. } => {
                ProtocolEncodingError::with_source(e)
            }
            ReadError::Io { .. } => ConnectionError::with_source(e),
            ReadError::OutOfOrder { .. } => ProtocolOutOfOrderError::with_source(e),
            ReadError::Eos => ClientConnectionEosError::with_source(e),
        }
    }
}

impl PgConnection {
    pub(crate) fn new(peer: String, stream: Box<dyn Transport>) -> PgConnection {
        PgConnection {
            peer,
            stream,
            inbuf: BytesMut::with_capacity(8192),
            outbuf: BytesMut::with_capacity(8192),
            mode: Mode::Dirty,
            backend_key: None,
            server_params: HashMap::new(),
        }
    }
    /// Value of a run-time parameter reported by the server, e.g.
    /// `server_version`.
    pub fn server_param(&self, name: &str) -> Option<&str> {
        self.server_params.get(name).map(|v| &v[..])
    }
    /// Transaction status reported at the end of the last statement.
    ///
    /// Returns `None` while a statement is in progress or after the
    /// connection broke.
    pub fn transaction_state(&self) -> Option<TransactionState> {
        match self.mode {
            Mode::Idle(state) => Some(state),
            Mode::Dirty | Mode::Closed => None,
        }
    }
    pub fn peer(&self) -> &str {
        &self.peer
    }
}
