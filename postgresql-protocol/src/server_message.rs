//! Raw server responses, as produced by a connection before decoding
use bytes::Bytes;

use crate::common::{Format, TypeId};

/// Column description as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub type_id: TypeId,
    pub format: Format,
}

/// Fields of a single row; `None` is the NULL marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataRow {
    pub fields: Vec<Option<Bytes>>,
}

/// Successful result of a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResponse {
    /// Empty for statements that don't return rows.
    pub columns: Vec<RawColumn>,
    pub rows: Vec<DataRow>,
    /// Command tag, e.g. `INSERT 0 1`.
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Error,
    Fatal,
    Panic,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    // Not in a transaction block.
    NotInTransaction = 0x49,

    // In a transaction block.
    InTransaction = 0x54,

    // In a failed transaction block
    // (commands will be rejected until the block is ended).
    InFailedTransaction = 0x45,
}

/// Statement was rejected by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub severity: ErrorSeverity,
    /// SQLSTATE.
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
    /// One-based character position in the statement.
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerResponse {
    Complete(QueryResponse),
    Error(ErrorResponse),
}

impl ErrorSeverity {
    pub fn from_name(name: &str) -> ErrorSeverity {
        match name {
            "ERROR" => ErrorSeverity::Error,
            "FATAL" => ErrorSeverity::Fatal,
            "PANIC" => ErrorSeverity::Panic,
            _ => ErrorSeverity::Unknown,
        }
    }
}

impl TransactionState {
    pub fn from_status(status: u8) -> Option<TransactionState> {
        match status {
            0x49 => Some(TransactionState::NotInTransaction),
            0x54 => Some(TransactionState::InTransaction),
            0x45 => Some(TransactionState::InFailedTransaction),
            _ => None,
        }
    }
}
