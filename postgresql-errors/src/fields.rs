//! Typed fields that can be attached to an [`Error`](crate::Error)
use crate::traits::Field;

/// Text of the statement that caused the error.
pub struct QueryText;

impl Field for QueryText {
    const NAME: &'static str = "source_code";
    type Value = String;
}

/// Five-character SQLSTATE reported by the server.
pub struct SqlState;

impl Field for SqlState {
    const NAME: &'static str = "sql_state";
    type Value = String;
}

pub struct Detail;

impl Field for Detail {
    const NAME: &'static str = "detail";
    type Value = String;
}

pub struct Hint;

impl Field for Hint {
    const NAME: &'static str = "hint";
    type Value = String;
}

/// Zero-based character offset into [`QueryText`].
pub struct Position;

impl Field for Position {
    const NAME: &'static str = "position";
    type Value = usize;
}

/// Type OID of the value that failed to encode or decode.
pub struct TypeOid;

impl Field for TypeOid {
    const NAME: &'static str = "type_oid";
    type Value = u32;
}

/// Zero-based index of the query argument that failed to bind.
pub struct ParameterIndex;

impl Field for ParameterIndex {
    const NAME: &'static str = "parameter_index";
    type Value = usize;
}

/// Zero-based index of the result column that failed to decode.
pub struct ColumnIndex;

impl Field for ColumnIndex {
    const NAME: &'static str = "column_index";
    type Value = usize;
}
