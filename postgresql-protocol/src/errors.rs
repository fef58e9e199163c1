use std::error::Error;
use std::str;

use snafu::{Backtrace, IntoError, Snafu};

use crate::common::TypeId;
use crate::value::Value;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub), context(suffix(false)))]
#[non_exhaustive]
pub enum DecodeError {
    #[snafu(display("unexpected end of value, expected {} bytes, got {}", expected, got))]
    Underflow {
        backtrace: Backtrace,
        expected: usize,
        got: usize,
    },
    #[snafu(display("value contains {} extra bytes after decoding", extra))]
    ExtraData { backtrace: Backtrace, extra: usize },
    #[snafu(display("invalid utf8 when decoding string: {}", source))]
    InvalidUtf8 {
        backtrace: Backtrace,
        source: str::Utf8Error,
    },
    #[snafu(display("invalid boolean byte 0x{:02x}", byte))]
    InvalidBool { backtrace: Backtrace, byte: u8 },
    #[snafu(display("row has {} fields, but {} columns were described", fields, columns))]
    RowSizeMismatch {
        backtrace: Backtrace,
        fields: usize,
        columns: usize,
    },
    #[snafu(display("column {:?} uses text format, only binary results are supported", column))]
    TextFormatColumn { backtrace: Backtrace, column: String },
    #[snafu(display("error decoding value"))]
    DecodeValue {
        backtrace: Backtrace,
        source: Box<dyn Error + Send + Sync>,
    },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub), context(suffix(false)))]
#[non_exhaustive]
pub enum EncodeError {
    #[snafu(display(
        "trying to encode invalid value type {} with codec {}",
        value_type,
        codec
    ))]
    InvalidValue {
        backtrace: Backtrace,
        value_type: &'static str,
        codec: &'static str,
    },
    #[snafu(display("value {} is out of range for {}", value, codec))]
    OutOfRange {
        backtrace: Backtrace,
        value: i128,
        codec: &'static str,
    },
    #[snafu(display("single value larger than 1GiB"))]
    ValueTooLong { backtrace: Backtrace },
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub), context(suffix(false)))]
#[non_exhaustive]
pub enum CodecError {
    #[snafu(display("no codec registered for type {}", type_id))]
    UnsupportedType {
        backtrace: Backtrace,
        type_id: TypeId,
    },
}

pub fn invalid_value(codec: &'static str, value: &Value) -> EncodeError {
    InvalidValue {
        codec,
        value_type: value.kind(),
    }
    .build()
}

pub fn decode_error<E: Error + Send + Sync + 'static>(e: E) -> DecodeError {
    DecodeValue.into_error(Box::new(e))
}
