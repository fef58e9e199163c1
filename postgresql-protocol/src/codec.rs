/*!
Binary codecs for built-in PostgreSQL types.

Every codec converts between a [`Value`] and the body of a single binary
parameter or column (the length prefix and the NULL marker are handled by
the caller).
*/
use std::fmt;
use std::str;
use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use snafu::{ensure, OptionExt, ResultExt};

use crate::common::TypeId;
use crate::errors::{self, DecodeError, EncodeError};
use crate::value::Value;

/// Encoder and decoder of the binary representation of a single type.
pub trait Codec: fmt::Debug + Send + Sync + 'static {
    /// Type this codec is registered for by default.
    fn type_id(&self) -> TypeId;
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError>;
    fn decode(&self, buf: &[u8]) -> Result<Value, DecodeError>;
}

#[derive(Debug)]
pub struct Bool;

#[derive(Debug)]
pub struct Int16;

#[derive(Debug)]
pub struct Int32;

#[derive(Debug)]
pub struct Int64;

/// Text and the types sharing its binary representation.
#[derive(Debug)]
pub struct Text {
    type_id: TypeId,
}

impl Text {
    pub fn new(type_id: TypeId) -> Text {
        Text { type_id }
    }
}

/// Codec for one of the built-in types.
pub fn scalar_codec(type_id: TypeId) -> Option<Arc<dyn Codec>> {
    match type_id {
        TypeId::BOOL => Some(Arc::new(Bool)),
        TypeId::INT2 => Some(Arc::new(Int16)),
        TypeId::INT4 => Some(Arc::new(Int32)),
        TypeId::INT8 => Some(Arc::new(Int64)),
        TypeId::TEXT | TypeId::VARCHAR | TypeId::BPCHAR | TypeId::NAME => {
            Some(Arc::new(Text::new(type_id)))
        }
        _ => None,
    }
}

fn exact(buf: &[u8], len: usize) -> Result<(), DecodeError> {
    ensure!(
        buf.len() >= len,
        errors::Underflow {
            expected: len,
            got: buf.len()
        }
    );
    ensure!(
        buf.len() == len,
        errors::ExtraData {
            extra: buf.len() - len
        }
    );
    Ok(())
}

fn integer(codec: &'static str, value: &Value) -> Result<i64, EncodeError> {
    value
        .as_i64()
        .ok_or_else(|| errors::invalid_value(codec, value))
}

impl Codec for Bool {
    fn type_id(&self) -> TypeId {
        TypeId::BOOL
    }
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError> {
        let val = match value {
            Value::Bool(val) => *val,
            _ => Err(errors::invalid_value("bool", value))?,
        };
        buf.reserve(1);
        buf.put_u8(val as u8);
        Ok(())
    }
    fn decode(&self, mut buf: &[u8]) -> Result<Value, DecodeError> {
        exact(buf, 1)?;
        match buf.get_u8() {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            byte => errors::InvalidBool { byte }.fail(),
        }
    }
}

impl Codec for Int16 {
    fn type_id(&self) -> TypeId {
        TypeId::INT2
    }
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError> {
        let val = integer("int2", value)?;
        let val = i16::try_from(val).ok().context(errors::OutOfRange {
            value: val,
            codec: "int2",
        })?;
        buf.reserve(2);
        buf.put_i16(val);
        Ok(())
    }
    fn decode(&self, mut buf: &[u8]) -> Result<Value, DecodeError> {
        exact(buf, 2)?;
        Ok(Value::Int16(buf.get_i16()))
    }
}

impl Codec for Int32 {
    fn type_id(&self) -> TypeId {
        TypeId::INT4
    }
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError> {
        let val = integer("int4", value)?;
        let val = i32::try_from(val).ok().context(errors::OutOfRange {
            value: val,
            codec: "int4",
        })?;
        buf.reserve(4);
        buf.put_i32(val);
        Ok(())
    }
    fn decode(&self, mut buf: &[u8]) -> Result<Value, DecodeError> {
        exact(buf, 4)?;
        Ok(Value::Int32(buf.get_i32()))
    }
}

impl Codec for Int64 {
    fn type_id(&self) -> TypeId {
        TypeId::INT8
    }
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError> {
        let val = integer("int8", value)?;
        buf.reserve(8);
        buf.put_i64(val);
        Ok(())
    }
    fn decode(&self, mut buf: &[u8]) -> Result<Value, DecodeError> {
        exact(buf, 8)?;
        Ok(Value::Int64(buf.get_i64()))
    }
}

impl Codec for Text {
    fn type_id(&self) -> TypeId {
        self.type_id
    }
    fn encode(&self, buf: &mut BytesMut, value: &Value) -> Result<(), EncodeError> {
        let val = match value {
            Value::Text(val) => val,
            _ => Err(errors::invalid_value("text", value))?,
        };
        ensure!(i32::try_from(val.len()).is_ok(), errors::ValueTooLong);
        buf.extend_from_slice(val.as_bytes());
        Ok(())
    }
    fn decode(&self, buf: &[u8]) -> Result<Value, DecodeError> {
        let val = str::from_utf8(buf).context(errors::InvalidUtf8)?;
        Ok(Value::Text(val.to_owned()))
    }
}
