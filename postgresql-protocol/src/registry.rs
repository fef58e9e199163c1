use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use once_cell::sync::Lazy;
use postgresql_errors::fields::TypeOid;
use postgresql_errors::{Error, ErrorKind};
use postgresql_errors::{ProtocolEncodingError, TypeMismatchError, UnsupportedTypeError};

use crate::codec::{scalar_codec, Codec};
use crate::common::TypeId;
use crate::errors::{self, DecodeError, EncodeError};
use crate::value::Value;

static BUILTINS: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::with_builtins()));

const BUILTIN_TYPES: &[TypeId] = &[
    TypeId::BOOL,
    TypeId::INT2,
    TypeId::INT4,
    TypeId::INT8,
    TypeId::TEXT,
    TypeId::NAME,
    TypeId::BPCHAR,
    TypeId::VARCHAR,
];

/// Maps server type identifiers to binary codecs.
///
/// Registry is not modified after construction, so it can be freely shared
/// between connections. Use [`TypeRegistry::shared`] for the default set of
/// types, or build an extended one with [`TypeRegistry::register`].
#[derive(Clone)]
pub struct TypeRegistry {
    codecs: HashMap<TypeId, Arc<dyn Codec>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut types = self.codecs.keys().map(|t| t.0).collect::<Vec<_>>();
        types.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &types).finish()
    }
}

impl TypeRegistry {
    /// Registry that has no types at all.
    pub fn empty() -> TypeRegistry {
        TypeRegistry {
            codecs: HashMap::new(),
        }
    }
    /// Registry with `bool`, `int2`, `int4`, `int8` and the text types.
    pub fn with_builtins() -> TypeRegistry {
        let mut reg = TypeRegistry::empty();
        for type_id in BUILTIN_TYPES {
            if let Some(codec) = scalar_codec(*type_id) {
                reg.codecs.insert(*type_id, codec);
            }
        }
        reg
    }
    /// Process-wide registry of the built-in types.
    pub fn shared() -> Arc<TypeRegistry> {
        BUILTINS.clone()
    }
    /// Add (or replace) the codec for a type.
    pub fn register(mut self, type_id: TypeId, codec: Arc<dyn Codec>) -> TypeRegistry {
        self.codecs.insert(type_id, codec);
        self
    }
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.codecs.contains_key(&type_id)
    }
    pub fn codec(&self, type_id: TypeId) -> Result<&Arc<dyn Codec>, Error> {
        self.codecs.get(&type_id).ok_or_else(|| unsupported(type_id))
    }
    /// Binary representation of `value` as type `type_id`.
    ///
    /// Values of the integer family are converted to the target width when
    /// they fit.
    pub fn encode(&self, type_id: TypeId, value: &Value) -> Result<Bytes, Error> {
        let codec = self.codec(type_id)?;
        let mut buf = BytesMut::new();
        codec
            .encode(&mut buf, value)
            .map_err(|e| encode_error(type_id, e))?;
        Ok(buf.freeze())
    }
    pub fn decode(&self, type_id: TypeId, buf: &[u8]) -> Result<Value, Error> {
        let codec = self.codec(type_id)?;
        codec.decode(buf).map_err(|e| decode_error(type_id, e))
    }
}

pub(crate) fn unsupported(type_id: TypeId) -> Error {
    UnsupportedTypeError::with_source(errors::UnsupportedType { type_id }.build())
        .with::<TypeOid>(type_id.0)
}

pub(crate) fn encode_error(type_id: TypeId, e: EncodeError) -> Error {
    match e {
        EncodeError::ValueTooLong { .. } => ProtocolEncodingError::with_source(e),
        _ => TypeMismatchError::with_source(e),
    }
    .with::<TypeOid>(type_id.0)
}

pub(crate) fn decode_error(type_id: TypeId, e: DecodeError) -> Error {
    ProtocolEncodingError::with_source(e).with::<TypeOid>(type_id.0)
}
