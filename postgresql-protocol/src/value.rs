use crate::common::TypeId;

/// A single value either sent as a query parameter or read from a result
/// column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        use Value::*;
        match self {
            Null => "null",
            Bool(..) => "bool",
            Int16(..) => "int16",
            Int32(..) => "int32",
            Int64(..) => "int64",
            Text(..) => "text",
        }
    }
    /// Type this value is sent as when no type is declared for it.
    pub fn type_id(&self) -> TypeId {
        use Value::*;
        match self {
            Null => TypeId::UNSPECIFIED,
            Bool(..) => TypeId::BOOL,
            Int16(..) => TypeId::INT2,
            Int32(..) => TypeId::INT4,
            Int64(..) => TypeId::INT8,
            Text(..) => TypeId::TEXT,
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
    /// Any integer value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int16(v) => Some(v.into()),
            Value::Int32(v) => Some(v.into()),
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
    /// Smallest integer value that holds `v`.
    pub fn from_integer(v: i64) -> Value {
        if let Ok(v) = i16::try_from(v) {
            Value::Int16(v)
        } else if let Ok(v) = i32::try_from(v) {
            Value::Int32(v)
        } else {
            Value::Int64(v)
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Value {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int64(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
