/*!
Typed extraction of values from result rows.
*/
use postgresql_errors::fields::ColumnIndex;
use postgresql_errors::{Error, ErrorKind, TypeMismatchError};

use crate::value::Value;

/// Conversion from a single decoded column value.
///
/// Integer conversions widen but never narrow: an `int2` column can be read
/// as `i64`, an `int8` column can't be read as `i32`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Error>;
}

/// Conversion from a full row.
pub trait Queryable: Sized {
    fn decode_row(values: &[Value]) -> Result<Self, Error>;
}

fn mismatch(expected: &str, value: &Value) -> Error {
    TypeMismatchError::with_message(format!(
        "expected {}, got {}",
        expected,
        value.kind()
    ))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match *value {
            Value::Int16(v) => Ok(v),
            _ => Err(mismatch("int16", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match *value {
            Value::Int16(v) => Ok(v.into()),
            Value::Int32(v) => Ok(v),
            _ => Err(mismatch("int32", value)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_i64().ok_or_else(|| mismatch("int64", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value
            .as_str()
            .map(|s| s.to_owned())
            .ok_or_else(|| mismatch("text", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

macro_rules! implement_tuple {
    ( $count:expr, $(($name:ident, $index:tt),)+ ) => (
        impl<$($name:FromValue),+> Queryable for ($($name,)+) {
            fn decode_row(values: &[Value]) -> Result<Self, Error> {
                if values.len() != $count {
                    return Err(TypeMismatchError::with_message(format!(
                        "expected {} columns, row has {}",
                        $count,
                        values.len(),
                    )));
                }
                Ok((
                    $(
                        $name::from_value(&values[$index])
                            .map_err(|e| e.with::<ColumnIndex>($index as usize))?,
                    )+
                ))
            }
        }
    )
}

implement_tuple! {
    1,
    (T0, 0),
}
implement_tuple! {
    2,
    (T0, 0),
    (T1, 1),
}
implement_tuple! {
    3,
    (T0, 0),
    (T1, 1),
    (T2, 2),
}
implement_tuple! {
    4,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
}
implement_tuple! {
    5,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
}
implement_tuple! {
    6,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
}
implement_tuple! {
    7,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
}
implement_tuple! {
    8,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
    (T7, 7),
}
implement_tuple! {
    9,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
    (T7, 7),
    (T8, 8),
}
implement_tuple! {
    10,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
    (T7, 7),
    (T8, 8),
    (T9, 9),
}
implement_tuple! {
    11,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
    (T7, 7),
    (T8, 8),
    (T9, 9),
    (T10, 10),
}
implement_tuple! {
    12,
    (T0, 0),
    (T1, 1),
    (T2, 2),
    (T3, 3),
    (T4, 4),
    (T5, 5),
    (T6, 6),
    (T7, 7),
    (T8, 8),
    (T9, 9),
    (T10, 10),
    (T11, 11),
}
