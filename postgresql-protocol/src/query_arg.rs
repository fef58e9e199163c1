/*!
Conversion of host values into wire parameters.

Each argument is a [`QueryArg`], and a full argument list is [`QueryArgs`]
(implemented for `()`, tuples, slices and vectors). [`ParameterBinder`]
turns the argument list into [`BoundParam`]s ready for a parameterized
request.

Integers are sent as the narrowest of `int2`, `int4` and `int8` that holds
the value, unless the type is fixed by [`Typed`] or by using an explicit
[`Value`] variant:

```rust
# use postgresql_protocol::common::TypeId;
# use postgresql_protocol::query_arg::{ParameterBinder, Typed};
# use postgresql_protocol::registry::TypeRegistry;
let registry = TypeRegistry::shared();
let binder = ParameterBinder::new(&registry);
let params = binder.bind("SELECT $1, $2", &(2, Typed(TypeId::INT8, 2))).unwrap();
assert_eq!(params[0].type_id, TypeId::INT2);
assert_eq!(params[1].type_id, TypeId::INT8);
```
*/
use bytes::Bytes;

use postgresql_errors::fields::{ParameterIndex, TypeOid};
use postgresql_errors::{Error, ErrorKind, ParameterCountError, TypeMismatchError};

use crate::common::TypeId;
use crate::placeholders::max_placeholder;
use crate::registry::TypeRegistry;
use crate::value::Value;

/// A single parameter in binary format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    /// [`TypeId::UNSPECIFIED`] lets the server infer the type.
    pub type_id: TypeId,
    /// `None` is sent as SQL NULL.
    pub value: Option<Bytes>,
}

/// A single query argument.
pub trait QueryArg {
    fn to_value(&self) -> Result<Value, Error>;
    /// Server type to send the value as. `None` uses the type implied by
    /// the value itself.
    fn declared_type(&self) -> Option<TypeId> {
        None
    }
}

/// An argument with an explicitly declared server type.
///
/// Integers are converted to the declared width if they fit.
#[derive(Debug, Clone)]
pub struct Typed<T>(pub TypeId, pub T);

/// A list of query arguments.
pub trait QueryArgs {
    fn count(&self) -> usize;
    fn encode(&self, encoder: &mut Encoder) -> Result<(), Error>;
}

/// Accumulates bound parameters while encoding [`QueryArgs`].
#[derive(Debug)]
pub struct Encoder<'a> {
    registry: &'a TypeRegistry,
    params: Vec<BoundParam>,
}

/// Turns query arguments into wire parameters.
#[derive(Debug, Clone, Copy)]
pub struct ParameterBinder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> Encoder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Encoder<'a> {
        Encoder {
            registry,
            params: Vec::new(),
        }
    }
    pub fn push<A: QueryArg + ?Sized>(&mut self, arg: &A) -> Result<(), Error> {
        let index = self.params.len();
        self.bind_one(arg)
            .map(|param| self.params.push(param))
            .map_err(|e| e.with::<ParameterIndex>(index))
    }
    fn bind_one<A: QueryArg + ?Sized>(&self, arg: &A) -> Result<BoundParam, Error> {
        let value = arg.to_value()?;
        let type_id = arg.declared_type().unwrap_or_else(|| value.type_id());
        if value.is_null() {
            return Ok(BoundParam {
                type_id,
                value: None,
            });
        }
        let data = self.registry.encode(type_id, &value)?;
        Ok(BoundParam {
            type_id,
            value: Some(data),
        })
    }
    pub fn finish(self) -> Vec<BoundParam> {
        self.params
    }
}

impl<'a> ParameterBinder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> ParameterBinder<'a> {
        ParameterBinder { registry }
    }
    /// Encode `args` for the `$N` placeholders of `sql`.
    ///
    /// The number of arguments must match the highest placeholder number
    /// used in the statement.
    pub fn bind<A: QueryArgs + ?Sized>(&self, sql: &str, args: &A) -> Result<Vec<BoundParam>, Error> {
        let expected = max_placeholder(sql);
        let got = args.count();
        if expected != got {
            return Err(ParameterCountError::with_message(format!(
                "statement expects {} arguments, {} given",
                expected, got
            )));
        }
        let mut enc = Encoder::new(self.registry);
        args.encode(&mut enc)?;
        Ok(enc.finish())
    }
}

impl QueryArg for Value {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(self.clone())
    }
}

impl QueryArg for bool {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Bool(*self))
    }
}

impl QueryArg for str {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Text(self.to_string()))
    }
}

impl QueryArg for String {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Text(self.clone()))
    }
}

impl<T: QueryArg + ?Sized> QueryArg for &T {
    fn to_value(&self) -> Result<Value, Error> {
        (**self).to_value()
    }
    fn declared_type(&self) -> Option<TypeId> {
        (**self).declared_type()
    }
}

impl<T: QueryArg> QueryArg for Option<T> {
    fn to_value(&self) -> Result<Value, Error> {
        match self {
            Some(val) => val.to_value(),
            None => Ok(Value::Null),
        }
    }
    fn declared_type(&self) -> Option<TypeId> {
        self.as_ref().and_then(|v| v.declared_type())
    }
}

impl<T: QueryArg> QueryArg for Typed<T> {
    fn to_value(&self) -> Result<Value, Error> {
        self.1.to_value()
    }
    fn declared_type(&self) -> Option<TypeId> {
        Some(self.0)
    }
}

macro_rules! implement_integer {
    ($($t:ty),*) => {$(
        impl QueryArg for $t {
            fn to_value(&self) -> Result<Value, Error> {
                i64::try_from(*self)
                    .map(Value::from_integer)
                    .map_err(|_| {
                        TypeMismatchError::with_message(format!(
                            "integer {} does not fit into int8", self
                        ))
                        .with::<TypeOid>(TypeId::INT8.0)
                    })
            }
        }
    )*};
}

implement_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl QueryArgs for () {
    fn count(&self) -> usize {
        0
    }
    fn encode(&self, _enc: &mut Encoder) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: QueryArg> QueryArgs for [T] {
    fn count(&self) -> usize {
        self.len()
    }
    fn encode(&self, enc: &mut Encoder) -> Result<(), Error> {
        for arg in self {
            enc.push(arg)?;
        }
        Ok(())
    }
}

impl<T: QueryArg, const N: usize> QueryArgs for [T; N] {
    fn count(&self) -> usize {
        N
    }
    fn encode(&self, enc: &mut Encoder) -> Result<(), Error> {
        self[..].encode(enc)
    }
}

impl<T: QueryArg> QueryArgs for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }
    fn encode(&self, enc: &mut Encoder) -> Result<(), Error> {
        self[..].encode(enc)
    }
}

impl<A: QueryArgs + ?Sized> QueryArgs for &A {
    fn count(&self) -> usize {
        (**self).count()
    }
    fn encode(&self, enc: &mut Encoder) -> Result<(), Error> {
        (**self).encode(enc)
    }
}

macro_rules! implement_tuple {
    ( $count:expr, $($name:ident,)+ ) => (
        impl<$($name:QueryArg),+> QueryArgs for ($($name,)+) {
            fn count(&self) -> usize {
                $count
            }
            fn encode(&self, enc: &mut Encoder) -> Result<(), Error> {
                #![allow(non_snake_case)]
                let ($($name,)+) = self;
                $(
                    enc.push($name)?;
                )*
                Ok(())
            }
        }
    )
}

implement_tuple! {1, T0, }
implement_tuple! {2, T0, T1, }
implement_tuple! {3, T0, T1, T2, }
implement_tuple! {4, T0, T1, T2, T3, }
implement_tuple! {5, T0, T1, T2, T3, T4, }
implement_tuple! {6, T0, T1, T2, T3, T4, T5, }
implement_tuple! {7, T0, T1, T2, T3, T4, T5, T6, }
implement_tuple! {8, T0, T1, T2, T3, T4, T5, T6, T7, }
implement_tuple! {9, T0, T1, T2, T3, T4, T5, T6, T7, T8, }
implement_tuple! {10, T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, }
implement_tuple! {11, T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, }
implement_tuple! {12, T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, }
