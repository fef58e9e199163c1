use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error as StdError;

use crate::error::{Error, Inner};

/// Trait that marks PostgreSQL client errors.
///
/// Currently sealed, because the set of kinds is fixed by this crate.
pub trait ErrorKind: Sealed {
    fn with_message<S: Into<Cow<'static, str>>>(s: S) -> Error {
        Self::build().context(s)
    }
    fn with_source<E: StdError + Send + Sync + 'static>(src: E) -> Error {
        Error(Box::new(Inner {
            code: Self::CODE,
            messages: Vec::new(),
            error: Some(Box::new(src)),
            fields: HashMap::new(),
        }))
    }
    fn with_source_box(src: Box<dyn StdError + Send + Sync>) -> Error {
        Error(Box::new(Inner {
            code: Self::CODE,
            messages: Vec::new(),
            error: Some(src),
            fields: HashMap::new(),
        }))
    }
    fn build() -> Error {
        Error::from_code(Self::CODE)
    }
}

pub trait Sealed {
    const CODE: u32;
    const NAME: &'static str;
    fn is_superclass_of(code: u32) -> bool;
}

/// Typed piece of information attached to an [`Error`].
pub trait Field {
    const NAME: &'static str;
    type Value: Any + Send + Sync + 'static;
}

/// Extension for results that already carry an [`Error`].
pub trait ResultExt<T> {
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Into<Cow<'static, str>>;
    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: Into<Cow<'static, str>>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Into<Cow<'static, str>>,
    {
        self.map_err(|e| e.context(context))
    }
    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: Into<Cow<'static, str>>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}
