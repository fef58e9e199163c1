use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use crate::fields::{Detail, Hint, Position, QueryText, SqlState};
use crate::kinds::{error_name, sql_state_code, tag_check};
use crate::traits::{ErrorKind, Field};

/// Error type returned from any PostgreSQL client call.
// This includes boxed error, because propagating through call chain is
// faster when error is just one pointer
#[derive(Debug)]
pub struct Error(pub(crate) Box<Inner>);

/// Tag that is used to group similar errors.
#[derive(Debug, Clone, Copy)]
pub struct Tag {
    pub(crate) bit: u32,
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub code: u32,
    pub messages: Vec<Cow<'static, str>>,
    pub error: Option<Box<dyn StdError + Send + Sync + 'static>>,
    pub fields: HashMap<(&'static str, TypeId), Box<dyn Any + Send + Sync>>,
}

impl Error {
    /// Returns `true` if error is of kind `T` or of any of its subkinds.
    pub fn is<T: ErrorKind>(&self) -> bool {
        T::is_superclass_of(self.0.code)
    }
    pub fn has_tag(&self, tag: Tag) -> bool {
        tag_check(self.0.code, tag.bit)
    }
    /// Add a context message; the most recent one is displayed first.
    pub fn context<S: Into<Cow<'static, str>>>(mut self, msg: S) -> Error {
        self.0.messages.push(msg.into());
        self
    }
    pub fn kind_name(&self) -> &str {
        error_name(self.0.code)
    }
    pub fn kind_debug(&self) -> impl fmt::Display {
        format!("{} [0x{:08X}]", error_name(self.0.code), self.0.code)
    }
    pub fn code(&self) -> u32 {
        self.0.code
    }
    pub fn initial_message(&self) -> Option<&str> {
        self.0.messages.first().map(|m| &m[..])
    }
    pub fn contexts(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.messages.iter().skip(1).map(|m| &m[..])
    }
    pub fn from_code(code: u32) -> Error {
        Error(Box::new(Inner {
            code,
            messages: Vec::new(),
            error: None,
            fields: HashMap::new(),
        }))
    }
    /// Create an error of the most specific kind for a server SQLSTATE.
    ///
    /// The state itself is kept in the [`SqlState`] field.
    pub fn from_sql_state(state: &str) -> Error {
        Error::from_code(sql_state_code(state)).with::<SqlState>(state)
    }
    pub fn refine_kind<T: ErrorKind>(mut self) -> Error {
        self.0.code = T::CODE;
        self
    }
    /// Attach a typed field to the error, replacing the previous value.
    pub fn set<T: Field>(&mut self, value: impl Into<T::Value>) {
        self.0
            .fields
            .insert((T::NAME, TypeId::of::<T::Value>()), Box::new(value.into()));
    }
    /// Builder-style variant of [`Error::set`].
    pub fn with<T: Field>(mut self, value: impl Into<T::Value>) -> Error {
        self.set::<T>(value);
        self
    }
    pub fn get<T: Field>(&self) -> Option<&T::Value> {
        self.0
            .fields
            .get(&(T::NAME, TypeId::of::<T::Value>()))
            .and_then(|v| v.downcast_ref::<T::Value>())
    }
    pub fn query_text(&self) -> Option<&str> {
        self.get::<QueryText>().map(|s| &s[..])
    }
    /// Five-character SQLSTATE code reported by the server.
    pub fn sql_state(&self) -> Option<&str> {
        self.get::<SqlState>().map(|s| &s[..])
    }
    pub fn hint(&self) -> Option<&str> {
        self.get::<Hint>().map(|s| &s[..])
    }
    pub fn detail(&self) -> Option<&str> {
        self.get::<Detail>().map(|s| &s[..])
    }
    /// Zero-based character offset into the query text.
    pub fn position(&self) -> Option<usize> {
        self.get::<Position>().copied()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = self.kind_name();
        if f.alternate() {
            write!(f, "{}", kind)?;
            for msg in self.0.messages.iter().rev() {
                write!(f, ": {}", msg)?;
            }
            if let Some(mut src) = self.source() {
                write!(f, ": {}", src)?;
                while let Some(next) = src.source() {
                    write!(f, ": {}", next)?;
                    src = next;
                }
            }
        } else if let Some(last) = self.0.messages.last() {
            write!(f, "{}: {}", kind, last)?;
        } else if let Some(src) = self.source() {
            write!(f, "{}: {}", kind, src)?;
        } else {
            write!(f, "{}", kind)?;
        }
        if let Some(detail) = self.detail() {
            write!(f, "\n  Detail: {}", detail)?;
        }
        if let Some(hint) = self.hint() {
            write!(f, "\n  Hint: {}", hint)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.error.as_ref().map(|b| b.as_ref() as &dyn StdError)
    }
}
