//! Errors that can be returned by the client
pub use postgresql_errors::*;
