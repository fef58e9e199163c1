/*!
# Error Handling for the PostgreSQL client

All errors that the client produces are encapsulated into the [`Error`]
structure. The structure is a bit like `Box<dyn Error>`, except it can only
contain client error kinds. [`UserError`] can be used to encapsulate custom
errors (commonly used to return an error from a transaction).

Each error kind is represented as a separate type that implements the
[`ErrorKind`] trait. Error kinds are used like marker structs: use
[`Error::is`] to check the kind and the kind itself to create instances:

```rust
# use std::io;
# use postgresql_errors::{UserError, ErrorKind};
let err = UserError::with_source(io::Error::from(io::ErrorKind::NotFound));
assert!(err.is::<UserError>());
```

Since errors are hierarchical, [`Error::is`] works with any ancestor:

```rust
# use postgresql_errors::*;
# let err = ParameterCountError::with_message("expected 2 arguments, got 1");
assert!(err.is::<ParameterCountError>());
assert!(err.is::<QueryArgumentError>());  // implied by the assertion above
assert!(err.is::<InterfaceError>());  // and this one
assert!(err.is::<ClientError>());  // and this one
```

Errors reported by the server are [`ExecutionError`]s. The most specific
subkind is picked from the SQLSTATE, which stays available through
[`Error::sql_state`]:

```rust
# use postgresql_errors::*;
let err = Error::from_sql_state("23505");
assert!(err.is::<UniqueViolationError>());
assert!(err.is::<ExecutionError>());
assert_eq!(err.sql_state(), Some("23505"));
```

Serialization failures and deadlocks carry the [`SHOULD_RETRY`] tag.

# Fields

Additional information (the offending query, server detail and hint,
parameter index, type OID) is attached as typed [fields](crate::fields)
and read back with [`Error::get`].
*/
mod error;
mod traits;

pub mod display;
pub mod fields;
pub mod kinds;

#[cfg(feature = "miette")]
pub mod miette;

pub use display::{display_error, display_error_verbose};
pub use error::{Error, Tag};
pub use kinds::*;
pub use traits::{ErrorKind, Field, ResultExt};
