//! Typed PostgreSQL client
//!
//! Main way to use the client is [`Database`]: it owns a single connection
//! and runs statements one at a time. Parameters are passed as tuples (or
//! slices) of host values bound to `$1`, `$2`, ... placeholders, and every
//! statement returns a fully decoded [`ResultSet`].
//!
//! To connect, use the [`connect`] function (it gets connection parameters
//! from the libpq environment variables). You can also use [`Builder`] to
//! [`build`](Builder::build) a custom [`Config`] and
//! [connect](Database::connect) using that config.
//!
//! # Example
//!
//! ```rust,no_run
//! fn main() -> anyhow::Result<()> {
//!     let mut db = postgresql_client::connect()?;
//!     let rows = db.execute("SELECT $1::int4, $2::bool", &(2, true))?;
//!     let row = rows.get(0)?;
//!     assert_eq!(row.get_as::<i32>(0)?, 2);
//!     assert_eq!(row.get_as::<bool>(1)?, true);
//!     Ok(())
//! }
//! ```
//!
//! # Types
//!
//! | PostgreSQL        | [`Value`]          | Rust                  |
//! |-------------------|--------------------|-----------------------|
//! | `bool`            | `Bool`             | `bool`                |
//! | `int2`            | `Int16`            | `i16`                 |
//! | `int4`            | `Int32`            | `i32`                 |
//! | `int8`            | `Int64`            | `i64`                 |
//! | `text`, `varchar` | `Text`             | `String`, `&str`      |
//! | `NULL`            | `Null`             | `Option<T>`           |
//!
//! Other types can be supported by registering a
//! [`Codec`](postgresql_protocol::codec::Codec) in a custom
//! [`TypeRegistry`] and passing it to [`Database::with_registry`].
#![warn(missing_debug_implementations)]

mod builder;
mod connection;
mod database;
mod env;
pub mod errors;
pub mod raw;
mod transaction;

pub use builder::{Builder, Config};
pub use connection::{Connection, Connector, PgConnector};
pub use database::Database;
pub use env::Env;
pub use errors::Error;
pub use transaction::Transaction;

pub use postgresql_protocol::common::TypeId;
pub use postgresql_protocol::query_arg::{QueryArg, QueryArgs, Typed};
pub use postgresql_protocol::queryable::{FromValue, Queryable};
pub use postgresql_protocol::registry::TypeRegistry;
pub use postgresql_protocol::result_set::{ResultSet, Row};
pub use postgresql_protocol::value::Value;

/// Create a connection to the database with default parameters
///
/// Connection parameters are read from the environment (`PGHOST`,
/// `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE` and friends, see
/// [`Builder::read_env_vars`]), so no configuration is specified here.
///
/// For more fine-grained setup see [`Database`] and [`Builder`]
/// documentation and the source of this function.
pub fn connect() -> Result<Database, Error> {
    Database::connect(&Builder::from_env()?.build()?)
}
