use std::sync::Arc;

use postgresql_protocol::query_arg::{ParameterBinder, QueryArgs};
use postgresql_protocol::queryable::Queryable;
use postgresql_protocol::registry::TypeRegistry;
use postgresql_protocol::result_set::ResultSet;
use postgresql_protocol::server_message::ServerResponse;
use postgresql_protocol::ResultDecoder;

use crate::builder::Config;
use crate::connection::{Connection, Connector, PgConnector};
use crate::errors::fields::QueryText;
use crate::errors::{ClientConnectionClosedError, Error, ErrorKind};
use crate::transaction::Transaction;

/// A connection to a single database.
///
/// Statements run one at a time, in the order they are issued; `execute`
/// borrows the database mutably for the whole round trip. An error
/// reported by the server for one statement does not affect the following
/// ones:
///
/// ```rust,no_run
/// # fn main() -> Result<(), postgresql_client::Error> {
/// use postgresql_client::errors::ExecutionError;
///
/// let mut db = postgresql_client::connect()?;
/// let create = "CREATE TABLE visits (id int8 PRIMARY KEY, page text)";
/// match db.execute(create, &()) {
///     Ok(_) => {}
///     Err(e) if e.is::<ExecutionError>() => {
///         db.execute("DROP TABLE visits", &())?;
///         db.execute(create, &())?;
///     }
///     Err(e) => return Err(e),
/// }
/// db.execute("INSERT INTO visits VALUES ($1, $2)", &(1, "/index"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
    conn: Option<Box<dyn Connection>>,
    config: Config,
    registry: Arc<TypeRegistry>,
}

fn closed() -> Error {
    ClientConnectionClosedError::with_message("database connection is closed")
}

impl Database {
    /// Connect to the server described by `config`.
    pub fn connect(config: &Config) -> Result<Database, Error> {
        Database::connect_with(config, &PgConnector)
    }

    /// Connect using a custom [`Connector`].
    pub fn connect_with(config: &Config, connector: &dyn Connector) -> Result<Database, Error> {
        let conn = connector.connect(config)?;
        Ok(Database::with_connection(config.clone(), conn))
    }

    /// Wrap an already established connection.
    pub fn with_connection(config: Config, conn: Box<dyn Connection>) -> Database {
        Database {
            conn: Some(conn),
            config,
            registry: TypeRegistry::shared(),
        }
    }

    /// Use `registry` to encode parameters and decode results.
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Database {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Host name of the server, `None` for a Unix socket connection.
    pub fn host(&self) -> Option<&str> {
        self.config.host()
    }

    /// Database name.
    pub fn name(&self) -> &str {
        self.config.database()
    }

    pub fn user(&self) -> &str {
        self.config.user()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a statement and return all of its rows.
    ///
    /// Arguments are bound to the `$1`, `$2`, ... placeholders of `sql`;
    /// use `&()` for a statement without parameters. Rows that the
    /// statement produces are fully decoded before this method returns.
    ///
    /// Errors reported by the server are of kind
    /// [`ExecutionError`](crate::errors::ExecutionError) and carry the
    /// statement text.
    pub fn execute<A>(&mut self, sql: &str, arguments: &A) -> Result<ResultSet, Error>
    where
        A: QueryArgs + ?Sized,
    {
        self.execute_inner(sql, arguments)
            .map_err(|e| e.with::<QueryText>(sql))
    }

    fn execute_inner<A>(&mut self, sql: &str, arguments: &A) -> Result<ResultSet, Error>
    where
        A: QueryArgs + ?Sized,
    {
        let params = ParameterBinder::new(&self.registry).bind(sql, arguments)?;
        let conn = self.conn.as_mut().ok_or_else(closed)?;
        let result = if params.is_empty() {
            conn.send_simple(sql)
        } else {
            conn.send_parameterized(sql, &params)
        };
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if !conn.is_consistent() {
                    log::warn!(
                        "Connection to {} is unusable, closing: {:#}",
                        self.config.display_addr(),
                        e
                    );
                    self.conn = None;
                }
                return Err(e);
            }
        };
        match response {
            ServerResponse::Complete(response) => ResultDecoder::new(&self.registry).decode(response),
            ServerResponse::Error(error) => Err(error.into()),
        }
    }

    /// Run a statement and convert every row into `R`.
    ///
    /// ```rust,no_run
    /// # fn main() -> Result<(), postgresql_client::Error> {
    /// # let mut db = postgresql_client::connect()?;
    /// let pairs = db.query::<(i32, bool), _>("SELECT $1::int4, true", &(2,))?;
    /// assert_eq!(pairs, vec![(2, true)]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query<R, A>(&mut self, sql: &str, arguments: &A) -> Result<Vec<R>, Error>
    where
        R: Queryable,
        A: QueryArgs + ?Sized,
    {
        let rows = self.execute(sql, arguments)?;
        rows.iter()
            .map(|row| row.decode::<R>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.with::<QueryText>(sql))
    }

    /// Start a transaction.
    ///
    /// The transaction is rolled back unless
    /// [`commit`](Transaction::commit) is called.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, Error> {
        Transaction::begin(self)
    }

    /// Run `body` in a transaction.
    ///
    /// The transaction is committed if `body` returns `Ok` and rolled back
    /// otherwise.
    pub fn with_transaction<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<Error>,
    {
        let mut tx = self.transaction()?;
        match body(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                log::debug!("transaction successful");
                Ok(value)
            }
            Err(e) => {
                log::debug!("transaction error, rolling back");
                if let Err(rollback) = tx.rollback() {
                    log::warn!("rollback error: {:#}", rollback);
                }
                Err(e)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Close the connection.
    ///
    /// Any further statement fails with
    /// [`ClientConnectionClosedError`]. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), Error> {
        match self.conn.take() {
            Some(mut conn) => conn.close(),
            None => Ok(()),
        }
    }
}
