use postgresql_protocol::query_arg::QueryArgs;
use postgresql_protocol::queryable::Queryable;
use postgresql_protocol::result_set::ResultSet;

use crate::database::Database;
use crate::errors::{Error, ErrorKind, InvalidTransactionStateError};

/// Transaction object returned by [`Database::transaction`].
///
/// Dropping the transaction without calling [`commit`](Transaction::commit)
/// rolls it back.
#[derive(Debug)]
pub struct Transaction<'a> {
    db: &'a mut Database,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(db: &'a mut Database) -> Result<Transaction<'a>, Error> {
        db.execute("BEGIN", &())?;
        log::trace!("transaction started");
        Ok(Transaction {
            db,
            finished: false,
        })
    }

    /// Run a statement inside the transaction.
    pub fn execute<A>(&mut self, sql: &str, arguments: &A) -> Result<ResultSet, Error>
    where
        A: QueryArgs + ?Sized,
    {
        self.db.execute(sql, arguments)
    }

    /// Run a statement inside the transaction and convert rows into `R`.
    pub fn query<R, A>(&mut self, sql: &str, arguments: &A) -> Result<Vec<R>, Error>
    where
        R: Queryable,
        A: QueryArgs + ?Sized,
    {
        self.db.query(sql, arguments)
    }

    /// Commit the transaction.
    ///
    /// If a statement in the transaction failed, the server rolls back
    /// instead and [`InvalidTransactionStateError`] is returned.
    pub fn commit(mut self) -> Result<(), Error> {
        self.finished = true;
        let result = self.db.execute("COMMIT", &())?;
        if result.command_tag() == "ROLLBACK" {
            return Err(InvalidTransactionStateError::with_message(
                "transaction was aborted, rolled back instead of commit",
            ));
        }
        log::trace!("transaction committed");
        Ok(())
    }

    pub fn rollback(mut self) -> Result<(), Error> {
        self.finished = true;
        self.db.execute("ROLLBACK", &())?;
        log::trace!("transaction rolled back");
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            log::trace!("transaction explicitly committed or rolled back, noop drop");
            return;
        }
        if self.db.is_closed() {
            log::debug!("transaction dropped after connection was closed");
            return;
        }
        log::debug!("transaction dropped, so rolling back");
        match self.db.execute("ROLLBACK", &()) {
            Ok(_) => log::debug!("rollback successful"),
            Err(e) => log::error!("rollback error: {:#}", e),
        }
    }
}
