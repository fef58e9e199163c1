use pretty_assertions::assert_eq;

use postgresql_client::errors::{Error, InvalidTransactionStateError};
use postgresql_client::errors::{UniqueViolationError, UserError};
use postgresql_client::errors::ErrorKind;

use crate::server::{complete, failure, MockServer};

const INSERT: &str = "INSERT INTO visits VALUES ($1, $2)";

#[test_log::test]
fn commit() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect(INSERT, complete("INSERT 0 1"))
        .expect(INSERT, complete("INSERT 0 1"))
        .expect("COMMIT", complete("COMMIT"));
    let mut db = server.database();
    let inserted = db.with_transaction(|tx| {
        let mut total = 0;
        for (id, page) in [(1_i64, "/index"), (2, "/about")] {
            total += tx
                .execute(INSERT, &(id, page))?
                .rows_affected()
                .unwrap_or(0);
        }
        Ok::<_, Error>(total)
    })?;
    assert_eq!(inserted, 2);
    assert_eq!(
        server.statements(),
        vec!["BEGIN", INSERT, INSERT, "COMMIT"]
    );
    server.assert_done();
    Ok(())
}

#[test_log::test]
fn rollback_on_error() {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect(INSERT, failure("23505", "duplicate key value"))
        .expect("ROLLBACK", complete("ROLLBACK"));
    let mut db = server.database();
    let err = db
        .with_transaction(|tx| tx.execute(INSERT, &(1_i64, "/index")))
        .unwrap_err();
    assert!(err.is::<UniqueViolationError>());
    assert_eq!(server.statements(), vec!["BEGIN", INSERT, "ROLLBACK"]);
    assert!(!db.is_closed());
}

#[test_log::test]
fn user_error_rolls_back() {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect("ROLLBACK", complete("ROLLBACK"));
    let mut db = server.database();
    let err = db
        .with_transaction(|_tx| Err::<(), _>(UserError::with_message("changed my mind")))
        .unwrap_err();
    assert!(err.is::<UserError>());
    server.assert_done();
}

#[test_log::test]
fn rollback_on_drop() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect(INSERT, complete("INSERT 0 1"))
        .expect("ROLLBACK", complete("ROLLBACK"))
        .expect("SELECT count(*) FROM visits", complete("SELECT 0"));
    let mut db = server.database();
    {
        let mut tx = db.transaction()?;
        tx.execute(INSERT, &(1_i64, "/index"))?;
    }
    db.execute("SELECT count(*) FROM visits", &())?;
    server.assert_done();
    Ok(())
}

#[test_log::test]
fn explicit_rollback() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect("ROLLBACK", complete("ROLLBACK"));
    let mut db = server.database();
    db.transaction()?.rollback()?;
    assert_eq!(server.statements(), vec!["BEGIN", "ROLLBACK"]);
    Ok(())
}

#[test_log::test]
fn commit_of_aborted_transaction() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect("SELECT 1/0", failure("22012", "division by zero"))
        .expect("COMMIT", complete("ROLLBACK"));
    let mut db = server.database();
    let mut tx = db.transaction()?;
    assert!(tx.execute("SELECT 1/0", &()).is_err());
    let err = tx.commit().unwrap_err();
    assert!(err.is::<InvalidTransactionStateError>());
    server.assert_done();
    Ok(())
}

#[test_log::test]
fn drop_after_disconnect() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect("BEGIN", complete("BEGIN"))
        .expect_disconnect(INSERT);
    let mut db = server.database();
    {
        let mut tx = db.transaction()?;
        assert!(tx.execute(INSERT, &(1_i64, "/index")).is_err());
    }
    assert!(db.is_closed());
    assert_eq!(server.statements(), vec!["BEGIN", INSERT]);
    Ok(())
}
