//! Tests against a real server, enabled by setting `POSTGRESQL_TEST_DSN`.
use pretty_assertions::assert_eq;

use postgresql_client::errors::{ExecutionError, UniqueViolationError};
use postgresql_client::{Builder, Database, Value};

fn database() -> anyhow::Result<Option<Database>> {
    let Ok(dsn) = std::env::var("POSTGRESQL_TEST_DSN") else {
        log::info!("POSTGRESQL_TEST_DSN is not set, skipping");
        return Ok(None);
    };
    let mut bld = Builder::new();
    bld.read_dsn(&dsn)?;
    Ok(Some(Database::connect(&bld.build()?)?))
}

#[test_log::test]
fn int_and_bool() -> anyhow::Result<()> {
    let Some(mut db) = database()? else {
        return Ok(());
    };
    let rows = db.execute("SELECT $1::int4, $2", &(2, true))?;
    assert_eq!(rows.get(0)?.values(), &[Value::Int32(2), Value::Bool(true)]);
    Ok(())
}

#[test_log::test]
fn integer_limits() -> anyhow::Result<()> {
    let Some(mut db) = database()? else {
        return Ok(());
    };
    let row = db.query::<(i16, i32, i64), _>(
        "SELECT $1::int2, $2::int4, $3::int8",
        &(i16::MIN, i32::MAX, i64::MIN),
    )?;
    assert_eq!(row, vec![(i16::MIN, i32::MAX, i64::MIN)]);
    let row = db.query::<(Option<String>, String), _>(
        "SELECT NULL::text, $1::text",
        &("Grüße",),
    )?;
    assert_eq!(row, vec![(None, "Grüße".into())]);
    Ok(())
}

#[test_log::test]
fn recreate_table() -> anyhow::Result<()> {
    let Some(mut db) = database()? else {
        return Ok(());
    };
    let create = "CREATE TEMP TABLE live_visits (id int8 PRIMARY KEY, page text)";
    db.execute(create, &())?;
    match db.execute(create, &()) {
        Ok(_) => panic!("table should already exist"),
        Err(e) if e.is::<ExecutionError>() => {
            db.execute("DROP TABLE live_visits", &())?;
            db.execute(create, &())?;
        }
        Err(e) => return Err(e.into()),
    }
    let insert = "INSERT INTO live_visits VALUES ($1, $2)";
    db.execute(insert, &(1_i64, "/index"))?;
    let err = db.execute(insert, &(1_i64, "/about")).unwrap_err();
    assert!(err.is::<UniqueViolationError>());
    let count = db.query::<(i64,), _>("SELECT count(*) FROM live_visits", &())?;
    assert_eq!(count, vec![(1,)]);
    db.close()?;
    Ok(())
}
