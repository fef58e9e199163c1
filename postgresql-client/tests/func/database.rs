use bytes::Bytes;
use pretty_assertions::assert_eq;

use postgresql_client::errors::{ClientConnectionClosedError, ConnectionError};
use postgresql_client::errors::{DuplicateObjectError, ExecutionError, ParameterCountError};
use postgresql_client::errors::{UniqueViolationError, UnsupportedTypeError};
use postgresql_client::{Builder, Database, TypeId, Value};
use postgresql_protocol::query_arg::BoundParam;
use postgresql_protocol::server_message::ServerResponse;

use crate::server::{complete, error, failure, rows, MockServer};

const CREATE: &str = "CREATE TABLE visits (id int8 PRIMARY KEY, page text)";
const INSERT: &str = "INSERT INTO visits VALUES ($1, $2)";

#[test_log::test]
fn int_and_bool() -> anyhow::Result<()> {
    let server = MockServer::new();
    server.expect(
        "SELECT $1::int4, $2",
        rows(
            &[("int4", TypeId::INT4), ("?column?", TypeId::BOOL)],
            &[&[Some(&b"\0\0\0\x02"[..]), Some(&b"\x01"[..])]],
        ),
    );
    let mut db = server.database();
    let result = db.execute("SELECT $1::int4, $2", &(2, true))?;
    assert_eq!(result.len(), 1);
    let row = result.get(0)?;
    assert_eq!(row.values(), &[Value::Int32(2), Value::Bool(true)]);
    assert_eq!(row.get_as::<i32>(0)?, 2);
    assert!(row.get_as::<bool>(1)?);
    assert_eq!(row.decode::<(i64, bool)>()?, (2, true));
    assert_eq!(
        server.received()[0].params,
        vec![
            BoundParam {
                type_id: TypeId::INT2,
                value: Some(Bytes::from_static(b"\0\x02")),
            },
            BoundParam {
                type_id: TypeId::BOOL,
                value: Some(Bytes::from_static(b"\x01")),
            },
        ]
    );
    server.assert_done();
    Ok(())
}

#[test_log::test]
fn typed_query() -> anyhow::Result<()> {
    let server = MockServer::new();
    server.expect(
        "SELECT id, page FROM visits",
        rows(
            &[("id", TypeId::INT8), ("page", TypeId::TEXT)],
            &[
                &[Some(&b"\0\0\0\0\0\0\0\x01"[..]), Some(&b"/index"[..])],
                &[Some(&b"\0\0\0\0\0\0\0\x02"[..]), None],
            ],
        ),
    );
    let mut db = server.database();
    let visits = db.query::<(i64, Option<String>), _>("SELECT id, page FROM visits", &())?;
    assert_eq!(visits, vec![(1, Some("/index".into())), (2, None)]);
    Ok(())
}

#[test_log::test]
fn no_rows() -> anyhow::Result<()> {
    let server = MockServer::new();
    server.expect(
        "SELECT id, page FROM visits WHERE id = $1",
        rows(&[("id", TypeId::INT8), ("page", TypeId::TEXT)], &[]),
    );
    let mut db = server.database();
    let result = db.execute("SELECT id, page FROM visits WHERE id = $1", &(7_i64,))?;
    assert!(result.is_empty());
    assert_eq!(result.columns().len(), 2);
    assert_eq!(result.column_index("page"), Some(1));
    Ok(())
}

#[test_log::test]
fn rows_affected() -> anyhow::Result<()> {
    let server = MockServer::new();
    server.expect(INSERT, complete("INSERT 0 1"));
    let mut db = server.database();
    let result = db.execute(INSERT, &(1_i64, "/index"))?;
    assert!(result.is_empty());
    assert_eq!(result.command_tag(), "INSERT 0 1");
    assert_eq!(result.rows_affected(), Some(1));
    Ok(())
}

#[test_log::test]
fn unique_violation() {
    let server = MockServer::new();
    let mut violation = error(
        "23505",
        "duplicate key value violates unique constraint \"visits_pkey\"",
    );
    violation.detail = Some("Key (id)=(1) already exists.".into());
    server.expect(INSERT, complete("INSERT 0 1"));
    server.expect(INSERT, ServerResponse::Error(violation));
    let mut db = server.database();
    db.execute(INSERT, &(1_i64, "/index")).unwrap();
    let err = db.execute(INSERT, &(1_i64, "/about")).unwrap_err();
    assert!(err.is::<UniqueViolationError>());
    assert!(err.is::<ExecutionError>());
    assert_eq!(err.sql_state(), Some("23505"));
    assert_eq!(err.detail(), Some("Key (id)=(1) already exists."));
    assert_eq!(err.query_text(), Some(INSERT));
    assert!(!db.is_closed());
}

#[test_log::test]
fn drop_and_recreate() -> anyhow::Result<()> {
    let server = MockServer::new();
    server
        .expect(CREATE, failure("42P07", "relation \"visits\" already exists"))
        .expect("DROP TABLE visits", complete("DROP TABLE"))
        .expect(CREATE, complete("CREATE TABLE"))
        .expect(INSERT, complete("INSERT 0 1"));
    let mut db = server.database();
    match db.execute(CREATE, &()) {
        Ok(_) => panic!("table should already exist"),
        Err(e) if e.is::<ExecutionError>() => {
            assert!(e.is::<DuplicateObjectError>());
            db.execute("DROP TABLE visits", &())?;
            db.execute(CREATE, &())?;
        }
        Err(e) => return Err(e.into()),
    }
    db.execute(INSERT, &(1_i64, "/index"))?;
    assert_eq!(server.connections(), 1);
    assert_eq!(
        server.statements(),
        vec![CREATE, "DROP TABLE visits", CREATE, INSERT]
    );
    server.assert_done();
    Ok(())
}

#[test_log::test]
fn error_position() {
    let server = MockServer::new();
    let mut syntax = error("42601", "syntax error at or near \"SELEC\"");
    syntax.position = Some(1);
    server.expect("SELEC 1", ServerResponse::Error(syntax));
    let mut db = server.database();
    let err = db.execute("SELEC 1", &()).unwrap_err();
    assert_eq!(err.position(), Some(0));
    let verbose = postgresql_client::errors::display_error_verbose(&err).to_string();
    assert!(verbose.contains("SELEC 1"), "{}", verbose);
}

#[test_log::test]
fn parameter_count_mismatch() {
    let server = MockServer::new();
    let mut db = server.database();
    let err = db
        .execute("SELECT $1::int4, $2::int4", &(1,))
        .unwrap_err();
    assert!(err.is::<ParameterCountError>());
    assert_eq!(err.query_text(), Some("SELECT $1::int4, $2::int4"));
    let err = db.execute("SELECT 1", &(1, 2)).unwrap_err();
    assert!(err.is::<ParameterCountError>());
    assert!(server.received().is_empty());
    assert!(!db.is_closed());
}

#[test_log::test]
fn unsupported_column() {
    let server = MockServer::new();
    // float8
    server.expect(
        "SELECT 1.5::float8",
        rows(&[("float8", TypeId(701))], &[&[Some(&b"?\xf8\0\0\0\0\0\0"[..])]]),
    );
    let mut db = server.database();
    let err = db.execute("SELECT 1.5::float8", &()).unwrap_err();
    assert!(err.is::<UnsupportedTypeError>());
    assert!(!db.is_closed());
}

#[test_log::test]
fn broken_connection() {
    let server = MockServer::new();
    server.expect_disconnect("SELECT pg_sleep(10)");
    let mut db = server.database();
    let err = db.execute("SELECT pg_sleep(10)", &()).unwrap_err();
    assert!(err.is::<ConnectionError>());
    assert!(db.is_closed());
    let err = db.execute("SELECT 1", &()).unwrap_err();
    assert!(err.is::<ClientConnectionClosedError>());
    assert_eq!(server.statements(), vec!["SELECT pg_sleep(10)"]);
}

#[test_log::test]
fn close() -> anyhow::Result<()> {
    let server = MockServer::new();
    let mut db = server.database();
    assert!(!db.is_closed());
    db.close()?;
    assert!(db.is_closed());
    assert!(server.is_closed());
    let err = db.execute("SELECT 1", &()).unwrap_err();
    assert!(err.is::<ClientConnectionClosedError>());
    db.close()?;
    Ok(())
}

#[test_log::test]
fn identity() -> anyhow::Result<()> {
    let db = MockServer::new().database();
    assert_eq!(db.host(), Some("db.example.com"));
    assert_eq!(db.name(), "shop");
    assert_eq!(db.user(), "app");

    let mut bld = Builder::new();
    bld.unix_socket_dir("/run/postgresql").port(6432)?.user("app")?;
    let server = MockServer::new();
    let db = Database::connect_with(&bld.build()?, &server)?;
    assert_eq!(db.host(), None);
    assert_eq!(db.name(), "app");
    assert_eq!(
        db.config().unix_path(),
        Some(std::path::Path::new("/run/postgresql/.s.PGSQL.6432"))
    );
    Ok(())
}

#[test_log::test]
fn miette_report() {
    let server = MockServer::new();
    let mut missing = error("42P01", "relation \"vists\" does not exist");
    missing.position = Some(15);
    server.expect("SELECT * FROM vists", ServerResponse::Error(missing));
    let mut db = server.database();
    let err = db.execute("SELECT * FROM vists", &()).unwrap_err();
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("relation \"vists\" does not exist"), "{}", report);
}
