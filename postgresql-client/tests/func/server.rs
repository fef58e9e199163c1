//! Scripted in-process server used in place of a real connection.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use postgresql_client::errors::{ClientConnectionEosError, Error, ErrorKind};
use postgresql_client::{Builder, Config, Connection, Connector, Database, TypeId};
use postgresql_protocol::common::Format;
use postgresql_protocol::query_arg::BoundParam;
use postgresql_protocol::server_message::{DataRow, ErrorResponse, ErrorSeverity};
use postgresql_protocol::server_message::{QueryResponse, RawColumn, ServerResponse};

#[derive(Debug, Clone, Default)]
pub struct MockServer(Arc<Mutex<State>>);

#[derive(Debug, Default)]
struct State {
    script: VecDeque<(String, Reply)>,
    received: Vec<Received>,
    connections: usize,
    closed: bool,
}

#[derive(Debug)]
enum Reply {
    Response(ServerResponse),
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

#[derive(Debug)]
struct MockConnection {
    server: MockServer,
    consistent: bool,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }
    pub fn expect(&self, sql: &str, response: ServerResponse) -> &Self {
        self.state()
            .script
            .push_back((sql.into(), Reply::Response(response)));
        self
    }
    pub fn expect_disconnect(&self, sql: &str) -> &Self {
        self.state()
            .script
            .push_back((sql.into(), Reply::Disconnect));
        self
    }
    pub fn received(&self) -> Vec<Received> {
        self.state().received.clone()
    }
    pub fn statements(&self) -> Vec<String> {
        self.state().received.iter().map(|r| r.sql.clone()).collect()
    }
    pub fn connections(&self) -> usize {
        self.state().connections
    }
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
    pub fn assert_done(&self) {
        let state = self.state();
        assert!(
            state.script.is_empty(),
            "statements not executed: {:?}",
            state.script
        );
    }
    pub fn database(&self) -> Database {
        Database::connect_with(&config(), self).expect("mock connection works")
    }
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().expect("mock server mutex works")
    }
}

pub fn config() -> Config {
    let mut bld = Builder::new();
    bld.host_port(Some("db.example.com"), Some(5432))
        .unwrap()
        .user("app")
        .unwrap()
        .database("shop")
        .unwrap();
    bld.build().unwrap()
}

impl Connector for MockServer {
    fn connect(&self, _config: &Config) -> Result<Box<dyn Connection>, Error> {
        self.state().connections += 1;
        Ok(Box::new(MockConnection {
            server: self.clone(),
            consistent: true,
        }))
    }
}

impl MockConnection {
    fn reply(&mut self, sql: &str, params: &[BoundParam]) -> Result<ServerResponse, Error> {
        assert!(self.consistent, "statement sent over a broken connection");
        let mut state = self.server.state();
        let (expected, reply) = state
            .script
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected statement {:?}", sql));
        assert_eq!(expected, sql, "statements executed out of order");
        state.received.push(Received {
            sql: sql.into(),
            params: params.to_vec(),
        });
        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Disconnect => {
                self.consistent = false;
                Err(ClientConnectionEosError::with_message("end of stream"))
            }
        }
    }
}

impl Connection for MockConnection {
    fn send_simple(&mut self, sql: &str) -> Result<ServerResponse, Error> {
        self.reply(sql, &[])
    }
    fn send_parameterized(
        &mut self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<ServerResponse, Error> {
        assert!(!params.is_empty());
        self.reply(sql, params)
    }
    fn close(&mut self) -> Result<(), Error> {
        self.server.state().closed = true;
        Ok(())
    }
    fn is_consistent(&self) -> bool {
        self.consistent
    }
}

pub fn complete(tag: &str) -> ServerResponse {
    ServerResponse::Complete(QueryResponse {
        tag: tag.into(),
        ..Default::default()
    })
}

pub fn rows(columns: &[(&str, TypeId)], rows: &[&[Option<&[u8]>]]) -> ServerResponse {
    ServerResponse::Complete(QueryResponse {
        columns: columns
            .iter()
            .map(|(name, type_id)| RawColumn {
                name: name.to_string(),
                type_id: *type_id,
                format: Format::Binary,
            })
            .collect(),
        rows: rows
            .iter()
            .map(|fields| DataRow {
                fields: fields
                    .iter()
                    .map(|f| f.map(Bytes::copy_from_slice))
                    .collect(),
            })
            .collect(),
        tag: format!("SELECT {}", rows.len()),
    })
}

pub fn error(code: &str, message: &str) -> ErrorResponse {
    ErrorResponse {
        severity: ErrorSeverity::Error,
        code: code.into(),
        message: message.into(),
        detail: None,
        hint: None,
        position: None,
    }
}

pub fn failure(code: &str, message: &str) -> ServerResponse {
    ServerResponse::Error(error(code, message))
}
