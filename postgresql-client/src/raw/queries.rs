use fallible_iterator::FallibleIterator;
use postgres_protocol::message::backend as inp;
use postgres_protocol::message::frontend as out;
use postgres_protocol::IsNull;
use snafu::{IntoError, OptionExt, ResultExt};

use postgresql_protocol::common::{Format, TypeId};
use postgresql_protocol::query_arg::BoundParam;
use postgresql_protocol::server_message::{DataRow, QueryResponse, RawColumn, ServerResponse};

use crate::connection::Connection;
use crate::errors::{ClientConnectionClosedError, ClientInconsistentError};
use crate::errors::{Error, ErrorKind, ProtocolEncodingError};
use crate::raw::connection::error_response;
use crate::raw::{Decode, Encode, OutOfOrder};
use crate::raw::{Mode, PgConnection, ReadError};

/// Marks a request in progress; the connection is unusable until it is
/// consumed by `expect_ready`.
pub(crate) struct Guard;

impl PgConnection {
    fn begin_request(&mut self) -> Result<Guard, Error> {
        match self.mode {
            Mode::Idle(_) => {
                self.mode = Mode::Dirty;
                Ok(Guard)
            }
            Mode::Dirty => Err(ClientInconsistentError::with_message(
                "previous request was interrupted",
            )),
            Mode::Closed => Err(ClientConnectionClosedError::with_message(
                "connection is closed",
            )),
        }
    }

    fn expect_ready(&mut self, guard: Guard) -> Result<(), Error> {
        loop {
            if let inp::Message::ReadyForQuery(ready) = self.message()? {
                drop(guard);
                self.set_ready(ready.status())?;
                return Ok(());
            }
        }
    }

    /// Run a single statement through the extended query protocol.
    pub(crate) fn statement(
        &mut self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<ServerResponse, Error> {
        let idle = self.mode;
        let guard = self.begin_request()?;
        if let Err(e) = self.write_statement(sql, params) {
            // nothing was sent yet
            self.outbuf.clear();
            self.mode = idle;
            return Err(e);
        }
        log::debug!(
            "{}: executing {:?} with {} parameters",
            self.peer,
            sql,
            params.len()
        );
        self.flush()?;
        self.read_response(guard)
    }

    fn write_statement(&mut self, sql: &str, params: &[BoundParam]) -> Result<(), Error> {
        let binary = Format::Binary.code();
        out::parse("", sql, params.iter().map(|p| p.type_id.0), &mut self.outbuf)
            .context(Encode)?;
        out::bind(
            "",
            "",
            Some(binary),
            params,
            |param, buf| match &param.value {
                Some(data) => {
                    buf.extend_from_slice(data);
                    Ok(IsNull::No)
                }
                None => Ok(IsNull::Yes),
            },
            Some(binary),
            &mut self.outbuf,
        )
        .map_err(|e| match e {
            out::BindError::Conversion(e) => ProtocolEncodingError::with_source_box(e),
            out::BindError::Serialization(e) => Encode.into_error(e).into(),
        })?;
        out::describe(b'P', "", &mut self.outbuf).context(Encode)?;
        out::execute("", 0, &mut self.outbuf).context(Encode)?;
        out::sync(&mut self.outbuf);
        Ok(())
    }

    fn read_response(&mut self, guard: Guard) -> Result<ServerResponse, Error> {
        let mut response = QueryResponse::default();
        loop {
            match self.message()? {
                inp::Message::ParseComplete
                | inp::Message::BindComplete
                | inp::Message::NoData
                | inp::Message::EmptyQueryResponse => {}
                inp::Message::RowDescription(desc) => {
                    response.columns = columns(&desc)?;
                }
                inp::Message::DataRow(row) => {
                    response.rows.push(data_row(&row)?);
                }
                inp::Message::CommandComplete(body) => {
                    response.tag = body.tag().context(Decode)?.to_owned();
                }
                inp::Message::CopyInResponse(_) => {
                    out::copy_fail("COPY FROM STDIN is not supported", &mut self.outbuf)
                        .context(Encode)?;
                    self.flush()?;
                }
                inp::Message::CopyOutResponse(_)
                | inp::Message::CopyData(_)
                | inp::Message::CopyDone => {
                    log::trace!("{}: skipping COPY output", self.peer);
                }
                inp::Message::ErrorResponse(body) => {
                    let error = error_response(body.fields())?;
                    self.expect_ready(guard)?;
                    log::debug!(
                        "{}: statement failed with {}: {}",
                        self.peer,
                        error.code,
                        error.message
                    );
                    return Ok(ServerResponse::Error(error));
                }
                inp::Message::ReadyForQuery(ready) => {
                    drop(guard);
                    self.set_ready(ready.status())?;
                    log::debug!(
                        "{}: {:?}, {} rows",
                        self.peer,
                        response.tag,
                        response.rows.len()
                    );
                    return Ok(ServerResponse::Complete(response));
                }
                _ => {
                    return Err(OutOfOrder {
                        message: "unexpected message in query response",
                    }
                    .build()
                    .into())
                }
            }
        }
    }
}

fn columns(desc: &inp::RowDescriptionBody) -> Result<Vec<RawColumn>, ReadError> {
    let mut fields = desc.fields();
    let mut columns = Vec::new();
    while let Some(field) = fields.next().context(Decode)? {
        let format = Format::from_code(field.format()).context(OutOfOrder {
            message: "invalid column format code",
        })?;
        columns.push(RawColumn {
            name: field.name().to_owned(),
            type_id: TypeId(field.type_oid()),
            format,
        });
    }
    Ok(columns)
}

fn data_row(row: &inp::DataRowBody) -> Result<DataRow, ReadError> {
    let buf = row.buffer_bytes();
    let mut ranges = row.ranges();
    let mut fields = Vec::with_capacity(ranges.size_hint().0);
    while let Some(range) = ranges.next().context(Decode)? {
        fields.push(range.map(|r| buf.slice(r)));
    }
    Ok(DataRow { fields })
}

impl Connection for PgConnection {
    fn send_simple(&mut self, sql: &str) -> Result<ServerResponse, Error> {
        self.statement(sql, &[])
    }
    fn send_parameterized(
        &mut self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<ServerResponse, Error> {
        self.statement(sql, params)
    }
    fn close(&mut self) -> Result<(), Error> {
        self.terminate()
    }
    fn is_consistent(&self) -> bool {
        matches!(self.mode, Mode::Idle(_))
    }
}
