use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use fallible_iterator::FallibleIterator;
use postgres_protocol::authentication::{md5_hash, sasl};
use postgres_protocol::message::backend as inp;
use postgres_protocol::message::frontend as out;
use snafu::{OptionExt, ResultExt};

use postgresql_protocol::server_message::{ErrorResponse, ErrorSeverity, TransactionState};

use crate::builder::{Address, Config};
use crate::errors::{AuthenticationError, ClientConnectionFailedError};
use crate::errors::{Error, ErrorKind};
use crate::raw::{BackendKey, Mode, PgConnection, ReadError, Transport};
use crate::raw::{Decode, Encode, Eos, Io, OutOfOrder};

const READ_CHUNK: usize = 8192;

impl PgConnection {
    /// Connect and authenticate using `config`.
    pub fn connect(config: &Config) -> Result<PgConnection, Error> {
        let (peer, stream) = open_stream(config).map_err(|e| {
            ClientConnectionFailedError::with_source(e)
                .context(format!("cannot connect to {}", config.display_addr()))
        })?;
        let mut conn = PgConnection::new(peer, stream);
        conn.startup(config)?;
        Ok(conn)
    }

    pub(crate) fn startup(&mut self, config: &Config) -> Result<(), Error> {
        let mut params = vec![
            ("user", config.user()),
            ("database", config.database()),
            ("client_encoding", "UTF8"),
        ];
        if let Some(name) = config.application_name() {
            params.push(("application_name", name));
        }
        out::startup_message(params, &mut self.outbuf).context(Encode)?;
        self.flush()?;
        self.authenticate(config)?;
        loop {
            match self.message()? {
                inp::Message::BackendKeyData(keydata) => {
                    log::debug!("{}: backend pid {}", self.peer, keydata.process_id());
                    self.backend_key = Some(BackendKey {
                        pid: keydata.process_id(),
                        secret: keydata.secret_key(),
                    });
                }
                inp::Message::ReadyForQuery(ready) => {
                    self.set_ready(ready.status())?;
                    log::info!("{}: connected to database {:?}", self.peer, config.database());
                    return Ok(());
                }
                inp::Message::ErrorResponse(body) => {
                    return Err(startup_error(error_response(body.fields())?));
                }
                _ => {
                    return Err(OutOfOrder {
                        message: "unexpected message during startup",
                    }
                    .build()
                    .into())
                }
            }
        }
    }

    fn authenticate(&mut self, config: &Config) -> Result<(), Error> {
        loop {
            match self.message()? {
                inp::Message::AuthenticationOk => {
                    log::debug!("{}: authenticated as {:?}", self.peer, config.user());
                    return Ok(());
                }
                inp::Message::AuthenticationCleartextPassword => {
                    let password = require_password(config)?;
                    out::password_message(password.as_bytes(), &mut self.outbuf)
                        .context(Encode)?;
                    self.flush()?;
                }
                inp::Message::AuthenticationMd5Password(body) => {
                    let password = require_password(config)?;
                    let hash = md5_hash(
                        config.user().as_bytes(),
                        password.as_bytes(),
                        body.salt(),
                    );
                    out::password_message(hash.as_bytes(), &mut self.outbuf).context(Encode)?;
                    self.flush()?;
                }
                inp::Message::AuthenticationSasl(body) => {
                    self.authenticate_scram(config, &body)?;
                }
                inp::Message::ErrorResponse(body) => {
                    return Err(startup_error(error_response(body.fields())?));
                }
                inp::Message::AuthenticationKerberosV5
                | inp::Message::AuthenticationScmCredential
                | inp::Message::AuthenticationGss
                | inp::Message::AuthenticationSspi
                | inp::Message::AuthenticationGssContinue(_) => {
                    return Err(AuthenticationError::with_message(
                        "authentication method requested by the server is not supported",
                    ));
                }
                _ => {
                    return Err(OutOfOrder {
                        message: "unexpected message during authentication",
                    }
                    .build()
                    .into())
                }
            }
        }
    }

    fn authenticate_scram(
        &mut self,
        config: &Config,
        body: &inp::AuthenticationSaslBody,
    ) -> Result<(), Error> {
        let mut mechanisms = body.mechanisms();
        let mut supported = false;
        while let Some(mechanism) = mechanisms.next().context(Decode)? {
            if mechanism == sasl::SCRAM_SHA_256 {
                supported = true;
            }
        }
        if !supported {
            return Err(AuthenticationError::with_message(
                "server offered no supported SASL mechanism",
            ));
        }
        let password = require_password(config)?;
        let mut scram =
            sasl::ScramSha256::new(password.as_bytes(), sasl::ChannelBinding::unsupported());
        out::sasl_initial_response(sasl::SCRAM_SHA_256, scram.message(), &mut self.outbuf)
            .context(Encode)?;
        self.flush()?;
        match self.message()? {
            inp::Message::AuthenticationSaslContinue(body) => {
                scram
                    .update(body.data())
                    .map_err(AuthenticationError::with_source)?;
            }
            inp::Message::ErrorResponse(body) => {
                return Err(startup_error(error_response(body.fields())?));
            }
            _ => {
                return Err(OutOfOrder {
                    message: "expected SASL continue message",
                }
                .build()
                .into())
            }
        }
        out::sasl_response(scram.message(), &mut self.outbuf).context(Encode)?;
        self.flush()?;
        match self.message()? {
            inp::Message::AuthenticationSaslFinal(body) => {
                scram
                    .finish(body.data())
                    .map_err(AuthenticationError::with_source)?;
            }
            inp::Message::ErrorResponse(body) => {
                return Err(startup_error(error_response(body.fields())?));
            }
            _ => {
                return Err(OutOfOrder {
                    message: "expected SASL final message",
                }
                .build()
                .into())
            }
        }
        Ok(())
    }

    /// Next message that needs a reaction.
    ///
    /// Asynchronous messages (parameter changes, notices and
    /// notifications) are consumed here.
    pub(crate) fn message(&mut self) -> Result<inp::Message, ReadError> {
        loop {
            match self.read_message()? {
                inp::Message::ParameterStatus(param) => {
                    let name = param.name().context(Decode)?;
                    let value = param.value().context(Decode)?;
                    log::debug!("Param {:?} = {:?}", name, value);
                    self.server_params.insert(name.into(), value.into());
                }
                inp::Message::NoticeResponse(body) => {
                    let notice = error_response(body.fields())?;
                    log::warn!("{}: server notice {}: {}", self.peer, notice.code, notice.message);
                }
                inp::Message::NotificationResponse(body) => {
                    log::debug!(
                        "{}: notification from pid {} on channel {:?}",
                        self.peer,
                        body.process_id(),
                        body.channel().context(Decode)?,
                    );
                }
                msg => return Ok(msg),
            }
        }
    }

    fn read_message(&mut self) -> Result<inp::Message, ReadError> {
        loop {
            if let Some(msg) = inp::Message::parse(&mut self.inbuf).context(Decode)? {
                return Ok(msg);
            }
            let len = self.inbuf.len();
            self.inbuf.resize(len + READ_CHUNK, 0);
            let result = self.stream.read(&mut self.inbuf[len..]);
            match result {
                Ok(0) => {
                    self.inbuf.truncate(len);
                    return Eos.fail();
                }
                Ok(bytes) => self.inbuf.truncate(len + bytes),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.inbuf.truncate(len),
                Err(e) => {
                    self.inbuf.truncate(len);
                    return Err(e).context(Io);
                }
            }
        }
    }

    pub(crate) fn flush(&mut self) -> Result<(), ReadError> {
        let result = self
            .stream
            .write_all(&self.outbuf)
            .and_then(|()| self.stream.flush());
        self.outbuf.clear();
        result.context(Io)
    }

    pub(crate) fn set_ready(&mut self, status: u8) -> Result<(), ReadError> {
        let state = TransactionState::from_status(status).context(OutOfOrder {
            message: "invalid transaction status",
        })?;
        log::trace!("{}: ready, {:?}", self.peer, state);
        self.mode = Mode::Idle(state);
        Ok(())
    }

    pub(crate) fn terminate(&mut self) -> Result<(), Error> {
        if self.mode == Mode::Closed {
            return Ok(());
        }
        self.mode = Mode::Closed;
        out::terminate(&mut self.outbuf);
        self.flush()?;
        log::debug!("{}: connection closed", self.peer);
        Ok(())
    }
}

impl Drop for PgConnection {
    fn drop(&mut self) {
        if let Mode::Idle(_) = self.mode {
            if let Err(e) = self.terminate() {
                log::debug!("{}: error closing connection: {:#}", self.peer, e);
            }
        }
    }
}

fn require_password(config: &Config) -> Result<&str, Error> {
    config.password().ok_or_else(|| {
        AuthenticationError::with_message("server requested a password, but none is configured")
    })
}

fn open_stream(config: &Config) -> io::Result<(String, Box<dyn Transport>)> {
    match config.address() {
        Address::Tcp((host, port)) => {
            let stream = connect_tcp(host, *port, config.connect_timeout())?;
            stream.set_nodelay(true)?;
            let peer = stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| config.display_addr().to_string());
            let stream: Box<dyn Transport> = Box::new(stream);
            Ok((peer, stream))
        }
        #[cfg(unix)]
        Address::Unix(path) => {
            let stream: Box<dyn Transport> = Box::new(UnixStream::connect(path)?);
            Ok((path.display().to_string(), stream))
        }
        #[cfg(not(unix))]
        Address::Unix(_) => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "unix sockets are not supported on this platform",
        )),
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                log::debug!("Cannot connect to {}: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host name resolved to no addresses")
    }))
}

pub(crate) fn error_response(mut fields: inp::ErrorFields<'_>) -> Result<ErrorResponse, ReadError> {
    let mut severity = None;
    let mut code = String::new();
    let mut message = String::new();
    let mut detail = None;
    let mut hint = None;
    let mut position = None;
    while let Some(field) = fields.next().context(Decode)? {
        let value = String::from_utf8_lossy(field.value_bytes());
        match field.type_() {
            // non-localized severity takes precedence
            b'V' => severity = Some(ErrorSeverity::from_name(&value)),
            b'S' if severity.is_none() => severity = Some(ErrorSeverity::from_name(&value)),
            b'C' => code = value.into_owned(),
            b'M' => message = value.into_owned(),
            b'D' => detail = Some(value.into_owned()),
            b'H' => hint = Some(value.into_owned()),
            b'P' => position = value.parse().ok(),
            _ => {}
        }
    }
    Ok(ErrorResponse {
        severity: severity.unwrap_or(ErrorSeverity::Unknown),
        code,
        message: if message.is_empty() {
            "unknown error".into()
        } else {
            message
        },
        detail,
        hint,
        position,
    })
}

fn startup_error(resp: ErrorResponse) -> Error {
    let auth_failure = resp.code.starts_with("28");
    let err = Error::from(resp);
    if auth_failure {
        err.refine_kind::<AuthenticationError>()
    } else {
        err.refine_kind::<ClientConnectionFailedError>()
    }
}
