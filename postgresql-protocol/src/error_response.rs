use postgresql_errors::fields::{Detail, Hint, Position};
use postgresql_errors::Error;

pub use crate::server_message::{ErrorResponse, ErrorSeverity};

impl From<ErrorResponse> for Error {
    fn from(resp: ErrorResponse) -> Error {
        let mut err = Error::from_sql_state(&resp.code).context(resp.message);
        if let Some(detail) = resp.detail {
            err.set::<Detail>(detail);
        }
        if let Some(hint) = resp.hint {
            err.set::<Hint>(hint);
        }
        if let Some(position) = resp.position {
            err.set::<Position>(position.saturating_sub(1));
        }
        err
    }
}
