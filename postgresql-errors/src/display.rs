use std::fmt;

use crate::fields::{ColumnIndex, ParameterIndex, TypeOid};
use crate::{Error, ProtocolError};

pub struct DisplayError<'a>(&'a Error, bool);
pub struct VerboseError<'a>(&'a Error);

pub fn display_error(e: &Error, verbose: bool) -> DisplayError {
    DisplayError(e, verbose)
}
pub fn display_error_verbose(e: &Error) -> VerboseError {
    VerboseError(e)
}

impl fmt::Display for DisplayError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let DisplayError(ref e, verbose) = self;
        write!(f, "{:#}", e)?;
        if e.is::<ProtocolError>() || *verbose {
            if let Some(query) = e.query_text() {
                write!(f, "\n  Query:")?;
                for line in query.lines() {
                    write!(f, "\n      {}", line)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for VerboseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let e = self.0;
        writeln!(f, "Error type: {}", e.kind_debug())?;
        writeln!(f, "Message: {:#}", e)?;
        if let Some(state) = e.sql_state() {
            writeln!(f, "SQLSTATE: {}", state)?;
        }
        if let Some(pos) = e.position() {
            writeln!(f, "Position: {}", pos)?;
        }
        if let Some(oid) = e.get::<TypeOid>() {
            writeln!(f, "Type OID: {}", oid)?;
        }
        if let Some(idx) = e.get::<ParameterIndex>() {
            writeln!(f, "Parameter: ${}", idx + 1)?;
        }
        if let Some(idx) = e.get::<ColumnIndex>() {
            writeln!(f, "Column: {}", idx)?;
        }
        if let Some(query) = e.query_text() {
            writeln!(f, "Query:")?;
            for line in query.lines() {
                writeln!(f, "    {}", line)?;
            }
        }
        Ok(())
    }
}
