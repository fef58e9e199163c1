//! Miette support for PostgreSQL client errors
//!
//! [miette](https://docs.rs/miette) allows nice formatting of errors,
//! including the offending part of the query.
use miette::{LabeledSpan, SourceCode};
use std::fmt::Display;

use crate::fields::QueryText;
use crate::Error;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn Display + '_>> {
        Some(Box::new(self.kind_name()))
    }
    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get::<QueryText>().map(|s| s as _)
    }
    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let query = self.query_text()?;
        let pos = self.position()?;
        // server positions count characters, miette wants byte offsets
        let start = query
            .char_indices()
            .nth(pos)
            .map(|(idx, _)| idx)
            .unwrap_or(query.len());
        let len = query[start..]
            .find(|c: char| c.is_whitespace())
            .unwrap_or(query.len() - start);
        Some(Box::new(
            Some(LabeledSpan::new(self.sql_state().map(Into::into), start, len)).into_iter(),
        ))
    }
    fn help(&self) -> Option<Box<dyn Display + '_>> {
        self.hint().map(|v| Box::new(v) as Box<dyn Display>)
    }
}
