use std::ops::Deref;
use std::sync::Arc;

use crate::common::TypeId;

/// Name, type and position of a single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_id: TypeId,
    pub position: usize,
}

/// Columns of a single response, shared by the result set and all its rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowDescription(Arc<[ColumnDescriptor]>);

impl RowDescription {
    pub fn new(columns: Vec<ColumnDescriptor>) -> RowDescription {
        RowDescription(columns.into())
    }
    /// Position of the first column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c.name == name)
    }
}

impl Deref for RowDescription {
    type Target = [ColumnDescriptor];
    fn deref(&self) -> &[ColumnDescriptor] {
        &self.0
    }
}
