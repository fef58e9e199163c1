use std::hash::{Hash, Hasher};
use std::slice;
use std::sync::Arc;

use postgresql_errors::fields::ColumnIndex;
use postgresql_errors::{Error, ErrorKind, IndexOutOfRangeError, InvalidArgumentError};

use crate::descriptors::{ColumnDescriptor, RowDescription};
use crate::queryable::{FromValue, Queryable};
use crate::value::Value;

/// Rows returned by a single statement, in server order.
///
/// Result set is immutable. Cloning is cheap, all clones share the rows.
#[derive(Debug, Clone)]
pub struct ResultSet(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    columns: RowDescription,
    rows: Vec<Row>,
    tag: String,
}

/// A single result row.
///
/// Rows compare and hash by their values only, so two rows with the same
/// values are equal even if they come from different result sets.
#[derive(Debug, Clone)]
pub struct Row {
    columns: RowDescription,
    values: Arc<[Value]>,
}

fn out_of_range(what: &str, index: usize, len: usize) -> Error {
    IndexOutOfRangeError::with_message(format!(
        "{} index {} is out of range, length is {}",
        what, index, len
    ))
}

impl ResultSet {
    pub(crate) fn new(columns: RowDescription, rows: Vec<Row>, tag: String) -> ResultSet {
        ResultSet(Arc::new(Inner { columns, rows, tag }))
    }
    /// Result of a statement that returns no rows.
    pub fn empty(tag: impl Into<String>) -> ResultSet {
        ResultSet::new(RowDescription::default(), Vec::new(), tag.into())
    }
    pub fn len(&self) -> usize {
        self.0.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.rows.is_empty()
    }
    pub fn get(&self, index: usize) -> Result<&Row, Error> {
        self.0
            .rows
            .get(index)
            .ok_or_else(|| out_of_range("row", index, self.len()))
    }
    pub fn iter(&self) -> slice::Iter<'_, Row> {
        self.0.rows.iter()
    }
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.0.columns
    }
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.0.columns.index_of(name)
    }
    /// Command tag reported by the server, e.g. `SELECT 2` or `INSERT 0 1`.
    pub fn command_tag(&self) -> &str {
        &self.0.tag
    }
    /// Number of rows affected, as reported in the command tag.
    pub fn rows_affected(&self) -> Option<u64> {
        self.0.tag.rsplit(' ').next().and_then(|n| n.parse().ok())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = slice::Iter<'a, Row>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Row {
    pub(crate) fn new(columns: RowDescription, values: Vec<Value>) -> Row {
        Row {
            columns,
            values: values.into(),
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn get(&self, index: usize) -> Result<&Value, Error> {
        self.values
            .get(index)
            .ok_or_else(|| out_of_range("column", index, self.len()))
    }
    /// Value of column `index` converted into `T`.
    pub fn get_as<T: FromValue>(&self, index: usize) -> Result<T, Error> {
        T::from_value(self.get(index)?).map_err(|e| e.with::<ColumnIndex>(index))
    }
    pub fn get_by_name(&self, name: &str) -> Result<&Value, Error> {
        let index = self.columns.index_of(name).ok_or_else(|| {
            InvalidArgumentError::with_message(format!("no column named {:?}", name))
        })?;
        self.get(index)
    }
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.values.iter()
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
    /// Convert the whole row, e.g. into `(i32, bool)`.
    pub fn decode<T: Queryable>(&self) -> Result<T, Error> {
        T::decode_row(&self.values)
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Row) -> bool {
        self.values == other.values
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state)
    }
}

#[cfg(feature = "with-serde")]
impl serde::Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use postgresql_errors::{IndexOutOfRangeError, InvalidArgumentError};
    use pretty_assertions::assert_eq;

    use crate::common::TypeId;
    use crate::descriptors::{ColumnDescriptor, RowDescription};
    use crate::value::Value;

    use super::{ResultSet, Row};

    fn columns() -> RowDescription {
        RowDescription::new(vec![
            ColumnDescriptor {
                name: "n".into(),
                type_id: TypeId::INT4,
                position: 0,
            },
            ColumnDescriptor {
                name: "b".into(),
                type_id: TypeId::BOOL,
                position: 1,
            },
        ])
    }

    #[test]
    fn index_errors() {
        let cols = columns();
        let rs = ResultSet::new(
            cols.clone(),
            vec![Row::new(cols, vec![Value::Int32(2), Value::Bool(true)])],
            "SELECT 1".into(),
        );
        assert!(rs.get(1).unwrap_err().is::<IndexOutOfRangeError>());
        let row = rs.get(0).unwrap();
        assert!(row.get(2).unwrap_err().is::<IndexOutOfRangeError>());
        assert_eq!(row.get_by_name("b").unwrap(), &Value::Bool(true));
        assert!(row.get_by_name("c").unwrap_err().is::<InvalidArgumentError>());
        assert_eq!(rs.rows_affected(), Some(1));
    }

    #[test]
    fn value_semantics() {
        let a = Row::new(columns(), vec![Value::Int32(1), Value::Bool(false)]);
        let b = Row::new(RowDescription::default(), vec![Value::Int32(1), Value::Bool(false)]);
        assert_eq!(a, b);
        let set = [a, b].into_iter().collect::<HashSet<_>>();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn command_tags() {
        assert_eq!(ResultSet::empty("INSERT 0 3").rows_affected(), Some(3));
        assert_eq!(ResultSet::empty("CREATE TABLE").rows_affected(), None);
        assert_eq!(ResultSet::empty("").rows_affected(), None);
        assert!(ResultSet::empty("BEGIN").columns().is_empty());
    }
}
