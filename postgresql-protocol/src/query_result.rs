use std::sync::Arc;

use postgresql_errors::fields::ColumnIndex;
use postgresql_errors::{Error, ErrorKind, ProtocolEncodingError};

use crate::codec::Codec;
use crate::common::Format;
use crate::descriptors::{ColumnDescriptor, RowDescription};
use crate::errors;
use crate::registry::{decode_error, TypeRegistry};
use crate::result_set::{ResultSet, Row};
use crate::server_message::QueryResponse;
use crate::value::Value;

/// Turns raw server responses into typed [`ResultSet`]s.
#[derive(Debug, Clone, Copy)]
pub struct ResultDecoder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ResultDecoder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> ResultDecoder<'a> {
        ResultDecoder { registry }
    }
    /// Decode every row of the response.
    ///
    /// Codecs for all columns are looked up before any row is decoded, so
    /// an unsupported column type is reported even if there are no rows.
    /// Nothing is returned unless all rows decode.
    pub fn decode(&self, response: QueryResponse) -> Result<ResultSet, Error> {
        let QueryResponse { columns, rows, tag } = response;
        let mut codecs = Vec::with_capacity(columns.len());
        let mut descriptors = Vec::with_capacity(columns.len());
        for (position, column) in columns.into_iter().enumerate() {
            if column.format != Format::Binary {
                return Err(ProtocolEncodingError::with_source(
                    errors::TextFormatColumn {
                        column: column.name,
                    }
                    .build(),
                )
                .with::<ColumnIndex>(position));
            }
            let codec = self
                .registry
                .codec(column.type_id)
                .map_err(|e| {
                    e.context(format!("cannot decode column {:?}", column.name))
                        .with::<ColumnIndex>(position)
                })?;
            codecs.push(Arc::clone(codec));
            descriptors.push(ColumnDescriptor {
                name: column.name,
                type_id: column.type_id,
                position,
            });
        }
        let description = RowDescription::new(descriptors);
        let mut result = Vec::with_capacity(rows.len());
        for (row_num, row) in rows.into_iter().enumerate() {
            let values = self
                .decode_row(&description, &codecs, &row.fields)
                .map_err(|e| e.context(format!("cannot decode row {}", row_num)))?;
            result.push(Row::new(description.clone(), values));
        }
        Ok(ResultSet::new(description, result, tag))
    }

    fn decode_row(
        &self,
        columns: &RowDescription,
        codecs: &[Arc<dyn Codec>],
        fields: &[Option<bytes::Bytes>],
    ) -> Result<Vec<Value>, Error> {
        if fields.len() != columns.len() {
            return Err(ProtocolEncodingError::with_source(
                errors::RowSizeMismatch {
                    fields: fields.len(),
                    columns: columns.len(),
                }
                .build(),
            ));
        }
        let mut values = Vec::with_capacity(fields.len());
        for ((field, codec), column) in fields.iter().zip(codecs).zip(columns.iter()) {
            let value = match field {
                None => Value::Null,
                Some(data) => codec.decode(data).map_err(|e| {
                    decode_error(column.type_id, e).with::<ColumnIndex>(column.position)
                })?,
            };
            values.push(value);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    use postgresql_errors::fields::{ColumnIndex, TypeOid};
    use postgresql_errors::{ProtocolEncodingError, UnsupportedTypeError};

    use crate::common::{Format, TypeId};
    use crate::registry::TypeRegistry;
    use crate::server_message::{DataRow, QueryResponse, RawColumn};
    use crate::value::Value;

    use super::ResultDecoder;

    fn column(name: &str, type_id: TypeId) -> RawColumn {
        RawColumn {
            name: name.into(),
            type_id,
            format: Format::Binary,
        }
    }

    fn row(fields: &[Option<&'static [u8]>]) -> DataRow {
        DataRow {
            fields: fields.iter().map(|f| f.map(Bytes::from_static)).collect(),
        }
    }

    #[test]
    fn nulls_and_order() {
        let reg = TypeRegistry::shared();
        let rs = ResultDecoder::new(&reg)
            .decode(QueryResponse {
                columns: vec![column("n", TypeId::INT4), column("s", TypeId::TEXT)],
                rows: vec![
                    row(&[Some(&b"\0\0\0\x03"[..]), None]),
                    row(&[None, Some(&b"spring"[..])]),
                    row(&[Some(&b"\0\0\0\x01"[..]), Some(&b""[..])]),
                ],
                tag: "SELECT 3".into(),
            })
            .unwrap();
        assert_eq!(rs.len(), 3);
        let values = rs.iter().map(|r| r.values().to_vec()).collect::<Vec<_>>();
        assert_eq!(
            values,
            vec![
                vec![Value::Int32(3), Value::Null],
                vec![Value::Null, Value::Text("spring".into())],
                vec![Value::Int32(1), Value::Text("".into())],
            ]
        );
        assert_eq!(rs.columns()[1].name, "s");
        assert_eq!(rs.columns()[1].position, 1);
    }

    #[test]
    fn unsupported_without_rows() {
        let reg = TypeRegistry::shared();
        let err = ResultDecoder::new(&reg)
            .decode(QueryResponse {
                columns: vec![column("n", TypeId::INT4), column("f", TypeId(701))],
                rows: vec![],
                tag: "SELECT 0".into(),
            })
            .unwrap_err();
        assert!(err.is::<UnsupportedTypeError>());
        assert_eq!(err.get::<TypeOid>(), Some(&701));
        assert_eq!(err.get::<ColumnIndex>(), Some(&1));
    }

    #[test]
    fn row_arity() {
        let reg = TypeRegistry::shared();
        let err = ResultDecoder::new(&reg)
            .decode(QueryResponse {
                columns: vec![column("n", TypeId::INT4)],
                rows: vec![row(&[Some(&b"\0\0\0\x03"[..]), None])],
                tag: "SELECT 1".into(),
            })
            .unwrap_err();
        assert!(err.is::<ProtocolEncodingError>());
    }

    #[test]
    fn text_format_rejected() {
        let reg = TypeRegistry::shared();
        let mut col = column("n", TypeId::INT4);
        col.format = Format::Text;
        let err = ResultDecoder::new(&reg)
            .decode(QueryResponse {
                columns: vec![col],
                rows: vec![],
                tag: "SELECT 0".into(),
            })
            .unwrap_err();
        assert!(err.is::<ProtocolEncodingError>());
    }

    #[test]
    fn bad_bool_fails_whole_result() {
        let reg = TypeRegistry::shared();
        let err = ResultDecoder::new(&reg)
            .decode(QueryResponse {
                columns: vec![column("b", TypeId::BOOL)],
                rows: vec![row(&[Some(&b"\x01"[..])]), row(&[Some(&b"\x02"[..])])],
                tag: "SELECT 2".into(),
            })
            .unwrap_err();
        assert!(err.is::<ProtocolEncodingError>());
        assert_eq!(err.initial_message(), Some("cannot decode row 1"));
    }
}
