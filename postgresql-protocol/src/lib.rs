/*!
Value marshaling for the typed PostgreSQL client.

This crate has no I/O. It converts between host values and the binary wire
representation, and builds result sets out of raw server responses:

* [Value](crate::value::Value): a single parameter or column value
* [TypeRegistry](crate::registry::TypeRegistry): maps server type OIDs to
  [codecs](crate::codec::Codec)
* [ParameterBinder](crate::query_arg::ParameterBinder): turns
  [QueryArgs](crate::query_arg::QueryArgs) into wire parameters
* [ResultDecoder]: turns a raw
  [QueryResponse](crate::server_message::QueryResponse) into a
  [ResultSet](crate::result_set::ResultSet)
* [FromValue](crate::queryable::FromValue) and
  [Queryable](crate::queryable::Queryable): typed access to rows

Supported types are `bool`, `int2`, `int4`, `int8` and `text` (with
`varchar`, `bpchar` and `name` sharing the text representation).
*/

mod placeholders;
mod query_result;

pub mod codec;
pub mod common;
pub mod descriptors;
pub mod error_response;
pub mod errors;
pub mod query_arg;
pub mod queryable;
pub mod registry;
pub mod result_set;
pub mod server_message;
pub mod value;

pub use placeholders::max_placeholder;
pub use query_result::ResultDecoder;
