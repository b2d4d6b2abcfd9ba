//! Dynamic SQL assembly with positional parameter binding.
//!
//! Fragment text is built from trusted column/operator literals only; every
//! caller-supplied value travels as a typed bind parameter.

pub mod partial_update;
pub mod where_builder;

pub use partial_update::sql_for_partial_update;
pub use where_builder::WhereBuilder;

use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::FromRow;

/// A typed bind value for a positional placeholder.
///
/// Nulls are carried inside the variant so the wire type matches the target
/// column (an untyped null would fail Postgres type analysis on integer and
/// numeric columns).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i64>),
    Text(Option<String>),
    Numeric(Option<Decimal>),
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match p {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.as_deref()),
        SqlParam::Numeric(d) => q.bind(*d),
    }
}
