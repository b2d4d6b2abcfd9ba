use crate::error::ApiError;

use super::SqlParam;

/// Compile a sparse field-update payload into a parameterized SET clause.
///
/// `fields` is the ordered list of `(external field name, new value)` pairs;
/// a typed null value means "set to null", a field simply not appearing means
/// "do not touch". `field_to_column` rewrites external camelCase names to
/// store column names; fields not in the table are used verbatim.
///
/// Returns the joined `"column" = $N` fragments (1-based, payload order) and
/// the parallel value list. Callers appending their own trailing parameters
/// (e.g. the row key for the WHERE clause) must number them from
/// `values.len() + 1`.
///
/// An empty payload is a caller contract violation and fails before any SQL
/// text is produced.
pub fn sql_for_partial_update(
    fields: Vec<(&str, SqlParam)>,
    field_to_column: &[(&str, &str)],
) -> Result<(String, Vec<SqlParam>), ApiError> {
    if fields.is_empty() {
        return Err(ApiError::bad_request("No data to update"));
    }

    let mut set_cols = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (field, value)) in fields.into_iter().enumerate() {
        let column = field_to_column
            .iter()
            .find(|(external, _)| *external == field)
            .map(|(_, column)| *column)
            .unwrap_or(field);

        set_cols.push(format!("\"{}\" = ${}", column, idx + 1));
        values.push(value);
    }

    Ok((set_cols.join(", "), values))
}
