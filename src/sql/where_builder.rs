use super::SqlParam;

/// Accumulates ANDed boolean predicates with positional placeholders.
///
/// Each pushed predicate takes exactly one bound value; the placeholder number
/// is assigned from the running value count so fragments stay aligned with the
/// parameter list no matter which filters were present.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    fragments: Vec<String>,
    params: Vec<SqlParam>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `<lhs> $N` as a predicate, binding `param` to `$N`.
    /// `lhs` must be trusted text, e.g. `name ILIKE` or `salary >=`.
    pub fn push(&mut self, lhs: &str, param: SqlParam) {
        self.params.push(param);
        self.fragments.push(format!("{} ${}", lhs, self.params.len()));
    }

    /// Produce the final clause and the parameter list.
    ///
    /// With zero predicates this is the empty string (an all-rows query),
    /// never `WHERE TRUE`. Otherwise the clause carries its own leading space
    /// so it can be spliced directly into a query template.
    pub fn into_clause(self) -> (String, Vec<SqlParam>) {
        let clause = if self.fragments.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.fragments.join(" AND "))
        };
        (clause, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_yields_no_clause_and_no_params() {
        let (clause, params) = WhereBuilder::new().into_clause();
        assert_eq!(clause, "");
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_are_anded_in_push_order_with_positional_placeholders() {
        let mut builder = WhereBuilder::new();
        builder.push("title ILIKE", SqlParam::Text(Some("%job%".into())));
        builder.push("salary >=", SqlParam::Int(Some(150_000)));
        builder.push("equity >", SqlParam::Int(Some(0)));

        let (clause, params) = builder.into_clause();
        assert_eq!(clause, " WHERE title ILIKE $1 AND salary >= $2 AND equity > $3");
        assert_eq!(
            params,
            vec![
                SqlParam::Text(Some("%job%".into())),
                SqlParam::Int(Some(150_000)),
                SqlParam::Int(Some(0)),
            ]
        );
    }

    #[test]
    fn single_predicate_clause() {
        let mut builder = WhereBuilder::new();
        builder.push("num_employees <=", SqlParam::Int(Some(50)));

        let (clause, params) = builder.into_clause();
        assert_eq!(clause, " WHERE num_employees <= $1");
        assert_eq!(params.len(), 1);
    }
}
