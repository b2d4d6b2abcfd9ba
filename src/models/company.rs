use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;
use crate::sql::{bind_param_query_as, sql_for_partial_update, SqlParam, WhereBuilder};

/// External camelCase field names -> store column names for partial updates.
const FIELD_TO_COLUMN: &[(&str, &str)] = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Company plus its jobs, as returned by `Company::get`
#[derive(Debug, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<rust_decimal::Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyNew {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyNew {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.handle.is_empty() || self.handle.len() > 25 {
            return Err(ApiError::bad_request("handle must be 1-25 characters"));
        }
        if self.name.is_empty() {
            return Err(ApiError::bad_request("name must not be empty"));
        }
        if matches!(self.num_employees, Some(n) if n < 0) {
            return Err(ApiError::bad_request("numEmployees must be >= 0"));
        }
        Ok(())
    }
}

/// Partial-update payload. A field that is absent stays untouched; for the
/// nullable columns an explicit JSON null sets the column to null, which the
/// double Option keeps distinct from absence.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if matches!(self.num_employees, Some(Some(n)) if n < 0) {
            return Err(ApiError::bad_request("numEmployees must be >= 0"));
        }
        Ok(())
    }

    /// Flatten into ordered (field, value) pairs for the update compiler.
    fn into_fields(self) -> Vec<(&'static str, SqlParam)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", SqlParam::Text(Some(name))));
        }
        if let Some(description) = self.description {
            fields.push(("description", SqlParam::Text(Some(description))));
        }
        if let Some(num_employees) = self.num_employees {
            fields.push(("numEmployees", SqlParam::Int(num_employees.map(i64::from))));
        }
        if let Some(logo_url) = self.logo_url {
            fields.push(("logoUrl", SqlParam::Text(logo_url)));
        }
        fields
    }
}

/// Search filters for `Company::find_all`; all present filters are ANDed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanySearchFilters {
    pub name: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl CompanySearchFilters {
    /// Cross-field check the query compiler assumes has already passed.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(ApiError::bad_request(
                    "minEmployees must be less than or equal to maxEmployees",
                ));
            }
        }
        Ok(())
    }

    fn to_where(&self) -> WhereBuilder {
        let mut builder = WhereBuilder::new();
        if let Some(name) = &self.name {
            builder.push("name ILIKE", SqlParam::Text(Some(format!("%{}%", name))));
        }
        if let Some(min) = self.min_employees {
            builder.push("num_employees >=", SqlParam::Int(Some(min)));
        }
        if let Some(max) = self.max_employees {
            builder.push("num_employees <=", SqlParam::Int(Some(max)));
        }
        builder
    }
}

impl Company {
    /// Insert a new company. Fails with Conflict if the handle is taken.
    pub async fn create(pool: &PgPool, data: CompanyNew) -> Result<Company, ApiError> {
        let existing = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(ApiError::conflict(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_COLUMNS}"
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;

        Ok(company)
    }

    /// All companies matching the filters, ordered by name.
    /// Filters must already be validated (`CompanySearchFilters::validate`).
    pub async fn find_all(
        pool: &PgPool,
        filters: &CompanySearchFilters,
    ) -> Result<Vec<Company>, ApiError> {
        let (where_clause, params) = filters.to_where().into_clause();
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies{where_clause} ORDER BY name");

        let mut query = sqlx::query_as::<_, Company>(&sql);
        for param in params.iter() {
            query = bind_param_query_as(query, param);
        }
        let companies = query.fetch_all(pool).await?;

        Ok(companies)
    }

    /// One company by handle, with its jobs embedded in insertion order.
    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, ApiError> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        let jobs = sqlx::query_as::<_, CompanyJob>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Partial update; the handle itself is never mutable.
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        data: CompanyUpdate,
    ) -> Result<Company, ApiError> {
        let (set_cols, params) = sql_for_partial_update(data.into_fields(), FIELD_TO_COLUMN)?;

        let handle_idx = params.len() + 1;
        let sql = format!(
            "UPDATE companies SET {set_cols} WHERE handle = ${handle_idx} \
             RETURNING {COMPANY_COLUMNS}"
        );

        let mut query = sqlx::query_as::<_, Company>(&sql);
        for param in params.iter() {
            query = bind_param_query_as(query, param);
        }
        let company = query
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        Ok(company)
    }

    /// Delete by handle; the store cascades to the company's jobs.
    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, String>(
            "DELETE FROM companies WHERE handle = $1 RETURNING handle",
        )
        .bind(handle)
        .fetch_optional(pool)
        .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("No company: {}", handle))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filters_produce_no_where_clause() {
        let filters = CompanySearchFilters::default();
        let (clause, params) = filters.to_where().into_clause();
        assert_eq!(clause, "");
        assert!(params.is_empty());
    }

    #[test]
    fn name_filter_is_wrapped_for_substring_match() {
        let filters = CompanySearchFilters {
            name: Some("net".into()),
            ..Default::default()
        };
        let (clause, params) = filters.to_where().into_clause();
        assert_eq!(clause, " WHERE name ILIKE $1");
        assert_eq!(params, vec![SqlParam::Text(Some("%net%".into()))]);
    }

    #[test]
    fn employee_bounds_become_range_predicates() {
        let filters = CompanySearchFilters {
            name: None,
            min_employees: Some(2),
            max_employees: Some(50),
        };
        let (clause, params) = filters.to_where().into_clause();
        assert_eq!(clause, " WHERE num_employees >= $1 AND num_employees <= $2");
        assert_eq!(params, vec![SqlParam::Int(Some(2)), SqlParam::Int(Some(50))]);
    }

    #[test]
    fn min_greater_than_max_is_rejected_before_any_query() {
        let filters = CompanySearchFilters {
            name: None,
            min_employees: Some(10),
            max_employees: Some(5),
        };
        let err = filters.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);

        // Equal bounds are fine
        let filters = CompanySearchFilters {
            name: None,
            min_employees: Some(5),
            max_employees: Some(5),
        };
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn update_payload_distinguishes_absent_from_null() {
        let update: CompanyUpdate =
            serde_json::from_value(json!({ "name": "New Name", "numEmployees": null })).unwrap();

        let fields = update.into_fields();
        assert_eq!(
            fields,
            vec![
                ("name", SqlParam::Text(Some("New Name".into()))),
                ("numEmployees", SqlParam::Int(None)),
            ]
        );
    }

    #[test]
    fn update_payload_rejects_handle() {
        let result: Result<CompanyUpdate, _> =
            serde_json::from_value(json!({ "handle": "new-handle", "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn negative_num_employees_is_rejected() {
        let update: CompanyUpdate =
            serde_json::from_value(json!({ "numEmployees": -1 })).unwrap();
        assert_eq!(update.validate().unwrap_err().status_code(), 400);
    }
}
