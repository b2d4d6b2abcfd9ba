use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;
use crate::sql::{bind_param_query_as, sql_for_partial_update, SqlParam, WhereBuilder};

/// Job update fields already match store column names; the compiler's
/// verbatim fallback covers them all.
const FIELD_TO_COLUMN: &[(&str, &str)] = &[];

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobNew {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl JobNew {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.is_empty() {
            return Err(ApiError::bad_request("title must not be empty"));
        }
        validate_salary(self.salary)?;
        validate_equity(self.equity)
    }
}

/// Partial-update payload. `id` and `companyHandle` are structurally absent
/// so an attempt to change them fails deserialization with a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(salary) = self.salary {
            validate_salary(salary)?;
        }
        if let Some(equity) = self.equity {
            validate_equity(equity)?;
        }
        Ok(())
    }

    fn into_fields(self) -> Vec<(&'static str, SqlParam)> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(("title", SqlParam::Text(Some(title))));
        }
        if let Some(salary) = self.salary {
            fields.push(("salary", SqlParam::Int(salary.map(i64::from))));
        }
        if let Some(equity) = self.equity {
            fields.push(("equity", SqlParam::Numeric(equity)));
        }
        fields
    }
}

fn validate_salary(salary: Option<i32>) -> Result<(), ApiError> {
    if matches!(salary, Some(s) if s < 0) {
        return Err(ApiError::bad_request("salary must be >= 0"));
    }
    Ok(())
}

fn validate_equity(equity: Option<Decimal>) -> Result<(), ApiError> {
    if matches!(equity, Some(e) if e < Decimal::ZERO || e > Decimal::ONE) {
        return Err(ApiError::bad_request("equity must be between 0 and 1"));
    }
    Ok(())
}

/// Search filters for `Job::find_all`; all present filters are ANDed.
///
/// `has_equity` is tri-state: `Some(true)` restricts to jobs with positive
/// equity, while `Some(false)` and `None` both contribute no predicate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobSearchFilters {
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
}

impl JobSearchFilters {
    /// Predicates are appended in a fixed order (title, minSalary, hasEquity)
    /// so placeholder numbering stays deterministic.
    fn to_where(&self) -> WhereBuilder {
        let mut builder = WhereBuilder::new();
        if let Some(title) = &self.title {
            builder.push("title ILIKE", SqlParam::Text(Some(format!("%{}%", title))));
        }
        if let Some(min_salary) = self.min_salary {
            builder.push("salary >=", SqlParam::Int(Some(min_salary)));
        }
        if self.has_equity == Some(true) {
            builder.push("equity >", SqlParam::Int(Some(0)));
        }
        builder
    }
}

impl Job {
    /// Insert a new job; the store assigns the id.
    pub async fn create(pool: &PgPool, data: JobNew) -> Result<Job, ApiError> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await?;

        Ok(job)
    }

    /// All jobs matching the filters, ordered by title then salary.
    pub async fn find_all(pool: &PgPool, filters: &JobSearchFilters) -> Result<Vec<Job>, ApiError> {
        let (where_clause, params) = filters.to_where().into_clause();
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs{where_clause} ORDER BY title, salary");

        let mut query = sqlx::query_as::<_, Job>(&sql);
        for param in params.iter() {
            query = bind_param_query_as(query, param);
        }
        let jobs = query.fetch_all(pool).await?;

        Ok(jobs)
    }

    /// One job by id.
    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, ApiError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    /// Partial update; id and companyHandle are never mutable.
    pub async fn update(pool: &PgPool, id: i32, data: JobUpdate) -> Result<Job, ApiError> {
        let (set_cols, params) = sql_for_partial_update(data.into_fields(), FIELD_TO_COLUMN)?;

        let id_idx = params.len() + 1;
        let sql = format!(
            "UPDATE jobs SET {set_cols} WHERE id = ${id_idx} RETURNING {JOB_COLUMNS}"
        );

        let mut query = sqlx::query_as::<_, Job>(&sql);
        for param in params.iter() {
            query = bind_param_query_as(query, param);
        }
        query
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    /// Delete by id.
    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("No job: {}", id))),
        }
    }
}
