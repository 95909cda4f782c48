use chrono::NaiveDate;
use sqlx::{self, postgres::PgArguments, FromRow};

use crate::database::models::PostFilter;

/// A value bound to a positional parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

/// Ordered equality predicates joined by AND. Columns are static
/// identifiers; values only ever travel as bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<(&'static str, SqlParam)>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<SqlParam>) -> Self {
        self.predicates.push((column, value.into()));
        self
    }

    pub fn eq_opt<V: Into<SqlParam>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn params(&self) -> impl Iterator<Item = &SqlParam> {
        self.predicates.iter().map(|(_, v)| v)
    }

    /// Render as ` WHERE a = $n AND b = $n+1`, numbering from `first_index`.
    /// Empty when there are no predicates.
    pub fn to_sql(&self, first_index: usize) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let conditions: Vec<String> = self
            .predicates
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, first_index + i))
            .collect();
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

impl From<&PostFilter> for WhereClause {
    fn from(filter: &PostFilter) -> Self {
        let (latitude, longitude) = filter.location.unzip();
        WhereClause::new()
            .eq_opt("p.user_id", filter.user_id)
            .eq_opt("p.latitude", latitude)
            .eq_opt("p.longitude", longitude)
            .eq_opt("p.date", filter.date)
            .eq_opt("p.activity", filter.activity.clone())
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Date(d) => q.bind(*d),
        SqlParam::Text(s) => q.bind(s.as_str()),
    }
}
