use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

use crate::error::StoreError;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A SQL template with `?` placeholders and the values bound to them, in order.
#[derive(Debug, Clone)]
pub struct Statement {
    sql: &'static str,
    params: Vec<Param>,
}

impl Statement {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn into_parts(self) -> Result<(&'static str, SqliteArguments<'static>), StoreError> {
        let mut arguments = SqliteArguments::default();
        for param in self.params {
            let added = match param {
                Param::Int(value) => arguments.add(value),
                Param::Text(value) => arguments.add(value),
            };
            added.map_err(|e| StoreError::Statement(sqlx::Error::Encode(e)))?;
        }
        Ok((self.sql, arguments))
    }
}

/// Acknowledgment of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}
