//! Table query builder over the PostgREST surface.
//!
//! ```rust,ignore
//! let inserted = client.table("leads").insert(&lead).execute().await?;
//! let row: Lead = client
//!     .table("leads")
//!     .select("*")
//!     .eq("id", &id)
//!     .execute()
//!     .await?
//!     .first()?;
//! ```

use std::fmt::Display;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::SupabaseClient;
use crate::error::{DbError, DbResult};

const PREFER: &str = "prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Entry point returned by [`SupabaseClient::table`].
#[derive(Debug)]
pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    table: String,
}

impl<'a> TableQuery<'a> {
    pub(crate) fn new(client: &'a SupabaseClient, table: String) -> Self {
        Self { client, table }
    }

    /// Read `columns` (PostgREST select syntax, e.g. `*`).
    pub fn select(self, columns: impl Into<String>) -> FilterBuilder<'a> {
        self.with(Operation::Select {
            columns: columns.into(),
        })
    }

    /// Insert one record, or many if `record` serializes to an array.
    pub fn insert<T: Serialize + ?Sized>(self, record: &T) -> FilterBuilder<'a> {
        self.with(Operation::Insert {
            body: serde_json::to_value(record),
        })
    }

    /// Update every row matching the filters with the fields in `patch`.
    pub fn update<T: Serialize + ?Sized>(self, patch: &T) -> FilterBuilder<'a> {
        self.with(Operation::Update {
            body: serde_json::to_value(patch),
        })
    }

    /// Delete every row matching the filters.
    pub fn delete(self) -> FilterBuilder<'a> {
        self.with(Operation::Delete)
    }

    fn with(self, operation: Operation) -> FilterBuilder<'a> {
        FilterBuilder {
            client: self.client,
            table: self.table,
            operation,
            filters: Vec::new(),
        }
    }
}

#[derive(Debug)]
enum Operation {
    Select { columns: String },
    Insert { body: serde_json::Result<Value> },
    Update { body: serde_json::Result<Value> },
    Delete,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "select",
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete => "delete",
        }
    }
}

/// A table operation awaiting filters and execution.
#[derive(Debug)]
pub struct FilterBuilder<'a> {
    client: &'a SupabaseClient,
    table: String,
    operation: Operation,
    filters: Vec<(String, String)>,
}

impl FilterBuilder<'_> {
    /// Keep only rows where `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Display) -> Self {
        self.filters.push((column.into(), format!("eq.{}", value)));
        self
    }

    /// Send the request and collect the returned rows.
    pub async fn execute(self) -> DbResult<QueryResponse> {
        let url = self.client.table_url(&self.table)?;
        let http = self.client.http();
        let operation_name = self.operation.name();

        let mut params: Vec<(String, String)> = Vec::with_capacity(self.filters.len() + 1);
        let request = match self.operation {
            Operation::Select { columns } => {
                params.push(("select".to_string(), columns));
                http.get(url)
            }
            Operation::Insert { body } => http
                .post(url)
                .header(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION))
                .json(&body?),
            Operation::Update { body } => http
                .patch(url)
                .header(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION))
                .json(&body?),
            Operation::Delete => http
                .delete(url)
                .header(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION)),
        };
        params.extend(self.filters);

        debug!(
            table = %self.table,
            operation = operation_name,
            filters = params.len(),
            "sending table request"
        );

        let response = request.query(&params).send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DbError::from_response(status.as_u16(), &body));
        }

        let data = if body.trim().is_empty() || !is_json {
            Vec::new()
        } else {
            match serde_json::from_str::<Value>(&body)? {
                Value::Array(rows) => rows,
                Value::Null => Vec::new(),
                row => vec![row],
            }
        };

        debug!(
            table = %self.table,
            operation = operation_name,
            status = status.as_u16(),
            rows = data.len(),
            "table request completed"
        );

        Ok(QueryResponse {
            table: self.table,
            status: status.as_u16(),
            data,
        })
    }
}

/// Rows returned by a table operation.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub table: String,
    pub status: u16,
    pub data: Vec<Value>,
}

impl QueryResponse {
    /// Decode every returned row.
    pub fn rows<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        self.data
            .iter()
            .map(|row| serde_json::from_value(row.clone()).map_err(DbError::from))
            .collect()
    }

    /// Decode the first returned row, failing if there is none.
    pub fn first<T: DeserializeOwned>(&self) -> DbResult<T> {
        let row = self.data.first().ok_or_else(|| DbError::EmptyResult {
            table: self.table.clone(),
        })?;
        Ok(serde_json::from_value(row.clone())?)
    }
}
