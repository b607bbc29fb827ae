use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::session::Session;
use crate::models::settings::BackendSettings;
use super::traits::RemoteTable;

/// REST backend speaking the PostgREST dialect (`/rest/v1/{table}`).
///
/// - **Auth**: every request carries the `apikey` header plus a bearer token,
///   the session's access token when there is one, the anon key otherwise.
/// - **Writes** ask for `Prefer: return=representation` so inserts, updates
///   and deletes echo the affected rows back.
/// - **Delete** of a missing id echoes an empty array, i.e. a count of 0;
///   a foreign-key conflict (409) becomes `DeleteBlocked`.
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
            anon_key: settings.anon_key.clone(),
        })
    }

    /// Endpoint for a table, e.g. `https://x.supabase.co/rest/v1/stock_operations`.
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    #[must_use]
    pub fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base_url)
    }

    fn request(&self, method: Method, url: &str, session: Option<&Session>) -> RequestBuilder {
        let token = session.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn read(response: Response) -> Result<(StatusCode, String), CoreError> {
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

// ── Response interpretation ─────────────────────────────────────────

/// Rows of a successful response; any other status becomes `Backend`.
pub fn parse_rows(status: StatusCode, body: &str, table: &str) -> Result<Vec<Value>, CoreError> {
    let body = success_body(status, body, table)?;
    match serde_json::from_str::<Value>(body)? {
        Value::Array(rows) => Ok(rows),
        other => Err(CoreError::Backend {
            table: table.to_string(),
            message: format!("Expected an array of rows, got {other}"),
        }),
    }
}

/// The row echoed back by an insert.
pub fn inserted_row(status: StatusCode, body: &str, table: &str) -> Result<Value, CoreError> {
    parse_rows(status, body, table)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::Backend {
            table: table.to_string(),
            message: "Insert returned no row".into(),
        })
}

/// The row echoed back by an update; none means the id matched nothing.
pub fn updated_row(status: StatusCode, body: &str, table: &str, id: &str) -> Result<Value, CoreError> {
    parse_rows(status, body, table)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::OperationNotFound(id.to_string()))
}

/// Number of rows a delete removed. 409 means a referencing row blocks it.
pub fn delete_outcome(status: StatusCode, body: &str, table: &str, id: &str) -> Result<usize, CoreError> {
    if status == StatusCode::CONFLICT {
        return Err(CoreError::DeleteBlocked {
            id: id.to_string(),
            message: describe_error_body(body),
        });
    }
    Ok(parse_rows(status, body, table)?.len())
}

/// Result of a stored procedure call; an empty body is `null`.
pub fn rpc_result(status: StatusCode, body: &str, function: &str) -> Result<Value, CoreError> {
    let body = success_body(status, body, function)?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn success_body<'b>(status: StatusCode, body: &'b str, table: &str) -> Result<&'b str, CoreError> {
    if status.is_success() {
        return Ok(body);
    }
    Err(CoreError::Backend {
        table: table.to_string(),
        message: format!("HTTP {}: {}", status.as_u16(), describe_error_body(body)),
    })
}

/// Extract the human-readable part of a PostgREST error payload
/// (`{"message": ..., "details": ...}`), falling back to the raw body.
#[must_use]
pub fn describe_error_body(body: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let message = map
        .get("message")
        .or_else(|| map.get("msg"))
        .or_else(|| map.get("error_description"))
        .and_then(Value::as_str);
    let details = map.get("details").and_then(Value::as_str);
    match (message, details) {
        (Some(m), Some(d)) if !d.is_empty() => format!("{m} ({d})"),
        (Some(m), _) => m.to_string(),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl RemoteTable for RestBackend {
    fn name(&self) -> &str {
        "PostgREST"
    }

    async fn select_all(
        &self,
        table: &str,
        order_by_desc: &str,
        session: Option<&Session>,
    ) -> Result<Vec<Value>, CoreError> {
        let url = self.table_url(table);
        let response = self
            .request(Method::GET, &url, session)
            .query(&[("select", "*".to_string()), ("order", format!("{order_by_desc}.desc"))])
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        parse_rows(status, &body, table)
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &str,
        session: Option<&Session>,
    ) -> Result<Option<Value>, CoreError> {
        let url = self.table_url(table);
        let response = self
            .request(Method::GET, &url, session)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        Ok(parse_rows(status, &body, table)?.into_iter().next())
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let url = self.table_url(table);
        let response = self
            .request(Method::POST, &url, session)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        inserted_row(status, &body, table)
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let url = self.table_url(table);
        let response = self
            .request(Method::PATCH, &url, session)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        updated_row(status, &body, table, id)
    }

    async fn delete_by_id(
        &self,
        table: &str,
        id: &str,
        session: Option<&Session>,
    ) -> Result<usize, CoreError> {
        let url = self.table_url(table);
        let response = self
            .request(Method::DELETE, &url, session)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        delete_outcome(status, &body, table, id)
    }

    async fn rpc(
        &self,
        function: &str,
        args: Value,
        session: Option<&Session>,
    ) -> Result<Value, CoreError> {
        let url = self.rpc_url(function);
        let response = self
            .request(Method::POST, &url, session)
            .json(&args)
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        rpc_result(status, &body, function)
    }
}
