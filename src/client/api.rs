//! Transport seam between the client store and the thread service.

use actix_web::http::StatusCode;
use async_trait::async_trait;
use std::fmt;

use crate::models::comment::{Comment, NewComment};
use crate::models::thread::{NewThread, Thread, ThreadPatch, VoteDirection};

/// Failure taxonomy seen by the client. NotFound and Validation are
/// terminal per request; Transient and Timeout trigger the rollback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound,
    Validation(String),
    Transient(String),
    Timeout,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "Thread not found"),
            ApiError::Validation(msg) => write!(f, "Validation failed: {msg}"),
            ApiError::Transient(msg) => write!(f, "Request failed: {msg}"),
            ApiError::Timeout => write!(f, "Request timed out"),
        }
    }
}

/// The thread service surface as seen from the widget.
#[async_trait(?Send)]
pub trait ThreadApi {
    async fn list_threads(&self) -> Result<Vec<Thread>, ApiError>;
    async fn get_thread(&self, id: i64) -> Result<Thread, ApiError>;
    async fn create_thread(&self, new: &NewThread) -> Result<Thread, ApiError>;
    async fn update_thread(&self, id: i64, patch: &ThreadPatch) -> Result<Thread, ApiError>;
    async fn delete_thread(&self, id: i64) -> Result<(), ApiError>;
    async fn add_comment(&self, thread_id: i64, new: &NewComment) -> Result<Comment, ApiError>;
    async fn edit_comment(
        &self,
        thread_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError>;
    async fn delete_comment(&self, thread_id: i64, comment_id: i64) -> Result<(), ApiError>;
    async fn vote(&self, thread_id: i64, direction: VoteDirection) -> Result<i64, ApiError>;
}

/// HTTP implementation of [`ThreadApi`] over awc.
pub struct RestApi {
    base: String,
    client: awc::Client,
}

impl RestApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> RestApi {
        let base = base_url.into().trim_end_matches('/').to_string();
        RestApi { base, client: awc::Client::default() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/threads{}", self.base, path)
    }
}

fn transport_error(e: impl fmt::Display) -> ApiError {
    ApiError::Transient(e.to_string())
}

fn status_error(status: StatusCode, body: Option<serde_json::Value>) -> ApiError {
    let message = body
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::BAD_REQUEST => ApiError::Validation(message),
        _ => ApiError::Transient(message),
    }
}

#[async_trait(?Send)]
impl ThreadApi for RestApi {
    async fn list_threads(&self) -> Result<Vec<Thread>, ApiError> {
        let mut resp = self.client.get(self.url("")).send().await.map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Vec<Thread>>().await.map_err(transport_error)
    }

    async fn get_thread(&self, id: i64) -> Result<Thread, ApiError> {
        let mut resp = self
            .client
            .get(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Thread>().await.map_err(transport_error)
    }

    async fn create_thread(&self, new: &NewThread) -> Result<Thread, ApiError> {
        let mut resp = self
            .client
            .post(self.url(""))
            .send_json(new)
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Thread>().await.map_err(transport_error)
    }

    async fn update_thread(&self, id: i64, patch: &ThreadPatch) -> Result<Thread, ApiError> {
        let mut resp = self
            .client
            .put(self.url(&format!("/{id}")))
            .send_json(patch)
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Thread>().await.map_err(transport_error)
    }

    async fn delete_thread(&self, id: i64) -> Result<(), ApiError> {
        let mut resp = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        Ok(())
    }

    async fn add_comment(&self, thread_id: i64, new: &NewComment) -> Result<Comment, ApiError> {
        let mut resp = self
            .client
            .post(self.url(&format!("/{thread_id}/comments")))
            .send_json(new)
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Comment>().await.map_err(transport_error)
    }

    async fn edit_comment(
        &self,
        thread_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError> {
        let mut resp = self
            .client
            .put(self.url(&format!("/{thread_id}/comments/{comment_id}")))
            .send_json(&serde_json::json!({ "content": content }))
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        resp.json::<Comment>().await.map_err(transport_error)
    }

    async fn delete_comment(&self, thread_id: i64, comment_id: i64) -> Result<(), ApiError> {
        let mut resp = self
            .client
            .delete(self.url(&format!("/{thread_id}/comments/{comment_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        Ok(())
    }

    async fn vote(&self, thread_id: i64, direction: VoteDirection) -> Result<i64, ApiError> {
        let mut resp = self
            .client
            .post(self.url(&format!("/{thread_id}/vote")))
            .send_json(&serde_json::json!({ "direction": direction }))
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let body = resp.json::<serde_json::Value>().await.ok();
            return Err(status_error(resp.status(), body));
        }
        let body = resp.json::<serde_json::Value>().await.map_err(transport_error)?;
        body.get("votes")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ApiError::Transient("Malformed vote response".to_string()))
    }
}
