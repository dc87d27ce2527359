use std::path::Path;

use anyhow::{Context, Result};
use lingodocs_shared::{
    api::{DashboardMetrics, DocumentFields, DocumentListParams, Envelope, FieldErrors, Page},
    Document,
};
use reqwest::{multipart, Client, StatusCode};

use super::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Document not found")]
    NotFound,
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    /// Load a stored session from disk, if any
    pub fn load_session(&mut self) -> Result<bool> {
        self.session = Session::load()?;
        Ok(self.session.is_some())
    }

    /// Drop the session in memory and on disk. Called after a 401.
    pub fn clear_session(&mut self) -> Result<()> {
        self.session = None;
        Session::delete()
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => request.header("Authorization", format!("Bearer {}", session.token)),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.with_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.with_auth(self.client.delete(self.url(path)))
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn post_multipart(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<reqwest::Response, ApiError> {
        self.with_auth(self.client.post(self.url(path)))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Network)
    }

    /// Unwrap the `{status, statusCode, message, data, errors}` envelope,
    /// returning `data` on success.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                let envelope: Envelope<T> = response.json().await.map_err(ApiError::Network)?;
                envelope
                    .data
                    .ok_or_else(|| ApiError::Server("Response envelope had no data".to_string()))
            }
            _ => Err(self.error_from(status, response).await),
        }
    }

    /// Like `handle_response` but for endpoints whose envelope has no data.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(self.error_from(status, response).await),
        }
    }

    async fn error_from(&self, status: StatusCode, response: reqwest::Response) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                let envelope: Option<Envelope<serde_json::Value>> = response.json().await.ok();
                match envelope.and_then(|e| e.errors) {
                    Some(errors) => ApiError::Validation(errors),
                    None => ApiError::Validation(FieldErrors::new()),
                }
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                ApiError::Server(format!("{}: {}", status, text))
            }
        }
    }

    // ============ Documents ============

    pub async fn list_documents(
        &self,
        params: &DocumentListParams,
    ) -> Result<Page<Document>, ApiError> {
        let mut url = self.url("/documents");
        let query = list_query(params);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let response = self
            .with_auth(self.client.get(url))
            .send()
            .await
            .map_err(ApiError::Network)?;

        self.handle_response(response).await
    }

    pub async fn get_document(&self, id: i64) -> Result<Document, ApiError> {
        let response = self.get(&format!("/documents/{}", id)).await?;
        self.handle_response(response).await
    }

    pub async fn create_document(
        &self,
        fields: &DocumentFields,
        file_path: &Path,
    ) -> Result<Document, ApiError> {
        let form = document_form(fields).part("document", file_part(file_path).await?);
        let response = self.post_multipart("/documents", form).await?;
        self.handle_response(response).await
    }

    pub async fn update_document(
        &self,
        id: i64,
        fields: &DocumentFields,
        file_path: Option<&Path>,
    ) -> Result<Document, ApiError> {
        let mut form = document_form(fields);
        if let Some(path) = file_path {
            form = form.part("document", file_part(path).await?);
        }

        // POST rather than PUT: the update route accepts both, and POST is
        // what multipart-only form clients can send.
        let response = self
            .post_multipart(&format!("/documents/{}", id), form)
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        let response = self.delete(&format!("/documents/{}", id)).await?;
        self.handle_empty_response(response).await
    }

    // ============ Dashboard ============

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        let response = self.get("/dashboard").await?;
        self.handle_response(response).await
    }
}

fn document_form(fields: &DocumentFields) -> multipart::Form {
    multipart::Form::new()
        .text("name", fields.name.clone())
        .text("current_language", fields.current_language.clone())
        .text("process_language", fields.process_language.clone())
        .text("status", fields.status.as_str())
}

async fn file_part(path: &Path) -> Result<multipart::Part, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Could not read file {}", path.display()))
        .map_err(ApiError::Other)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(multipart::Part::bytes(bytes).file_name(file_name))
}

/// Build the listing query string from the optional params.
fn list_query(params: &DocumentListParams) -> String {
    let mut query_parts = Vec::new();

    if let Some(page) = params.page {
        query_parts.push(format!("page={}", page));
    }
    if let Some(per_page) = params.per_page {
        query_parts.push(format!("per_page={}", per_page));
    }
    if let Some(order_by) = &params.order_by {
        query_parts.push(format!("order_by={}", order_by));
    }
    if let Some(order_direction) = &params.order_direction {
        query_parts.push(format!("order_direction={}", order_direction));
    }
    if let Some(search) = &params.search {
        if !search.is_empty() {
            query_parts.push(format!("search={}", urlencoding::encode(search)));
        }
    }

    query_parts.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_is_empty_for_default_params() {
        assert_eq!(list_query(&DocumentListParams::default()), "");
    }

    #[test]
    fn list_query_includes_set_params_and_encodes_search() {
        let params = DocumentListParams {
            page: Some(2),
            per_page: Some(5),
            order_by: Some("created_at".to_string()),
            order_direction: Some("asc".to_string()),
            search: Some("Q1 Report".to_string()),
        };
        assert_eq!(
            list_query(&params),
            "page=2&per_page=5&order_by=created_at&order_direction=asc&search=Q1%20Report"
        );
    }

    #[test]
    fn list_query_skips_empty_search() {
        let params = DocumentListParams {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(list_query(&params), "");
    }
}
