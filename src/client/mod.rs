//! HTTP client for the measurement API, used by the `measure` CLI.
//!
//! The client holds the bearer token of the current session. Any 401/403
//! answer drops it, mirroring a dashboard that logs out on an invalid
//! session.

pub mod dashboard;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::database::models::{Measurement, MeasurementView, Series, SeriesInput};
use crate::services::{LoginResult, MeasurementInput};

pub use dashboard::{Dashboard, DashboardState, Effect, Filters, LoadState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 401/403; the stored token has been discarded
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Url(_) => None,
        }
    }
}

/// Query of `GET /api/measurements`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub series_ids: Vec<i32>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ListParams {
    /// Empty values are left out entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.series_ids.is_empty() {
            let csv = self
                .series_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("series_id", csv));
        }
        if let Some(start) = self.start.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("start", start.clone()));
        }
        if let Some(end) = self.end.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("end", end.clone()));
        }
        pairs
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeletedSeries {
    deleted: Series,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send and turn non-2xx answers into errors carrying the server's message.
    async fn execute(&mut self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if self.token.take().is_some() {
                warn!("Session rejected by server ({}), token cleared", status.as_u16());
            }
            return Err(ClientError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<R: DeserializeOwned>(
        &mut self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<R, ClientError> {
        let builder = self.request(Method::GET, path)?.query(query);
        Ok(self.execute(builder).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let builder = self.request(method, path)?.json(body);
        Ok(self.execute(builder).await?.json().await?)
    }

    pub async fn health(&mut self) -> Result<Value, ClientError> {
        self.get_json("health", &[]).await
    }

    /// Log in and keep the issued token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResult, ClientError> {
        let result: LoginResult = self
            .send_json(
                Method::POST,
                "auth/login",
                &json!({ "username": username, "password": password }),
            )
            .await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Result<String, ClientError> {
        let body: MessageBody = self
            .send_json(
                Method::POST,
                "auth/register",
                &json!({ "username": username, "password": password }),
            )
            .await?;
        Ok(body.message)
    }

    pub async fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<String, ClientError> {
        let body: MessageBody = self
            .send_json(
                Method::PUT,
                "auth/change-password",
                &json!({ "oldPassword": old_password, "newPassword": new_password }),
            )
            .await?;
        Ok(body.message)
    }

    pub async fn list_series(&mut self) -> Result<Vec<Series>, ClientError> {
        self.get_json("api/series", &[]).await
    }

    pub async fn create_series(&mut self, input: &SeriesInput) -> Result<Series, ClientError> {
        self.send_json(Method::POST, "api/series", input).await
    }

    pub async fn update_series(&mut self, id: i32, input: &SeriesInput) -> Result<Series, ClientError> {
        self.send_json(Method::PUT, &format!("api/series/{}", id), input).await
    }

    /// Returns the removed series; its measurements are gone too.
    pub async fn delete_series(&mut self, id: i32) -> Result<Series, ClientError> {
        let builder = self.request(Method::DELETE, &format!("api/series/{}", id))?;
        let body: DeletedSeries = self.execute(builder).await?.json().await?;
        Ok(body.deleted)
    }

    pub async fn list_measurements(&mut self, params: &ListParams) -> Result<Vec<MeasurementView>, ClientError> {
        self.get_json("api/measurements", &params.query_pairs()).await
    }

    pub async fn create_measurement(&mut self, input: &MeasurementInput) -> Result<Measurement, ClientError> {
        self.send_json(Method::POST, "api/measurements", input).await
    }

    pub async fn update_measurement(
        &mut self,
        id: i32,
        input: &MeasurementInput,
    ) -> Result<Measurement, ClientError> {
        self.send_json(Method::PUT, &format!("api/measurements/{}", id), input)
            .await
    }

    pub async fn delete_measurement(&mut self, id: i32) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("api/measurements/{}", id))?;
        self.execute(builder).await?;
        Ok(())
    }
}

/// `error` from the JSON error body, `message` as a fallback, else the status text.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();

    match response.json::<Value>().await {
        Ok(body) => body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}
