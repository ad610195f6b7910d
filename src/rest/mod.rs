//! Thin PostgREST client. Every request is scoped by the tenant header and
//! every outcome, including transport failures, comes back as a
//! [`RestResponse`] envelope rather than an error.

pub mod query;

use reqwest::{header::HeaderMap, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

pub use query::{build_query, Query};

pub const TENANT_HEADER: &str = "x-tenant-key";

/// Connection details for one tenant's relational backend.
#[derive(Clone, Debug)]
pub struct RestEnv {
    pub base_url: String,
    pub anon_key: SecretString,
    pub tenant_key: Option<String>,
}

impl RestEnv {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            anon_key: SecretString::from(anon_key.to_string()),
            tenant_key: None,
        }
    }

    pub fn with_tenant_key(mut self, tenant_key: impl Into<String>) -> Self {
        self.tenant_key = Some(tenant_key.into());
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub status: u16,
}

impl<T> RestResponse<T> {
    pub fn success(data: Option<T>, status: u16) -> Self {
        Self {
            data,
            error: None,
            status,
        }
    }

    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> AppResult<Option<T>> {
        match self.error {
            Some(message) => Err(AppError::remote(self.status, message)),
            None => Ok(self.data),
        }
    }
}

impl<T> RestResponse<Vec<T>> {
    /// Rows of a successful response; a missing body counts as no rows.
    pub fn into_rows(self) -> AppResult<Vec<T>> {
        Ok(self.into_result()?.unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn headers(env: &RestEnv, prefer: &str) -> HeaderMap {
        let anon_key = env.anon_key.expose_secret();
        let mut headers = HeaderMap::new();
        let pairs = [
            ("apikey", anon_key.to_string()),
            ("authorization", format!("Bearer {}", anon_key)),
            ("content-type", "application/json".to_string()),
            ("accept", "application/json".to_string()),
            ("prefer", prefer.to_string()),
        ];
        for (name, value) in pairs {
            if let Ok(value) = value.parse() {
                headers.insert(name, value);
            }
        }
        if let Some(tenant_key) = env.tenant_key.as_deref() {
            if let Ok(value) = tenant_key.parse() {
                headers.insert(TENANT_HEADER, value);
            }
        }
        headers
    }

    /// Issues one request against `<base>/rest/v1/<path>`. The body is only
    /// sent for POST and PATCH.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        env: &RestEnv,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> RestResponse<T> {
        let url = env.endpoint(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(Self::headers(env, "return=representation"));

        if method == Method::POST || method == Method::PATCH {
            if let Some(body) = body {
                request = request.body(body.to_string());
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("{} {} failed: {}", method, path, err);
                return RestResponse::failure(0, err.to_string());
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return RestResponse::failure(status.as_u16(), err.to_string()),
        };

        if !status.is_success() {
            log::warn!("{} {} returned {}", method, path, status.as_u16());
            let message = if text.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                text
            };
            return RestResponse::failure(status.as_u16(), message);
        }

        if text.trim().is_empty() {
            return RestResponse::success(None, status.as_u16());
        }
        match serde_json::from_str::<T>(&text) {
            Ok(data) => RestResponse::success(Some(data), status.as_u16()),
            Err(err) => {
                log::debug!("{} {} returned a body that did not parse: {}", method, path, err);
                RestResponse::success(None, status.as_u16())
            }
        }
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        env: &RestEnv,
        table: &str,
        query: &Query,
    ) -> RestResponse<Vec<T>> {
        self.execute(env, &query.path_for(table), Method::GET, None)
            .await
    }

    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        env: &RestEnv,
        table: &str,
        rows: &B,
    ) -> RestResponse<Vec<T>> {
        match serde_json::to_value(rows) {
            Ok(body) => self.execute(env, table, Method::POST, Some(&body)).await,
            Err(err) => RestResponse::failure(0, err.to_string()),
        }
    }

    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        env: &RestEnv,
        table: &str,
        filter: &Query,
        patch: &B,
    ) -> RestResponse<Vec<T>> {
        match serde_json::to_value(patch) {
            Ok(body) => {
                self.execute(env, &filter.path_for(table), Method::PATCH, Some(&body))
                    .await
            }
            Err(err) => RestResponse::failure(0, err.to_string()),
        }
    }

    pub async fn remove(&self, env: &RestEnv, table: &str, filter: &Query) -> RestResponse<Value> {
        self.execute(env, &filter.path_for(table), Method::DELETE, None)
            .await
    }

    /// Exact row count from the `Content-Range` header, `None` on any failure.
    pub async fn count(&self, env: &RestEnv, table: &str, filter: &Query) -> Option<u64> {
        let query = Query::new().select("id").limit(1);
        let mut path = query.path_for(table);
        let filter = filter.to_query_string();
        if let Some(rest) = filter.strip_prefix('?') {
            path.push('&');
            path.push_str(rest);
        }

        let response = self
            .http
            .get(env.endpoint(&path))
            .headers(Self::headers(env, "count=exact"))
            .send()
            .await
            .map_err(|err| log::warn!("count on {} failed: {}", table, err))
            .ok()?;

        if !response.status().is_success() {
            log::warn!("count on {} returned {}", table, response.status().as_u16());
            return None;
        }

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
    }
}

/// `0-0/5` and `*/5` both yield `5`.
pub fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slashes() {
        let env = RestEnv::new("https://abc.supabase.co///", "anon");
        assert_eq!(
            env.endpoint("quizzes?select=*"),
            "https://abc.supabase.co/rest/v1/quizzes?select=*"
        );
    }

    #[test]
    fn test_headers_carry_key_and_tenant() {
        let env = RestEnv::new("https://abc.supabase.co", "anon").with_tenant_key("tk");
        let headers = RestClient::headers(&env, "return=representation");
        assert_eq!(headers["apikey"], "anon");
        assert_eq!(headers["authorization"], "Bearer anon");
        assert_eq!(headers["prefer"], "return=representation");
        assert_eq!(headers[TENANT_HEADER], "tk");
    }

    #[test]
    fn test_headers_without_tenant() {
        let env = RestEnv::new("https://abc.supabase.co", "anon");
        let headers = RestClient::headers(&env, "count=exact");
        assert!(headers.get(TENANT_HEADER).is_none());
    }

    #[test]
    fn test_envelope_into_result() {
        let ok: RestResponse<Vec<i32>> = RestResponse::success(Some(vec![1]), 200);
        assert!(ok.is_ok());
        assert_eq!(ok.into_rows().unwrap(), vec![1]);

        let failed: RestResponse<Vec<i32>> = RestResponse::failure(409, "duplicate key");
        assert!(!failed.is_ok());
        assert_eq!(
            failed.into_rows(),
            Err(AppError::RemoteFailure {
                status: 409,
                message: "duplicate key".to_string()
            })
        );
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range_total("0-0/5"), Some(5));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-0/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
