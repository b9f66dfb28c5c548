// Async HTTP client for the Snyk v1 REST API.
//
// Base path: https://snyk.io/api/v1/
// Auth: `Authorization: token <apiKey>`
//
// Endpoint groups (organizations, notification settings, integrations) are
// implemented as inherent methods in sibling modules; this file only owns
// URL construction, the HTTP verbs, and status classification.

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://snyk.io/api/v1/";

/// Account-wide options shared by every gateway call.
///
/// Read-only for the lifetime of a reconciliation run.
#[derive(Debug, Clone)]
pub struct SnykOptions {
    pub group_id: String,
    pub api_key: SecretString,
    pub base_url: Url,
    pub transport: TransportConfig,
}

/// Async client for the Snyk v1 API.
///
/// Holds no mutable state: every call is a single self-contained request,
/// so one client can be shared (behind an `Arc`) across independent
/// reconciliations.
#[derive(Debug, Clone)]
pub struct SnykClient {
    http: reqwest::Client,
    base_url: Url,
    group_id: String,
}

impl SnykClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from account options, injecting the authorization,
    /// content-type and user-agent headers on every request.
    pub fn new(options: &SnykOptions) -> Result<Self, Error> {
        let http = options
            .transport
            .build_authenticated_client(&options.api_key)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(options.base_url.clone()),
            group_id: options.group_id.clone(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, group_id: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base_url(Url::parse(base_url)?);
        Ok(Self {
            http,
            base_url,
            group_id: group_id.to_owned(),
        })
    }

    /// The group whose organizations this client manages.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// The API root every path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"org/abc/integrations"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// Send one request and classify the status. The body of a successful
    /// response is returned raw for the caller to decode.
    pub async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        trace!(status = status.as_u16(), bytes = text.len(), "response received");

        classify(status, path, text)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let body = self.send::<()>(Method::GET, path, None).await?;
        decode(body)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = self.send(Method::POST, path, Some(body)).await?;
        decode(body)
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = self.send(Method::PUT, path, Some(body)).await?;
        decode(body)
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        self.send(Method::PUT, path, Some(body)).await.map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.send::<()>(Method::DELETE, path, None).await.map(drop)
    }
}

// ── Response handling ────────────────────────────────────────────────

fn classify(status: StatusCode, path: &str, body: String) -> Result<String, Error> {
    match status.as_u16() {
        s if s < 300 => Ok(body),
        401 => Err(Error::Unauthenticated),
        403 => Err(Error::Unauthorized),
        404 => Err(Error::NotFound {
            path: path.to_owned(),
        }),
        s => Err(Error::UnexpectedStatus { status: s, body }),
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Ensure the base URL ends with `/` so relative joins append instead of
/// replacing the last path segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(classify(StatusCode::OK, "/x", String::new()).is_ok());
        assert!(classify(StatusCode::NO_CONTENT, "/x", String::new()).is_ok());
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, "/x", String::new()),
            Err(Error::Unauthenticated)
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, "/x", String::new()),
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "/org/1", String::new()),
            Err(Error::NotFound { ref path }) if path == "/org/1"
        ));
        assert!(matches!(
            classify(StatusCode::MOVED_PERMANENTLY, "/x", "moved".into()),
            Err(Error::UnexpectedStatus { status: 301, .. })
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "/x", String::new()),
            Err(Error::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client =
            SnykClient::from_reqwest("http://localhost:9999/api/v1", "g", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9999/api/v1/");
        assert_eq!(
            client.url("/org/abc").unwrap().as_str(),
            "http://localhost:9999/api/v1/org/abc"
        );
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        let result: Result<serde_json::Value, Error> = decode("{not json".into());
        match result {
            Err(Error::Deserialization { body, .. }) => assert_eq!(body, "{not json"),
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }
}
