use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use crate::errors::ServiceError;
use crate::google::auth::TokenProvider;
use crate::observability;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Shared HTTP plumbing: bearer auth, error mapping, metrics.
#[derive(Clone)]
pub struct GoogleHttp {
    client: Client,
    token: Arc<dyn TokenProvider>,
}

impl GoogleHttp {
    pub fn new(token: Arc<dyn TokenProvider>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Startup(format!("http client: {e}")))?;
        Ok(Self { client, token })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn send_json<T: DeserializeOwned>(&self, api: &'static str, req: RequestBuilder) -> Result<T, ServiceError> {
        let resp = self.execute(api, req).await?;
        resp.json::<T>().await.map_err(|e| {
            error!(api, error = %e, "undecodable response body");
            ServiceError::Transport(format!("{api} response: {e}"))
        })
    }

    pub async fn send_empty(&self, api: &'static str, req: RequestBuilder) -> Result<(), ServiceError> {
        self.execute(api, req).await.map(|_| ())
    }

    async fn execute(&self, api: &'static str, req: RequestBuilder) -> Result<Response, ServiceError> {
        let token = self.token.access_token().await?;
        let started = Instant::now();
        let result = req.bearer_auth(token).send().await;
        observability::record_call(api, started.elapsed().as_secs_f64());

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                observability::record_error(api, 0);
                error!(api, error = %e, "remote call failed");
                return Err(ServiceError::Transport(e.to_string()));
            }
        };
        let status = resp.status();
        debug!(api, status = status.as_u16(), url = %resp.url(), "remote call");
        if status.is_success() {
            return Ok(resp);
        }

        observability::record_error(api, status.as_u16());
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        });
        error!(api, status = status.as_u16(), %message, "remote api error");
        Err(ServiceError::upstream(api, status.as_u16(), message))
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

/// `base` with each segment appended, percent-encoded as needed.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ServiceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::Startup(format!("{base} cannot be used as a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn parse_base(raw: &str) -> Result<Url, ServiceError> {
    Url::parse(raw).map_err(|e| ServiceError::Startup(format!("invalid base url {raw}: {e}")))
}
