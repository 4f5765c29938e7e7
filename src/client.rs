use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::delta::DeltasService;
use crate::org::OrgsService;
use crate::router::{self, Route, RouteError};
use crate::spec::RouteVars;

const USER_AGENT: &str = concat!("srcgraph/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build request URL: {0}")]
    Route(#[from] RouteError),

    #[error("Invalid API base URL {0:?}")]
    BaseUrl(String),

    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("API returned {}: {body}", .response.status)]
    Status { response: Response, body: String },

    #[error("Failed to decode API response ({}): {source}", .response.status)]
    Decode {
        response: Response,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Response metadata, when the server answered at all.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ClientError::Status { response, .. } | ClientError::Decode { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }
}

/// A request ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<serde_json::Value>,
}

/// Status and headers of an API response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// A response with its undecoded body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub response: Response,
    pub body: Vec<u8>,
}

/// Performs one HTTP exchange. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RawResponse, ClientError>;
}

/// [`Transport`] backed by reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(token: Option<String>) -> Result<HttpTransport, ClientError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(HttpTransport { http, token })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ClientError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let response = Response {
            status: resp.status(),
            headers: resp.headers().clone(),
        };
        let body = resp.bytes().await?.to_vec();
        debug!(status = %response.status, body_bytes = body.len(), "received API response");

        Ok(RawResponse { response, body })
    }
}

/// Client for the Sourcegraph API.
pub struct Client {
    base_url: Url,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client talking HTTP to the endpoint in `config`.
    pub fn new(config: &Config) -> Result<Client, ClientError> {
        let api_url = config.api_url();
        let base_url = Url::parse(&api_url).map_err(|_| ClientError::BaseUrl(api_url.clone()))?;
        let transport = HttpTransport::new(config.access_token())?;
        Ok(Client::with_transport(base_url, transport))
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(mut base_url: Url, transport: impl Transport + 'static) -> Client {
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Client {
            base_url,
            transport: Box::new(transport),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn deltas(&self) -> DeltasService<'_> {
        DeltasService::new(self)
    }

    pub fn orgs(&self) -> OrgsService<'_> {
        OrgsService::new(self)
    }

    pub(crate) fn url<T: Serialize + ?Sized>(
        &self,
        route: Route,
        vars: &RouteVars,
        opt: Option<&T>,
    ) -> Result<Url, ClientError> {
        Ok(router::url(&self.base_url, route, vars, opt)?)
    }

    pub(crate) fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Request, ClientError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(ClientError::Encode)?;
        Ok(Request { method, url, body })
    }

    async fn send(&self, request: Request) -> Result<RawResponse, ClientError> {
        debug!(method = %request.method, url = %request.url, "sending API request");
        let raw = self.transport.send(request).await?;
        if !raw.response.status.is_success() {
            return Err(ClientError::Status {
                body: String::from_utf8_lossy(&raw.body).into_owned(),
                response: raw.response,
            });
        }
        Ok(raw)
    }

    /// Send `request` and decode the JSON response body into `T`. An empty
    /// body decodes as JSON `null`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<(T, Response), ClientError> {
        let raw = self.send(request).await?;
        let body: &[u8] = if raw.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &raw.body
        };
        match serde_json::from_slice(body) {
            Ok(value) => Ok((value, raw.response)),
            Err(source) => Err(ClientError::Decode {
                response: raw.response,
                source,
            }),
        }
    }

    /// Send `request`, ignoring any response body.
    pub(crate) async fn send_empty(&self, request: Request) -> Result<Response, ClientError> {
        Ok(self.send(request).await?.response)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for service tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed status and body, and records every request.
    #[derive(Clone)]
    pub struct FakeTransport {
        status: StatusCode,
        body: String,
        pub requests: Arc<Mutex<Vec<Request>>>,
    }

    impl FakeTransport {
        pub fn new(status: u16, body: &str) -> FakeTransport {
            FakeTransport {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_string(),
                requests: Arc::default(),
            }
        }

        pub fn client(&self) -> Client {
            let base = Url::parse("https://sourcegraph.example/.api/").unwrap();
            Client::with_transport(base, self.clone())
        }

        pub fn only_request(&self) -> Request {
            let requests = self.requests.lock().unwrap();
            assert_eq!(requests.len(), 1, "expected exactly one request");
            requests[0].clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: Request) -> Result<RawResponse, ClientError> {
            self.requests.lock().unwrap().push(request);
            Ok(RawResponse {
                response: Response {
                    status: self.status,
                    headers: HeaderMap::new(),
                },
                body: self.body.clone().into_bytes(),
            })
        }
    }
}
