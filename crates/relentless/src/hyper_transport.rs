// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use http::{Request, Response};
use http_body::Body;
use hyper::body::Incoming;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use layered::Service;
use serde::Serialize;

use crate::{BoxError, Client, ClientConfig, ReplayBody, Result, TransportError};

/// A plain `HTTP/1.1` transport over a pooled [`hyper_util`] client.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    client: HyperClient<HttpConnector, ReplayBody>,
}

impl HyperTransport {
    /// Creates a transport with its own connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: HyperClient::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<ReplayBody>> for HyperTransport {
    type Out = std::result::Result<Response<Incoming>, TransportError>;

    fn execute(&self, input: Request<ReplayBody>) -> impl Future<Output = Self::Out> + Send {
        let response = self.client.request(input);
        async move { response.await.map_err(TransportError::new) }
    }
}

impl Client<HyperTransport> {
    /// Creates a client with the default policy over a new [`HyperTransport`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    /// Creates a client with the given policy over a new [`HyperTransport`].
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Client::builder().config(config).transport(HyperTransport::new()).build()
    }
}

impl Default for Client<HyperTransport> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends a request through a new client with the default policy.
///
/// # Errors
///
/// See [`Error`](crate::Error).
pub async fn send<B>(request: Request<B>) -> Result<Response<Incoming>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    Client::new().send(request).await
}

/// Issues a `GET` request through a new client with the default policy.
///
/// # Errors
///
/// See [`Error`](crate::Error).
pub async fn get(url: &str) -> Result<Response<Incoming>> {
    Client::new().get(url).await
}

/// Issues a `HEAD` request through a new client with the default policy.
///
/// # Errors
///
/// See [`Error`](crate::Error).
pub async fn head(url: &str) -> Result<Response<Incoming>> {
    Client::new().head(url).await
}

/// Issues a `POST` request through a new client with the default policy.
///
/// # Errors
///
/// See [`Error`](crate::Error).
pub async fn post<B>(url: &str, content_type: &str, body: B) -> Result<Response<Incoming>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    Client::new().post(url, content_type, body).await
}

/// Issues a `POST` request with URL-encoded form values through a new client with the
/// default policy.
///
/// # Errors
///
/// See [`Error`](crate::Error).
pub async fn post_form<F>(url: &str, form: &F) -> Result<Response<Incoming>>
where
    F: Serialize + ?Sized,
{
    Client::new().post_form(url, form).await
}
