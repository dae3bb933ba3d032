// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};
use std::str::FromStr;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Extensions, HeaderMap, Method, Request, Uri, Version};
use http_body::Body;
use http_body_util::Full;

use crate::{BodySnapshot, BoxError, CancellationToken, Error, ReplayBody};

/// The content type of encoded form values.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The kind of call being made, as it appears in the attempt log.
///
/// Parsing accepts the operation names case-insensitively; `Do` is accepted as an alias for
/// [`Send`](Self::Send).
///
/// ```
/// # use relentless::{Error, Operation};
/// assert_eq!("get".parse::<Operation>()?, Operation::Get);
/// assert_eq!("Do".parse::<Operation>()?, Operation::Send);
/// assert!(matches!("Patch".parse::<Operation>(), Err(Error::UnsupportedOperation(_))));
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A prebuilt request, sent as-is.
    Send,
    /// `GET` of a URL.
    Get,
    /// `HEAD` of a URL.
    Head,
    /// `POST` of a body with a content type.
    Post,
    /// `POST` of URL-encoded form values.
    PostForm,
}

impl Operation {
    /// Returns the name used in the attempt log.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Send => "Send",
            Self::Get => "Get",
            Self::Head => "Head",
            Self::Post => "Post",
            Self::PostForm => "PostForm",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "do" | "send" => Ok(Self::Send),
            "get" => Ok(Self::Get),
            "head" => Ok(Self::Head),
            "post" => Ok(Self::Post),
            "postform" | "post_form" => Ok(Self::PostForm),
            _ => Err(Error::UnsupportedOperation(s.to_string())),
        }
    }
}

/// What an operation is applied to.
#[derive(Debug)]
pub enum Target<B = Full<Bytes>> {
    /// A prebuilt request. Accepted by [`Operation::Send`].
    Request(Request<B>),
    /// A URL. Accepted by [`Operation::Get`] and [`Operation::Head`].
    Url(String),
    /// A URL with a body and its content type. Accepted by [`Operation::Post`].
    Upload {
        /// The URL to post to.
        url: String,
        /// The value of the `Content-Type` header.
        content_type: String,
        /// The body to post.
        body: B,
    },
    /// A URL with form values. Accepted by [`Operation::PostForm`].
    Form {
        /// The URL to post to.
        url: String,
        /// The form values, in order.
        fields: Vec<(String, String)>,
    },
}

impl<B> Target<B> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "a prebuilt request",
            Self::Url(_) => "a URL",
            Self::Upload { .. } => "an upload",
            Self::Form { .. } => "form values",
        }
    }
}

/// An operation paired with its target, describing one call.
///
/// Use [`Client::execute`](crate::Client::execute) to run it. The pairing is validated when the
/// call starts; an operation applied to a target it does not accept fails with
/// [`Error::UnsupportedOperation`] before the body is read.
///
/// ```
/// # use relentless::{Operation, RequestSpec, Target};
/// let spec: RequestSpec = RequestSpec::new(Operation::Head, Target::Url("http://localhost/".into()));
/// assert_eq!(spec.operation(), Operation::Head);
/// ```
#[derive(Debug)]
pub struct RequestSpec<B = Full<Bytes>> {
    operation: Operation,
    target: Target<B>,
}

impl<B> RequestSpec<B> {
    /// Pairs an operation with a target.
    pub fn new(operation: Operation, target: Target<B>) -> Self {
        Self { operation, target }
    }

    /// Returns the operation.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the target.
    #[must_use]
    pub fn target(&self) -> &Target<B> {
        &self.target
    }

    /// Validates the pairing, reads the body once and produces the template every attempt is
    /// rebuilt from.
    pub(crate) async fn prepare(self) -> Result<Template, Error>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        match (self.operation, self.target) {
            (Operation::Send, Target::Request(request)) => {
                let (parts, body) = request.into_parts();
                let snapshot = BodySnapshot::capture(body).await?;

                Ok(Template {
                    operation: Operation::Send,
                    method: parts.method,
                    uri: parts.uri,
                    version: parts.version,
                    headers: parts.headers,
                    extensions: parts.extensions,
                    snapshot,
                })
            }
            (operation @ (Operation::Get | Operation::Head), Target::Url(url)) => {
                let method = if operation == Operation::Get { Method::GET } else { Method::HEAD };
                Template::from_url(operation, method, &url, None, BodySnapshot::default())
            }
            (Operation::Post, Target::Upload { url, content_type, body }) => {
                let snapshot = BodySnapshot::capture(body).await?;
                Template::from_url(Operation::Post, Method::POST, &url, Some(&content_type), snapshot)
            }
            (Operation::PostForm, Target::Form { url, fields }) => {
                let encoded = serde_urlencoded::to_string(&fields)?;
                Template::from_url(
                    Operation::PostForm,
                    Method::POST,
                    &url,
                    Some(FORM_CONTENT_TYPE),
                    BodySnapshot::new(encoded),
                )
            }
            (operation, target) => Err(Error::UnsupportedOperation(format!(
                "{operation} does not accept {}",
                target.kind()
            ))),
        }
    }
}

/// The immutable description every attempt's request is rebuilt from.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    operation: Operation,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    snapshot: BodySnapshot,
}

impl Template {
    pub(crate) fn from_url(
        operation: Operation,
        method: Method,
        url: &str,
        content_type: Option<&str>,
        snapshot: BodySnapshot,
    ) -> Result<Self, Error> {
        let mut builder = Request::builder().method(method).uri(url);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        let (parts, ()) = builder.body(())?.into_parts();

        Ok(Self {
            operation,
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            extensions: parts.extensions,
            snapshot,
        })
    }

    pub(crate) fn operation(&self) -> Operation {
        self.operation
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub(crate) fn url(&self) -> String {
        self.uri.to_string()
    }

    /// Only `GET` is raced across lanes.
    pub(crate) fn is_idempotent_read(&self) -> bool {
        self.method == Method::GET
    }

    /// The cancellation token the caller attached to the request, if any.
    pub(crate) fn cancellation(&self) -> Option<CancellationToken> {
        self.extensions.get::<CancellationToken>().cloned()
    }

    /// Builds a fresh request with its own reader over the snapshot.
    pub(crate) fn build(&self) -> Request<ReplayBody> {
        let mut request = Request::new(self.snapshot.reader());
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers.clone();
        *request.extensions_mut() = self.extensions.clone();
        request.extensions_mut().insert(self.snapshot.clone());
        request
    }
}
