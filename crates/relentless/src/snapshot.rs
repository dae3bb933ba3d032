// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full};

use crate::{BoxError, Error};

/// The body every attempt sends: a fresh, independent view over a [`BodySnapshot`].
pub type ReplayBody = Full<Bytes>;

/// The bytes of a request body, captured once so they can be replayed by every attempt.
///
/// A snapshot is cheap to clone; clones share the same buffer. Requests rebuilt for an
/// attempt carry their snapshot in their extensions, so a transport that needs to send the
/// body again (for example, to follow a redirect) can obtain another reader:
///
/// ```
/// # use bytes::Bytes;
/// # use relentless::BodySnapshot;
/// # fn transport(request: http::Request<relentless::ReplayBody>) {
/// if let Some(snapshot) = request.extensions().get::<BodySnapshot>() {
///     let again = snapshot.reader();
/// #   let _ = again;
/// }
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodySnapshot {
    bytes: Bytes,
}

impl BodySnapshot {
    /// Creates a snapshot over bytes that are already in memory.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Reads `body` to the end and keeps its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyRead`] if the body yields an error before its end.
    pub async fn capture<B>(body: B) -> Result<Self, Error>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let collected = body.collect().await.map_err(|e| Error::BodyRead(e.into()))?;

        Ok(Self {
            bytes: collected.to_bytes(),
        })
    }

    /// Returns a new reader over the captured bytes.
    #[must_use]
    pub fn reader(&self) -> ReplayBody {
        Full::new(self.bytes.clone())
    }

    /// Returns the captured bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the number of captured bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if no bytes were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
