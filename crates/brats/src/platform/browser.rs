// crates/brats/src/platform/browser.rs
// ============================================================================
// Module: HTTP Probe
// Description: Stateful browser over deployed app routes.
// Purpose: Visit app paths and expose the last status and body for assertions.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! [`Browser`] keeps the last response so scenarios read like
//! `visit("/")` then `body()`/`status()`. [`ReqwestTransport`] issues bounded
//! blocking GETs with redirects disabled so a router's 404 is seen as-is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

use super::HttpResponse;
use super::HttpTransport;
use crate::error::PlatformError;

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Underlying client.
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] when the client cannot be built.
    pub fn new() -> Result<Self, PlatformError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Builds a transport with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] when the client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent("brats/0.1")
            .build()
            .map_err(|err| PlatformError::Http {
                url: String::new(),
                message: format!("failed to build http client: {err}"),
            })?;
        Ok(Self {
            client,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, PlatformError> {
        let http_err = |err: reqwest::Error| PlatformError::Http {
            url: url.to_string(),
            message: err.to_string(),
        };
        let response = self.client.get(url.clone()).send().map_err(http_err)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(http_err)?;
        Ok(HttpResponse {
            status,
            body,
        })
    }
}

// ============================================================================
// SECTION: Browser
// ============================================================================

/// Stateful HTTP probe rooted at an app's route.
pub struct Browser<'a> {
    /// Transport used for requests.
    transport: &'a dyn HttpTransport,
    /// App base URL.
    base: Url,
    /// Last response received.
    last: Option<HttpResponse>,
}

impl<'a> Browser<'a> {
    /// Builds a browser for an app route.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, base: Url) -> Self {
        Self {
            transport,
            base,
            last: None,
        }
    }

    /// Requests `path` relative to the app root and keeps the response.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] when the path is not a valid URL
    /// reference or no response arrives.
    pub fn visit(&mut self, path: &str) -> Result<&HttpResponse, PlatformError> {
        let url = self.base.join(path).map_err(|err| PlatformError::Http {
            url: format!("{}{path}", self.base),
            message: err.to_string(),
        })?;
        let response = self.transport.get(&url)?;
        tracing::debug!(url = %url, status = response.status, "visited app path");
        Ok(&*self.last.insert(response))
    }

    /// Body of the last response, empty before the first visit.
    #[must_use]
    pub fn body(&self) -> &str {
        self.last.as_ref().map_or("", |response| response.body.as_str())
    }

    /// Status of the last response, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.last.as_ref().map(|response| response.status)
    }
}
