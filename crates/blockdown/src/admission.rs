//! Image admission.
//!
//! Every image URL passes two gates before it may become an image block:
//! a synchronous syntactic check (absolute `http`/`https`, no local or
//! embedded path) and an asynchronous liveness probe. Rejection is silent:
//! callers simply leave the image out.

use std::future::Future;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// Prefixes of local or embedded paths that are never fetched
pub const DENIED_PREFIXES: &[&str] = &["C:", "D:", "file:", "embedded:"];

/// Absolute http(s) URL with a non-empty host
static ABSOLUTE_HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+(?:[/?#]\S*)?$").unwrap());

/// Error returned by a liveness probe
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("probe task was cancelled")]
    Cancelled,

    #[error("no tokio runtime available for the request")]
    NoRuntime,
}

/// Why an image was left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not an absolute http or https URL
    Scheme,
    /// Starts with a denied local/embedded prefix
    LocalPath,
    /// Probe answered with an error status
    Status(u16),
    /// Probe failed (network error, timeout)
    Unreachable(String),
}

/// Outcome of the admission gates for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Liveness check for an image URL.
///
/// Returns the HTTP status the URL answered with. Implementations own their
/// timeout and must not retry.
pub trait Probe: Send + Sync {
    fn probe(&self, url: &str) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

/// Syntactic gate, no network involved
pub fn check_url(url: &str) -> Result<(), Rejection> {
    let lower = url.to_ascii_lowercase();
    if DENIED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(&prefix.to_ascii_lowercase()))
    {
        return Err(Rejection::LocalPath);
    }

    if !ABSOLUTE_HTTP_URL.is_match(url) {
        return Err(Rejection::Scheme);
    }

    Ok(())
}

/// Run both gates for one URL
pub async fn admit<P: Probe>(probe: &P, url: &str) -> Admission {
    if let Err(rejection) = check_url(url) {
        return rejected(url, rejection);
    }

    match probe.probe(url).await {
        Ok(status) if status < 400 => {
            trace!(url, status, "image admitted");
            Admission::Admitted
        }
        Ok(status) => rejected(url, Rejection::Status(status)),
        Err(e) => rejected(url, Rejection::Unreachable(e.to_string())),
    }
}

fn rejected(url: &str, reason: Rejection) -> Admission {
    debug!(url, ?reason, "image rejected");
    Admission::Rejected(reason)
}

/// Configuration for [`HttpProbe`]
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Deadline for the whole request, including redirects
    pub timeout: Duration,

    /// Redirects to follow before giving up
    pub max_redirects: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_redirects: 10,
        }
    }
}

/// Probe that issues a `HEAD` request.
///
/// The blocking request runs on tokio's blocking pool. Awaited outside a
/// tokio runtime it fails with [`ProbeError::NoRuntime`], so the image is
/// rejected instead of the conversion panicking.
#[derive(Clone)]
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    /// Create a probe with the default configuration
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .max_redirects(config.max_redirects)
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for HttpProbe {
    fn probe(&self, url: &str) -> impl Future<Output = Result<u16, ProbeError>> + Send {
        let agent = self.agent.clone();
        let url = url.to_string();

        async move {
            let handle =
                tokio::runtime::Handle::try_current().map_err(|_| ProbeError::NoRuntime)?;
            let response = handle
                .spawn_blocking(move || agent.head(&url).call())
                .await
                .map_err(|_| ProbeError::Cancelled)?;

            match response {
                Ok(response) => Ok(response.status().as_u16()),
                Err(ureq::Error::StatusCode(code)) => Ok(code),
                Err(e) => Err(ProbeError::Transport(e.to_string())),
            }
        }
    }
}
