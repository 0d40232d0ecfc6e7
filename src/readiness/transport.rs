use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("http transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }
}

/// Single synchronous HTTP GET returning only the status code.
pub trait HttpTransport {
    fn get_status(&self, url: &str) -> Result<u16, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get_status(&self, url: &str) -> Result<u16, TransportError> {
        (**self).get_status(url)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get_status(&self, url: &str) -> Result<u16, TransportError> {
        (**self).get_status(url)
    }
}

/// Blocking reqwest client with a per-request timeout.
///
/// Redirects are not followed: a 3xx answer is the status of the probe.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| TransportError::new(format!("http client build failed: {err}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get_status(&self, url: &str) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| TransportError::new(format!("GET {url} failed: {err}")))?;
        Ok(response.status().as_u16())
    }
}
