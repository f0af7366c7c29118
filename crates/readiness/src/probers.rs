//! Readiness probe implementations.

use crate::address::resolve_address;
use crate::error::ProbeError;
use crate::types::{HttpGetSpec, TcpSocketSpec};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// A way of checking readiness against one kind of probe specification.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Specification this prober understands
    type Spec: Send + Sync;

    /// Perform a single check.
    ///
    /// `Ok(false)` means the target answered but is not ready yet. Any error
    /// means the check could not be carried out.
    async fn check_probe(&self, spec: Option<&Self::Spec>) -> Result<bool, ProbeError>;

    /// Get the name of this prober
    fn name(&self) -> &str;
}

/// A check bound to its concrete target.
///
/// The polling loop only sees this trait, so the probe kind is chosen once
/// when the check is bound.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    /// Perform a single check against the bound target
    async fn check(&self) -> Result<bool, ProbeError>;
}

/// A prober paired with the specification it checks.
pub struct BoundProbe<P: Prober> {
    prober: P,
    spec: P::Spec,
}

impl<P: Prober> BoundProbe<P> {
    pub fn new(prober: P, spec: P::Spec) -> Self {
        Self { prober, spec }
    }
}

#[async_trait]
impl<P: Prober> ReadinessCheck for BoundProbe<P> {
    async fn check(&self) -> Result<bool, ProbeError> {
        self.prober.check_probe(Some(&self.spec)).await
    }
}

/// HTTP GET prober
///
/// Only a `200 OK` answer counts as ready. Connections are not pooled, each
/// check opens and releases its own.
#[derive(Debug, Clone)]
pub struct HttpGetProber {
    client: reqwest::Client,
}

impl HttpGetProber {
    /// Create a new HTTP GET prober
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create a prober around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn probe_url(spec: &HttpGetSpec, address: &str) -> Result<Url, ProbeError> {
        let scheme = match spec.scheme.to_ascii_lowercase().as_str() {
            "" | "http" => "http",
            _ => return Err(ProbeError::UnsupportedScheme(spec.scheme.clone())),
        };

        let path = if spec.path.starts_with('/') {
            spec.path.clone()
        } else {
            format!("/{}", spec.path)
        };

        Url::parse(&format!("{}://{}{}", scheme, address, path)).map_err(|e| {
            ProbeError::Resolution {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl Prober for HttpGetProber {
    type Spec = HttpGetSpec;

    async fn check_probe(&self, spec: Option<&HttpGetSpec>) -> Result<bool, ProbeError> {
        let spec = spec.ok_or(ProbeError::InvalidSpec)?;

        let address = resolve_address(&spec.host, &spec.port)?;
        let url = Self::probe_url(spec, &address)?;
        info!(url = %url, "checking probe url");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "HTTP probe failed");
                return Err(ProbeError::transport(address, &e));
            }
        };

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "HTTP probe answered");
        Ok(status == StatusCode::OK)
    }

    fn name(&self) -> &str {
        "http_get"
    }
}

/// TCP connect prober
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpSocketProber;

impl TcpSocketProber {
    /// Create a new TCP connect prober
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpSocketProber {
    type Spec = TcpSocketSpec;

    async fn check_probe(&self, spec: Option<&TcpSocketSpec>) -> Result<bool, ProbeError> {
        let spec = spec.ok_or(ProbeError::InvalidSpec)?;

        let address = resolve_address(&spec.host, &spec.port)?;

        match TcpStream::connect(address.as_str()).await {
            Ok(stream) => {
                drop(stream);
                debug!(address = %address, "TCP probe connected");
                Ok(true)
            }
            Err(e) => {
                warn!(address = %address, error = %e, "TCP probe failed");
                Err(ProbeError::transport(address, &e))
            }
        }
    }

    fn name(&self) -> &str {
        "tcp_socket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PortSpec;

    fn http_spec(scheme: &str, path: &str) -> HttpGetSpec {
        HttpGetSpec {
            host: "127.0.0.1".into(),
            port: PortSpec::numeric(8080),
            path: path.into(),
            scheme: scheme.into(),
        }
    }

    #[test]
    fn test_probe_url() {
        let url = HttpGetProber::probe_url(&http_spec("http", "/health"), "127.0.0.1:8080").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/health");

        let url = HttpGetProber::probe_url(&http_spec("", "ready"), "127.0.0.1:8080").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/ready");

        let url = HttpGetProber::probe_url(&http_spec("HTTP", ""), "127.0.0.1:8080").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_probe_url_rejects_other_schemes() {
        let err = HttpGetProber::probe_url(&http_spec("https", "/"), "127.0.0.1:8080").unwrap_err();
        assert_eq!(err, ProbeError::UnsupportedScheme("https".into()));
    }

    #[test]
    fn test_probe_url_with_unparseable_port() {
        let err = HttpGetProber::probe_url(&http_spec("http", "/"), "app.local:http").unwrap_err();
        assert!(matches!(err, ProbeError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_nil_specs() {
        let http = HttpGetProber::new().unwrap();
        assert_eq!(http.check_probe(None).await, Err(ProbeError::InvalidSpec));

        let tcp = TcpSocketProber::new();
        assert_eq!(tcp.check_probe(None).await, Err(ProbeError::InvalidSpec));
    }

    #[tokio::test]
    async fn test_bound_probe_checks_its_spec() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let bound = BoundProbe::new(
            TcpSocketProber::new(),
            TcpSocketSpec {
                host: "127.0.0.1".into(),
                port: PortSpec::numeric(i32::from(port)),
            },
        );
        assert_eq!(bound.check().await, Ok(true));
    }

    #[test]
    fn test_prober_names() {
        assert_eq!(HttpGetProber::new().unwrap().name(), "http_get");
        assert_eq!(TcpSocketProber::new().name(), "tcp_socket");
    }
}
