use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("page location has no host")]
    MissingHost,
    #[error("socket path must start with '/': {0:?}")]
    RelativePath(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Ws,
    Wss,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
        }
    }
}

/// How the socket scheme is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemePolicy {
    /// `wss` when the page itself was served over `https:`, `ws` otherwise.
    #[default]
    MatchPage,
    /// Always `ws`, whatever the page transport.
    Insecure,
}

impl SchemePolicy {
    /// `page_protocol` is `window.location.protocol`, e.g. `"https:"`.
    pub fn scheme_for(self, page_protocol: &str) -> Scheme {
        match self {
            SchemePolicy::Insecure => Scheme::Ws,
            SchemePolicy::MatchPage => {
                if page_protocol.trim_end_matches(':').eq_ignore_ascii_case("https") {
                    Scheme::Wss
                } else {
                    Scheme::Ws
                }
            }
        }
    }
}

/// A resolved WebSocket URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    path: String,
}

impl Endpoint {
    pub fn new(scheme: Scheme, host: &str, path: &str) -> Result<Self, EndpointError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(EndpointError::MissingHost);
        }
        if !path.starts_with('/') {
            return Err(EndpointError::RelativePath(path.to_string()));
        }
        Ok(Self {
            scheme,
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    /// Build the endpoint from the page's own location.
    pub fn from_page(
        policy: SchemePolicy,
        page_protocol: &str,
        host: &str,
        path: &str,
    ) -> Result<Self, EndpointError> {
        Self::new(policy.scheme_for(page_protocol), host, path)
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme.as_str(), self.host, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_page_uses_ws() {
        let ep = Endpoint::from_page(SchemePolicy::MatchPage, "http:", "example.test", "/ws/").unwrap();
        assert_eq!(ep.url(), "ws://example.test/ws/");
    }

    #[test]
    fn https_page_upgrades_to_wss() {
        let ep = Endpoint::from_page(SchemePolicy::MatchPage, "https:", "example.test:8443", "/ws/").unwrap();
        assert_eq!(ep.url(), "wss://example.test:8443/ws/");
    }

    #[test]
    fn insecure_policy_keeps_ws() {
        let ep = Endpoint::from_page(SchemePolicy::Insecure, "https:", "example.test", "/ws/").unwrap();
        assert_eq!(ep.scheme(), Scheme::Ws);
        assert_eq!(ep.url(), "ws://example.test/ws/");
    }

    #[test]
    fn file_pages_fall_back_to_ws() {
        assert_eq!(SchemePolicy::MatchPage.scheme_for("file:"), Scheme::Ws);
        assert_eq!(SchemePolicy::MatchPage.scheme_for("HTTPS:"), Scheme::Wss);
    }

    #[test]
    fn rejects_missing_host_and_relative_path() {
        assert_eq!(
            Endpoint::new(Scheme::Ws, "  ", "/ws/"),
            Err(EndpointError::MissingHost)
        );
        assert_eq!(
            Endpoint::new(Scheme::Ws, "example.test", "ws/"),
            Err(EndpointError::RelativePath("ws/".into()))
        );
    }
}
