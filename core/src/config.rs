//! Client options and the fixed endpoints and identifiers NowCerts expects.

pub(crate) const PROTOCOL: &str = "https";
pub(crate) const DEFAULT_HOST: &str = "api.nowcerts.com/api";
pub(crate) const DEFAULT_API_VERSION: &str = "2018-06-22";
pub(crate) const TOKEN_PATH: &str = "token";
pub(crate) const CLIENT_ID: &str = "ngAuthApp";

pub const USER_AGENT: &str = concat!("nowcerts-client/", env!("CARGO_PKG_VERSION"));

/// Key casing convention for payloads exchanged with NowCerts.
///
/// Kept for parity with the options the service documents; requests are
/// always sent in the API's native camel case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyInflection {
    #[default]
    Camel,
    Snake,
    Preserve,
}

/// Options applied to every call made by a `NowCerts` client.
///
/// `host` may carry a scheme (`http://127.0.0.1:3000/api`); without one the
/// client talks https.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowCertsOptions {
    pub host: String,
    pub key_inflection: KeyInflection,
    pub nowcerts_version: String,
}

impl Default for NowCertsOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            key_inflection: KeyInflection::default(),
            nowcerts_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl NowCertsOptions {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn key_inflection(mut self, inflection: KeyInflection) -> Self {
        self.key_inflection = inflection;
        self
    }

    pub fn nowcerts_version(mut self, version: impl Into<String>) -> Self {
        self.nowcerts_version = version.into();
        self
    }

    /// Absolute base URL: the host with a scheme and without a trailing `/`.
    pub(crate) fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("{PROTOCOL}://{host}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let options = NowCertsOptions::default();
        assert_eq!(options.base_url(), "https://api.nowcerts.com/api");
        assert_eq!(options.nowcerts_version, "2018-06-22");
        assert_eq!(options.key_inflection, KeyInflection::Camel);
    }

    #[test]
    fn host_with_scheme_is_kept() {
        let options = NowCertsOptions::default().host("http://127.0.0.1:3000/api/");
        assert_eq!(options.base_url(), "http://127.0.0.1:3000/api");
    }

    #[test]
    fn setters_override_defaults() {
        let options = NowCertsOptions::default()
            .key_inflection(KeyInflection::Snake)
            .nowcerts_version("2020-01-01");
        assert_eq!(options.key_inflection, KeyInflection::Snake);
        assert_eq!(options.nowcerts_version, "2020-01-01");
    }
}
