//! Runtime settings of the local stub, read from `SITE_STUB_*` environment
//! variables with development defaults.

use std::env;

use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct StubConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file. `:memory:` keeps everything in RAM.
    pub db_path: String,
    pub admin_user: String,
    pub admin_password: String,
    /// Code a registering member must present to get the admin role.
    pub admin_code: String,
    pub open_browser: bool,
    /// Base of the durable image URLs written on publish.
    pub public_url: String,
    /// Makes every publish fail, to exercise the saved-but-not-published path.
    pub fail_publish: bool,
}

impl Default for StubConfig {
    fn default() -> Self {
        StubConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: "site-stub.sqlite".to_string(),
            admin_user: "admin".to_string(),
            admin_password: "admin".to_string(),
            admin_code: "letmein".to_string(),
            open_browser: true,
            public_url: "http://127.0.0.1:8080".to_string(),
            fail_publish: false,
        }
    }
}

impl StubConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, so tests do not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = StubConfig::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("SITE_STUB_HOST").unwrap_or(defaults.host);
        let port = match var("SITE_STUB_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid SITE_STUB_PORT={raw}");
                defaults.port
            }),
            None => defaults.port,
        };
        let public_url = var("SITE_STUB_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        StubConfig {
            db_path: var("SITE_STUB_DB").unwrap_or(defaults.db_path),
            admin_user: var("SITE_STUB_ADMIN_USER").unwrap_or(defaults.admin_user),
            admin_password: var("SITE_STUB_ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            admin_code: var("SITE_STUB_ADMIN_CODE").unwrap_or(defaults.admin_code),
            open_browser: var("SITE_STUB_OPEN_BROWSER").map_or(defaults.open_browser, |v| flag(&v)),
            fail_publish: var("SITE_STUB_FAIL_PUBLISH").is_some_and(|v| flag(&v)),
            host,
            port,
            public_url,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_vars(vars: &[(&str, &str)]) -> StubConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        StubConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(with_vars(&[]), StubConfig::default());
    }

    #[test]
    fn public_url_follows_host_and_port() {
        let config = with_vars(&[("SITE_STUB_HOST", "0.0.0.0"), ("SITE_STUB_PORT", "9000")]);
        assert_eq!(config.public_url, "http://0.0.0.0:9000");

        let config = with_vars(&[("SITE_STUB_PUBLIC_URL", "https://cdn.example.com/")]);
        assert_eq!(config.public_url, "https://cdn.example.com");
    }

    #[test]
    fn flags_and_bad_ports() {
        let config = with_vars(&[
            ("SITE_STUB_PORT", "not-a-port"),
            ("SITE_STUB_OPEN_BROWSER", "no"),
            ("SITE_STUB_FAIL_PUBLISH", "TRUE"),
            ("SITE_STUB_DB", "  "),
        ]);
        assert_eq!(config.port, 8080);
        assert!(!config.open_browser);
        assert!(config.fail_publish);
        assert_eq!(config.db_path, "site-stub.sqlite");
    }
}
