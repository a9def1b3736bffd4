use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use client::prelude::{AutoIpxeForm, BackendConfig};
use url::Url;

use super::script::ScriptPolicy;

pub const BOOTS_SERVICE_URL: &str = "BOOTS_SERVICE_URL";
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const BACKEND_TIMEOUT_SECS: &str = "BACKEND_TIMEOUT_SECS";
pub const INVENTORY_ENDPOINT: &str = "INVENTORY_ENDPOINT";
pub const AUTO_IPXE_FORM: &str = "AUTO_IPXE_FORM";
pub const SCRIPT_POLICY: &str = "SCRIPT_POLICY";

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub backend: BackendConfig,
    pub policy: ScriptPolicy,
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());

        let base = get(BOOTS_SERVICE_URL).ok_or(Error::Missing(BOOTS_SERVICE_URL))?;
        let mut backend = BackendConfig::new(service_url(&base)?);

        if let Some(secs) = get(BACKEND_TIMEOUT_SECS) {
            let secs = match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(Error::invalid(BACKEND_TIMEOUT_SECS, &secs)),
            };
            backend = backend.with_timeout(Duration::from_secs(secs));
        }
        if let Some(endpoint) = get(INVENTORY_ENDPOINT) {
            backend = backend.with_inventory_endpoint(endpoint.trim().trim_matches('/'));
        }
        if let Some(form) = get(AUTO_IPXE_FORM) {
            let form: AutoIpxeForm = form
                .parse()
                .map_err(|_| Error::invalid(AUTO_IPXE_FORM, &form))?;
            backend = backend.with_auto_ipxe(form);
        }

        let policy = match get(SCRIPT_POLICY) {
            Some(policy) => policy
                .parse()
                .map_err(|_| Error::invalid(SCRIPT_POLICY, &policy))?,
            None => ScriptPolicy::default(),
        };

        let listen = get(LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN.to_owned());
        let listen = listen
            .trim()
            .parse()
            .map_err(|_| Error::invalid(LISTEN_ADDR, &listen))?;

        Ok(Config {
            listen,
            backend,
            policy,
        })
    }
}

// The boot service has historically been configured as bare `host:port`.
fn service_url(raw: &str) -> Result<Url, Error> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{}", raw)
    };
    match Url::parse(&candidate) {
        Ok(url) if url.has_host() => Ok(url),
        _ => Err(Error::invalid(BOOTS_SERVICE_URL, raw)),
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Error {
    fn invalid(key: &'static str, value: &str) -> Self {
        Error::Invalid {
            key,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[(BOOTS_SERVICE_URL, "boots:7080")]).unwrap();
        assert_eq!(config.backend.base_url.as_str(), "http://boots:7080/");
        assert_eq!(config.backend.timeout, Duration::from_secs(1800));
        assert_eq!(config.backend.inventory_endpoint, "UpdateEN");
        assert_eq!(config.backend.auto_ipxe, AutoIpxeForm::Flat);
        assert_eq!(config.policy, ScriptPolicy::Verbatim);
        assert_eq!(config.listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            (BOOTS_SERVICE_URL, "https://boots.internal/api"),
            (LISTEN_ADDR, "127.0.0.1:9000"),
            (BACKEND_TIMEOUT_SECS, "60"),
            (INVENTORY_ENDPOINT, "/updateEN"),
            (AUTO_IPXE_FORM, "per-mac"),
            (SCRIPT_POLICY, "strip-control"),
        ])
        .unwrap();
        assert_eq!(config.backend.base_url.as_str(), "https://boots.internal/api");
        assert_eq!(config.backend.timeout, Duration::from_secs(60));
        assert_eq!(config.backend.inventory_endpoint, "updateEN");
        assert_eq!(config.backend.auto_ipxe, AutoIpxeForm::PerMac);
        assert_eq!(config.policy, ScriptPolicy::StripControl);
        assert_eq!(config.listen.port(), 9000);
    }

    #[test]
    fn missing_backend() {
        assert_eq!(load(&[]).unwrap_err(), Error::Missing(BOOTS_SERVICE_URL));
        assert_eq!(
            load(&[(BOOTS_SERVICE_URL, "  ")]).unwrap_err(),
            Error::Missing(BOOTS_SERVICE_URL)
        );
    }

    #[test]
    fn invalid_values() {
        let err = load(&[(BOOTS_SERVICE_URL, "boots"), (BACKEND_TIMEOUT_SECS, "soon")]).unwrap_err();
        assert!(matches!(err, Error::Invalid { key: BACKEND_TIMEOUT_SECS, .. }));

        let err = load(&[(BOOTS_SERVICE_URL, "boots"), (BACKEND_TIMEOUT_SECS, "0")]).unwrap_err();
        assert_eq!(
            err,
            Error::Invalid {
                key: BACKEND_TIMEOUT_SECS,
                value: "0".to_owned()
            }
        );

        let err = load(&[(BOOTS_SERVICE_URL, "boots"), (LISTEN_ADDR, "everywhere")]).unwrap_err();
        assert!(matches!(err, Error::Invalid { key: LISTEN_ADDR, .. }));

        let err = load(&[(BOOTS_SERVICE_URL, "http://")]).unwrap_err();
        assert!(matches!(err, Error::Invalid { key: BOOTS_SERVICE_URL, .. }));
    }
}
