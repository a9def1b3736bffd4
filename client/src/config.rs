use std::str::FromStr;
use std::time::Duration;

use proto::prelude::{BACKEND_TIMEOUT_SECS, DEFAULT_INVENTORY_ENDPOINT};
use url::Url;

/// How the auto-boot script is requested from the boot service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoIpxeForm {
    /// `POST {base}/auto.ipxe` with `{"mac": ..}` as body
    #[default]
    Flat,
    /// `POST {base}/{mac}/auto.ipxe` without a body
    PerMac,
}

impl FromStr for AutoIpxeForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(AutoIpxeForm::Flat),
            "per-mac" | "per_mac" | "permac" => Ok(AutoIpxeForm::PerMac),
            other => Err(format!("unknown auto.ipxe form {:?}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub inventory_endpoint: String,
    pub auto_ipxe: AutoIpxeForm,
}

impl BackendConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(BACKEND_TIMEOUT_SECS),
            inventory_endpoint: DEFAULT_INVENTORY_ENDPOINT.to_owned(),
            auto_ipxe: AutoIpxeForm::default(),
        }
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_inventory_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.inventory_endpoint = endpoint.into();
        self
    }
    pub fn with_auto_ipxe(mut self, form: AutoIpxeForm) -> Self {
        self.auto_ipxe = form;
        self
    }
}
