use std::string::FromUtf8Error;

use proto::prelude::*;
use reqwest::blocking;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use super::config::{AutoIpxeForm, BackendConfig};

/// Blocking client for the boot service.
///
/// Every call makes exactly one attempt. Whatever goes wrong on the way
/// (transport, status, empty or undecodable body) collapses into
/// [`BackendOutcome::Unavailable`]; the caller turns that into a retry
/// script instead of retrying here.
#[derive(Clone)]
pub struct BackendClient {
    config: BackendConfig,
    http: blocking::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, Error> {
        if config.base_url.cannot_be_a_base() {
            return Err(Error::BaseUrl(config.base_url.to_string()));
        }
        let http = blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }
    pub fn update_inventory(&self, update: &InventoryUpdate) -> BackendOutcome {
        match self.try_update_inventory(update) {
            Ok(status) => {
                if status == InventoryStatus::Fail {
                    log::warn!("boot service rejected inventory update for {}", update.mac);
                }
                BackendOutcome::Status(status)
            }
            Err(err) => {
                log::warn!("inventory update for {} failed: {}", update.mac, err);
                BackendOutcome::Unavailable
            }
        }
    }
    pub fn auto_ipxe(&self, mac: &str) -> BackendOutcome {
        match self.try_auto_ipxe(mac) {
            Ok(script) => BackendOutcome::Success(script),
            Err(err) => {
                log::warn!("no auto.ipxe for {}: {}", mac, err);
                BackendOutcome::Unavailable
            }
        }
    }
    fn try_update_inventory(&self, update: &InventoryUpdate) -> Result<InventoryStatus, Error> {
        let url = self.endpoint(&[self.config.inventory_endpoint.as_str()])?;
        let body = self.post(url, Some(update))?;
        let res: StatusRes = serde_json::from_slice(&body)?;
        Ok(res.into())
    }
    fn try_auto_ipxe(&self, mac: &str) -> Result<String, Error> {
        let body = match self.config.auto_ipxe {
            AutoIpxeForm::Flat => {
                let url = self.endpoint(&[AUTO_IPXE])?;
                self.post(url, Some(&AutoIpxeReq { mac }))?
            }
            AutoIpxeForm::PerMac => {
                let url = self.endpoint(&[mac, AUTO_IPXE])?;
                self.post(url, None::<&()>)?
            }
        };
        Ok(String::from_utf8(body)?)
    }
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::BaseUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
    fn post<T>(&self, url: Url, body: Option<&T>) -> Result<Vec<u8>, Error>
    where
        T: Serialize + ?Sized,
    {
        log::debug!("POST {}", url);
        let request = match body {
            Some(body) => self.http.post(url).json(body),
            None => self.http.post(url).header(CONTENT_TYPE, "application/json"),
        };
        let res = request.send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = res.bytes()?;
        if body.is_empty() {
            return Err(Error::EmptyBody);
        }
        Ok(body.to_vec())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("boot service answered {0}")]
    Status(StatusCode),
    #[error("boot service sent an empty body")]
    EmptyBody,
    #[error("malformed json from boot service: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("script is not utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("{0} cannot be used as a base url")]
    BaseUrl(String),
}
