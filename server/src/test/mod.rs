// dummy boot service
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use proto::prelude::*;

use crate::stage::Backend;

pub fn params() -> BootParams {
    let _ = env_logger::builder().is_test(true).try_init();
    BootParams {
        mac: Some("52:54:00:12:34:56".to_owned()),
        uuid: Some("8c4a1c22-0f5e-4c32-9f43-5a3d1c0b9e11".to_owned()),
        serial_id: Some("SN-0042".to_owned()),
        en_ip: Some("10.20.0.15".to_owned()),
        boot_url: Some("http://10.20.0.1:8080".to_owned()),
    }
}

/// Answers every call the same way and counts them.
#[derive(Default)]
pub struct MockBackend {
    status: Option<InventoryStatus>,
    script: Option<String>,
    calls: AtomicUsize,
    updates: Mutex<Vec<InventoryUpdate>>,
}

impl MockBackend {
    pub fn passing() -> Self {
        Self {
            status: Some(InventoryStatus::Pass),
            ..Default::default()
        }
    }
    pub fn failing() -> Self {
        Self {
            status: Some(InventoryStatus::Fail),
            ..Default::default()
        }
    }
    pub fn unavailable() -> Self {
        Default::default()
    }
    pub fn scripted(script: &str) -> Self {
        Self {
            script: Some(script.to_owned()),
            ..Default::default()
        }
    }
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
    pub fn last_update(&self) -> Option<InventoryUpdate> {
        self.updates.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn update_inventory(&self, update: InventoryUpdate) -> BackendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update);
        match self.status {
            Some(status) => BackendOutcome::Status(status),
            None => BackendOutcome::Unavailable,
        }
    }
    async fn auto_ipxe(&self, _mac: String) -> BackendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Some(script) => BackendOutcome::Success(script.clone()),
            None => BackendOutcome::Unavailable,
        }
    }
}
