use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_std::task;
use async_trait::async_trait;
use client::prelude::BackendClient;
use proto::prelude::*;

use super::script::{self, Script, ScriptPolicy};
use super::validate::{self, ValidationError};

/// The boot service as seen by a stage.
///
/// Implementations never fail: anything that goes wrong is reported as
/// [`BackendOutcome::Unavailable`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn update_inventory(&self, update: InventoryUpdate) -> BackendOutcome;
    async fn auto_ipxe(&self, mac: String) -> BackendOutcome;
}

#[async_trait]
impl Backend for BackendClient {
    async fn update_inventory(&self, update: InventoryUpdate) -> BackendOutcome {
        let client = self.clone();
        offload(move || client.update_inventory(&update)).await
    }
    async fn auto_ipxe(&self, mac: String) -> BackendOutcome {
        let client = self.clone();
        offload(move || client.auto_ipxe(&mac)).await
    }
}

// The blocking call runs on async-std's blocking pool; a panic in there
// must still end up as a retry script.
async fn offload<F>(call: F) -> BackendOutcome
where
    F: FnOnce() -> BackendOutcome + Send + 'static,
{
    task::spawn_blocking(move || {
        panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
            log::error!("backend call panicked, answering with a retry");
            BackendOutcome::Unavailable
        })
    })
    .await
}

/// Drives one transition of the boot workflow per request.
///
/// Nothing is remembered between calls; the script handed back carries
/// everything the next request needs.
pub struct StageController {
    backend: Arc<dyn Backend>,
    policy: ScriptPolicy,
}

impl StageController {
    pub fn new(backend: Arc<dyn Backend>, policy: ScriptPolicy) -> Self {
        Self { backend, policy }
    }
    pub async fn discover(&self, params: &BootParams) -> Script {
        let request = match self.admit(Stage::Discover, params) {
            Ok(request) => request,
            Err(err) => return script::error(&err),
        };
        let outcome = self.inventory(&request).await;
        if outcome.is_pass() {
            log::info!("inventory updated for {}", request.mac);
        }
        script::render(&request, &outcome, self.policy)
    }
    pub async fn chain(&self, params: &BootParams) -> Script {
        let request = match self.admit(Stage::Chain, params) {
            Ok(request) => request,
            Err(err) => return script::error(&err),
        };
        let outcome = self.backend.auto_ipxe(request.mac.clone()).await;
        match outcome {
            BackendOutcome::Success(_) => log::info!("handing auto.ipxe to {}", request.mac),
            _ => log::info!("no workflow for {} yet, client will retry", request.mac),
        }
        script::render(&request, &outcome, self.policy)
    }
    /// Write never renders a script; the caller only learns whether the
    /// inventory took the update.
    pub async fn write(&self, params: &BootParams) -> WriteSignal {
        let request = match self.admit(Stage::Write, params) {
            Ok(request) => request,
            Err(_) => return WriteSignal::Failed,
        };
        if self.inventory(&request).await.is_pass() {
            log::info!("write confirmed for {}", request.mac);
            WriteSignal::Written
        } else {
            WriteSignal::Failed
        }
    }
    fn admit(&self, stage: Stage, params: &BootParams) -> Result<BootRequest, ValidationError> {
        validate::validate(stage, params).map_err(|err| {
            log::warn!("rejected {} request: {}", stage, err);
            err
        })
    }
    async fn inventory(&self, request: &BootRequest) -> BackendOutcome {
        match InventoryUpdate::from_request(request) {
            Some(update) => self.backend.update_inventory(update).await,
            None => BackendOutcome::Unavailable,
        }
    }
}
