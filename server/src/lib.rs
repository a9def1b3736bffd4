#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod script;
pub mod stage;
pub mod validate;
pub mod web;
#[cfg(test)]
mod test;

use std::io;
use std::sync::Arc;

use client::prelude::BackendClient;

pub mod prelude {
    pub use super::config::Config;
    pub use super::script::{Script, ScriptKind, ScriptPolicy};
    pub use super::stage::{Backend, StageController};
    pub use super::web::prelude::*;
    pub use super::Error;
}

/// Serves the stage endpoints until the listener fails.
pub async fn serve(config: config::Config) -> Result<(), Error> {
    let backend = BackendClient::new(config.backend.clone())?;
    log::info!(
        "boot service at {}, inventory via /{}, {:?} auto.ipxe, timeout {:?}",
        config.backend.base_url,
        config.backend.inventory_endpoint,
        config.backend.auto_ipxe,
        config.backend.timeout
    );

    let stage = stage::StageController::new(Arc::new(backend), config.policy);
    let app = web::app(web::state::AppState::new(stage));

    log::info!("listening on http://{}", config.listen);
    app.listen(config.listen).await?;
    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] config::Error),
    #[error("backend client: {0}")]
    Backend(#[from] client::prelude::Error),
    #[error("server failure: {0}")]
    IoError(#[from] io::Error),
}
