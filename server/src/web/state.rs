use std::sync::Arc;

use super::super::stage::StageController;

#[derive(Clone)]
pub struct AppState {
    pub stage: Arc<StageController>,
}

impl AppState {
    pub fn new(stage: StageController) -> AppState {
        AppState {
            stage: Arc::new(stage),
        }
    }
}
