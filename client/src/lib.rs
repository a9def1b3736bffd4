pub mod backend;
pub mod config;

pub mod prelude {
    pub use super::backend::{BackendClient, Error};
    pub use super::config::{AutoIpxeForm, BackendConfig};
}
