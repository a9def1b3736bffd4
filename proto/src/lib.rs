pub mod common;
pub mod constant;
pub mod wire;

pub mod prelude {
    pub use super::common::*;
    pub use super::constant::*;
    pub use super::wire::*;
}
