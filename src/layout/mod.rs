//! Box geometry and taffy conversion.

mod box_model;
pub mod resolve;

pub use box_model::{BoxEvent, BoxModel, CallbackLockGuard};
