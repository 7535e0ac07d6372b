//! Style values and the cascade.
//!
//! Everything style-related reads from declarative attributes: literal value
//! types ([`Color`], [`Length`], shorthand box values), selector matching
//! with specificity scoring, and per-node resolution with caching.

mod cache;
mod color;
mod length;
mod selector;
mod sheet;

pub use cache::{snapshot_of, StyleResolver};
pub use color::Color;
pub use length::Length;
pub use selector::{find_style, KeyboardState, MouseState, Selector, Snapshot};
pub use sheet::StyleSheet;
