//! The declarative tree: shared-arena nodes, typed attribute values, and
//! synchronous mutation observers.

mod node;
mod store;
mod value;

pub use node::{Node, TreeEvent};
pub use store::{NodeId, Subscription};
pub use value::{Combine, FromValue, IntoValue, Value};
