//! # arbor-ui
//!
//! A declarative UI tree interpreter: components are nodes in a shared tree,
//! attributes drive behaviour through reactive bindings, styles cascade
//! through nested selector sheets, and layout runs through block, flexbox,
//! and grid strategies.
//!
//! ## Core Systems
//!
//! - **[`tree`]** — Slotmap-backed node arena with typed attribute values
//!   and synchronous mutation observers
//! - **[`binding`]** — [`Property`](binding::Property): typed, observable
//!   views over single attributes, with inheritance and accumulation
//! - **[`style`]** — Style values ([`Length`](style::Length),
//!   [`Color`](style::Color)), selector matching, and cached per-node
//!   resolution
//! - **[`layout`]** — The box model and taffy-facing value resolution
//! - **[`item`]** — Runtime items as decorator chains: box model ownership,
//!   per-strategy child constraints, widget behaviour, container layout
//! - **[`markup`]** — Textual markup front-end producing declarative trees
//! - **[`interpreter`]** — Materializes a tree into decorated items and
//!   keeps it live under later mutation
//! - **[`geometry`]** — Point, Size, Rect, Edges primitives

// Foundation
pub mod geometry;
pub mod tree;

// Attributes and styling
pub mod binding;
pub mod style;

// Layout
pub mod layout;

// Items and interpretation
pub mod error;
pub mod interpreter;
pub mod item;
pub mod markup;

pub use binding::Property;
pub use error::Error;
pub use interpreter::Interpreter;
pub use item::{box_model_of, container_of, to_type, GuiItem, Item, ItemRef};
pub use tree::{Node, Value};
