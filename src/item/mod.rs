//! Runtime items and their decorators.
//!
//! Every declarative node the interpreter visits becomes one [`Item`]
//! wrapped in a stack of decorators, each adding one orthogonal behaviour
//! (box model ownership, flex/grid/block child constraints, widget
//! behaviour, container layout). The stack preserves a single logical
//! identity: capability queries such as [`to_type`] and [`box_model_of`]
//! walk the whole chain, so callers never care how deep a capability lives.

mod block;
mod common;
mod container;
mod flex;
mod grid;
mod item;
mod primitive;
mod widgets;

use std::any::Any;
use std::rc::Rc;

use crate::layout::BoxModel;
use crate::tree::Node;

pub use block::{BlockChild, BlockContainer};
pub use common::CommonItem;
pub use container::{Container, ContainerCore, LayoutStrategy};
pub use flex::{FlexChild, FlexContainer};
pub use grid::{GridChild, GridContainer};
pub use item::Item;
pub use primitive::{ComponentFactory, Primitive};
pub use widgets::{ButtonWidget, ImageWidget, TextWidget};

/// A shared handle to the outermost decorator of one item.
pub type ItemRef = Rc<dyn GuiItem>;

/// One link in an item's decorator chain.
///
/// Defaults delegate inward through [`GuiItem::inner`], so a decorator only
/// implements the handful of methods it actually changes. The innermost link
/// is the [`Item`] itself, reachable from any link via [`GuiItem::base`].
pub trait GuiItem: 'static {
    fn as_any(&self) -> &dyn Any;

    /// The next link inward, or `None` on the base item.
    fn inner(&self) -> Option<&dyn GuiItem>;

    /// The innermost item of this chain.
    fn base(&self) -> &Item;

    fn state(&self) -> &Node {
        self.base().state()
    }

    fn primitive(&self) -> Primitive {
        self.base().primitive()
    }

    fn children(&self) -> Vec<ItemRef> {
        self.base().children()
    }

    fn child_count(&self) -> usize {
        self.base().child_count()
    }

    fn parent(&self) -> Option<ItemRef> {
        self.base().parent()
    }

    /// Whether this item accepts children. Content leaves override this.
    fn is_container(&self) -> bool {
        self.inner().is_none_or(|inner| inner.is_container())
    }

    /// Whether this item renders intrinsic content (text, images).
    fn is_content(&self) -> bool {
        self.inner().is_some_and(|inner| inner.is_content())
    }

    fn insert_child(&self, child: ItemRef, index: usize) {
        match self.inner() {
            Some(inner) => inner.insert_child(child, index),
            None => self.base().insert_direct(child, index),
        }
    }

    fn set_children(&self, children: Vec<ItemRef>) {
        match self.inner() {
            Some(inner) => inner.set_children(children),
            None => self.base().set_children_direct(children),
        }
    }

    /// Remove the child whose declarative node is `state`, returning it.
    fn remove_child(&self, state: &Node) -> Option<ItemRef> {
        match self.inner() {
            Some(inner) => inner.remove_child(state),
            None => self.base().remove_direct(state),
        }
    }

    /// This link's box model, if it owns one.
    fn box_model(&self) -> Option<Rc<BoxModel>> {
        None
    }

    /// This link's container capability, if it lays out children.
    fn container(&self) -> Option<&dyn Container> {
        None
    }
}

/// Walk the decorator chain outermost-in looking for a concrete link type.
pub fn to_type<T: 'static>(item: &dyn GuiItem) -> Option<&T> {
    let mut current = Some(item);
    while let Some(link) = current {
        if let Some(found) = link.as_any().downcast_ref::<T>() {
            return Some(found);
        }
        current = link.inner();
    }
    None
}

/// The box model of an item, wherever in the chain it lives.
pub fn box_model_of(item: &dyn GuiItem) -> Option<Rc<BoxModel>> {
    let mut current = Some(item);
    while let Some(link) = current {
        if let Some(model) = link.box_model() {
            return Some(model);
        }
        current = link.inner();
    }
    None
}

/// The container capability of an item, wherever in the chain it lives.
pub fn container_of(item: &dyn GuiItem) -> Option<&dyn Container> {
    let mut current = Some(item);
    while let Some(link) = current {
        if let Some(container) = link.container() {
            return Some(container);
        }
        current = link.inner();
    }
    None
}
