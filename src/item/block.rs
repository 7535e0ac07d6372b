//! Block layout: children positioned by explicit coordinates.
//!
//! A block container does not distribute space. Each child sits at its `x`/`y`
//! (or `centre-x`/`centre-y`) coordinates, resolved against the parent's
//! content bounds and rounded to whole pixels, and takes whatever size its own
//! box model resolved. Edge and centre coordinates on the same axis are
//! mutually exclusive: writing one removes the other.

use std::any::Any;
use std::rc::Rc;

use crate::binding::Property;
use crate::geometry::{Edges, Point, Rect, Size};
use crate::item::{
    box_model_of, Container, ContainerCore, GuiItem, Item, ItemRef,
};
use crate::layout::BoxEvent;
use crate::style::Length;
use crate::tree::Node;

/// The parent's content bounds, derived from its resolved attributes. Empty
/// for a detached node.
fn parent_content_bounds(state: &Node) -> Rect {
    let Some(parent) = state.parent() else {
        return Rect::EMPTY;
    };
    let border: Edges = parent.attribute_as("border-width").unwrap_or_default();
    let padding: Edges = parent.attribute_as("padding").unwrap_or_default();
    Rect::new(
        0.0,
        0.0,
        parent.attribute_as("component-width").unwrap_or(0.0),
        parent.attribute_as("component-height").unwrap_or(0.0),
    )
    .shrink(border + padding)
}

/// A child's top-left corner: per-axis coordinates resolved against the
/// parent content bounds, rounded individually, then offset by the content
/// origin. A centre coordinate wins over an edge coordinate on its axis.
fn block_position(state: &Node, content: &Rect, size: Size) -> Point {
    let x = match state.attribute_as::<Length>("centre-x") {
        Some(centre) => (centre.to_pixels(content.width) - size.width / 2.0).round(),
        None => state
            .attribute_as::<Length>("x")
            .unwrap_or_default()
            .to_pixels(content.width)
            .round(),
    };
    let y = match state.attribute_as::<Length>("centre-y") {
        Some(centre) => (centre.to_pixels(content.height) - size.height / 2.0).round(),
        None => state
            .attribute_as::<Length>("y")
            .unwrap_or_default()
            .to_pixels(content.height)
            .round(),
    };
    Point::new(content.x + x, content.y + y)
}

/// A child's size: declared lengths resolve against the parent content
/// bounds, auto falls back to the box model's resolved size. Whole pixels.
fn block_size(state: &Node, content: &Rect) -> Size {
    let resolved = |key: &str, dimension: f32, fallback: &str| {
        match state.attribute_as::<Length>(key) {
            Some(length) if !length.is_auto() => length.to_pixels(dimension),
            _ => state.attribute_as(fallback).unwrap_or(0.0_f32),
        }
        .round()
    };
    Size::new(
        resolved("width", content.width, "component-width"),
        resolved("height", content.height, "component-height"),
    )
}

/// The per-child half of block layout.
pub struct BlockChild {
    inner: ItemRef,
    _x: Property<Length>,
    _y: Property<Length>,
    _centre_x: Property<Length>,
    _centre_y: Property<Length>,
}

impl BlockChild {
    pub fn new(inner: ItemRef) -> Rc<BlockChild> {
        let state = inner.state().clone();

        // Weak: the handlers live in the store's listener list, which must
        // not own the item.
        let reposition = {
            let item = Rc::downgrade(&inner);
            move || {
                let Some(item) = item.upgrade() else {
                    return;
                };
                let state = item.state();
                let content = parent_content_bounds(state);
                let position = block_position(state, &content, block_size(state, &content));
                item.primitive().set_position(position);
            }
        };

        // Writing an edge coordinate removes the centre coordinate on the
        // same axis, and vice versa. The handlers only clear when their own
        // key is present, so the removal they trigger does not clear back.
        let coordinate_change = |own: &'static str, opposite: &'static str| {
            let state = state.clone();
            let reposition = reposition.clone();
            move || {
                if state.has_attribute(own) {
                    state.remove_attribute(opposite);
                }
                reposition();
            }
        };

        let x = Property::new(&state, "x");
        let y = Property::new(&state, "y");
        let centre_x = Property::new(&state, "centre-x");
        let centre_y = Property::new(&state, "centre-y");

        x.on_change(coordinate_change("x", "centre-x"));
        y.on_change(coordinate_change("y", "centre-y"));
        centre_x.on_change(coordinate_change("centre-x", "x"));
        centre_y.on_change(coordinate_change("centre-y", "y"));

        reposition();

        Rc::new(BlockChild {
            inner,
            _x: x,
            _y: y,
            _centre_x: centre_x,
            _centre_y: centre_y,
        })
    }
}

impl GuiItem for BlockChild {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        Some(self.inner.as_ref())
    }

    fn base(&self) -> &Item {
        self.inner.base()
    }
}

/// The container half of block layout.
pub struct BlockContainer {
    inner: ItemRef,
    core: ContainerCore,
}

impl BlockContainer {
    pub fn new(inner: ItemRef) -> Rc<BlockContainer> {
        let state = inner.state().clone();
        let core = ContainerCore::new(&state);
        let container = Rc::new(BlockContainer { inner, core });

        if let Some(model) = box_model_of(container.as_ref()) {
            let weak = Rc::downgrade(&container);
            model.add_listener(move |event| {
                let Some(container) = weak.upgrade() else {
                    return;
                };
                match event {
                    BoxEvent::Changed => container.lay_out_children(),
                    BoxEvent::Invalidated => container.handle_box_invalidated(),
                }
            });
        }

        container
    }
}

impl GuiItem for BlockContainer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        Some(self.inner.as_ref())
    }

    fn base(&self) -> &Item {
        self.inner.base()
    }

    fn container(&self) -> Option<&dyn Container> {
        Some(self)
    }

    fn insert_child(&self, child: ItemRef, index: usize) {
        self.insert_child_with_layout(child, index);
    }

    fn set_children(&self, children: Vec<ItemRef>) {
        self.set_children_with_layout(children);
    }
}

impl Container for BlockContainer {
    fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn as_item(&self) -> &dyn GuiItem {
        self
    }

    /// Explicit coordinates imply no intrinsic size.
    fn calculate_ideal_size(&self, _constraints: Size) -> Size {
        Size::ZERO
    }

    fn perform_layout(&self) {
        let Some(model) = box_model_of(self.as_item()) else {
            return;
        };
        let content = model.content_bounds();
        for child in self.as_item().children() {
            let state = child.state();
            let size = block_size(state, &content);
            let position = block_position(state, &content, size);
            child
                .primitive()
                .set_bounds(Rect::new(position.x, position.y, size.width, size.height));
        }
    }
}
