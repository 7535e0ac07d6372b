//! The box model derived from a node's declarative attributes.
//!
//! Every geometric fact lives in the tree: declared sizes (`width`,
//! `height`), resolved component sizes (`component-width`,
//! `component-height`), the box edges (`margin`, `border-width`, `padding`),
//! and the validity flag (`box-model-valid`). The `BoxModel` is a derived
//! view over those attributes plus the change-propagation choreography:
//!
//! - a declared-size write recomputes the component size and, when it
//!   changed, invalidates the parent's box model;
//! - a write to any other box attribute marks this box changed and
//!   invalidates the parent;
//! - flipping `box-model-valid` to `false` fires the invalidation listeners,
//!   which is how containers learn they must lay out again.
//!
//! `box-model-callback-lock` suppresses all of the above while a layout pass
//! writes geometry back into the tree.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::{Edges, Rect, Size};
use crate::style::Length;
use crate::tree::{Node, Subscription, TreeEvent};

/// What a box-model listener is being told.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxEvent {
    /// Some box attribute changed.
    Changed,
    /// The box was explicitly invalidated and needs a fresh layout.
    Invalidated,
}

type Listener = Rc<dyn Fn(BoxEvent)>;

/// Derived box geometry for one node.
pub struct BoxModel {
    state: Node,
    listeners: RefCell<Vec<Listener>>,
    _subscription: Subscription,
}

impl BoxModel {
    pub fn new(state: Node) -> Rc<Self> {
        if !state.has_attribute("width") {
            state.set_attribute("width", "auto");
        }
        if !state.has_attribute("height") {
            state.set_attribute("height", "auto");
        }
        if !state.has_attribute("box-model-valid") {
            state.set_attribute("box-model-valid", true);
        }

        let model = Rc::new_cyclic(|weak: &Weak<BoxModel>| {
            let weak = weak.clone();
            let observed = state.clone();
            let subscription = state.subscribe(move |event| {
                let Some(model) = weak.upgrade() else {
                    return;
                };
                let TreeEvent::AttributeChanged { node, key } = event else {
                    return;
                };
                if *node != observed {
                    return;
                }
                model.handle_attribute_changed(key);
            });

            BoxModel {
                state,
                listeners: RefCell::new(Vec::new()),
                _subscription: subscription,
            }
        });

        if !model.state.has_attribute("component-width") {
            model
                .state
                .set_attribute("component-width", model.calculate_component_width());
        }
        if !model.state.has_attribute("component-height") {
            model
                .state
                .set_attribute("component-height", model.calculate_component_height());
        }

        model
    }

    pub fn state(&self) -> &Node {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Geometry queries
    // -----------------------------------------------------------------------

    /// Resolved outer width in pixels.
    pub fn width(&self) -> f32 {
        self.state.attribute_as("component-width").unwrap_or(0.0)
    }

    /// Resolved outer height in pixels.
    pub fn height(&self) -> f32 {
        self.state.attribute_as("component-height").unwrap_or(0.0)
    }

    /// The outer bounds, origin at zero.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width(), self.height())
    }

    pub fn margin(&self) -> Edges {
        self.state.attribute_as("margin").unwrap_or(Edges::ZERO)
    }

    pub fn border(&self) -> Edges {
        self.state.attribute_as("border-width").unwrap_or(Edges::ZERO)
    }

    pub fn padding(&self) -> Edges {
        self.state.attribute_as("padding").unwrap_or(Edges::ZERO)
    }

    /// The bounds available to children: the outer bounds less border and
    /// padding, never negative.
    pub fn content_bounds(&self) -> Rect {
        self.bounds().shrink(self.border() + self.padding())
    }

    /// Minimum outer size, resolved against the parent. Zero when
    /// unconstrained.
    pub fn minimum_size(&self) -> Size {
        let parent = self.parent_size();
        Size::new(
            self.declared("min-width").to_pixels(parent.width),
            self.declared("min-height").to_pixels(parent.height),
        )
    }

    /// Maximum outer size, resolved against the parent. Infinite when
    /// unconstrained.
    pub fn maximum_size(&self) -> Size {
        let parent = self.parent_size();
        let resolve = |key: &str, dimension: f32| match self.declared(key) {
            Length::Auto => f32::INFINITY,
            length => length.to_pixels(dimension),
        };
        Size::new(
            resolve("max-width", parent.width),
            resolve("max-height", parent.height),
        )
    }

    // -----------------------------------------------------------------------
    // Geometry writes (used by layout passes)
    // -----------------------------------------------------------------------

    pub fn set_width(&self, width: f32) {
        self.state.set_attribute("component-width", width);
        // A top-level box is sized from outside, so the declared size
        // follows the resolved one.
        if self.state.parent().is_none() {
            self.state.set_attribute("width", width.round());
        }
    }

    pub fn set_height(&self, height: f32) {
        self.state.set_attribute("component-height", height);
        if self.state.parent().is_none() {
            self.state.set_attribute("height", height.round());
        }
    }

    /// Set both dimensions, collapsing the two writes into a single change
    /// notification when both actually change.
    pub fn set_size(&self, size: Size) {
        let both_change = size.width != self.width() && size.height != self.height();
        if both_change {
            let _lock = self.lock_callbacks();
            self.set_width(size.width);
        } else {
            self.set_width(size.width);
        }
        self.set_height(size.height);
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    /// Force an invalidation notification, even if the box was already
    /// invalid.
    pub fn invalidate(&self) {
        self.state.set_attribute("box-model-valid", true);
        self.state.set_attribute("box-model-valid", false);
    }

    /// Invalidate the parent's box model through the tree.
    pub fn invalidate_parent(&self) {
        if let Some(parent) = self.state.parent() {
            parent.set_attribute("box-model-valid", true);
            parent.set_attribute("box-model-valid", false);
        }
    }

    /// Suppress change handling on this box until the guard drops.
    pub fn lock_callbacks(&self) -> CallbackLockGuard {
        CallbackLockGuard::new(self.state.clone())
    }

    pub fn add_listener(&self, listener: impl Fn(BoxEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    // -----------------------------------------------------------------------
    // Change handling
    // -----------------------------------------------------------------------

    fn handle_attribute_changed(self: &Rc<Self>, key: &str) {
        match key {
            "width" | "height" => {
                if self.callbacks_locked() {
                    return;
                }
                let resized = self.update_component_size();
                self.notify(BoxEvent::Changed);
                if resized {
                    self.invalidate_parent();
                }
            }
            "component-width" | "component-height" | "ideal-width" | "ideal-height"
            | "margin" | "padding" | "border-width" => {
                if self.callbacks_locked() {
                    return;
                }
                self.state.set_attribute("box-model-valid", true);
                self.notify(BoxEvent::Changed);
                self.invalidate_parent();
            }
            "box-model-valid" => {
                if self.callbacks_locked() {
                    return;
                }
                if !self.state.attribute_as::<bool>("box-model-valid").unwrap_or(true) {
                    self.notify(BoxEvent::Invalidated);
                }
            }
            _ => {}
        }
    }

    /// Recompute both component dimensions from the declared sizes. Returns
    /// whether either changed.
    fn update_component_size(&self) -> bool {
        let width = self.calculate_component_width();
        let height = self.calculate_component_height();
        let resized = width != self.width() || height != self.height();

        // Under our own lock so the component-size handler does not run a
        // second notification for the same write.
        let _lock = self.lock_callbacks();
        self.state.set_attribute("component-width", width);
        self.state.set_attribute("component-height", height);

        resized
    }

    fn calculate_component_width(&self) -> f32 {
        match self.declared("width") {
            // An auto box is as wide as its own chrome until layout says
            // otherwise.
            Length::Auto => self.padding().horizontal() + self.border().horizontal(),
            length => length.to_pixels(self.parent_size().width),
        }
    }

    fn calculate_component_height(&self) -> f32 {
        match self.declared("height") {
            Length::Auto => self.padding().vertical() + self.border().vertical(),
            length => length.to_pixels(self.parent_size().height),
        }
    }

    fn declared(&self, key: &str) -> Length {
        self.state.attribute_as(key).unwrap_or(Length::Auto)
    }

    /// The parent's resolved size, or zero for a root box.
    fn parent_size(&self) -> Size {
        match self.state.parent() {
            Some(parent) => Size::new(
                parent.attribute_as("component-width").unwrap_or(0.0),
                parent.attribute_as("component-height").unwrap_or(0.0),
            ),
            None => Size::ZERO,
        }
    }

    fn callbacks_locked(&self) -> bool {
        self.state
            .attribute_as::<bool>("box-model-callback-lock")
            .unwrap_or(false)
    }

    fn notify(&self, event: BoxEvent) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

/// RAII guard for `box-model-callback-lock`. Nests: the previous lock state
/// is restored on drop.
pub struct CallbackLockGuard {
    state: Node,
    previous: bool,
}

impl CallbackLockGuard {
    fn new(state: Node) -> Self {
        let previous = state
            .attribute_as::<bool>("box-model-callback-lock")
            .unwrap_or(false);
        state.set_attribute("box-model-callback-lock", true);
        Self { state, previous }
    }
}

impl Drop for CallbackLockGuard {
    fn drop(&mut self) {
        self.state.set_attribute("box-model-callback-lock", self.previous);
    }
}
