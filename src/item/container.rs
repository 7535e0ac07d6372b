//! Shared behaviour of layout containers.
//!
//! Every container (flex, grid, block) follows the same choreography:
//!
//! - A box invalidation recomputes the ideal size against the current
//!   content bounds. If the ideal changed and an ancestor exists, the write
//!   itself propagates upward and the ancestor will come back down with a
//!   full pass; otherwise the container lays out its children now.
//! - A structural change (children added, layout-affecting attribute
//!   written) probes the ideal size unconstrained and follows the same rule.
//! - The actual pass runs under two locks: the recursion lock stops a
//!   container re-entering its own layout, and the box callback lock stops
//!   geometry write-backs from re-invalidating the container mid-pass.
//! - A child that changes its own ideal size during the pass sets the
//!   changed flag instead, and the pass reruns until it settles.

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Size;
use crate::item::{box_model_of, GuiItem, ItemRef};
use crate::tree::{Node, Subscription, TreeEvent};

/// Which kind of layout pass is being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// A probe for ideal sizes: must leave all real geometry untouched.
    Dummy,
    /// The pass that writes resolved geometry back into the tree.
    Real,
}

/// The per-container layout flags, shared with the tree watcher that
/// detects mid-pass ideal-size changes.
pub struct ContainerCore {
    layout_lock: Rc<Cell<bool>>,
    changes_during_layout: Rc<Cell<bool>>,
    _watcher: Subscription,
}

impl ContainerCore {
    pub fn new(state: &Node) -> Self {
        let layout_lock = Rc::new(Cell::new(false));
        let changes_during_layout = Rc::new(Cell::new(false));

        let lock = Rc::clone(&layout_lock);
        let changes = Rc::clone(&changes_during_layout);
        let observed = state.clone();
        let watcher = state.subscribe(move |event| {
            if !lock.get() {
                return;
            }
            let TreeEvent::AttributeChanged { node, key } = event else {
                return;
            };
            if key != "ideal-width" && key != "ideal-height" {
                return;
            }
            if *node == observed || node.parent().as_ref() == Some(&observed) {
                changes.set(true);
            }
        });

        Self {
            layout_lock,
            changes_during_layout,
            _watcher: watcher,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.layout_lock.get()
    }

    fn set_locked(&self, locked: bool) {
        self.layout_lock.set(locked);
    }

    /// Clear the changed flag at the start of a pass iteration.
    pub fn begin_pass(&self) {
        self.changes_during_layout.set(false);
    }

    /// Whether an ideal size moved during the current pass iteration.
    pub fn changed_during_pass(&self) -> bool {
        self.changes_during_layout.get()
    }
}

/// The container capability: items that lay out their children.
pub trait Container: GuiItem {
    fn core(&self) -> &ContainerCore;

    /// This link as a plain item, for capability walks.
    fn as_item(&self) -> &dyn GuiItem;

    /// The size this container would take given `constraints`, computed
    /// bottom-up and side-effect free.
    fn calculate_ideal_size(&self, constraints: Size) -> Size;

    /// Run one real layout pass within the current content bounds.
    fn perform_layout(&self);

    /// The guarded entry point for layout. Re-entry and empty containers
    /// are no-ops; geometry write-backs are suppressed for the duration.
    fn lay_out_children(&self) {
        let core = self.core();
        if core.is_locked() || self.as_item().child_count() == 0 {
            return;
        }
        let Some(model) = box_model_of(self.as_item()) else {
            return;
        };

        let _callback_guard = model.lock_callbacks();
        core.set_locked(true);
        self.perform_layout();
        core.set_locked(false);
    }

    /// React to this container's box being invalidated.
    fn handle_box_invalidated(&self) {
        let Some(model) = box_model_of(self.as_item()) else {
            return;
        };
        let content = model.content_bounds();
        let ideal = self.calculate_ideal_size(Size::new(content.width, content.height));
        let ideal_changed = write_ideal_size(self.as_item().state(), &model, ideal);

        // An ideal-size change on a nested container propagates upward
        // instead; the top-level ancestor's pass will come back down.
        if !ideal_changed || self.as_item().parent().is_none() {
            self.lay_out_children();
        }
    }

    /// React to a structural change: re-probe the ideal size unconstrained.
    fn handle_layout_changed(&self) {
        let Some(model) = box_model_of(self.as_item()) else {
            return;
        };
        let unconstrained = Size::new(u16::MAX as f32, u16::MAX as f32);
        let ideal = self.calculate_ideal_size(unconstrained);
        let ideal_changed = write_ideal_size(self.as_item().state(), &model, ideal);

        if !ideal_changed {
            self.lay_out_children();
        }
    }

    /// Delegate an insertion inward, then relayout if it stuck.
    fn insert_child_with_layout(&self, child: ItemRef, index: usize) {
        let link = self.as_item();
        let before = link.child_count();
        if let Some(inner) = link.inner() {
            inner.insert_child(child, index);
        }
        if link.child_count() != before {
            self.handle_layout_changed();
        }
    }

    /// Delegate a wholesale replacement inward under the callback lock,
    /// then relayout.
    fn set_children_with_layout(&self, children: Vec<ItemRef>) {
        let link = self.as_item();
        if let Some(model) = box_model_of(link) {
            let _guard = model.lock_callbacks();
            if let Some(inner) = link.inner() {
                inner.set_children(children);
            }
        } else if let Some(inner) = link.inner() {
            inner.set_children(children);
        }
        if link.child_count() > 0 {
            self.handle_layout_changed();
        }
    }
}

/// The main axis of a flex or grid container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Translate a child's declared constraints into a taffy style, shared by
/// the flex and grid engines.
///
/// Declared sizes resolve against the parent's content bounds in a real
/// pass and against zero in a dummy pass, so a percentage-sized child
/// cannot leak the parent's current geometry into an ideal-size probe. An
/// auto main-axis size falls back to the child's own ideal size where one
/// has been computed: as a minimum when it fits (or when probing), as a
/// hard size when it would overflow.
pub(crate) fn child_constraints(
    child: &dyn GuiItem,
    parent_content: Size,
    orientation: Orientation,
    strategy: LayoutStrategy,
) -> taffy::Style {
    use crate::layout::resolve;
    use crate::style::Length;
    use taffy::prelude::*;

    let mut style = taffy::Style::default();
    let Some(model) = box_model_of(child) else {
        return style;
    };
    let state = child.state();

    let minimum = model.minimum_size();
    let mut min_width = minimum.width;
    let mut min_height = minimum.height;

    let maximum = model.maximum_size();
    if maximum.width.is_finite() {
        style.max_size.width = Dimension::from_length(maximum.width);
    }
    if maximum.height.is_finite() {
        style.max_size.height = Dimension::from_length(maximum.height);
    }

    style.margin = resolve::margin(model.margin());

    let real = strategy == LayoutStrategy::Real;
    let resolve_against = |declared: Length, dimension: f32| {
        declared.to_pixels(if real { dimension } else { 0.0 })
    };

    let width: Length = state.attribute_as("width").unwrap_or(Length::Auto);
    let height: Length = state.attribute_as("height").unwrap_or(Length::Auto);
    let ideal_width: Option<f32> = state.attribute_as("ideal-width");
    let ideal_height: Option<f32> = state.attribute_as("ideal-height");

    if !width.is_auto() {
        style.size.width = Dimension::from_length(resolve_against(width, parent_content.width));
    } else if let Some(ideal) = ideal_width {
        match orientation {
            Orientation::Vertical => {
                if ideal < parent_content.width || !real {
                    min_width = min_width.max(ideal);
                } else {
                    style.size.width = Dimension::from_length(parent_content.width);
                }
            }
            Orientation::Horizontal => {
                style.size.width = Dimension::from_length(ideal);
            }
        }
    }

    if !height.is_auto() {
        style.size.height = Dimension::from_length(resolve_against(height, parent_content.height));
    } else if let Some(ideal) = ideal_height {
        min_height = min_height.max(ideal);
    }

    if min_width > 0.0 {
        style.min_size.width = Dimension::from_length(min_width);
    }
    if min_height > 0.0 {
        style.min_size.height = Dimension::from_length(min_height);
    }

    style
}

/// Children in layout order: stable-sorted by the `order` attribute, so
/// equal orders keep document order.
pub(crate) fn ordered_children(item: &dyn GuiItem) -> Vec<ItemRef> {
    let mut children = item.children();
    children.sort_by_key(|child| child.state().attribute_as::<i64>("order").unwrap_or(0));
    children
}

/// Write both ideal dimensions, collapsing to one change notification when
/// both move. Returns whether either moved.
fn write_ideal_size(state: &Node, model: &crate::layout::BoxModel, ideal: Size) -> bool {
    let previous = Size::new(
        state.attribute_as("ideal-width").unwrap_or(0.0),
        state.attribute_as("ideal-height").unwrap_or(0.0),
    );
    let width_changed = previous.width != ideal.width;
    let height_changed = previous.height != ideal.height;

    if width_changed && height_changed {
        let _guard = model.lock_callbacks();
        state.set_attribute("ideal-width", ideal.width);
    } else if width_changed {
        state.set_attribute("ideal-width", ideal.width);
    }
    if height_changed {
        state.set_attribute("ideal-height", ideal.height);
    }

    width_changed || height_changed
}
