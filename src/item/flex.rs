//! Flexbox layout, solved by taffy.
//!
//! Two decorators cooperate. [`FlexChild`] sits on every child of a flex
//! container and owns the per-child attributes (`order`, `flex-grow`,
//! `flex-shrink`, `flex-basis`, `align-self`); changing any of them re-runs
//! the parent's layout. [`FlexContainer`] owns the container attributes and
//! the passes themselves: each pass builds a throwaway taffy tree from the
//! current attribute values, solves it, and writes the results back into the
//! children's box models and primitives.
//!
//! An ideal-size probe solves the same tree under a dummy strategy: content
//! packed at the start, no growing, percentages resolved against zero. The
//! probe writes nothing back, so it is free of side effects.

use std::any::Any;
use std::rc::Rc;

use taffy::prelude::{AvailableSpace, Dimension, FromLength, TaffyTree};
use taffy::style::{AlignContent, AlignItems, Display, JustifyContent};

use crate::binding::Property;
use crate::geometry::{Point, Size};
use crate::item::container::{child_constraints, ordered_children, Orientation};
use crate::item::{
    box_model_of, container_of, Container, ContainerCore, GuiItem, Item, ItemRef, LayoutStrategy,
};
use crate::layout::{resolve, BoxEvent};
use crate::style::Length;

// Weak: a strong capture would keep the item alive through the store's
// listener list and its teardown would reach back into the store.
fn relayout_parent(item: &ItemRef) -> impl FnMut() + 'static {
    let item = Rc::downgrade(item);
    move || {
        let Some(item) = item.upgrade() else {
            return;
        };
        if let Some(parent) = item.parent() {
            if let Some(container) = container_of(parent.as_ref()) {
                container.lay_out_children();
            }
        }
    }
}

/// The per-child half of flex layout.
pub struct FlexChild {
    inner: ItemRef,
    _order: Property<i64>,
    _grow: Property<f32>,
    _shrink: Property<f32>,
    _basis: Property<String>,
    _align_self: Property<String>,
}

impl FlexChild {
    pub fn new(inner: ItemRef) -> Rc<FlexChild> {
        let state = inner.state().clone();
        if !state.has_attribute("flex-shrink") {
            state.set_attribute("flex-shrink", 1.0);
        }

        let order = Property::new(&state, "order");
        let grow = Property::new(&state, "flex-grow");
        let shrink = Property::new(&state, "flex-shrink");
        let basis = Property::new(&state, "flex-basis");
        let align_self = Property::new(&state, "align-self");

        order.on_change(relayout_parent(&inner));
        grow.on_change(relayout_parent(&inner));
        shrink.on_change(relayout_parent(&inner));
        basis.on_change(relayout_parent(&inner));
        align_self.on_change(relayout_parent(&inner));

        Rc::new(FlexChild {
            inner,
            _order: order,
            _grow: grow,
            _shrink: shrink,
            _basis: basis,
            _align_self: align_self,
        })
    }
}

impl GuiItem for FlexChild {
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

struct SolvedChild {
    item: ItemRef,
    location: Point,
    size: Size,
}

/// The container half of flex layout.
pub struct FlexContainer {
    inner: ItemRef,
    core: ContainerCore,
    _direction: Property<String>,
    _wrap: Property<String>,
    _justify: Property<String>,
    _align_items: Property<String>,
    _align_content: Property<String>,
}

impl FlexContainer {
    pub fn new(inner: ItemRef) -> Rc<FlexContainer> {
        let state = inner.state().clone();
        if !state.has_attribute("flex-direction") {
            state.set_attribute("flex-direction", "column");
        }

        let core = ContainerCore::new(&state);
        let container = Rc::new(FlexContainer {
            inner,
            core,
            _direction: Property::new(&state, "flex-direction"),
            _wrap: Property::new(&state, "flex-wrap"),
            _justify: Property::new(&state, "justify-content"),
            _align_items: Property::new(&state, "align-items"),
            _align_content: Property::new(&state, "align-content"),
        });

        for property in [
            &container._direction,
            &container._wrap,
            &container._justify,
            &container._align_items,
            &container._align_content,
        ] {
            let weak = Rc::downgrade(&container);
            property.on_change(move || {
                if let Some(container) = weak.upgrade() {
                    container.handle_layout_changed();
                }
            });
        }

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

    fn orientation(&self) -> Orientation {
        match self.state().attribute_as::<String>("flex-direction").as_deref() {
            Some("row") | Some("row-reverse") => Orientation::Horizontal,
            _ => Orientation::Vertical,
        }
    }

    fn solve(&self, available: Size, strategy: LayoutStrategy) -> Option<Vec<SolvedChild>> {
        match self.try_solve(available, strategy) {
            Ok(solved) => Some(solved),
            Err(error) => {
                tracing::warn!(%error, "flex solve failed");
                None
            }
        }
    }

    fn try_solve(
        &self,
        available: Size,
        strategy: LayoutStrategy,
    ) -> Result<Vec<SolvedChild>, taffy::TaffyError> {
        let orientation = self.orientation();
        let real = strategy == LayoutStrategy::Real;
        let state = self.state();

        let mut tree: TaffyTree<()> = TaffyTree::new();
        let children = ordered_children(self.as_item());
        let mut nodes = Vec::with_capacity(children.len());
        for child in &children {
            let mut style = child_constraints(child.as_ref(), available, orientation, strategy);
            let child_state = child.state();
            style.flex_shrink = child_state.attribute_as("flex-shrink").unwrap_or(1.0);
            if real {
                style.flex_grow = child_state.attribute_as("flex-grow").unwrap_or(0.0);
                if let Some(basis) = child_state.attribute_as::<Length>("flex-basis") {
                    style.flex_basis = resolve::dimension(basis);
                }
                if let Some(keyword) = child_state.attribute_as::<String>("align-self") {
                    style.align_self = resolve::align_items(&keyword);
                }
            }
            nodes.push(tree.new_leaf(style)?);
        }

        let keyword =
            |key: &str| state.attribute_as::<String>(key).unwrap_or_default();
        let mut root_style = taffy::Style {
            display: Display::Flex,
            flex_direction: resolve::flex_direction(&keyword("flex-direction")),
            flex_wrap: resolve::flex_wrap(&keyword("flex-wrap")),
            size: taffy::Size {
                width: Dimension::from_length(available.width),
                height: Dimension::from_length(available.height),
            },
            ..Default::default()
        };
        if real {
            root_style.justify_content = resolve::justify_content(&keyword("justify-content"));
            root_style.align_items = resolve::align_items(&keyword("align-items"));
            root_style.align_content = resolve::align_content(&keyword("align-content"));
        } else {
            // A probe measures natural extents: content packed at the start,
            // nothing stretched.
            root_style.justify_content = Some(JustifyContent::FlexStart);
            root_style.align_items = Some(AlignItems::FlexStart);
            root_style.align_content = Some(AlignContent::FlexStart);
        }

        let root = tree.new_with_children(root_style, &nodes)?;
        tree.compute_layout(
            root,
            taffy::Size {
                width: AvailableSpace::Definite(available.width),
                height: AvailableSpace::Definite(available.height),
            },
        )?;

        let mut solved = Vec::with_capacity(children.len());
        for (child, node) in children.into_iter().zip(nodes) {
            let layout = tree.layout(node)?;
            solved.push(SolvedChild {
                item: child,
                location: Point::new(layout.location.x, layout.location.y),
                size: Size::new(layout.size.width, layout.size.height),
            });
        }
        Ok(solved)
    }
}

impl GuiItem for FlexContainer {
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

impl Container for FlexContainer {
    fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn as_item(&self) -> &dyn GuiItem {
        self
    }

    fn calculate_ideal_size(&self, constraints: Size) -> Size {
        let Some(model) = box_model_of(self.as_item()) else {
            return Size::ZERO;
        };
        let Some(solved) = self.solve(constraints, LayoutStrategy::Dummy) else {
            return Size::ZERO;
        };

        let mut extremities = Size::ZERO;
        for child in &solved {
            let margin = box_model_of(child.item.as_ref())
                .map(|child_model| child_model.margin())
                .unwrap_or_default();
            extremities.width = extremities
                .width
                .max(child.location.x + child.size.width + margin.right);
            extremities.height = extremities
                .height
                .max(child.location.y + child.size.height + margin.bottom);
        }

        let chrome = model.border() + model.padding();
        Size::new(
            extremities.width + chrome.horizontal(),
            extremities.height + chrome.vertical(),
        )
    }

    fn perform_layout(&self) {
        let Some(model) = box_model_of(self.as_item()) else {
            return;
        };
        // A child whose ideal size moves mid-pass invalidates the pass, so
        // rerun until the geometry settles.
        loop {
            self.core.begin_pass();
            let content = model.content_bounds();
            let Some(solved) = self.solve(content.size(), LayoutStrategy::Real) else {
                return;
            };
            for child in solved {
                if let Some(child_model) = box_model_of(child.item.as_ref()) {
                    child_model.set_size(child.size);
                }
                child
                    .item
                    .primitive()
                    .set_position(content.position() + child.location);
            }
            if !self.core.changed_during_pass() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{CommonItem, Primitive};
    use crate::tree::Node;

    fn build_container(root: Node) -> Rc<FlexContainer> {
        FlexContainer::new(CommonItem::new(Item::new(root, Primitive::neutral(), None)))
    }

    fn attach_children(container: &Rc<FlexContainer>, nodes: &[Node]) -> Vec<ItemRef> {
        let parent: ItemRef = Rc::clone(container) as ItemRef;
        let mut children: Vec<ItemRef> = Vec::new();
        for node in nodes {
            children.push(FlexChild::new(CommonItem::new(Item::new(
                node.clone(),
                Primitive::neutral(),
                Some(&parent),
            ))));
        }
        container.set_children_with_layout(children.clone());
        children
    }

    fn row_root(width: f64, height: f64) -> Node {
        let root = Node::new("Component");
        root.set_attribute("width", width);
        root.set_attribute("height", height);
        root.set_attribute("flex-direction", "row");
        root
    }

    #[test]
    fn test_grow_distributes_free_space() {
        let root = row_root(300.0, 100.0);
        let first_node = root.append("Component");
        first_node.set_attribute("flex-grow", 1.0);
        let second_node = root.append("Component");
        second_node.set_attribute("flex-grow", 2.0);

        let container = build_container(root);
        let children = attach_children(&container, &[first_node, second_node]);

        assert_eq!(children[0].primitive().bounds().width, 100.0);
        assert_eq!(children[1].primitive().bounds().width, 200.0);
        assert_eq!(children[1].primitive().bounds().x, 100.0);
    }

    #[test]
    fn test_margins_offset_positions() {
        let root = row_root(300.0, 100.0);
        let first_node = root.append("Component");
        first_node.set_attribute("width", 50.0);
        first_node.set_attribute("margin", "0 10 0 5");
        let second_node = root.append("Component");
        second_node.set_attribute("width", 60.0);

        let container = build_container(root);
        let children = attach_children(&container, &[first_node, second_node]);

        assert_eq!(children[0].primitive().bounds().x, 5.0);
        assert_eq!(children[1].primitive().bounds().x, 65.0);
        drop(container);
    }

    #[test]
    fn test_relative_sizes_resolve_against_content() {
        let root = row_root(300.0, 200.0);
        let child_node = root.append("Component");
        child_node.set_attribute("width", "50%");
        child_node.set_attribute("height", "10%");

        let container = build_container(root);
        let children = attach_children(&container, &[child_node]);

        let bounds = children[0].primitive().bounds();
        assert_eq!(bounds.width, 150.0);
        assert_eq!(bounds.height, 20.0);
        drop(container);
    }

    #[test]
    fn test_padding_offsets_content() {
        let root = row_root(300.0, 100.0);
        root.set_attribute("padding", "10 20 30 40");
        let child_node = root.append("Component");
        child_node.set_attribute("width", 50.0);

        let container = build_container(root);
        let children = attach_children(&container, &[child_node]);

        let bounds = children[0].primitive().bounds();
        assert_eq!(bounds.x, 40.0);
        assert_eq!(bounds.y, 10.0);
        // Stretched into the content box, which padding has shrunk.
        assert_eq!(bounds.height, 60.0);
        drop(container);
    }

    #[test]
    fn test_order_rearranges_children() {
        let root = row_root(300.0, 100.0);
        let first_node = root.append("Component");
        first_node.set_attribute("width", 50.0);
        first_node.set_attribute("order", 1);
        let second_node = root.append("Component");
        second_node.set_attribute("width", 60.0);

        let container = build_container(root);
        let children = attach_children(&container, &[first_node, second_node]);

        // The second child has the default order 0 and lays out first.
        assert_eq!(children[1].primitive().bounds().x, 0.0);
        assert_eq!(children[0].primitive().bounds().x, 60.0);
        drop(container);
    }

    #[test]
    fn test_child_property_change_triggers_relayout() {
        let root = row_root(300.0, 100.0);
        let first_node = root.append("Component");
        first_node.set_attribute("flex-grow", 1.0);
        let second_node = root.append("Component");
        second_node.set_attribute("flex-grow", 1.0);

        let container = build_container(root);
        let children = attach_children(&container, &[first_node, second_node.clone()]);
        assert_eq!(children[0].primitive().bounds().width, 150.0);

        second_node.set_attribute("flex-grow", 3.0);
        assert_eq!(children[0].primitive().bounds().width, 75.0);
        assert_eq!(children[1].primitive().bounds().width, 225.0);
        drop(container);
    }

    #[test]
    fn test_ideal_size_probe_is_side_effect_free() {
        let root = Node::new("Component");
        root.set_attribute("padding", 5.0);
        let first_node = root.append("Component");
        first_node.set_attribute("width", 80.0);
        first_node.set_attribute("height", 40.0);
        let second_node = root.append("Component");
        second_node.set_attribute("width", 50.0);
        second_node.set_attribute("height", 60.0);

        let container = build_container(root);
        let parent: ItemRef = Rc::clone(&container) as ItemRef;
        let mut children: Vec<ItemRef> = Vec::new();
        for node in [&first_node, &second_node] {
            children.push(FlexChild::new(CommonItem::new(Item::new(
                node.clone(),
                Primitive::neutral(),
                Some(&parent),
            ))));
        }
        // Attach directly, bypassing layout, so the probe runs on a tree no
        // pass has touched.
        container.base().set_children_direct(children.clone());

        let probe = Size::new(u16::MAX as f32, u16::MAX as f32);
        let ideal = container.calculate_ideal_size(probe);
        assert_eq!(ideal, Size::new(90.0, 110.0));

        // A second probe agrees, and no geometry was written back.
        assert_eq!(container.calculate_ideal_size(probe), ideal);
        assert_eq!(children[0].primitive().bounds().x, 0.0);
        assert_eq!(children[0].primitive().bounds().y, 0.0);
        assert!(!first_node.has_attribute("ideal-width"));
    }
}
