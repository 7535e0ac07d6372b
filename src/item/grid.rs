//! Grid layout, solved by taffy.
//!
//! The same decorator pair as flex: [`GridChild`] owns the per-child
//! placement attributes (`order`, `grid-column`, `grid-row`, `justify-self`,
//! `align-self`) and re-runs the parent's layout when they change;
//! [`GridContainer`] owns the track templates and alignment attributes and
//! solves a throwaway taffy tree per pass.

use std::any::Any;
use std::rc::Rc;

use taffy::prelude::{AvailableSpace, Dimension, FromLength, TaffyTree};
use taffy::style::{AlignContent, AlignItems, Display};

use crate::binding::Property;
use crate::geometry::{Point, Size};
use crate::item::container::{child_constraints, ordered_children, Orientation};
use crate::item::{
    box_model_of, container_of, Container, ContainerCore, GuiItem, Item, ItemRef, LayoutStrategy,
};
use crate::layout::{resolve, BoxEvent};

// Weak for the same reason as the flex half: the store's listener list must
// not own the item.
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

/// The per-child half of grid layout.
pub struct GridChild {
    inner: ItemRef,
    _order: Property<i64>,
    _column: Property<String>,
    _row: Property<String>,
    _justify_self: Property<String>,
    _align_self: Property<String>,
}

impl GridChild {
    pub fn new(inner: ItemRef) -> Rc<GridChild> {
        let state = inner.state().clone();

        let order = Property::new(&state, "order");
        let column = Property::new(&state, "grid-column");
        let row = Property::new(&state, "grid-row");
        let justify_self = Property::new(&state, "justify-self");
        let align_self = Property::new(&state, "align-self");

        order.on_change(relayout_parent(&inner));
        column.on_change(relayout_parent(&inner));
        row.on_change(relayout_parent(&inner));
        justify_self.on_change(relayout_parent(&inner));
        align_self.on_change(relayout_parent(&inner));

        Rc::new(GridChild {
            inner,
            _order: order,
            _column: column,
            _row: row,
            _justify_self: justify_self,
            _align_self: align_self,
        })
    }
}

impl GuiItem for GridChild {
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

/// The container half of grid layout.
pub struct GridContainer {
    inner: ItemRef,
    core: ContainerCore,
    _columns: Property<String>,
    _rows: Property<String>,
    _gap: Property<String>,
    _justify_content: Property<String>,
    _align_content: Property<String>,
    _justify_items: Property<String>,
    _align_items: Property<String>,
}

impl GridContainer {
    pub fn new(inner: ItemRef) -> Rc<GridContainer> {
        let state = inner.state().clone();

        let core = ContainerCore::new(&state);
        let container = Rc::new(GridContainer {
            inner,
            core,
            _columns: Property::new(&state, "grid-template-columns"),
            _rows: Property::new(&state, "grid-template-rows"),
            _gap: Property::new(&state, "gap"),
            _justify_content: Property::new(&state, "justify-content"),
            _align_content: Property::new(&state, "align-content"),
            _justify_items: Property::new(&state, "justify-items"),
            _align_items: Property::new(&state, "align-items"),
        });

        for property in [
            &container._columns,
            &container._rows,
            &container._gap,
            &container._justify_content,
            &container._align_content,
            &container._justify_items,
            &container._align_items,
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

    fn solve(&self, available: Size, strategy: LayoutStrategy) -> Option<Vec<SolvedChild>> {
        match self.try_solve(available, strategy) {
            Ok(solved) => Some(solved),
            Err(error) => {
                tracing::warn!(%error, "grid solve failed");
                None
            }
        }
    }

    fn try_solve(
        &self,
        available: Size,
        strategy: LayoutStrategy,
    ) -> Result<Vec<SolvedChild>, taffy::TaffyError> {
        let real = strategy == LayoutStrategy::Real;
        let state = self.state();

        let mut tree: TaffyTree<()> = TaffyTree::new();
        let children = ordered_children(self.as_item());
        let mut nodes = Vec::with_capacity(children.len());
        for child in &children {
            let mut style =
                child_constraints(child.as_ref(), available, Orientation::Vertical, strategy);
            let child_state = child.state();
            if let Some(placement) = child_state.attribute_as::<String>("grid-column") {
                style.grid_column = resolve::grid_placement(&placement);
            }
            if let Some(placement) = child_state.attribute_as::<String>("grid-row") {
                style.grid_row = resolve::grid_placement(&placement);
            }
            if real {
                if let Some(keyword) = child_state.attribute_as::<String>("justify-self") {
                    style.justify_self = resolve::align_items(&keyword);
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
            display: Display::Grid,
            grid_template_columns: resolve::grid_tracks(&keyword("grid-template-columns")),
            grid_template_rows: resolve::grid_tracks(&keyword("grid-template-rows")),
            gap: resolve::gap(&keyword("gap")),
            size: taffy::Size {
                width: Dimension::from_length(available.width),
                height: Dimension::from_length(available.height),
            },
            ..Default::default()
        };
        if real {
            root_style.justify_content = resolve::justify_content(&keyword("justify-content"));
            root_style.align_content = resolve::align_content(&keyword("align-content"));
            root_style.justify_items = resolve::align_items(&keyword("justify-items"));
            root_style.align_items = resolve::align_items(&keyword("align-items"));
        } else {
            // A probe measures track extents: tracks packed at the start,
            // children stretched into them.
            root_style.justify_content = None;
            root_style.align_content = Some(AlignContent::FlexStart);
            root_style.justify_items = Some(AlignItems::Stretch);
            root_style.align_items = Some(AlignItems::Stretch);
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

impl GuiItem for GridContainer {
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

impl Container for GridContainer {
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
