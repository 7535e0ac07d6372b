//! The common decorator every item gets first.
//!
//! Owns the item's [`BoxModel`] and keeps the native primitive in step with
//! the tree: resolved box sizes flow into the primitive's bounds, and the
//! `enabled` and `visible` attributes flow into the primitive's display
//! state.

use std::any::Any;
use std::rc::Rc;

use crate::binding::Property;
use crate::geometry::Size;
use crate::item::{GuiItem, ItemRef};
use crate::layout::{BoxEvent, BoxModel};

pub struct CommonItem {
    inner: ItemRef,
    box_model: Rc<BoxModel>,
    _enabled: Property<bool>,
    _visible: Property<bool>,
}

impl CommonItem {
    pub fn new(inner: ItemRef) -> Rc<CommonItem> {
        let state = inner.state().clone();
        if !state.has_attribute("enabled") {
            state.set_attribute("enabled", true);
        }
        if !state.has_attribute("visible") {
            state.set_attribute("visible", true);
        }

        let box_model = BoxModel::new(state.clone());

        let primitive = inner.primitive();
        primitive.set_size(Size::new(box_model.width(), box_model.height()));
        {
            let primitive = primitive.clone();
            let sized = state.clone();
            box_model.add_listener(move |event| {
                if event == BoxEvent::Changed {
                    primitive.set_size(Size::new(
                        sized.attribute_as("component-width").unwrap_or(0.0),
                        sized.attribute_as("component-height").unwrap_or(0.0),
                    ));
                }
            });
        }

        let enabled = Property::<bool>::new(&state, "enabled");
        {
            let primitive = primitive.clone();
            let state = state.clone();
            enabled.on_change(move || {
                primitive.set_enabled(state.attribute_as("enabled").unwrap_or(true));
            });
        }

        let visible = Property::<bool>::new(&state, "visible");
        {
            let primitive = primitive.clone();
            let state = state.clone();
            visible.on_change(move || {
                primitive.set_visible(state.attribute_as("visible").unwrap_or(true));
            });
        }

        Rc::new(CommonItem {
            inner,
            box_model,
            _enabled: enabled,
            _visible: visible,
        })
    }

    pub fn box_model_ref(&self) -> &Rc<BoxModel> {
        &self.box_model
    }
}

impl GuiItem for CommonItem {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        Some(self.inner.as_ref())
    }

    fn base(&self) -> &crate::item::Item {
        self.inner.base()
    }

    fn box_model(&self) -> Option<Rc<BoxModel>> {
        Some(Rc::clone(&self.box_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{box_model_of, to_type, Item, Primitive};
    use crate::tree::Node;

    fn common(state: Node) -> Rc<CommonItem> {
        CommonItem::new(Item::new(state, Primitive::neutral(), None))
    }

    #[test]
    fn test_defaults_written() {
        let node = Node::new("Component");
        let _item = common(node.clone());
        assert_eq!(node.attribute_as::<bool>("enabled"), Some(true));
        assert_eq!(node.attribute_as::<bool>("visible"), Some(true));
    }

    #[test]
    fn test_box_changes_flow_into_primitive() {
        let node = Node::new("Component");
        node.set_attribute("width", 120.0);
        node.set_attribute("height", 90.0);

        let item = common(node.clone());
        assert_eq!(item.primitive().bounds().width, 120.0);

        node.set_attribute("width", 150.0);
        assert_eq!(item.primitive().bounds().width, 150.0);
    }

    #[test]
    fn test_enabled_flows_into_primitive() {
        let node = Node::new("Component");
        let item = common(node.clone());
        assert!(item.primitive().is_enabled());

        node.set_attribute("enabled", false);
        assert!(!item.primitive().is_enabled());
    }

    #[test]
    fn test_capability_queries_reach_through() {
        let node = Node::new("Component");
        let item = common(node);
        assert!(box_model_of(item.as_ref()).is_some());
        assert!(to_type::<Item>(item.as_ref()).is_some());
        assert!(to_type::<CommonItem>(item.as_ref()).is_some());
    }
}
