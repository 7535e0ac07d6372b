//! Native visual primitives and the component factory.
//!
//! A [`Primitive`] stands in for whatever the host platform renders: it keeps
//! the resolved bounds, visibility, interactivity, and its own parent/child
//! hierarchy, mirroring the item tree. Layout passes write geometry here;
//! nothing in this crate reads it back as a source of truth.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::geometry::{Point, Rect, Size};

struct PrimitiveData {
    type_tag: String,
    interactive: bool,
    visible: bool,
    enabled: bool,
    bounds: Rect,
    text: String,
    parent: Weak<RefCell<PrimitiveData>>,
    children: Vec<Primitive>,
}

/// A handle to one native visual primitive. Clones alias the same primitive.
#[derive(Clone)]
pub struct Primitive {
    data: Rc<RefCell<PrimitiveData>>,
}

impl Primitive {
    pub fn new(type_tag: &str, interactive: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(PrimitiveData {
                type_tag: type_tag.to_string(),
                interactive,
                visible: true,
                enabled: true,
                bounds: Rect::EMPTY,
                text: String::new(),
                parent: Weak::new(),
                children: Vec::new(),
            })),
        }
    }

    /// The fallback for unknown component types: renders nothing, reacts to
    /// nothing.
    pub fn neutral() -> Self {
        Self::new("neutral", false)
    }

    pub fn type_tag(&self) -> String {
        self.data.borrow().type_tag.clone()
    }

    pub fn is_interactive(&self) -> bool {
        self.data.borrow().interactive
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    pub fn bounds(&self) -> Rect {
        self.data.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.data.borrow_mut().bounds = bounds;
    }

    pub fn set_position(&self, position: Point) {
        let mut data = self.data.borrow_mut();
        data.bounds = data.bounds.with_position(position);
    }

    pub fn set_size(&self, size: Size) {
        let mut data = self.data.borrow_mut();
        data.bounds.width = size.width;
        data.bounds.height = size.height;
    }

    // -----------------------------------------------------------------------
    // Display state
    // -----------------------------------------------------------------------

    pub fn is_visible(&self) -> bool {
        self.data.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.data.borrow_mut().visible = visible;
    }

    pub fn is_enabled(&self) -> bool {
        self.data.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.data.borrow_mut().enabled = enabled;
    }

    pub fn text(&self) -> String {
        self.data.borrow().text.clone()
    }

    pub fn set_text(&self, text: &str) {
        self.data.borrow_mut().text = text.to_string();
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    pub fn is_attached(&self) -> bool {
        self.data.borrow().parent.upgrade().is_some()
    }

    pub fn add_child(&self, child: &Primitive, index: usize) {
        child.detach();
        child.data.borrow_mut().parent = Rc::downgrade(&self.data);
        let mut data = self.data.borrow_mut();
        let index = index.min(data.children.len());
        data.children.insert(index, child.clone());
    }

    /// Unhook this primitive from its parent, keeping its own children.
    pub fn detach(&self) {
        let parent = self.data.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|sibling| !Rc::ptr_eq(&sibling.data, &self.data));
            self.data.borrow_mut().parent = Weak::new();
        }
    }

    pub fn same_primitive(&self, other: &Primitive) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("Primitive")
            .field("type_tag", &data.type_tag)
            .field("bounds", &data.bounds)
            .field("children", &data.children.len())
            .finish()
    }
}

type Creator = Box<dyn Fn() -> Primitive>;

/// Creates native primitives by component type name.
///
/// Unknown names degrade to a neutral, non-interactive primitive rather than
/// failing.
pub struct ComponentFactory {
    creators: HashMap<String, Creator>,
}

impl Default for ComponentFactory {
    fn default() -> Self {
        let mut factory = Self { creators: HashMap::new() };
        factory.register("Button", || Primitive::new("Button", true));
        factory.register("Text", || Primitive::new("Text", false));
        factory.register("Image", || Primitive::new("Image", false));
        factory.register("Component", || Primitive::new("Component", false));
        factory.register("Window", || Primitive::new("Window", false));
        factory
    }
}

impl ComponentFactory {
    pub fn register(&mut self, type_name: &str, creator: impl Fn() -> Primitive + 'static) {
        self.creators.insert(type_name.to_string(), Box::new(creator));
    }

    pub fn create(&self, type_name: &str) -> Primitive {
        match self.creators.get(type_name) {
            Some(creator) => creator(),
            None => {
                tracing::debug!(type_name, "no creator registered, using neutral primitive");
                Primitive::neutral()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_detach() {
        let parent = Primitive::new("Window", false);
        let a = Primitive::new("Button", true);
        let b = Primitive::new("Button", true);

        parent.add_child(&a, 0);
        parent.add_child(&b, 1);
        assert_eq!(parent.child_count(), 2);
        assert!(a.is_attached());

        a.detach();
        assert_eq!(parent.child_count(), 1);
        assert!(!a.is_attached());
        assert!(b.is_attached());
    }

    #[test]
    fn test_reattach_moves_between_parents() {
        let first = Primitive::new("Window", false);
        let second = Primitive::new("Window", false);
        let child = Primitive::new("Text", false);

        first.add_child(&child, 0);
        second.add_child(&child, 0);
        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
    }

    #[test]
    fn test_factory_known_type() {
        let factory = ComponentFactory::default();
        let button = factory.create("Button");
        assert_eq!(button.type_tag(), "Button");
        assert!(button.is_interactive());
    }

    #[test]
    fn test_factory_unknown_type_is_neutral() {
        let factory = ComponentFactory::default();
        let mystery = factory.create("Carousel");
        assert_eq!(mystery.type_tag(), "neutral");
        assert!(!mystery.is_interactive());
        assert_eq!(mystery.child_count(), 0);
    }

    #[test]
    fn test_factory_registration_overrides() {
        let mut factory = ComponentFactory::default();
        factory.register("Carousel", || Primitive::new("Carousel", true));
        assert_eq!(factory.create("Carousel").type_tag(), "Carousel");
    }
}
