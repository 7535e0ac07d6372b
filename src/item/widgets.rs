//! Content decorators for the built-in widget types.
//!
//! These sit between the hereditary layout decorator and the display
//! container. Concrete painting lives behind the primitive; the decorators
//! only keep the primitive in step with the widget attributes and classify
//! the item as content where it cannot take children.

use std::any::Any;
use std::rc::Rc;

use crate::binding::Property;
use crate::item::{GuiItem, Item, ItemRef};

/// Text renders its `text` attribute and takes no children.
pub struct TextWidget {
    inner: ItemRef,
    _text: Property<String>,
}

impl TextWidget {
    pub fn new(inner: ItemRef) -> Rc<TextWidget> {
        let state = inner.state().clone();
        let text = Property::<String>::new(&state, "text");

        let primitive = inner.primitive();
        primitive.set_text(&text.get());
        {
            let primitive = primitive.clone();
            let text_value = Property::<String>::new(&state, "text");
            text.on_change(move || {
                primitive.set_text(&text_value.get());
            });
        }

        Rc::new(TextWidget { inner, _text: text })
    }
}

impl GuiItem for TextWidget {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        Some(self.inner.as_ref())
    }

    fn base(&self) -> &Item {
        self.inner.base()
    }

    fn is_container(&self) -> bool {
        false
    }

    fn is_content(&self) -> bool {
        true
    }
}

/// Button behaviour: an interactive widget whose `toggled` flag feeds the
/// style snapshot through the `checked` facet.
pub struct ButtonWidget {
    inner: ItemRef,
    _toggled: Property<bool>,
}

impl ButtonWidget {
    pub fn new(inner: ItemRef) -> Rc<ButtonWidget> {
        let state = inner.state().clone();
        if !state.has_attribute("toggled") {
            state.set_attribute("toggled", false);
        }

        let toggled = Property::<bool>::new(&state, "toggled");
        {
            let mirror = state.clone();
            toggled.on_change(move || {
                let on = mirror.attribute_as::<bool>("toggled").unwrap_or(false);
                mirror.set_attribute("checked", on);
            });
        }

        Rc::new(ButtonWidget {
            inner,
            _toggled: toggled,
        })
    }
}

impl GuiItem for ButtonWidget {
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

/// Image renders an external source and takes no children.
pub struct ImageWidget {
    inner: ItemRef,
    _source: Property<String>,
}

impl ImageWidget {
    pub fn new(inner: ItemRef) -> Rc<ImageWidget> {
        let state = inner.state().clone();
        let source = Property::<String>::new(&state, "source");
        {
            let source_value = Property::<String>::new(&state, "source");
            source.on_change(move || {
                tracing::debug!(source = %source_value.get(), "image source changed");
            });
        }

        Rc::new(ImageWidget {
            inner,
            _source: source,
        })
    }
}

impl GuiItem for ImageWidget {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        Some(self.inner.as_ref())
    }

    fn base(&self) -> &Item {
        self.inner.base()
    }

    fn is_container(&self) -> bool {
        false
    }

    fn is_content(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{CommonItem, Primitive};
    use crate::tree::Node;

    #[test]
    fn test_text_flows_into_primitive() {
        let node = Node::new("Text");
        node.set_attribute("text", "hello");

        let widget = TextWidget::new(CommonItem::new(Item::new(
            node.clone(),
            Primitive::new("Text", false),
            None,
        )));
        assert_eq!(widget.primitive().text(), "hello");

        node.set_attribute("text", "goodbye");
        assert_eq!(widget.primitive().text(), "goodbye");
    }

    #[test]
    fn test_text_is_content_not_container() {
        let node = Node::new("Text");
        let widget = TextWidget::new(CommonItem::new(Item::new(
            node,
            Primitive::new("Text", false),
            None,
        )));
        assert!(widget.is_content());
        assert!(!widget.is_container());
    }

    #[test]
    fn test_button_mirrors_toggled_into_checked() {
        let node = Node::new("Button");
        let _widget = ButtonWidget::new(CommonItem::new(Item::new(
            node.clone(),
            Primitive::new("Button", true),
            None,
        )));

        node.set_attribute("toggled", true);
        assert_eq!(node.attribute_as::<bool>("checked"), Some(true));

        node.set_attribute("toggled", false);
        assert_eq!(node.attribute_as::<bool>("checked"), Some(false));
    }

    #[test]
    fn test_button_remains_a_container() {
        let node = Node::new("Button");
        let widget = ButtonWidget::new(CommonItem::new(Item::new(
            node,
            Primitive::new("Button", true),
            None,
        )));
        assert!(widget.is_container());
        assert!(!widget.is_content());
    }

    #[test]
    fn test_image_is_content() {
        let node = Node::new("Image");
        node.set_attribute("source", "logo.png");
        let widget = ImageWidget::new(CommonItem::new(Item::new(
            node,
            Primitive::new("Image", false),
            None,
        )));
        assert!(widget.is_content());
        assert!(!widget.is_container());
    }
}
