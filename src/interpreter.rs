//! Materializing a declarative tree into runtime items.
//!
//! `interpret` walks a node tree and builds one decorated item per node:
//!
//! 1. alias expansion replaces aliased nodes with their template subtree,
//!    original attributes and children carried over;
//! 2. the component factory provides the native primitive (unknown types get
//!    a neutral one);
//! 3. the decorator chain is assembled in a fixed order: the base [`Item`],
//!    then [`CommonItem`], then the hereditary decorator chosen by the
//!    parent's `display`, then the widget decorator chosen by the type name,
//!    then (for non-content items) the display container chosen by the
//!    item's own `display`, then any caller-registered decorators;
//! 4. children recurse in declaration order; a child is attached only when
//!    the parent accepts children or the child is content.
//!
//! `listen_to` keeps a materialized tree live: nodes added to the
//! declarative tree afterwards are interpreted and inserted at the same
//! index, synchronously within the mutating call.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::item::{
    BlockChild, BlockContainer, ButtonWidget, CommonItem, ComponentFactory, FlexChild,
    FlexContainer, GridChild, GridContainer, ImageWidget, Item, ItemRef, TextWidget,
};
use crate::markup;
use crate::tree::{Node, Subscription, TreeEvent};

type Decorator = Box<dyn Fn(ItemRef) -> ItemRef>;

pub struct Interpreter {
    factory: ComponentFactory,
    aliases: HashMap<String, Node>,
    decorators: Vec<Decorator>,
    /// Suppresses live re-interpretation while an interpretation pass is
    /// itself mutating the tree (alias expansion).
    interpreting: Cell<bool>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            factory: ComponentFactory::default(),
            aliases: HashMap::new(),
            decorators: Vec::new(),
            interpreting: Cell::new(false),
        }
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.factory
    }

    /// Register a template subtree for a type name. Interpreting a node of
    /// that type replaces it with a copy of the template.
    pub fn add_alias(&mut self, name: &str, template: Node) {
        self.aliases.insert(name.to_string(), template);
    }

    /// Register a decorator applied to every interpreted item, outermost.
    /// Decorators run in registration order.
    pub fn add_decorator(&mut self, decorator: impl Fn(ItemRef) -> ItemRef + 'static) {
        self.decorators.push(Box::new(decorator));
    }

    /// Materialize `node` and its subtree.
    pub fn interpret(&self, node: &Node) -> ItemRef {
        self.interpreting.set(true);
        let item = self.interpret_subtree(node, None);
        self.interpreting.set(false);
        item
    }

    /// Parse markup, then materialize the resulting tree.
    pub fn interpret_str(&self, text: &str) -> Result<ItemRef, Error> {
        let node = markup::parse(text)?;
        Ok(self.interpret(&node))
    }

    /// Keep `root` live: nodes added beneath it afterwards are interpreted
    /// and inserted at the same index. Drop the subscription to stop.
    pub fn listen_to(self: &Rc<Self>, root: &ItemRef) -> Subscription {
        let weak_root = Rc::downgrade(root);
        let weak_interpreter = Rc::downgrade(self);
        root.state().subscribe(move |event| {
            let TreeEvent::ChildAdded { parent, child, index } = event else {
                return;
            };
            let (Some(root), Some(interpreter)) =
                (weak_root.upgrade(), weak_interpreter.upgrade())
            else {
                return;
            };
            if interpreter.interpreting.get() {
                return;
            }
            let Some(parent_item) = find_item(&root, parent) else {
                return;
            };

            interpreter.interpreting.set(true);
            let child_item = interpreter.interpret_subtree(child, Some(&parent_item));
            interpreter.interpreting.set(false);

            if parent_item.is_container() || child_item.is_content() {
                parent_item.insert_child(child_item, *index);
            }
        })
    }

    fn interpret_subtree(&self, node: &Node, parent: Option<&ItemRef>) -> ItemRef {
        let node = self.expand_alias(node);
        let type_name = node.type_name();

        let primitive = self.factory.create(&type_name);
        let base = Item::new(node.clone(), primitive, parent);
        let mut item: ItemRef = CommonItem::new(base);

        if let Some(parent) = parent {
            item = match display_of(parent.state()).as_str() {
                "grid" => GridChild::new(item),
                "block" => BlockChild::new(item),
                _ => FlexChild::new(item),
            };
        }

        item = match type_name.as_str() {
            "Text" => TextWidget::new(item),
            "Button" => ButtonWidget::new(item),
            "Image" => ImageWidget::new(item),
            _ => item,
        };

        if !item.is_content() {
            item = match display_of(&node).as_str() {
                "grid" => GridContainer::new(item),
                "block" => BlockContainer::new(item),
                _ => FlexContainer::new(item),
            };
        }

        for decorator in &self.decorators {
            item = decorator(item);
        }

        let mut children = Vec::new();
        for child_node in node.children() {
            let child = self.interpret_subtree(&child_node, Some(&item));
            if item.is_container() || child.is_content() {
                children.push(child);
            }
        }
        if !children.is_empty() {
            item.set_children(children);
        }

        item
    }

    /// Replace an aliased node with a copy of its template, in place. The
    /// original node's attributes override the template's, and its children
    /// are re-attached after the template's own.
    fn expand_alias(&self, node: &Node) -> Node {
        let Some(template) = self.aliases.get(&node.type_name()) else {
            return node.clone();
        };

        let replacement_id = template.copy_into(node.store());
        let replacement = node.with_id(replacement_id);

        for key in node.attribute_names() {
            if let Some(value) = node.attribute(&key) {
                replacement.set_attribute(&key, value);
            }
        }

        let base = replacement.child_count();
        for (offset, child) in node.children().into_iter().enumerate() {
            node.detach_child(&child);
            replacement.attach_child(&child, base + offset);
        }

        if let Some(parent) = node.parent() {
            let index = parent.index_of(node).unwrap_or(0);
            parent.remove_child(node);
            parent.attach_child(&replacement, index);
        }

        replacement
    }
}

fn display_of(node: &Node) -> String {
    node.attribute_as::<String>("display")
        .unwrap_or_else(|| "flex".to_string())
}

/// Depth-first search for the item materialized from `state`.
fn find_item(item: &ItemRef, state: &Node) -> Option<ItemRef> {
    if item.state() == state {
        return Some(Rc::clone(item));
    }
    item.children()
        .iter()
        .find_map(|child| find_item(child, state))
}
