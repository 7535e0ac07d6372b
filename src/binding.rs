//! Reactive attribute bindings.
//!
//! A [`Property`] is a typed read/write view onto one attribute of one
//! declarative node. Reads may consult ancestor nodes, per an inheritance
//! policy, but never mutate the tree; writes always land on the bound node.
//! A registered change callback fires synchronously whenever the bound key
//! changes on any node the binding's lookup chain consults.

use std::cell::RefCell;
use std::rc::Rc;

use crate::tree::{Combine, FromValue, IntoValue, Node, Subscription, TreeEvent};

/// Which nodes a binding consults when the bound node lacks the key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Inheritance {
    /// Read only the bound node.
    DoNotInherit,
    /// Fall back exactly one level up.
    FromParent,
    /// Walk upward until the key is found or the root is reached.
    FromAncestors,
}

type ChangeCallback = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// A typed binding onto one node attribute.
pub struct Property<T> {
    node: Node,
    key: String,
    inheritance: Inheritance,
    /// Present only for accumulating bindings; folds chain values root-first.
    combine: Option<Rc<dyn Fn(T, T) -> T>>,
    on_change: ChangeCallback,
    _subscription: Subscription,
}

impl<T: FromValue> Property<T> {
    /// A non-inheriting binding.
    pub fn new(node: &Node, key: &str) -> Self {
        Self::with_inheritance(node, key, Inheritance::DoNotInherit)
    }

    /// A binding that falls back to the immediate parent.
    pub fn inheriting_from_parent(node: &Node, key: &str) -> Self {
        Self::with_inheritance(node, key, Inheritance::FromParent)
    }

    /// A binding that falls back to the nearest defining ancestor.
    pub fn inheriting_from_ancestors(node: &Node, key: &str) -> Self {
        Self::with_inheritance(node, key, Inheritance::FromAncestors)
    }

    /// A binding that concatenates every defining ancestor's value, root
    /// first, ending with the bound node's own value.
    pub fn accumulating(node: &Node, key: &str) -> Self
    where
        T: Combine + 'static,
    {
        let mut property = Self::with_inheritance(node, key, Inheritance::FromAncestors);
        property.combine = Some(Rc::new(T::combine));
        property
    }

    fn with_inheritance(node: &Node, key: &str, inheritance: Inheritance) -> Self {
        let on_change: ChangeCallback = Rc::new(RefCell::new(None));
        let subscription = {
            let on_change = Rc::clone(&on_change);
            let bound = node.clone();
            let key = key.to_string();
            node.subscribe(move |event| {
                let TreeEvent::AttributeChanged { node: changed, key: changed_key } = event
                else {
                    return;
                };
                if *changed_key != key || !is_relevant(&bound, changed, inheritance) {
                    return;
                }
                let callback = Rc::clone(&on_change);
                let mut slot = callback.borrow_mut();
                if let Some(callback) = slot.as_mut() {
                    callback();
                }
            })
        };
        Self {
            node: node.clone(),
            key: key.to_string(),
            inheritance,
            combine: None,
            on_change,
            _subscription: subscription,
        }
    }

    /// Whether the bound node itself defines the key.
    pub fn exists(&self) -> bool {
        self.node.has_attribute(&self.key)
    }

    /// Resolve the binding's current value, applying the inheritance and
    /// accumulation policies. Pure: never mutates the tree.
    pub fn resolve(&self) -> Option<T> {
        if let Some(combine) = &self.combine {
            return self.resolve_accumulated(combine);
        }
        if let Some(value) = self.node.attribute_as::<T>(&self.key) {
            return Some(value);
        }
        match self.inheritance {
            Inheritance::DoNotInherit => None,
            Inheritance::FromParent => {
                self.node.parent().and_then(|parent| parent.attribute_as::<T>(&self.key))
            }
            Inheritance::FromAncestors => self
                .node
                .ancestors()
                .iter()
                .find_map(|ancestor| ancestor.attribute_as::<T>(&self.key)),
        }
    }

    fn resolve_accumulated(&self, combine: &Rc<dyn Fn(T, T) -> T>) -> Option<T> {
        let mut chain = self.node.ancestors();
        chain.reverse();
        chain.push(self.node.clone());

        let mut result: Option<T> = None;
        for node in &chain {
            if let Some(value) = node.attribute_as::<T>(&self.key) {
                result = Some(match result {
                    Some(acc) => combine(acc, value),
                    None => value,
                });
            }
        }
        result
    }

    /// Resolve, or fall back to `fallback` when absent at every level.
    pub fn get_or(&self, fallback: T) -> T {
        self.resolve().unwrap_or(fallback)
    }

    /// The bound key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The bound node.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Register a change callback. It fires synchronously, inside the
    /// mutating `set_attribute` call, whenever the key changes on the bound
    /// node or on any ancestor the inheritance policy consults.
    pub fn on_change(&self, callback: impl FnMut() + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(callback));
    }

    /// Drop any registered change callback.
    pub fn clear_on_change(&self) {
        *self.on_change.borrow_mut() = None;
    }
}

impl<T: FromValue + Default> Property<T> {
    /// Resolve, or a type-appropriate zero value when absent at every level.
    pub fn get(&self) -> T {
        self.resolve().unwrap_or_default()
    }
}

impl<T: FromValue + IntoValue> Property<T> {
    /// Write the value into the bound node. Never writes an ancestor, even
    /// under inheriting policies.
    pub fn set(&self, value: T) {
        self.node.set_attribute(&self.key, value);
    }

    /// Remove the key from the bound node.
    pub fn clear(&self) {
        self.node.remove_attribute(&self.key);
    }
}

/// Whether a change on `changed` is visible to a binding on `bound`.
fn is_relevant(bound: &Node, changed: &Node, inheritance: Inheritance) -> bool {
    if changed == bound {
        return true;
    }
    match inheritance {
        Inheritance::DoNotInherit => false,
        Inheritance::FromParent => bound.parent().as_ref() == Some(changed),
        Inheritance::FromAncestors => changed.is_ancestor_of(bound),
    }
}
