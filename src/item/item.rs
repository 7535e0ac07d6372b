//! The base item: the innermost link of every decorator chain.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::item::{GuiItem, ItemRef, Primitive};
use crate::tree::{Node, Subscription, TreeEvent};

/// The state-owning core of one runtime item.
///
/// Holds the declarative node, the native primitive, and the child items.
/// The parent pointer refers to the parent's outermost decorator so that
/// removals re-enter the parent chain from the outside, like any other call.
pub struct Item {
    state: Node,
    primitive: Primitive,
    children: RefCell<Vec<ItemRef>>,
    parent: Weak<dyn GuiItem>,
    _remover: Subscription,
}

impl Item {
    /// Build an item for `state`. The remover subscription is registered
    /// here: when the node is detached from the declarative tree, the item
    /// removes itself from its parent item.
    pub fn new(state: Node, primitive: Primitive, parent: Option<&ItemRef>) -> Rc<Item> {
        let parent: Weak<dyn GuiItem> = match parent {
            Some(parent) => Rc::downgrade(parent),
            None => Weak::<Item>::new(),
        };

        let removed = state.clone();
        let removed_parent = parent.clone();
        let remover = state.subscribe(move |event| {
            if let TreeEvent::ChildRemoved { child, .. } = event {
                if *child == removed {
                    if let Some(parent) = removed_parent.upgrade() {
                        parent.remove_child(&removed);
                    }
                }
            }
        });

        Rc::new(Item {
            state,
            primitive,
            children: RefCell::new(Vec::new()),
            parent,
            _remover: remover,
        })
    }

    pub fn state(&self) -> &Node {
        &self.state
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive.clone()
    }

    pub fn children(&self) -> Vec<ItemRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn parent(&self) -> Option<ItemRef> {
        self.parent.upgrade()
    }

    /// Store a child and mirror it into the primitive hierarchy.
    pub(crate) fn insert_direct(&self, child: ItemRef, index: usize) {
        self.primitive.add_child(&child.primitive(), index);
        let mut children = self.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub(crate) fn set_children_direct(&self, new_children: Vec<ItemRef>) {
        for old in self.children.borrow_mut().drain(..) {
            old.primitive().detach();
        }
        for (index, child) in new_children.into_iter().enumerate() {
            self.insert_direct(child, index);
        }
    }

    /// Remove the child for `state`, detaching its primitive first.
    pub(crate) fn remove_direct(&self, state: &Node) -> Option<ItemRef> {
        let index = self
            .children
            .borrow()
            .iter()
            .position(|child| child.state() == state)?;
        let child = self.children.borrow_mut().remove(index);
        child.primitive().detach();
        Some(child)
    }
}

impl GuiItem for Item {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inner(&self) -> Option<&dyn GuiItem> {
        None
    }

    fn base(&self) -> &Item {
        self
    }
}
