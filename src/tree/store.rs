//! The arena backing a declarative tree.
//!
//! All nodes of one document live in a single `SlotMap`. Parent/child
//! relationships are stored in secondary maps so that node removal is
//! O(subtree size) and lookup is O(1). Listeners are store-wide: every
//! subscriber sees every mutation and filters for relevance itself, which is
//! what lets a binding observe ancestor nodes it is not directly bound to.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use super::node::TreeEvent;
use super::value::Value;

new_key_type! {
    /// Stable handle to a node in the arena.
    pub struct NodeId;
}

/// The payload of one declarative node.
pub(crate) struct NodeData {
    pub type_name: String,
    /// Ordered so iteration (and attribute carry-over) is deterministic.
    pub attributes: Vec<(String, Value)>,
}

impl NodeData {
    pub(crate) fn new(type_name: &str) -> Self {
        Self { type_name: type_name.to_string(), attributes: Vec::new() }
    }
}

pub(crate) type ListenerCallback = Rc<RefCell<dyn FnMut(&TreeEvent)>>;

struct ListenerEntry {
    id: u64,
    callback: ListenerCallback,
}

pub(crate) struct Store {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Create a detached node. It has no parent until attached.
    pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attach a detached node as a child of `parent` at `index`.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        debug_assert!(self.parent.get(child).is_none(), "child is already attached");
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, child);
        }
    }

    /// Detach `child` from its parent, keeping its subtree in the arena.
    ///
    /// Returns the index it occupied.
    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        if self.parent.get(child).copied() != Some(parent) {
            return None;
        }
        self.parent.remove(child);
        let siblings = self.children.get_mut(parent)?;
        let index = siblings.iter().position(|&c| c == child)?;
        siblings.remove(index);
        Some(index)
    }

    /// Destroy a detached node and all its descendants.
    pub(crate) fn destroy_subtree(&mut self, id: NodeId) {
        let mut queue = VecDeque::new();
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                queue.extend(kids);
            }
            self.parent.remove(current);
            self.nodes.remove(current);
        }
    }

    pub(crate) fn subscribe(&mut self, callback: ListenerCallback) -> u64 {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push(ListenerEntry { id, callback });
        id
    }

    /// Remove a listener, handing its callback back to the caller.
    ///
    /// The callback must not be dropped while the store is borrowed: tearing
    /// it down can drop items whose own subscriptions re-enter the store.
    pub(crate) fn unsubscribe(&mut self, id: u64) -> Option<ListenerCallback> {
        let index = self.listeners.iter().position(|entry| entry.id == id)?;
        Some(self.listeners.remove(index).callback)
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners.iter().any(|entry| entry.id == id)
    }

    fn collect_listeners(&self) -> Vec<(u64, ListenerCallback)> {
        self.listeners
            .iter()
            .map(|entry| (entry.id, Rc::clone(&entry.callback)))
            .collect()
    }
}

/// Notify every listener of `event`, in registration order.
///
/// The store borrow is released before any callback runs so callbacks are
/// free to mutate the tree. A callback that is already running higher up the
/// stack is skipped rather than re-entered.
pub(crate) fn dispatch(store: &Rc<RefCell<Store>>, event: &TreeEvent) {
    let listeners = store.borrow().collect_listeners();
    for (id, callback) in listeners {
        if !store.borrow().is_subscribed(id) {
            continue;
        }
        if let Ok(mut callback) = callback.try_borrow_mut() {
            callback(event);
        }
    }
}

/// Keeps a tree listener registered; unsubscribes when dropped.
pub struct Subscription {
    store: Weak<RefCell<Store>>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(store: &Rc<RefCell<Store>>, id: u64) -> Self {
        Self { store: Rc::downgrade(store), id }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        // The borrow ends before the callback drops.
        let callback = store.borrow_mut().unsubscribe(self.id);
        drop(callback);
    }
}
