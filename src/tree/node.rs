//! The `Node` handle: the public face of the declarative tree.
//!
//! A `Node` is a cheap, cloneable alias onto one node of a shared arena.
//! Any number of handles may point at the same underlying node; mutations
//! through one handle are visible through all of them and are announced to
//! subscribers synchronously, before the mutating call returns.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::store::{dispatch, NodeData, NodeId, Store, Subscription};
use super::value::{FromValue, IntoValue, Value};

/// A mutation announced to tree subscribers.
#[derive(Clone)]
pub enum TreeEvent {
    /// An attribute was written or removed on `node`.
    AttributeChanged { node: Node, key: String },
    /// `child` was inserted under `parent` at `index`.
    ChildAdded { parent: Node, child: Node, index: usize },
    /// `child` was detached from `parent`; it occupied `index`.
    ChildRemoved { parent: Node, child: Node, index: usize },
}

/// An aliasing handle to one declarative node.
#[derive(Clone)]
pub struct Node {
    store: Rc<RefCell<Store>>,
    id: NodeId,
}

impl Node {
    /// Create the root node of a fresh document.
    pub fn new(type_name: &str) -> Self {
        let mut store = Store::new();
        let id = store.create(NodeData::new(type_name));
        Self { store: Rc::new(RefCell::new(store)), id }
    }

    pub(crate) fn from_parts(store: Rc<RefCell<Store>>, id: NodeId) -> Self {
        Self { store, id }
    }

    pub(crate) fn store(&self) -> &Rc<RefCell<Store>> {
        &self.store
    }

    /// A handle to another node in the same document, e.g. one named by a
    /// [`TreeEvent`].
    pub fn with_id(&self, id: NodeId) -> Node {
        Node::from_parts(Rc::clone(&self.store), id)
    }

    /// The stable arena handle for this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether the underlying node still exists (it may have been removed
    /// while this handle was held).
    pub fn exists(&self) -> bool {
        self.store.borrow().contains(self.id)
    }

    /// The node's type name, e.g. `"Button"`.
    pub fn type_name(&self) -> String {
        self.store
            .borrow()
            .nodes
            .get(self.id)
            .map(|data| data.type_name.clone())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Read an attribute's raw value.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        let store = self.store.borrow();
        let data = store.nodes.get(self.id)?;
        data.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }

    /// Read an attribute converted to `T`.
    pub fn attribute_as<T: FromValue>(&self, key: &str) -> Option<T> {
        self.attribute(key).as_ref().and_then(T::from_value)
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Write an attribute. Subscribers are notified before this returns,
    /// unless the stored value is already equal to the new one.
    pub fn set_attribute(&self, key: &str, value: impl IntoValue) {
        let value = value.into_value();
        {
            let mut store = self.store.borrow_mut();
            let Some(data) = store.nodes.get_mut(self.id) else {
                return;
            };
            match data.attributes.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => {
                    if *existing == value {
                        return;
                    }
                    *existing = value;
                }
                None => data.attributes.push((key.to_string(), value)),
            }
        }
        dispatch(
            &self.store,
            &TreeEvent::AttributeChanged { node: self.clone(), key: key.to_string() },
        );
    }

    /// Remove an attribute; no-op (and no notification) if absent.
    pub fn remove_attribute(&self, key: &str) {
        let removed = {
            let mut store = self.store.borrow_mut();
            let Some(data) = store.nodes.get_mut(self.id) else {
                return;
            };
            let before = data.attributes.len();
            data.attributes.retain(|(name, _)| name != key);
            data.attributes.len() != before
        };
        if removed {
            dispatch(
                &self.store,
                &TreeEvent::AttributeChanged { node: self.clone(), key: key.to_string() },
            );
        }
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> Vec<String> {
        let store = self.store.borrow();
        store
            .nodes
            .get(self.id)
            .map(|data| data.attributes.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// The node's parent, if attached.
    pub fn parent(&self) -> Option<Node> {
        let parent = self.store.borrow().parent(self.id)?;
        Some(Node::from_parts(Rc::clone(&self.store), parent))
    }

    /// Walk up to the top of the tree.
    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self) -> Vec<Node> {
        let mut result = Vec::new();
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            result.push(parent.clone());
            current = parent;
        }
        result
    }

    /// Whether `self` is a (transitive) ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        other.ancestors().iter().any(|ancestor| ancestor == self)
    }

    /// Child handles in declaration order.
    pub fn children(&self) -> Vec<Node> {
        let store = self.store.borrow();
        store
            .children(self.id)
            .iter()
            .map(|&id| Node::from_parts(Rc::clone(&self.store), id))
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.store.borrow().children(self.id).len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        let store = self.store.borrow();
        let id = *store.children(self.id).get(index)?;
        Some(Node::from_parts(Rc::clone(&self.store), id))
    }

    /// Index of `child` among this node's children.
    pub fn index_of(&self, child: &Node) -> Option<usize> {
        self.store.borrow().children(self.id).iter().position(|&id| id == child.id)
    }

    /// Create a new child of the given type, appended after any existing
    /// children. Subscribers are notified of the addition before this
    /// returns (and before any attributes are set on the child).
    pub fn append(&self, type_name: &str) -> Node {
        let index = self.child_count();
        self.insert(index, type_name)
    }

    /// Create a new child of the given type at `index`.
    pub fn insert(&self, index: usize, type_name: &str) -> Node {
        let child = self.create_detached(type_name);
        self.attach_child(&child, index);
        child
    }

    /// Create a node in this document's arena without attaching it.
    pub(crate) fn create_detached(&self, type_name: &str) -> Node {
        let id = self.store.borrow_mut().create(NodeData::new(type_name));
        Node::from_parts(Rc::clone(&self.store), id)
    }

    /// Attach an already-built (detached) node of the same document.
    pub(crate) fn attach_child(&self, child: &Node, index: usize) {
        debug_assert!(
            Rc::ptr_eq(&self.store, &child.store),
            "child belongs to a different document"
        );
        let index = {
            let mut store = self.store.borrow_mut();
            let clamped = index.min(store.children(self.id).len());
            store.attach(self.id, child.id, clamped);
            clamped
        };
        dispatch(
            &self.store,
            &TreeEvent::ChildAdded { parent: self.clone(), child: child.clone(), index },
        );
    }

    /// Detach `child` without destroying its subtree, notifying subscribers.
    pub(crate) fn detach_child(&self, child: &Node) -> Option<usize> {
        let index = self.store.borrow_mut().detach(self.id, child.id)?;
        dispatch(
            &self.store,
            &TreeEvent::ChildRemoved { parent: self.clone(), child: child.clone(), index },
        );
        Some(index)
    }

    /// Remove `child` and destroy its whole subtree.
    ///
    /// Subscribers are notified after the child is detached but before its
    /// data is destroyed, so handles held by listeners still read normally
    /// during the callback.
    pub fn remove_child(&self, child: &Node) {
        if self.detach_child(child).is_some() {
            self.store.borrow_mut().destroy_subtree(child.id);
        }
    }

    // -----------------------------------------------------------------------
    // Copying
    // -----------------------------------------------------------------------

    /// Deep-copy this subtree into a fresh document.
    pub fn deep_copy(&self) -> Node {
        let store = Rc::new(RefCell::new(Store::new()));
        let id = self.copy_into(&store);
        Node::from_parts(store, id)
    }

    /// Deep-copy this subtree into `target` (detached), returning the copy's
    /// root id.
    pub(crate) fn copy_into(&self, target: &Rc<RefCell<Store>>) -> NodeId {
        let data = {
            let store = self.store.borrow();
            let source = store.nodes.get(self.id);
            NodeData {
                type_name: source.map(|d| d.type_name.clone()).unwrap_or_default(),
                attributes: source.map(|d| d.attributes.clone()).unwrap_or_default(),
            }
        };
        let id = target.borrow_mut().create(data);
        for (index, child) in self.children().iter().enumerate() {
            let child_id = child.copy_into(target);
            target.borrow_mut().attach(id, child_id, index);
        }
        id
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Subscribe to every mutation of this node's document.
    ///
    /// The subscription is store-wide: the callback sees changes anywhere in
    /// the tree and filters for relevance itself. Callbacks run in
    /// registration order, synchronously within the mutating call.
    pub fn subscribe(&self, callback: impl FnMut(&TreeEvent) + 'static) -> Subscription {
        let id = self.store.borrow_mut().subscribe(Rc::new(RefCell::new(callback)));
        Subscription::new(&self.store, id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && self.id == other.id
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node<{}>({:?})", self.type_name(), self.id)
    }
}
