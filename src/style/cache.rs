//! Per-node style resolution with property-level caching.
//!
//! A resolver derives everything from the declarative tree: the sheets come
//! from the `style` attribute of the node and its ancestors (nearest sheet
//! wins), and the snapshot comes from the node's current attributes. Both are
//! re-derived when the tree says so; cached lookups are only ever a shortcut,
//! never an independent source of truth.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::style::selector::{KeyboardState, MouseState, Snapshot};
use crate::style::sheet::StyleSheet;
use crate::tree::{FromValue, Node, Subscription, TreeEvent, Value};

/// Attributes that feed the selector snapshot. A write to any of these
/// invalidates cached lookups without rebuilding the sheets.
const FACET_KEYS: &[&str] = &["id", "class", "enabled", "hover", "active", "focus", "checked"];

struct ResolverState {
    sheets: RefCell<Vec<StyleSheet>>,
    sheets_dirty: Cell<bool>,
    cache: RefCell<HashMap<String, Option<Value>>>,
}

/// Resolves style properties for one node.
pub struct StyleResolver {
    node: Node,
    state: Rc<ResolverState>,
    _subscription: Subscription,
}

impl StyleResolver {
    pub fn new(node: Node) -> Self {
        let state = Rc::new(ResolverState {
            sheets: RefCell::new(Vec::new()),
            sheets_dirty: Cell::new(true),
            cache: RefCell::new(HashMap::new()),
        });

        let weak: Weak<ResolverState> = Rc::downgrade(&state);
        let observed = node.clone();
        let subscription = node.subscribe(move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match event {
                TreeEvent::AttributeChanged { node: changed, key } => {
                    if key == "style"
                        && (*changed == observed || changed.is_ancestor_of(&observed))
                    {
                        state.sheets_dirty.set(true);
                        state.cache.borrow_mut().clear();
                    } else if *changed == observed && FACET_KEYS.contains(&key.as_str()) {
                        state.cache.borrow_mut().clear();
                    }
                }
                // Reparenting anywhere above changes which sheets apply.
                TreeEvent::ChildAdded { child, .. } | TreeEvent::ChildRemoved { child, .. } => {
                    if *child == observed || child.is_ancestor_of(&observed) {
                        state.sheets_dirty.set(true);
                        state.cache.borrow_mut().clear();
                    }
                }
            }
        });

        Self {
            node,
            state,
            _subscription: subscription,
        }
    }

    /// Resolve a property against the cascade, or `None` when no rule
    /// matches. Callers keep their own default in that case.
    pub fn resolve(&self, property: &str) -> Option<Value> {
        if self.state.sheets_dirty.replace(false) {
            *self.state.sheets.borrow_mut() = self.collect_sheets();
            self.state.cache.borrow_mut().clear();
        }

        if let Some(cached) = self.state.cache.borrow().get(property) {
            return cached.clone();
        }

        let snapshot = snapshot_of(&self.node);
        let resolved = self
            .state
            .sheets
            .borrow()
            .iter()
            .find_map(|sheet| sheet.find(property, &snapshot).cloned());

        self.state
            .cache
            .borrow_mut()
            .insert(property.to_string(), resolved.clone());
        resolved
    }

    /// Resolve and convert in one step. Malformed values read as `None`.
    pub fn resolve_as<T: FromValue>(&self, property: &str) -> Option<T> {
        self.resolve(property).as_ref().and_then(T::from_value)
    }

    /// Sheets from the node outward, so the nearest declaration wins.
    fn collect_sheets(&self) -> Vec<StyleSheet> {
        std::iter::once(self.node.clone())
            .chain(self.node.ancestors())
            .filter_map(|node| node.attribute("style"))
            .map(|value| StyleSheet::from_value(&value))
            .collect()
    }
}

/// Read the selector-relevant attributes of a node.
pub fn snapshot_of(node: &Node) -> Snapshot {
    let flag = |key: &str| node.attribute_as::<bool>(key).unwrap_or(false);

    let mouse = if flag("active") {
        MouseState::Active
    } else if flag("hover") {
        MouseState::Hover
    } else {
        MouseState::Dissociate
    };
    let keyboard = if flag("focus") {
        KeyboardState::Focus
    } else {
        KeyboardState::Dissociate
    };

    Snapshot {
        id: node.attribute_as::<String>("id").unwrap_or_default(),
        classes: node.attribute_as::<Vec<String>>("class").unwrap_or_default(),
        type_name: node.type_name(),
        enabled: node.attribute_as::<bool>("enabled").unwrap_or(true),
        keyboard,
        mouse,
        toggled: flag("checked"),
    }
}
