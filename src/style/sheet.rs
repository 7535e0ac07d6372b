//! Flattening of nested style objects into selector rules.
//!
//! A `style` attribute holds an object whose keys are either property names
//! or selector refinements wrapping a nested object:
//!
//! ```text
//! {
//!     "background": "#333",
//!     "hover":    { "background": "#444" },
//!     "Button":   { "foreground": "white", "#ok": { ... } },
//!     ".primary": { ... },
//!     "disabled": { ... },
//! }
//! ```
//!
//! Nesting composes: a property inside `"Button"` inside `"hover"` gets a
//! selector constraining both facets. Declaration order is preserved so the
//! cascade can break specificity ties in favour of later rules.

use std::collections::HashMap;

use crate::style::selector::{find_style, KeyboardState, MouseState, Selector, Snapshot};
use crate::tree::Value;

/// All rules from one `style` attribute, indexed by property name.
#[derive(Default)]
pub struct StyleSheet {
    rules: HashMap<String, Vec<(Selector, Value)>>,
}

impl StyleSheet {
    /// Flatten a style object. Non-object values yield an empty sheet.
    pub fn from_value(value: &Value) -> Self {
        let mut sheet = StyleSheet::default();
        sheet.collect(value, &Selector::default());
        sheet
    }

    fn collect(&mut self, value: &Value, selector: &Selector) {
        let Value::Object(entries) = value else {
            return;
        };

        for (key, entry) in entries {
            match entry {
                Value::Object(_) => {
                    let refined = refine_selector(selector, key);
                    self.collect(entry, &refined);
                }
                _ => {
                    self.rules
                        .entry(key.clone())
                        .or_default()
                        .push((selector.clone(), entry.clone()));
                }
            }
        }
    }

    /// Resolve `property` against the node snapshot.
    pub fn find(&self, property: &str, snapshot: &Snapshot) -> Option<&Value> {
        find_style(self.rules.get(property)?, snapshot)
    }

    /// Property names this sheet can ever produce a value for.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Interpret a nested-object key as a selector refinement.
fn refine_selector(base: &Selector, key: &str) -> Selector {
    let mut selector = base.clone();

    if let Some(id) = key.strip_prefix('#') {
        selector.id = id.to_string();
    } else if let Some(class) = key.strip_prefix('.') {
        selector.class = class.to_string();
    } else {
        match key {
            "hover" => selector.mouse = MouseState::Hover,
            "active" => selector.mouse = MouseState::Active,
            "focus" => selector.keyboard = KeyboardState::Focus,
            "disabled" => selector.enabled = false,
            "checked" => selector.toggled = true,
            type_name => selector.type_name = type_name.to_string(),
        }
    }

    selector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: Vec<(&str, Value)>) -> Value {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn snapshot(type_name: &str) -> Snapshot {
        Snapshot {
            type_name: type_name.into(),
            enabled: true,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_top_level_properties_apply_everywhere() {
        let sheet = StyleSheet::from_value(&object(vec![
            ("background", Value::String("#333".into())),
        ]));
        assert_eq!(
            sheet.find("background", &snapshot("Button")),
            Some(&Value::String("#333".into())),
        );
        assert_eq!(
            sheet.find("background", &snapshot("Slider")),
            Some(&Value::String("#333".into())),
        );
        assert_eq!(sheet.find("foreground", &snapshot("Button")), None);
    }

    #[test]
    fn test_type_refinement() {
        let sheet = StyleSheet::from_value(&object(vec![
            ("background", Value::String("#333".into())),
            (
                "Button",
                object(vec![("background", Value::String("#555".into()))]),
            ),
        ]));
        assert_eq!(
            sheet.find("background", &snapshot("Button")),
            Some(&Value::String("#555".into())),
        );
        assert_eq!(
            sheet.find("background", &snapshot("Slider")),
            Some(&Value::String("#333".into())),
        );
    }

    #[test]
    fn test_interaction_refinement_requires_state() {
        let sheet = StyleSheet::from_value(&object(vec![
            ("background", Value::String("base".into())),
            ("hover", object(vec![("background", Value::String("hot".into()))])),
        ]));

        assert_eq!(
            sheet.find("background", &snapshot("Button")),
            Some(&Value::String("base".into())),
        );

        let hovered = Snapshot {
            mouse: MouseState::Hover,
            ..snapshot("Button")
        };
        assert_eq!(
            sheet.find("background", &hovered),
            Some(&Value::String("hot".into())),
        );
    }

    #[test]
    fn test_nesting_composes_facets() {
        let sheet = StyleSheet::from_value(&object(vec![(
            "hover",
            object(vec![(
                "Button",
                object(vec![("foreground", Value::String("white".into()))]),
            )]),
        )]));

        let hovered_button = Snapshot {
            mouse: MouseState::Hover,
            ..snapshot("Button")
        };
        let hovered_slider = Snapshot {
            mouse: MouseState::Hover,
            ..snapshot("Slider")
        };
        assert_eq!(
            sheet.find("foreground", &hovered_button),
            Some(&Value::String("white".into())),
        );
        assert_eq!(sheet.find("foreground", &hovered_slider), None);
        assert_eq!(sheet.find("foreground", &snapshot("Button")), None);
    }

    #[test]
    fn test_id_beats_type_in_same_sheet() {
        let sheet = StyleSheet::from_value(&object(vec![
            (
                "Button",
                object(vec![("background", Value::String("by-type".into()))]),
            ),
            (
                "#ok",
                object(vec![("background", Value::String("by-id".into()))]),
            ),
        ]));
        let target = Snapshot {
            id: "ok".into(),
            ..snapshot("Button")
        };
        assert_eq!(
            sheet.find("background", &target),
            Some(&Value::String("by-id".into())),
        );
    }

    #[test]
    fn test_disabled_refinement() {
        let sheet = StyleSheet::from_value(&object(vec![(
            "disabled",
            object(vec![("opacity", Value::Number(0.5))]),
        )]));
        assert_eq!(sheet.find("opacity", &snapshot("Button")), None);

        let disabled = Snapshot {
            enabled: false,
            ..snapshot("Button")
        };
        assert_eq!(sheet.find("opacity", &disabled), Some(&Value::Number(0.5)));
    }

    #[test]
    fn test_non_object_value_is_empty() {
        let sheet = StyleSheet::from_value(&Value::String("nope".into()));
        assert!(sheet.is_empty());
    }
}
