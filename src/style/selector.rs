//! Style selectors and best-match scoring.
//!
//! A selector matches a node's current interaction snapshot. Matching is in
//! two phases:
//!
//! 1. **Elimination**: any constrained facet that disagrees with the snapshot
//!    removes the rule outright.
//! 2. **Scoring**: surviving rules get a specificity bitmask; a facet that is
//!    both constrained and matched sets its bit. Bits from least to most
//!    significant: toggled, mouse, keyboard, disabled, type, class, id, so an
//!    id match outranks any combination of the lower facets.
//!
//! Ties go to the most recently registered rule.

/// Pointer interaction state of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseState {
    /// No constraint (on a selector) or no interaction (on a snapshot).
    #[default]
    Dissociate,
    Hover,
    Active,
}

/// Keyboard interaction state of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyboardState {
    #[default]
    Dissociate,
    Focus,
}

/// The facets a style rule may constrain. Empty strings leave the textual
/// facets unconstrained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub id: String,
    pub class: String,
    pub type_name: String,
    pub enabled: bool,
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub toggled: bool,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            id: String::new(),
            class: String::new(),
            type_name: String::new(),
            enabled: true,
            keyboard: KeyboardState::Dissociate,
            mouse: MouseState::Dissociate,
            toggled: false,
        }
    }
}

/// The observable state of one node at resolution time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub id: String,
    pub classes: Vec<String>,
    pub type_name: String,
    pub enabled: bool,
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub toggled: bool,
}

impl Selector {
    fn matches(&self, snapshot: &Snapshot) -> bool {
        if !self.id.is_empty() && self.id != snapshot.id {
            return false;
        }
        if !self.class.is_empty() && !snapshot.classes.contains(&self.class) {
            return false;
        }
        if !self.type_name.is_empty() && self.type_name != snapshot.type_name {
            return false;
        }
        // A disabled-only rule never applies to an enabled node.
        if !self.enabled && snapshot.enabled {
            return false;
        }
        if self.keyboard != KeyboardState::Dissociate && self.keyboard != snapshot.keyboard {
            return false;
        }
        if self.mouse != MouseState::Dissociate && self.mouse != snapshot.mouse {
            return false;
        }
        if self.toggled && !snapshot.toggled {
            return false;
        }

        true
    }

    fn score(&self, snapshot: &Snapshot) -> u32 {
        let mut score = 0u32;

        if self.toggled && snapshot.toggled {
            score |= 1 << 0;
        }
        if self.mouse != MouseState::Dissociate && self.mouse == snapshot.mouse {
            score |= 1 << 1;
        }
        if self.keyboard != KeyboardState::Dissociate && self.keyboard == snapshot.keyboard {
            score |= 1 << 2;
        }
        if !self.enabled && !snapshot.enabled {
            score |= 1 << 3;
        }
        if !self.type_name.is_empty() && self.type_name == snapshot.type_name {
            score |= 1 << 4;
        }
        if !self.class.is_empty() && snapshot.classes.contains(&self.class) {
            score |= 1 << 5;
        }
        if !self.id.is_empty() && self.id == snapshot.id {
            score |= 1 << 6;
        }

        score
    }
}

/// Pick the best-matching value for `snapshot` from rules in registration
/// order. The sort is stable, so among equal scores the later rule wins.
pub fn find_style<'a, V>(
    rules: &'a [(Selector, V)],
    snapshot: &Snapshot,
) -> Option<&'a V> {
    let mut matching: Vec<(u32, &V)> = rules
        .iter()
        .filter(|(selector, _)| selector.matches(snapshot))
        .map(|(selector, value)| (selector.score(snapshot), value))
        .collect();

    matching.sort_by_key(|(score, _)| *score);
    matching.last().map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_snapshot() -> Snapshot {
        Snapshot {
            id: "ok".into(),
            classes: vec!["primary".into()],
            type_name: "Button".into(),
            enabled: true,
            ..Snapshot::default()
        }
    }

    // ── Elimination ──────────────────────────────────────────────────

    #[test]
    fn test_unconstrained_selector_matches_anything() {
        let rules = vec![(Selector::default(), "base")];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"base"));
    }

    #[test]
    fn test_mismatched_facets_eliminate() {
        let rules = vec![
            (Selector { id: "cancel".into(), ..Selector::default() }, "a"),
            (Selector { class: "danger".into(), ..Selector::default() }, "b"),
            (Selector { type_name: "Slider".into(), ..Selector::default() }, "c"),
            (Selector { mouse: MouseState::Hover, ..Selector::default() }, "d"),
            (Selector { toggled: true, ..Selector::default() }, "e"),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), None);
    }

    #[test]
    fn test_disabled_rule_skips_enabled_node() {
        let rules = vec![(Selector { enabled: false, ..Selector::default() }, "dim")];
        assert_eq!(find_style(&rules, &button_snapshot()), None);

        let disabled = Snapshot { enabled: false, ..button_snapshot() };
        assert_eq!(find_style(&rules, &disabled), Some(&"dim"));
    }

    // ── Specificity ──────────────────────────────────────────────────

    #[test]
    fn test_id_beats_type() {
        let rules = vec![
            (Selector { id: "ok".into(), ..Selector::default() }, "by-id"),
            (Selector { type_name: "Button".into(), ..Selector::default() }, "by-type"),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"by-id"));
    }

    #[test]
    fn test_class_beats_type() {
        let rules = vec![
            (Selector { type_name: "Button".into(), ..Selector::default() }, "by-type"),
            (Selector { class: "primary".into(), ..Selector::default() }, "by-class"),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"by-class"));
    }

    #[test]
    fn test_type_beats_interaction_states() {
        let snapshot = Snapshot {
            mouse: MouseState::Hover,
            keyboard: KeyboardState::Focus,
            toggled: true,
            ..button_snapshot()
        };
        let rules = vec![
            (
                Selector {
                    mouse: MouseState::Hover,
                    keyboard: KeyboardState::Focus,
                    toggled: true,
                    ..Selector::default()
                },
                "by-interaction",
            ),
            (Selector { type_name: "Button".into(), ..Selector::default() }, "by-type"),
        ];
        assert_eq!(find_style(&rules, &snapshot), Some(&"by-type"));
    }

    #[test]
    fn test_compound_beats_single_facet() {
        let rules = vec![
            (Selector { type_name: "Button".into(), ..Selector::default() }, "plain"),
            (
                Selector {
                    type_name: "Button".into(),
                    class: "primary".into(),
                    ..Selector::default()
                },
                "compound",
            ),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"compound"));
    }

    #[test]
    fn test_tie_goes_to_latest_registration() {
        let rules = vec![
            (Selector { type_name: "Button".into(), ..Selector::default() }, "first"),
            (Selector { type_name: "Button".into(), ..Selector::default() }, "second"),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"second"));
    }

    #[test]
    fn test_hover_rule_requires_hover() {
        let rules = vec![
            (Selector::default(), "base"),
            (Selector { mouse: MouseState::Hover, ..Selector::default() }, "hot"),
        ];
        assert_eq!(find_style(&rules, &button_snapshot()), Some(&"base"));

        let hovered = Snapshot { mouse: MouseState::Hover, ..button_snapshot() };
        assert_eq!(find_style(&rules, &hovered), Some(&"hot"));
    }
}
