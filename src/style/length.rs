//! Length values and shorthand box parsing.

use crate::geometry::Edges;
use crate::tree::{FromValue, IntoValue, Value};

/// A one-dimensional size in a style value.
///
/// Percentages resolve against the relevant dimension of the parent's
/// content bounds. `Auto` defers to the layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Length {
    Pixels(f32),
    Percent(f32),
    #[default]
    Auto,
}

impl Length {
    pub fn is_auto(self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Resolve to pixels against the given parent dimension.
    pub fn to_pixels(self, parent_dimension: f32) -> f32 {
        match self {
            Length::Pixels(px) => px,
            Length::Percent(pc) => parent_dimension * pc / 100.0,
            Length::Auto => 0.0,
        }
    }

    /// Parse `"10"`, `"10px"`, `"50%"`, or `"auto"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "auto" {
            return Some(Length::Auto);
        }
        if let Some(percent) = text.strip_suffix('%') {
            return percent.trim().parse().ok().map(Length::Percent);
        }
        let pixels = text.strip_suffix("px").unwrap_or(text);
        pixels.trim().parse().ok().map(Length::Pixels)
    }
}

impl FromValue for Length {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Length::Pixels(*n as f32)),
            Value::String(s) => Length::parse(s),
            _ => None,
        }
    }
}

impl IntoValue for Length {
    fn into_value(self) -> Value {
        match self {
            Length::Pixels(px) => Value::Number(px as f64),
            Length::Percent(pc) => Value::String(format!("{pc}%")),
            Length::Auto => Value::String("auto".to_string()),
        }
    }
}

/// Shorthand box values, CSS style: one value applies to all four sides, two
/// are vertical/horizontal, three are top/horizontal/bottom, four are
/// top/right/bottom/left. Values separate on whitespace or commas.
impl FromValue for Edges {
    fn from_value(value: &Value) -> Option<Self> {
        let parts: Vec<f32> = match value {
            Value::Number(n) => return Some(Edges::all(*n as f32)),
            Value::String(s) => s
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .map(|part| part.parse().ok())
                .collect::<Option<_>>()?,
            Value::List(items) => items.iter().map(f32::from_value).collect::<Option<_>>()?,
            _ => return None,
        };

        match parts[..] {
            [all] => Some(Edges::all(all)),
            [vertical, horizontal] => Some(Edges::symmetric(vertical, horizontal)),
            [top, horizontal, bottom] => Some(Edges::new(top, horizontal, bottom, horizontal)),
            [top, right, bottom, left] => Some(Edges::new(top, right, bottom, left)),
            _ => None,
        }
    }
}

impl IntoValue for Edges {
    fn into_value(self) -> Value {
        Value::String(format!(
            "{} {} {} {}",
            self.top, self.right, self.bottom, self.left,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Lengths ──────────────────────────────────────────────────────

    #[test]
    fn test_parse_pixels() {
        assert_eq!(Length::parse("10"), Some(Length::Pixels(10.0)));
        assert_eq!(Length::parse("10.5px"), Some(Length::Pixels(10.5)));
        assert_eq!(Length::parse("  4 "), Some(Length::Pixels(4.0)));
    }

    #[test]
    fn test_parse_percent_and_auto() {
        assert_eq!(Length::parse("50%"), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("auto"), Some(Length::Auto));
        assert_eq!(Length::parse("wide"), None);
    }

    #[test]
    fn test_to_pixels() {
        assert_eq!(Length::Pixels(12.0).to_pixels(300.0), 12.0);
        assert_eq!(Length::Percent(50.0).to_pixels(300.0), 150.0);
        assert_eq!(Length::Auto.to_pixels(300.0), 0.0);
    }

    #[test]
    fn test_length_from_value() {
        assert_eq!(
            Length::from_value(&Value::Number(25.0)),
            Some(Length::Pixels(25.0)),
        );
        assert_eq!(
            Length::from_value(&Value::String("10%".into())),
            Some(Length::Percent(10.0)),
        );
    }

    // ── Shorthand box values ─────────────────────────────────────────

    #[test]
    fn test_single_value_applies_to_all_sides() {
        let edges = Edges::from_value(&Value::Number(5.0)).unwrap();
        assert_eq!(edges, Edges::all(5.0));
    }

    #[test]
    fn test_two_values_are_vertical_horizontal() {
        let edges = Edges::from_value(&Value::String("112.4 73.7".into())).unwrap();
        assert_eq!(edges.top, 112.4);
        assert_eq!(edges.bottom, 112.4);
        assert_eq!(edges.left, 73.7);
        assert_eq!(edges.right, 73.7);
    }

    #[test]
    fn test_three_values_are_top_horizontal_bottom() {
        let edges = Edges::from_value(&Value::String("14.25 8.3 1.1".into())).unwrap();
        assert_eq!(edges.top, 14.25);
        assert_eq!(edges.right, 8.3);
        assert_eq!(edges.bottom, 1.1);
        assert_eq!(edges.left, 8.3);
    }

    #[test]
    fn test_four_values_are_clockwise_from_top() {
        let edges = Edges::from_value(&Value::String("1 2 3 4".into())).unwrap();
        assert_eq!(edges, Edges::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_comma_separators() {
        let edges = Edges::from_value(&Value::String("6, 12, 18, 24".into())).unwrap();
        assert_eq!(edges, Edges::new(6.0, 12.0, 18.0, 24.0));
    }

    #[test]
    fn test_malformed_shorthand_is_none() {
        assert_eq!(Edges::from_value(&Value::String("1 2 3 4 5".into())), None);
        assert_eq!(Edges::from_value(&Value::String("thick".into())), None);
    }
}
