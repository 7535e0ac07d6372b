//! Attribute values and conversions.
//!
//! Declarative nodes store loosely-typed attribute values. Markup attributes
//! arrive as strings, so the conversion traits coerce liberally: `"120"` reads
//! as a number, `"true"` as a bool, and a whitespace-separated string as a
//! string list.

/// A single attribute value on a declarative node.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    /// An ordered key/value map. Declaration order is preserved so later
    /// entries win ties during style resolution.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Look up a key in an [`Value::Object`], or `None` for other variants.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => {
                entries.iter().find(|(name, _)| name == key).map(|(_, value)| value)
            }
            _ => None,
        }
    }
}

/// Convert a [`Value`] into a concrete attribute type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

/// Convert a concrete attribute type into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|n| n as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|n| n as i64)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).map(|n| n as i32)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|n| usize::try_from(n).ok())
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            Value::String(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            // Markup class lists arrive as one whitespace-separated string.
            Value::String(s) => {
                Some(s.split_whitespace().map(str::to_string).collect())
            }
            Value::List(items) => items.iter().map(String::from_value).collect(),
            _ => None,
        }
    }
}

impl IntoValue for Vec<String> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Value::String).collect())
    }
}

/// Format a number the way markup attributes expect: integral values print
/// without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// How an accumulating binding folds values gathered along its ancestor
/// chain, applied root-first.
pub trait Combine {
    fn combine(self, next: Self) -> Self;
}

impl Combine for String {
    fn combine(mut self, next: Self) -> Self {
        self.push_str(&next);
        self
    }
}

impl Combine for Vec<String> {
    fn combine(mut self, next: Self) -> Self {
        self.extend(next);
        self
    }
}

impl Combine for f64 {
    fn combine(self, next: Self) -> Self {
        self + next
    }
}

impl Combine for f32 {
    fn combine(self, next: Self) -> Self {
        self + next
    }
}

impl Combine for i64 {
    fn combine(self, next: Self) -> Self {
        self + next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_from_strings() {
        assert_eq!(f64::from_value(&Value::String("120".into())), Some(120.0));
        assert_eq!(f64::from_value(&Value::String(" 3.5 ".into())), Some(3.5));
        assert_eq!(f64::from_value(&Value::String("wat".into())), None);
        assert_eq!(i32::from_value(&Value::Number(7.0)), Some(7));
    }

    #[test]
    fn bools_coerce() {
        assert_eq!(bool::from_value(&Value::String("true".into())), Some(true));
        assert_eq!(bool::from_value(&Value::String("false".into())), Some(false));
        assert_eq!(bool::from_value(&Value::Number(0.0)), Some(false));
        assert_eq!(bool::from_value(&Value::Number(2.0)), Some(true));
    }

    #[test]
    fn strings_from_numbers_drop_trailing_zero() {
        assert_eq!(String::from_value(&Value::Number(40.0)), Some("40".into()));
        assert_eq!(String::from_value(&Value::Number(2.5)), Some("2.5".into()));
    }

    #[test]
    fn string_lists_split_on_whitespace() {
        let v = Value::String("primary  large hidden".into());
        assert_eq!(
            Vec::<String>::from_value(&v),
            Some(vec!["primary".into(), "large".into(), "hidden".into()]),
        );
    }

    #[test]
    fn object_entry_lookup() {
        let v = Value::Object(vec![
            ("background".into(), Value::String("#333".into())),
            ("foreground".into(), Value::String("#eee".into())),
        ]);
        assert_eq!(v.entry("foreground"), Some(&Value::String("#eee".into())));
        assert_eq!(v.entry("border"), None);
    }

    #[test]
    fn combine_concats_and_adds() {
        assert_eq!(String::from("ab").combine("cd".into()), "abcd");
        assert_eq!(3.0f64.combine(4.0), 7.0);
        assert_eq!(
            vec!["a".to_string()].combine(vec!["b".to_string()]),
            vec!["a".to_string(), "b".to_string()],
        );
    }
}
