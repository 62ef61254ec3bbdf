//! Value equality supplied by the hosting collection

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::CollectionError;

type CompareFn<V> = Arc<dyn Fn(&V, &V) -> Result<bool, CollectionError> + Send + Sync>;

/// Decides whether two option values are "the same" value
pub struct Comparator<V> {
    kind: &'static str,
    compare: CompareFn<V>,
}

impl<V> Clone for Comparator<V> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            compare: self.compare.clone(),
        }
    }
}

impl<V> fmt::Debug for Comparator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Comparator").field(&self.kind).finish()
    }
}

impl<V: PartialEq + 'static> Comparator<V> {
    /// `PartialEq` equality
    pub fn by_value() -> Self {
        Self {
            kind: "by-value",
            compare: Arc::new(|a: &V, b: &V| Ok(a == b)),
        }
    }
}

impl<V: Serialize + 'static> Comparator<V> {
    /// Equality of one named field of the serialized values, e.g. `"id"`
    pub fn by_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: "by-field",
            compare: Arc::new(move |a: &V, b: &V| {
                let a = field_of(a, &field)?;
                let b = field_of(b, &field)?;
                Ok(a == b)
            }),
        }
    }
}

fn field_of<V: Serialize>(value: &V, field: &str) -> Result<serde_json::Value, CollectionError> {
    let json = serde_json::to_value(value)
        .map_err(|e| CollectionError::Comparator(format!("value does not serialize: {e}")))?;
    match json {
        serde_json::Value::Object(mut map) => {
            Ok(map.remove(field).unwrap_or(serde_json::Value::Null))
        }
        serde_json::Value::Null => Ok(serde_json::Value::Null),
        other => Err(CollectionError::Comparator(format!(
            "cannot read field `{field}` of non-object value {other}"
        ))),
    }
}

impl<V: 'static> Comparator<V> {
    /// Arbitrary equality
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: "custom",
            compare: Arc::new(move |a: &V, b: &V| Ok(compare(a, b))),
        }
    }
}

impl<V> Comparator<V> {
    /// Compare, surfacing field-lookup failures
    pub fn try_compare(&self, a: &V, b: &V) -> Result<bool, CollectionError> {
        (self.compare)(a, b)
    }

    /// Compare; a failing field lookup counts as "not equal" and is logged
    pub fn matches(&self, a: &V, b: &V) -> bool {
        match self.try_compare(a, b) {
            Ok(equal) => equal,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Person {
        id: u32,
        name: String,
    }

    fn person(id: u32, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_by_value() {
        let cmp = Comparator::by_value();
        assert!(cmp.matches(&person(1, "Ada"), &person(1, "Ada")));
        assert!(!cmp.matches(&person(1, "Ada"), &person(1, "Grace")));
    }

    #[test]
    fn test_by_field_ignores_other_fields() {
        let cmp = Comparator::by_field("id");
        assert!(cmp.matches(&person(1, "Ada"), &person(1, "Renamed")));
        assert!(!cmp.matches(&person(1, "Ada"), &person(2, "Ada")));
    }

    #[test]
    fn test_by_field_on_scalar_is_an_error() {
        let cmp = Comparator::<u32>::by_field("id");
        assert!(matches!(
            cmp.try_compare(&1, &1),
            Err(CollectionError::Comparator(_))
        ));
        assert!(!cmp.matches(&1, &1));
    }

    #[test]
    fn test_custom() {
        let cmp = Comparator::custom(|a: &String, b: &String| a.eq_ignore_ascii_case(b));
        assert!(cmp.matches(&"ABC".to_string(), &"abc".to_string()));
    }
}
