//! Emptiness checks and pruning for JSON payloads sent to NowCerts.

use serde_json::{Map, Value};

/// `null`, `""`, `[]` and `{}` are empty. Numbers and booleans never are.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively drops empty members from objects.
///
/// Members are pruned before they are tested, so an object whose leaves are
/// all empty disappears from its parent. Array elements are pruned in place
/// but never removed.
pub fn remove_empty(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(remove_empty).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, remove_empty(v)))
                .filter(|(_, v)| !is_empty(v))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!(" ")));
        assert!(!is_empty(&json!([null])));
    }

    #[test]
    fn nested_empty_object_collapses() {
        assert_eq!(remove_empty(json!({"a": {"b": []}, "c": "x"})), json!({"c": "x"}));
    }

    #[test]
    fn all_empty_leaves_give_empty_object() {
        assert_eq!(remove_empty(json!({"a": null, "b": "", "c": {"d": {}}})), json!({}));
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(remove_empty(json!(0)), json!(0));
        assert_eq!(remove_empty(json!(false)), json!(false));
        assert_eq!(remove_empty(json!("x")), json!("x"));
        assert_eq!(remove_empty(json!({"n": 0, "b": false})), json!({"n": 0, "b": false}));
    }

    #[test]
    fn array_elements_are_pruned_not_removed() {
        assert_eq!(
            remove_empty(json!([{"a": null, "b": 1}, {"c": ""}])),
            json!([{"b": 1}, {}])
        );
        assert_eq!(
            remove_empty(json!({"agents": [{"firstName": "Ann", "lastName": null}]})),
            json!({"agents": [{"firstName": "Ann"}]})
        );
    }
}
