use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
}

/// One field that differs between a draft and its snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub change_type: ChangeType,
}

/// Field-level diff of two serializable values.
///
/// Both sides are compared as JSON objects keyed by field name, so field order
/// never matters. A `null` on one side and a missing key on the other count as
/// equal. Non-object values are compared whole under the field name `""`.
pub fn diff_fields<T: Serialize>(initial: &T, current: &T) -> Vec<FieldChange> {
    let before = serde_json::to_value(initial).unwrap_or(Value::Null);
    let after = serde_json::to_value(current).unwrap_or(Value::Null);

    match (before, after) {
        (Value::Object(before), Value::Object(after)) => diff_maps(&before, &after),
        (before, after) if before == after => Vec::new(),
        (before, after) => vec![FieldChange {
            field: String::new(),
            old_value: Some(before),
            new_value: Some(after),
            change_type: ChangeType::Modified,
        }],
    }
}

fn diff_maps(before: &Map<String, Value>, after: &Map<String, Value>) -> Vec<FieldChange> {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let old = before.get(key).filter(|v| !v.is_null());
            let new = after.get(key).filter(|v| !v.is_null());
            let change_type = match (old, new) {
                (None, None) => return None,
                (Some(o), Some(n)) if o == n => return None,
                (None, Some(_)) => ChangeType::Added,
                (Some(_), None) => ChangeType::Removed,
                (Some(_), Some(_)) => ChangeType::Modified,
            };
            Some(FieldChange {
                field: key.clone(),
                old_value: old.cloned(),
                new_value: new.cloned(),
                change_type,
            })
        })
        .collect()
}
