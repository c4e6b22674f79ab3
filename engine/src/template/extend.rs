use serde_json::{Map, Value};

/// Merge `extra` into `base` recursively
///
/// Mappings are merged key by key. Values which meet under the same key and are not
/// both mappings are collected into a sequence: sequences are concatenated,
/// scalars are appended to the other side.
pub(super) fn extend(base: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        match base.get_mut(key) {
            None => {
                base.insert(key.clone(), value.clone());
            }

            Some(Value::Object(existing)) if value.is_object() => {
                if let Value::Object(value) = value {
                    extend(existing, value);
                }
            }

            Some(existing) => {
                let mut items = match existing.take() {
                    Value::Array(items) => items,
                    other => vec![other],
                };

                match value {
                    Value::Array(more) => items.extend(more.iter().cloned()),
                    other => items.push(other.clone()),
                }

                *existing = Value::Array(items);
            }
        }
    }
}
