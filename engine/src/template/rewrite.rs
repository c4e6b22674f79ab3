use serde_json::{Map, Value};

/// Shape of a JSON value as seen by the reference walk
enum Node<'a> {
    Leaf(&'a mut Value),
    Mapping(&'a mut Map<String, Value>),
    Sequence(&'a mut Vec<Value>),
}

impl<'a> Node<'a> {
    fn of(value: &'a mut Value) -> Self {
        match value {
            Value::Object(map) => Node::Mapping(map),
            Value::Array(items) => Node::Sequence(items),
            leaf => Node::Leaf(leaf),
        }
    }
}

/// Prefix the references in every top level section of a decoded template
pub(super) fn prefix_document(document: &mut Map<String, Value>, prefix: &str) {
    if prefix.is_empty() {
        return;
    }

    for value in document.values_mut() {
        prefix_references(value, prefix);
    }
}

/// Prefix every logical id referenced through `Ref`, `DependsOn`, `Fn::GetAtt`,
/// `Condition` and `Fn::If`
///
/// Only references are rewritten here, the section keys themselves
/// are prefixed by the merger when they are inserted.
pub(super) fn prefix_references(value: &mut Value, prefix: &str) {
    if prefix.is_empty() {
        return;
    }

    match Node::of(value) {
        Node::Leaf(_) => {}

        Node::Sequence(items) => {
            for item in items.iter_mut() {
                prefix_references(item, prefix);
            }
        }

        Node::Mapping(map) => {
            // {"Ref": "..."} is only a reference when it's the sole key
            if map.len() == 1 {
                if let Some(Value::String(id)) = map.get_mut("Ref") {
                    prefix_id(id, prefix);
                    return;
                }
            }

            for (key, child) in map.iter_mut() {
                match key.as_str() {
                    "DependsOn" => prefix_depends_on(child, prefix),
                    "Fn::GetAtt" | "Fn::If" => prefix_first_element(child, prefix),
                    "Condition" => prefix_condition(child, prefix),
                    _ => prefix_references(child, prefix),
                }
            }
        }
    }
}

fn prefix_depends_on(value: &mut Value, prefix: &str) {
    match Node::of(value) {
        Node::Leaf(Value::String(id)) => prefix_id(id, prefix),

        Node::Sequence(items) => {
            for item in items.iter_mut() {
                if let Value::String(id) = item {
                    prefix_id(id, prefix);
                }
            }
        }

        Node::Leaf(_) => {}

        Node::Mapping(map) => {
            for child in map.values_mut() {
                prefix_references(child, prefix);
            }
        }
    }
}

/// The first element names the resource or condition, the rest are regular values
fn prefix_first_element(value: &mut Value, prefix: &str) {
    let Node::Sequence(items) = Node::of(value) else {
        return;
    };

    let mut items = items.iter_mut();

    if let Some(Value::String(id)) = items.next() {
        prefix_id(id, prefix);
    }

    for item in items {
        prefix_references(item, prefix);
    }
}

/// Conditions are referenced by name, IAM policy conditions are mappings and stay as they are
fn prefix_condition(value: &mut Value, prefix: &str) {
    match value {
        Value::String(id) => prefix_id(id, prefix),
        other => prefix_references(other, prefix),
    }
}

fn prefix_id(id: &mut String, prefix: &str) {
    if is_logical_id(id) {
        id.insert_str(0, prefix);
    }
}

/// Logical ids are alphanumeric, pseudo parameters like AWS::Region are not rewritten
fn is_logical_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with("AWS::")
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == ':')
}
