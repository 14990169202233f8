use serde_json::{Map, Value};

/// Recursively collapses object-typed values into dotted-path keys:
/// `{"a": {"b": 1}}` becomes `{"a.b": 1}`. Scalars and arrays pass through
/// unchanged; only objects are expanded. Terminates because driver-produced
/// records are finite and acyclic.
pub fn flatten_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, record, None);
    flat
}

fn flatten_into(out: &mut Map<String, Value>, record: &Map<String, Value>, prefix: Option<&str>) {
    for (key, value) in record {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, nested, Some(&path)),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}
