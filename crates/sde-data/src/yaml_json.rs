//! YAML to JSON coercion: the intermediate YAML model permits
//! non-string map keys, while JSON does not. Maps with non-string keys
//! are recursively stringified; sequences and scalars pass through
//! unchanged.

use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;

pub fn yaml_to_json(yaml: &YamlValue) -> JsonValue {
    match yaml {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                JsonValue::from(n.as_f64().unwrap_or_default())
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(seq) => JsonValue::Array(seq.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                out.insert(scalar_to_string(key), yaml_to_json(value));
            }
            JsonValue::Object(out)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// A map key's natural string form, used when the YAML key is not
/// already a string.
fn scalar_to_string(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => String::new(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
    }
}

/// Parse a YAML document and emit canonicalised JSON text with 2-space
/// indentation.
pub fn yaml_str_to_canonical_json(yaml_text: &str) -> Result<String, serde_yaml::Error> {
    let parsed: YamlValue = serde_yaml::from_str(yaml_text)?;
    let json = yaml_to_json(&parsed);
    Ok(to_pretty_2space(&json))
}

fn to_pretty_2space(value: &JsonValue) -> String {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut serializer).expect("json values always serialize");
    String::from_utf8(buf).expect("json output is always valid utf8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_string_keys_are_coerced_to_their_natural_string_form() {
        let yaml: YamlValue = serde_yaml::from_str("1: one\n2: two\n").unwrap();
        let json = yaml_to_json(&yaml);
        let obj = json.as_object().unwrap();
        assert_eq!(obj.get("1").and_then(JsonValue::as_str), Some("one"));
        assert_eq!(obj.get("2").and_then(JsonValue::as_str), Some("two"));
    }

    #[test]
    fn sequences_and_scalars_pass_through() {
        let yaml: YamlValue = serde_yaml::from_str("- 1\n- 2\n- three\n").unwrap();
        let json = yaml_to_json(&yaml);
        assert_eq!(json, serde_json::json!([1, 2, "three"]));
    }

    #[test]
    fn nested_maps_with_non_string_keys_coerce_recursively() {
        let yaml: YamlValue = serde_yaml::from_str("outer:\n  1: a\n  2: b\n").unwrap();
        let json = yaml_to_json(&yaml);
        let inner = json.get("outer").unwrap().as_object().unwrap();
        assert_eq!(inner.get("1").and_then(JsonValue::as_str), Some("a"));
    }

    #[test]
    fn canonical_json_uses_two_space_indent() {
        let out = yaml_str_to_canonical_json("a: 1\nb: 2\n").unwrap();
        assert!(out.contains("  \"a\": 1"));
    }
}
