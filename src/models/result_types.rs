use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Filename -> ranked predictions, in the order the server sent them.
pub type OperationResult = IndexMap<String, Vec<Prediction>>;

/// One ranked category guess. Both fields are kept as display text since the
/// service reports confidence either as a number or as a preformatted string.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Prediction {
    pub name: Option<String>,
    pub conf: Option<String>,
}

impl Prediction {
    pub fn new(name: impl Into<String>, conf: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            conf: Some(conf.into()),
        }
    }
}

fn value_to_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let prediction = match &value {
            Value::Object(map) => Prediction {
                name: value_to_text(map.get("name")),
                conf: value_to_text(map.get("conf")),
            },
            Value::String(s) => Prediction {
                name: Some(s.clone()),
                conf: None,
            },
            Value::Number(n) => Prediction {
                name: None,
                conf: Some(n.to_string()),
            },
            _ => Prediction::default(),
        };
        Ok(prediction)
    }
}

/// A display row of the processing summary.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub file_name: String,
    pub category: String,
    pub confidence: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_and_numeric_confidence() {
        let result: OperationResult = serde_json::from_str(
            r#"{"a.jpg":[{"name":"Cats","conf":"0.92"}],"b.jpg":[{"name":"Dogs","conf":0.5}]}"#,
        )
        .unwrap();
        assert_eq!(result["a.jpg"][0], Prediction::new("Cats", "0.92"));
        assert_eq!(result["b.jpg"][0], Prediction::new("Dogs", "0.5"));
    }

    #[test]
    fn keeps_server_key_order() {
        let result: OperationResult =
            serde_json::from_str(r#"{"z.jpg":[],"a.jpg":[],"m.jpg":[]}"#).unwrap();
        let keys: Vec<&str> = result.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z.jpg", "a.jpg", "m.jpg"]);
    }

    #[test]
    fn tolerates_bare_and_partial_entries() {
        let result: OperationResult =
            serde_json::from_str(r#"{"x.png":["person", 0.87, {"conf":"0.1"}, null]}"#).unwrap();
        let preds = &result["x.png"];
        assert_eq!(preds[0].name.as_deref(), Some("person"));
        assert_eq!(preds[1].conf.as_deref(), Some("0.87"));
        assert_eq!(preds[2].name, None);
        assert_eq!(preds[3], Prediction::default());
    }
}
