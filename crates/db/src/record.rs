use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary key of a remote row.
///
/// Tables may key rows by uuid (returned as a JSON string) or by an integer
/// sequence; both are kept so that the id round-trips in its original JSON
/// type when sent back as a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordId::Text(s) => serializer.serialize_str(s),
            RecordId::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId::Text(s),
            Raw::Number(n) => RecordId::Number(n),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_uuid_and_integer_keys() {
        let uuid: RecordId =
            serde_json::from_value(json!("0190c7a4-5b9e-7cc1-8f43-3f1a3c0f9b11")).unwrap();
        assert_eq!(uuid.to_string(), "0190c7a4-5b9e-7cc1-8f43-3f1a3c0f9b11");

        let number: RecordId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(number, RecordId::Number(42));
        assert_eq!(serde_json::to_value(&number).unwrap(), json!(42));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_value::<RecordId>(json!({"id": 1})).is_err());
        assert!(serde_json::from_value::<RecordId>(json!(null)).is_err());
    }
}
