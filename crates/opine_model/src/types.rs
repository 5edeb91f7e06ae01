//! Bundle object types (STIX 2.1 domain object equivalents)

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The fixed, ordered opinion value domain published by the Opinion type's
/// schema. Consumers render these; they must not redefine them.
pub const OPINION_VALUES: [&str; 5] = [
    "strongly-disagree",
    "disagree",
    "neutral",
    "agree",
    "strongly-agree",
];

/// Spec version stamped onto newly minted objects.
const SPEC_VERSION: &str = "2.1";

fn mint_id(object_type: &str) -> String {
    format!("{}--{}", object_type, Uuid::new_v4())
}

/// Timestamps serialize with millisecond precision and a `Z` suffix, the
/// shape other bundle producers emit.
mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

/// The analyst or organization producing an opinion.
///
/// Immutable once constructed; appended to the bundle at most once per
/// authoring session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    pub id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub modified: DateTime<Utc>,
    pub name: String,
    pub identity_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_information: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Construct a fresh individual identity from user entry.
    pub fn individual(name: impl Into<String>, contact_information: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            object_type: "identity".to_string(),
            spec_version: Some(SPEC_VERSION.to_string()),
            id: mint_id("identity"),
            created: now,
            modified: now,
            name: name.into(),
            identity_class: "individual".to_string(),
            contact_information: Some(contact_information.into()),
            extra: Map::new(),
        }
    }
}

/// A pre-existing record whose effectiveness is being judged.
///
/// Read-only here; every field other than `id` and `name` passes through
/// the flattened extra map untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Indicator {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed indicator)")
    }
}

/// A structured judgment about one indicator's effectiveness, attributed
/// to an identity via `created_by_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_ref: Option<String>,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub explanation: String,
    pub opinion: String,
    pub object_refs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Opinion {
    /// Construct an opinion evaluating exactly one indicator.
    ///
    /// `opinion` is stored verbatim; display normalization is the
    /// renderer's concern. `explanation` is taken as-is, untrimmed.
    pub fn new(
        indicator_id: impl Into<String>,
        opinion: impl Into<String>,
        explanation: impl Into<String>,
        created_by_ref: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            object_type: "opinion".to_string(),
            spec_version: Some(SPEC_VERSION.to_string()),
            id: mint_id("opinion"),
            created_by_ref: Some(created_by_ref.into()),
            created: now,
            modified: now,
            explanation: explanation.into(),
            opinion: opinion.into(),
            object_refs: vec![indicator_id.into()],
            extra: Map::new(),
        }
    }

    /// Whether this opinion evaluates the given object.
    pub fn references(&self, object_id: &str) -> bool {
        self.object_refs.iter().any(|r| r == object_id)
    }
}

/// One typed object in a bundle.
///
/// Unrecognized object types are carried through untouched so that
/// re-serializing a bundle never drops intelligence this tool does not
/// understand.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Identity(Identity),
    Indicator(Indicator),
    Opinion(Opinion),
    Other(Value),
}

impl Object {
    pub fn object_type(&self) -> &str {
        match self {
            Object::Identity(_) => "identity",
            Object::Indicator(_) => "indicator",
            Object::Opinion(_) => "opinion",
            Object::Other(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Object::Identity(identity) => &identity.id,
            Object::Indicator(indicator) => &indicator.id,
            Object::Opinion(opinion) => &opinion.id,
            Object::Other(value) => value.get("id").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Object::Identity(identity) => identity.serialize(serializer),
            Object::Indicator(indicator) => indicator.serialize(serializer),
            Object::Opinion(opinion) => opinion.serialize(serializer),
            Object::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let object_type = value.get("type").and_then(Value::as_str).unwrap_or("");
        match object_type {
            "identity" => serde_json::from_value(value)
                .map(Object::Identity)
                .map_err(de::Error::custom),
            "indicator" => serde_json::from_value(value)
                .map(Object::Indicator)
                .map_err(de::Error::custom),
            "opinion" => serde_json::from_value(value)
                .map(Object::Opinion)
                .map_err(de::Error::custom),
            _ => Ok(Object::Other(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn individual_identity_has_minted_id_and_class() {
        let identity = Identity::individual("Casey Analyst", "casey@example.com");
        assert!(identity.id.starts_with("identity--"));
        assert_eq!(identity.identity_class, "individual");
        assert_eq!(identity.spec_version.as_deref(), Some("2.1"));
        assert_eq!(
            identity.contact_information.as_deref(),
            Some("casey@example.com")
        );
        assert_eq!(identity.created, identity.modified);
    }

    #[test]
    fn opinion_references_exactly_the_given_indicator() {
        let opinion = Opinion::new(
            "indicator--0001",
            "agree",
            "works well",
            "identity--0001",
        );
        assert!(opinion.id.starts_with("opinion--"));
        assert_eq!(opinion.object_refs, vec!["indicator--0001".to_string()]);
        assert!(opinion.references("indicator--0001"));
        assert!(!opinion.references("indicator--0002"));
        assert_eq!(opinion.opinion, "agree");
        assert_eq!(opinion.explanation, "works well");
    }

    #[test]
    fn unknown_object_types_round_trip_verbatim() {
        let raw = serde_json::json!({
            "type": "malware",
            "id": "malware--3f6a",
            "name": "cryptolocker",
            "is_family": true,
        });
        let object: Object = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(object, Object::Other(_)));
        assert_eq!(object.object_type(), "malware");
        assert_eq!(object.id(), "malware--3f6a");
        assert_eq!(serde_json::to_value(&object).unwrap(), raw);
    }

    #[test]
    fn typed_objects_preserve_unmodeled_fields() {
        let raw = serde_json::json!({
            "type": "indicator",
            "id": "indicator--9b12",
            "name": "File hash for malware variant",
            "pattern": "[file:hashes.'SHA-256' = 'aec0...']",
            "valid_from": "2014-06-29T13:49:37.079Z",
        });
        let object: Object = serde_json::from_value(raw.clone()).unwrap();
        let Object::Indicator(ref indicator) = object else {
            panic!("expected indicator");
        };
        assert_eq!(indicator.display_name(), "File hash for malware variant");
        assert!(indicator.extra.contains_key("pattern"));
        assert_eq!(serde_json::to_value(&object).unwrap(), raw);
    }

    #[test]
    fn timestamps_serialize_with_millisecond_precision() {
        let opinion = Opinion::new("indicator--1", "neutral", "", "identity--1");
        let value = serde_json::to_value(&opinion).unwrap();
        let created = value.get("created").and_then(Value::as_str).unwrap();
        assert!(created.ends_with('Z'), "created = {created}");
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(created.len(), 24, "created = {created}");
    }
}
