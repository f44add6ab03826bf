//! Input JSON documents as extracted from the game.
//!
//! Maps are [`IndexMap`]s so that iteration follows document order, which
//! decides property and block ids.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{DataGenError, Result};

/// Internal property name -> definition
pub type PropertyDefs = IndexMap<String, PropertyDef>;

/// Block name -> definition
pub type BlockDefs = IndexMap<String, BlockDef>;

/// Property definition from `block_properties.json`
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    /// External name used by the protocol
    pub key: String,
    pub values: RawValues,
}

/// Value list of a property, typed by the JSON it was read from.
///
/// A list mixing strings, booleans and integers matches no variant and
/// fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawValues {
    Strings(Vec<String>),
    Booleans(Vec<bool>),
    Integers(Vec<i64>),
}

impl RawValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Strings(v) => v.len(),
            Self::Booleans(v) => v.len(),
            Self::Integers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Property definition with its value list not yet typed.
#[derive(Debug, Deserialize)]
struct UntypedPropertyDef {
    key: String,
    values: serde_json::Value,
}

/// Parses `block_properties.json`.
///
/// Value lists are typed one property at a time so that a list mixing
/// types is reported against the property that holds it.
///
/// # Errors
/// Returns [`DataGenError::Json`] for malformed JSON and
/// [`DataGenError::PropertyValueTypes`] for an untypeable value list.
pub fn parse_property_defs(json: &str) -> Result<PropertyDefs> {
    let untyped: IndexMap<String, UntypedPropertyDef> =
        serde_json::from_str(json).map_err(|source| DataGenError::Json {
            document: "block properties",
            source,
        })?;

    untyped
        .into_iter()
        .map(|(name, def)| -> Result<(String, PropertyDef)> {
            let values = RawValues::deserialize(def.values).map_err(|source| {
                DataGenError::PropertyValueTypes {
                    property: name.clone(),
                    source,
                }
            })?;
            Ok((
                name,
                PropertyDef {
                    key: def.key,
                    values,
                },
            ))
        })
        .collect()
}

/// Block definition from `blocks.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDef {
    pub id: u64,
    pub translation_key: String,
    pub default_state_id: u64,
    /// Internal property names, in declaration order
    #[serde(default)]
    pub properties: Vec<String>,
    pub states: Vec<StateDef>,
}

/// One entry of a block's `states` list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDef {
    pub state_id: u64,
    #[serde(default)]
    pub properties: IndexMap<String, StateValue>,
    pub air: bool,
    pub render_shape: String,
}

/// Value a state assigns to one of its block's properties
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_typed_at_parse_time() {
        let strings: RawValues = serde_json::from_str(r#"["north", "south"]"#).unwrap();
        assert_eq!(strings, RawValues::Strings(vec!["north".into(), "south".into()]));

        let bools: RawValues = serde_json::from_str("[true, false]").unwrap();
        assert_eq!(bools, RawValues::Booleans(vec![true, false]));

        let ints: RawValues = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(ints, RawValues::Integers(vec![1, 2, 3]));
    }

    #[test]
    fn test_mixed_values_rejected() {
        assert!(serde_json::from_str::<RawValues>(r#"["a", true]"#).is_err());
        assert!(serde_json::from_str::<RawValues>(r#"[0, "1"]"#).is_err());
        assert!(serde_json::from_str::<RawValues>("[0.5, 1.5]").is_err());
    }

    #[test]
    fn test_mixed_values_name_the_property() {
        let err = parse_property_defs(
            r#"{
                "lit": {"key": "lit", "values": [true, false]},
                "facing": {"key": "facing", "values": ["north", 1]}
            }"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, DataGenError::PropertyValueTypes { ref property, .. } if property == "facing"),
            "{err}"
        );
        assert!(err.to_string().contains("`facing`"));

        let defs = parse_property_defs(r#"{"age": {"key": "age", "values": [0, 1]}}"#).unwrap();
        assert_eq!(defs["age"].values, RawValues::Integers(vec![0, 1]));

        assert!(matches!(
            parse_property_defs("{"),
            Err(DataGenError::Json { document: "block properties", .. })
        ));
    }

    #[test]
    fn test_document_order_kept() {
        let defs: PropertyDefs = serde_json::from_str(
            r#"{
                "zeta": {"key": "z", "values": [true, false]},
                "alpha": {"key": "a", "values": [0, 1]}
            }"#,
        )
        .unwrap();
        let names: Vec<_> = defs.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_block_def_camel_case() {
        let def: BlockDef = serde_json::from_str(
            r#"{
                "id": 3,
                "translationKey": "block.minecraft.lever",
                "defaultStateId": 10,
                "properties": ["powered"],
                "states": [
                    {"stateId": 10, "properties": {"powered": "true"}, "air": false, "renderShape": "MODEL"},
                    {"stateId": 11, "properties": {"powered": "false"}, "air": false, "renderShape": "MODEL"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(def.id, 3);
        assert_eq!(def.translation_key, "block.minecraft.lever");
        assert_eq!(def.states[1].state_id, 11);
        assert_eq!(
            def.states[0].properties["powered"],
            StateValue::String("true".into())
        );
    }
}
