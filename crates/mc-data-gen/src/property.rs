//! Property registry and the property table encoder.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DataGenError, Result};
use crate::layout::{
    MAX_ENUM_VALUES, MAX_PROPERTIES, MAX_PROPERTY_VALUES, PropertyFlags, PropertyId, PropertyKind,
};
use crate::schema::{PropertyDefs, RawValues};

/// Validated value domain of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValues {
    Enum(Vec<String>),
    /// Always `[true, false]`
    Boolean,
    /// `start..start + count` with `start` 0 or 1
    Int { start: u8, count: u8 },
}

impl PropertyValues {
    pub const fn kind(&self) -> PropertyKind {
        match self {
            Self::Enum(_) => PropertyKind::Enum,
            Self::Boolean => PropertyKind::Boolean,
            Self::Int { start: 0, .. } => PropertyKind::IntFrom0,
            Self::Int { .. } => PropertyKind::IntFrom1,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Enum(values) => values.len(),
            Self::Boolean => 2,
            Self::Int { count, .. } => *count as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classifies a raw value list, enforcing the per-kind shape rules.
    fn classify(property: &str, raw: RawValues) -> Result<Self> {
        if raw.is_empty() {
            return Err(DataGenError::EmptyValues {
                property: property.to_owned(),
            });
        }
        if raw.len() > MAX_PROPERTY_VALUES {
            return Err(DataGenError::TooManyValues {
                property: property.to_owned(),
                count: raw.len(),
            });
        }

        match raw {
            RawValues::Strings(values) => Ok(Self::Enum(values)),
            RawValues::Booleans(values) => {
                if values == [true, false] {
                    Ok(Self::Boolean)
                } else {
                    Err(DataGenError::BooleanValues {
                        property: property.to_owned(),
                    })
                }
            }
            RawValues::Integers(values) => {
                let start = values[0];
                let contiguous = (start == 0 || start == 1)
                    && values
                        .iter()
                        .zip(start..)
                        .all(|(&value, expected)| value == expected);
                if !contiguous {
                    return Err(DataGenError::IntegerRange {
                        property: property.to_owned(),
                    });
                }
                Ok(Self::Int {
                    start: start as u8,
                    count: values.len() as u8,
                })
            }
        }
    }
}

/// A named, typed axis of block state variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Position in the input map
    pub id: PropertyId,
    /// Internal lookup name, the key in the input map
    pub name: String,
    /// External name used by the protocol
    pub key: String,
    pub values: PropertyValues,
}

impl Property {
    pub const fn kind(&self) -> PropertyKind {
        self.values.kind()
    }
}

/// Properties in id order, looked up by internal name.
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    properties: IndexMap<String, Property>,
}

impl PropertyRegistry {
    /// Builds the registry, assigning ids in document order.
    ///
    /// # Errors
    /// Fails on the first property whose value list is malformed, or if
    /// there are more properties than a [`PropertyId`] can address.
    pub fn from_defs(defs: PropertyDefs) -> Result<Self> {
        if defs.len() > MAX_PROPERTIES {
            return Err(DataGenError::TooManyProperties { count: defs.len() });
        }

        let properties = defs
            .into_iter()
            .enumerate()
            .map(|(id, (name, def))| -> Result<(String, Property)> {
                let values = PropertyValues::classify(&name, def.values)?;
                let property = Property {
                    id: id as PropertyId,
                    name: name.clone(),
                    key: def.key,
                    values,
                };
                Ok((name, property))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(Self { properties })
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn by_id(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get_index(id as usize).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Flattened property tables, all index-aligned with [`PropertyId`]
/// except `values`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTables<'a> {
    pub flags: Vec<PropertyFlags>,
    pub names: Vec<&'a str>,
    pub keys: Vec<&'a str>,
    /// Enum values of every enum property, concatenated in id order
    pub values: Vec<&'a str>,
}

/// Encodes the registry into its flattened tables.
///
/// # Errors
/// Fails once the running total of enum values exceeds what the 8-bit
/// offset field can address.
pub fn encode_properties(registry: &PropertyRegistry) -> Result<PropertyTables<'_>> {
    let tables = registry.iter().try_fold(
        PropertyTables::default(),
        |mut tables, property| -> Result<_> {
            let enum_offset = tables.values.len();
            if let PropertyValues::Enum(values) = &property.values {
                let total = enum_offset + values.len();
                if total > MAX_ENUM_VALUES {
                    return Err(DataGenError::EnumValueOverflow {
                        property: property.name.clone(),
                        total,
                    });
                }
                tables.values.extend(values.iter().map(String::as_str));
            }

            tables.flags.push(PropertyFlags::new(
                property.kind(),
                property.values.len() as u8,
                enum_offset as u8,
            ));
            tables.names.push(&property.name);
            tables.keys.push(&property.key);
            Ok(tables)
        },
    )?;

    debug!(
        properties = tables.flags.len(),
        enum_values = tables.values.len(),
        "encoded property tables"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(json: &str) -> Result<PropertyRegistry> {
        PropertyRegistry::from_defs(serde_json::from_str(json).unwrap())
    }

    fn enum_defs(sizes: &[usize]) -> PropertyDefs {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let values = (0..size).map(|v| format!("v{v}")).collect();
                (
                    format!("p{i}"),
                    crate::schema::PropertyDef {
                        key: format!("p{i}"),
                        values: RawValues::Strings(values),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_color_and_lit_flags() {
        let registry = registry(
            r#"{
                "colorable": {"key": "color", "values": ["red", "blue"]},
                "lit": {"key": "lit", "values": [true, false]}
            }"#,
        )
        .unwrap();
        let tables = encode_properties(&registry).unwrap();

        assert_eq!(tables.flags, [PropertyFlags(0x0002), PropertyFlags(0x0022)]);
        assert_eq!(tables.names, ["colorable", "lit"]);
        assert_eq!(tables.keys, ["color", "lit"]);
        assert_eq!(tables.values, ["red", "blue"]);
    }

    #[test]
    fn test_flags_decode_to_original_domain() {
        let registry = registry(
            r#"{
                "facing": {"key": "facing", "values": ["north", "south", "east", "west"]},
                "age": {"key": "age", "values": [0, 1, 2, 3, 4, 5, 6, 7]},
                "open": {"key": "open", "values": [true, false]},
                "half": {"key": "half", "values": ["upper", "lower"]},
                "layers": {"key": "layers", "values": [1, 2, 3, 4, 5, 6, 7, 8]}
            }"#,
        )
        .unwrap();
        let tables = encode_properties(&registry).unwrap();

        for (property, flags) in registry.iter().zip(&tables.flags) {
            assert_eq!(flags.kind(), property.kind(), "{}", property.name);
            assert_eq!(flags.count() as usize, property.values.len());
            match &property.values {
                PropertyValues::Enum(values) => {
                    let offset = flags.value_offset().unwrap() as usize;
                    let decoded = &tables.values[offset..offset + flags.count() as usize];
                    assert_eq!(decoded, values.as_slice());
                }
                PropertyValues::Boolean => {
                    assert_eq!(flags.count(), 2);
                    assert_eq!(flags.0 & 0xff00, 0);
                }
                PropertyValues::Int { start, count } => {
                    let start_bit = flags.int_start().unwrap();
                    assert_eq!(start_bit, *start);
                    let run: Vec<u8> = (start_bit..start_bit + flags.count()).collect();
                    let expected: Vec<u8> = (*start..*start + *count).collect();
                    assert_eq!(run, expected);
                    assert_eq!(flags.0 & 0xff00, 0);
                }
            }
        }

        assert_eq!(tables.flags[0].value_offset(), Some(0));
        assert_eq!(tables.flags[3].value_offset(), Some(4));
    }

    #[test]
    fn test_ids_follow_document_order() {
        let registry = registry(
            r#"{
                "b": {"key": "b", "values": [0, 1]},
                "a": {"key": "a", "values": ["x"]}
            }"#,
        )
        .unwrap();
        assert_eq!(registry.get("b").unwrap().id, 0);
        assert_eq!(registry.get("a").unwrap().id, 1);
        assert_eq!(registry.by_id(1).unwrap().name, "a");
        assert!(registry.by_id(2).is_none());
    }

    #[test]
    fn test_enum_total_255_accepted() {
        let mut sizes = vec![31; 8];
        sizes.push(7);
        let registry = PropertyRegistry::from_defs(enum_defs(&sizes)).unwrap();
        let tables = encode_properties(&registry).unwrap();
        assert_eq!(tables.values.len(), 255);
        assert_eq!(tables.flags[8].value_offset(), Some(248));
    }

    #[test]
    fn test_enum_total_256_rejected() {
        let mut sizes = vec![31; 8];
        sizes.push(8);
        let registry = PropertyRegistry::from_defs(enum_defs(&sizes)).unwrap();
        let err = encode_properties(&registry).unwrap_err();
        assert!(
            matches!(err, DataGenError::EnumValueOverflow { ref property, total: 256 } if property == "p8"),
            "{err}"
        );
    }

    fn boolean_defs(count: usize) -> PropertyDefs {
        (0..count)
            .map(|i| {
                (
                    format!("p{i}"),
                    crate::schema::PropertyDef {
                        key: format!("p{i}"),
                        values: RawValues::Booleans(vec![true, false]),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_property_count_limit() {
        let registry = PropertyRegistry::from_defs(boolean_defs(256)).unwrap();
        assert_eq!(registry.len(), 256);
        assert_eq!(registry.get("p255").unwrap().id, 255);
        assert_eq!(registry.by_id(255).unwrap().name, "p255");

        assert!(matches!(
            PropertyRegistry::from_defs(boolean_defs(257)),
            Err(DataGenError::TooManyProperties { count: 257 })
        ));
    }

    #[test]
    fn test_value_count_limits() {
        let values: Vec<String> = (0..31).map(|v| format!("\"v{v}\"")).collect();
        let json = format!(r#"{{"p": {{"key": "p", "values": [{}]}}}}"#, values.join(","));
        assert!(registry(&json).is_ok());

        let values: Vec<String> = (0..32).map(|v| v.to_string()).collect();
        let json = format!(r#"{{"p": {{"key": "p", "values": [{}]}}}}"#, values.join(","));
        assert!(matches!(
            registry(&json),
            Err(DataGenError::TooManyValues { count: 32, .. })
        ));
    }

    #[test]
    fn test_empty_values_rejected() {
        assert!(matches!(
            registry(r#"{"p": {"key": "p", "values": []}}"#),
            Err(DataGenError::EmptyValues { .. })
        ));
    }

    #[test]
    fn test_boolean_order_enforced() {
        for values in ["[false, true]", "[true]", "[true, false, true]", "[true, true]"] {
            let json = format!(r#"{{"p": {{"key": "p", "values": {values}}}}}"#);
            assert!(
                matches!(registry(&json), Err(DataGenError::BooleanValues { .. })),
                "{values}"
            );
        }
    }

    #[test]
    fn test_integer_runs() {
        for values in ["[0]", "[1]", "[0, 1, 2]", "[1, 2, 3, 4]"] {
            let json = format!(r#"{{"p": {{"key": "p", "values": {values}}}}}"#);
            assert!(registry(&json).is_ok(), "{values}");
        }
        for values in ["[2, 3]", "[0, 2]", "[1, 0]", "[-1, 0]", "[0, 1, 1]"] {
            let json = format!(r#"{{"p": {{"key": "p", "values": {values}}}}}"#);
            assert!(
                matches!(registry(&json), Err(DataGenError::IntegerRange { .. })),
                "{values}"
            );
        }
    }
}
