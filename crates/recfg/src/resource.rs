//! reconstructed resource model
//!
//! A [Resource] is the root container for one resource instance: its type,
//! its display name and the ordered fields recovered from the flat state.
//!
//! [Field] is a closed sum type; the parser and the printer both match on it
//! exhaustively, so a new variant is a compile error in both places instead
//! of a silent fallthrough.
//!
//! - [Scalar]: a leaf attribute. `path` keeps the flat key that produced it.
//! - [Map]: a one-level map of scalar leaves (map keys may contain dots).
//! - [List]: either all-[Scalar] children (a "simple" list) or all-[Nested]
//!   children (a "rich" list), never mixed.
//! - [Nested]: an anonymous object that only exists as a rich list element;
//!   it has no key of its own and inherits `path` from its first child.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Insertion-ordered field sequence (visitation order, never re-sorted)
pub type OrderedFields = Vec<Field>;

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(Scalar),
    Map(Map),
    List(List),
    Nested(Nested),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub key: String,
    /// original flat key, kept for diagnostics
    pub path: String,
    pub value: String,
    /// render the value bare instead of quoted
    ///
    /// The flat encoding carries no type information, so reconstruction
    /// always leaves this `false`; a schema-aware caller may flip it.
    pub is_bool: bool,
    /// server-assigned value, suppressed from rendered output
    pub computed: bool,
    /// interpolation reference attached by an external collaborator
    ///
    /// When set, the field renders as `key = "${link}"` and the literal
    /// value is not printed.
    pub link: Option<String>,
}

impl Scalar {
    pub fn new(key: impl Into<String>, path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            value: value.into(),
            is_bool: false,
            computed: false,
            link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub key: String,
    pub path: String,
    pub children: OrderedFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub key: String,
    pub path: String,
    pub children: OrderedFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    pub path: String,
    pub children: OrderedFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub resource_type: String,
    pub name: String,
    pub fields: OrderedFields,
}

impl Resource {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        fields: OrderedFields,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            fields,
        }
    }
}

impl serde::ser::Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(3))?;
        ser.serialize_entry("type", &self.resource_type)?;
        ser.serialize_entry("name", &self.name)?;
        ser.serialize_entry("attributes", &Entries(&self.fields))?;
        ser.end()
    }
}

/// Key/value view of an [OrderedFields], used for map-shaped levels
struct Entries<'a>(&'a [Field]);

impl serde::ser::Serialize for Entries<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            match field {
                Field::Scalar(scalar) => ser.serialize_entry(&scalar.key, field)?,
                Field::Map(map) => ser.serialize_entry(&map.key, field)?,
                Field::List(list) => ser.serialize_entry(&list.key, field)?,
                Field::Nested(_) => {
                    unreachable!("nested objects only occur as list elements")
                }
            }
        }
        ser.end()
    }
}

impl serde::ser::Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Scalar(scalar) => {
                if scalar.is_bool {
                    serializer.serialize_bool(scalar.value == "true")
                } else {
                    serializer.serialize_str(&scalar.value)
                }
            }
            Field::Map(map) => Entries(&map.children).serialize(serializer),
            Field::Nested(nested) => Entries(&nested.children).serialize(serializer),
            Field::List(list) => {
                let mut ser = serializer.serialize_seq(Some(list.children.len()))?;
                for element in &list.children {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
        }
    }
}
