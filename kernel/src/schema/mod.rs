//! Definitions of the projection schema a scan reads.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::{Error, KernelResult};

mod json;

/// The id a [`Schema`] gets when none is given.
pub const DEFAULT_SCHEMA_ID: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    String,
    Uuid,
    Binary,
    /// A fixed-length byte array.
    Fixed(u64),
    Decimal {
        precision: u32,
        scale: u32,
    },
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::TimestampTz => write!(f, "timestamptz"),
            Self::String => write!(f, "string"),
            Self::Uuid => write!(f, "uuid"),
            Self::Binary => write!(f, "binary"),
            Self::Fixed(length) => write!(f, "fixed[{length}]"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision}, {scale})"),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = Error;

    fn from_str(s: &str) -> KernelResult<Self> {
        let invalid = || Error::generic(format!("Cannot parse type string to primitive: {s}"));
        let lower = s.trim().to_ascii_lowercase();
        let primitive = match lower.as_str() {
            "boolean" => Self::Boolean,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "string" => Self::String,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            other => {
                if let Some(length) = other
                    .strip_prefix("fixed[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    Self::Fixed(length.trim().parse().map_err(|_| invalid())?)
                } else if let Some(args) = other
                    .strip_prefix("decimal(")
                    .and_then(|rest| rest.strip_suffix(')'))
                {
                    let (precision, scale) = args.split_once(',').ok_or_else(invalid)?;
                    Self::Decimal {
                        precision: precision.trim().parse().map_err(|_| invalid())?,
                        scale: scale.trim().parse().map_err(|_| invalid())?,
                    }
                } else {
                    return Err(invalid());
                }
            }
        };
        Ok(primitive)
    }
}

/// The type of a [`NestedField`], list element, or map key/value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Struct(StructType),
    List(ListType),
    Map(MapType),
}

impl From<PrimitiveType> for Type {
    fn from(primitive: PrimitiveType) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<StructType> for Type {
    fn from(struct_type: StructType) -> Self {
        Self::Struct(struct_type)
    }
}

impl From<ListType> for Type {
    fn from(list: ListType) -> Self {
        Self::List(list)
    }
}

impl From<MapType> for Type {
    fn from(map: MapType) -> Self {
        Self::Map(map)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Struct(struct_type) => write!(f, "{struct_type}"),
            Self::List(list) => write!(f, "list<{}>", list.element),
            Self::Map(map) => write!(f, "map<{}, {}>", map.key, map.value),
        }
    }
}

/// A named, id-tagged column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedField {
    pub id: i32,
    pub name: String,
    pub required: bool,
    pub field_type: Type,
    pub doc: Option<String>,
}

impl NestedField {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        field_type: impl Into<Type>,
        required: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            required,
            field_type: field_type.into(),
            doc: None,
        }
    }

    /// A field that must always hold a value.
    pub fn required(id: i32, name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self::new(id, name, field_type, true)
    }

    /// A field that may be null.
    pub fn optional(id: i32, name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self::new(id, name, field_type, false)
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl Display for NestedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let requirement = if self.required { "required" } else { "optional" };
        write!(f, "{}: {}: {requirement} {}", self.id, self.name, self.field_type)?;
        if let Some(doc) = &self.doc {
            write!(f, " ({doc})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructType {
    fields: Vec<NestedField>,
}

impl StructType {
    pub fn new(fields: impl IntoIterator<Item = NestedField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[NestedField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&NestedField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl Display for StructType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "struct<{}>", self.fields.iter().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListType {
    pub element_id: i32,
    pub element_required: bool,
    pub element: Box<Type>,
}

impl ListType {
    pub fn new(element_id: i32, element: impl Into<Type>, element_required: bool) -> Self {
        Self {
            element_id,
            element_required,
            element: Box::new(element.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    pub key_id: i32,
    pub key: Box<Type>,
    pub value_id: i32,
    pub value_required: bool,
    pub value: Box<Type>,
}

impl MapType {
    pub fn new(
        key_id: i32,
        key: impl Into<Type>,
        value_id: i32,
        value: impl Into<Type>,
        value_required: bool,
    ) -> Self {
        Self {
            key_id,
            key: Box::new(key.into()),
            value_id,
            value_required,
            value: Box::new(value.into()),
        }
    }
}

/// The ordered set of columns a scan projects, tagged with a schema id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    schema_id: i32,
    struct_type: StructType,
}

impl Schema {
    pub fn new(fields: impl IntoIterator<Item = NestedField>) -> Self {
        Self {
            schema_id: DEFAULT_SCHEMA_ID,
            struct_type: StructType::new(fields),
        }
    }

    pub fn with_schema_id(mut self, schema_id: i32) -> Self {
        self.schema_id = schema_id;
        self
    }

    pub fn schema_id(&self) -> i32 {
        self.schema_id
    }

    pub fn fields(&self) -> &[NestedField] {
        self.struct_type.fields()
    }

    pub fn field(&self, name: &str) -> Option<&NestedField> {
        self.struct_type.field(name)
    }

    pub fn as_struct(&self) -> &StructType {
        &self.struct_type
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "table {{")?;
        for field in self.fields() {
            write!(f, "\n  {field}")?;
        }
        write!(f, "\n}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_round_trip() {
        let primitives = [
            PrimitiveType::Boolean,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double,
            PrimitiveType::Date,
            PrimitiveType::Time,
            PrimitiveType::Timestamp,
            PrimitiveType::TimestampTz,
            PrimitiveType::String,
            PrimitiveType::Uuid,
            PrimitiveType::Binary,
            PrimitiveType::Fixed(16),
            PrimitiveType::Decimal {
                precision: 9,
                scale: 2,
            },
        ];
        for primitive in primitives {
            assert_eq!(primitive.to_string().parse::<PrimitiveType>().unwrap(), primitive);
        }
    }

    #[test]
    fn parse_parameterized_primitives() {
        assert_eq!(
            "decimal(38,10)".parse::<PrimitiveType>().unwrap(),
            PrimitiveType::Decimal {
                precision: 38,
                scale: 10
            }
        );
        assert_eq!(
            "FIXED[ 4 ]".parse::<PrimitiveType>().unwrap(),
            PrimitiveType::Fixed(4)
        );
        for bad in ["decimal(1)", "fixed[x]", "varchar"] {
            assert_eq!(
                bad.parse::<PrimitiveType>().unwrap_err().to_string(),
                format!("Cannot parse type string to primitive: {bad}")
            );
        }
    }

    #[test]
    fn schema_lookup_and_display() {
        let schema = Schema::new([
            NestedField::required(1, "c1", PrimitiveType::String).with_doc("c1"),
            NestedField::optional(
                2,
                "tags",
                ListType::new(3, PrimitiveType::String, false),
            ),
        ])
        .with_schema_id(4);
        assert_eq!(schema.schema_id(), 4);
        assert_eq!(schema.field("tags").map(|f| f.id), Some(2));
        assert!(schema.field("missing").is_none());
        assert_eq!(
            schema.to_string(),
            "table {\n  1: c1: required string (c1)\n  2: tags: optional list<string>\n}"
        );
    }
}
