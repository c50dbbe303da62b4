//! JSON encoding of [`Schema`] and [`Type`].

use serde::ser::{SerializeMap as _, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ListType, MapType, NestedField, Schema, StructType, Type, DEFAULT_SCHEMA_ID};
use crate::json::{
    as_object, get, get_bool, get_int, get_int_or_null, get_string, get_string_or_null,
};
use crate::{Error, KernelResult};

const TYPE: &str = "type";
const STRUCT: &str = "struct";
const LIST: &str = "list";
const MAP: &str = "map";
const SCHEMA_ID: &str = "schema-id";
const FIELDS: &str = "fields";
const ID: &str = "id";
const NAME: &str = "name";
const REQUIRED: &str = "required";
const DOC: &str = "doc";
const ELEMENT_ID: &str = "element-id";
const ELEMENT: &str = "element";
const ELEMENT_REQUIRED: &str = "element-required";
const KEY_ID: &str = "key-id";
const KEY: &str = "key";
const VALUE_ID: &str = "value-id";
const VALUE: &str = "value";
const VALUE_REQUIRED: &str = "value-required";

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(TYPE, STRUCT)?;
        map.serialize_entry(SCHEMA_ID, &self.schema_id)?;
        map.serialize_entry(FIELDS, self.fields())?;
        map.end()
    }
}

impl Serialize for StructType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(TYPE, STRUCT)?;
        map.serialize_entry(FIELDS, self.fields())?;
        map.end()
    }
}

impl Serialize for NestedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.doc.is_some() { 5 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(ID, &self.id)?;
        map.serialize_entry(NAME, &self.name)?;
        map.serialize_entry(REQUIRED, &self.required)?;
        map.serialize_entry(TYPE, &self.field_type)?;
        if let Some(doc) = &self.doc {
            map.serialize_entry(DOC, doc)?;
        }
        map.end()
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Type::Primitive(primitive) => serializer.collect_str(primitive),
            Type::Struct(struct_type) => struct_type.serialize(serializer),
            Type::List(list) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry(TYPE, LIST)?;
                map.serialize_entry(ELEMENT_ID, &list.element_id)?;
                map.serialize_entry(ELEMENT, &list.element)?;
                map.serialize_entry(ELEMENT_REQUIRED, &list.element_required)?;
                map.end()
            }
            Type::Map(map_type) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry(TYPE, MAP)?;
                map.serialize_entry(KEY_ID, &map_type.key_id)?;
                map.serialize_entry(KEY, &map_type.key)?;
                map.serialize_entry(VALUE_ID, &map_type.value_id)?;
                map.serialize_entry(VALUE, &map_type.value)?;
                map.serialize_entry(VALUE_REQUIRED, &map_type.value_required)?;
                map.end()
            }
        }
    }
}

impl Type {
    /// Decode a type: a primitive type name, or a `struct`/`list`/`map` object.
    pub fn from_json(json: &Value) -> KernelResult<Self> {
        match json {
            Value::String(name) => Ok(Type::Primitive(name.parse()?)),
            Value::Object(node) => match node.get(TYPE).and_then(Value::as_str) {
                Some(STRUCT) => struct_from_json(node).map(Type::Struct),
                Some(LIST) => list_from_json(node).map(Type::List),
                Some(MAP) => map_from_json(node).map(Type::Map),
                _ => Err(Error::InvalidType(json.clone())),
            },
            _ => Err(Error::InvalidType(json.clone())),
        }
    }
}

impl Schema {
    /// Decode a schema. The top-level type must be a struct; `schema-id` defaults to
    /// [`DEFAULT_SCHEMA_ID`] when absent.
    pub fn from_json(json: &Value) -> KernelResult<Self> {
        let struct_type = match Type::from_json(json)? {
            Type::Struct(struct_type) => struct_type,
            other => {
                return Err(Error::generic(format!(
                    "Cannot create schema, not a struct type: {other}"
                )))
            }
        };
        let node = as_object("schema", json)?;
        let schema_id = get_int_or_null(SCHEMA_ID, node)?.unwrap_or(DEFAULT_SCHEMA_ID);
        Ok(Schema {
            schema_id,
            struct_type,
        })
    }
}

fn struct_from_json(node: &Map<String, Value>) -> KernelResult<StructType> {
    let fields = get(FIELDS, node)?;
    let fields = fields.as_array().ok_or_else(|| {
        Error::generic(format!("Cannot parse struct fields from non-array: {fields}"))
    })?;
    let fields = fields
        .iter()
        .map(field_from_json)
        .collect::<KernelResult<Vec<_>>>()?;
    Ok(StructType::new(fields))
}

fn field_from_json(json: &Value) -> KernelResult<NestedField> {
    let node = as_object("struct field", json)?;
    let id = get_int(ID, node)?;
    let name = get_string(NAME, node)?;
    let field_type = Type::from_json(get(TYPE, node)?)?;
    let required = get_bool(REQUIRED, node)?;
    let doc = get_string_or_null(DOC, node)?;
    Ok(NestedField {
        id,
        name: name.to_string(),
        required,
        field_type,
        doc: doc.map(str::to_string),
    })
}

fn list_from_json(node: &Map<String, Value>) -> KernelResult<ListType> {
    let element_id = get_int(ELEMENT_ID, node)?;
    let element = Type::from_json(get(ELEMENT, node)?)?;
    let element_required = get_bool(ELEMENT_REQUIRED, node)?;
    Ok(ListType::new(element_id, element, element_required))
}

fn map_from_json(node: &Map<String, Value>) -> KernelResult<MapType> {
    let key_id = get_int(KEY_ID, node)?;
    let key = Type::from_json(get(KEY, node)?)?;
    let value_id = get_int(VALUE_ID, node)?;
    let value = Type::from_json(get(VALUE, node)?)?;
    let value_required = get_bool(VALUE_REQUIRED, node)?;
    Ok(MapType::new(key_id, key, value_id, value, value_required))
}
