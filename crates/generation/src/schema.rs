//! Response schemas in the provider's `responseSchema` dialect.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            enum_values: Vec::new(),
            items: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::of(SchemaType::Object)
        }
    }

    /// String restricted to the given values.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: values.into_iter().map(Into::into).collect(),
            ..Self::string()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn require<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Marks every declared property as required.
    pub fn require_all(mut self) -> Self {
        self.required = self.properties.keys().cloned().collect();
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Smallest value that satisfies the schema: one array element, the first
    /// enum value, placeholder scalars.
    pub fn sample(&self) -> Value {
        match self.kind {
            SchemaType::String => self
                .enum_values
                .first()
                .map(|v| Value::String(v.clone()))
                .unwrap_or_else(|| Value::String("placeholder".to_string())),
            SchemaType::Integer => Value::from(1),
            SchemaType::Number => Value::from(1.0),
            SchemaType::Boolean => Value::Bool(false),
            SchemaType::Array => Value::Array(
                self.items
                    .as_ref()
                    .map(|item| vec![item.sample()])
                    .unwrap_or_default(),
            ),
            SchemaType::Object => Value::Object(
                self.properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.sample()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}
