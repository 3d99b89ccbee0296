//! The host-side object model a compilation produces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use wsdlproxy_wsdl::{graph::JsonType, QualifiedName};

use super::{config::ProxyConfig, error::Error, wire::WireService};

/// Direction a type travels in. Only ever widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    In,
    Out,
    #[serde(rename = "inout")]
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    #[default]
    One,
    OneToMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterCardinality {
    #[default]
    One,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModelKind {
    Object {
        properties: Vec<Property>,
    },
    Enumeration {
        #[serde(rename = "baseType")]
        base: JsonType,
        values: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelType {
    pub name: String,
    /// Schema type the model was flattened from; absent for synthesized wrappers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<QualifiedName>,
    pub usage: Usage,
    #[serde(default)]
    pub embedded: bool,
    #[serde(flatten)]
    pub kind: ModelKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub cardinality: ParameterCardinality,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub service_type: String,
    pub operations: Vec<OperationModel>,
    pub types: Vec<ModelType>,
    pub wire: WireService,
    #[serde(default)]
    pub proxy_config: ProxyConfig,
}

impl Usage {
    pub fn merge(self, other: Self) -> Self {
        if self == other {
            self
        } else {
            Self::InOut
        }
    }
}

impl FromStr for Usage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "inout" => Ok(Self::InOut),
            other => Err(Error::InvalidUsage(other.to_owned())),
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
        })
    }
}

impl Property {
    /// The name the host registry binds this property under.
    pub fn binding_name(&self) -> &str {
        self.safe_name.as_deref().unwrap_or(&self.name)
    }
}

impl ModelType {
    pub fn properties(&self) -> &[Property] {
        match &self.kind {
            ModelKind::Object { properties } => properties,
            ModelKind::Enumeration { .. } => &[],
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|property| property.name == name)
    }
}

impl ServiceDescriptor {
    pub fn model_type(&self, name: &str) -> Option<&ModelType> {
        self.types.iter().find(|ty| ty.name == name)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationModel> {
        self.operations.iter().find(|operation| operation.name == name)
    }

    /// Wire configuration with the caller's overrides applied on top. Null values are dropped.
    pub fn proxy_configuration(&self) -> Result<Map<String, Value>, Error> {
        let mut merged = match serde_json::to_value(&self.wire)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Value::Object(overrides) = serde_json::to_value(&self.proxy_config)? {
            merged.extend(overrides);
        }

        Ok(merged
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_only_widens() {
        assert_eq!(Usage::In.merge(Usage::In), Usage::In);
        assert_eq!(Usage::Out.merge(Usage::Out), Usage::Out);
        assert_eq!(Usage::In.merge(Usage::Out), Usage::InOut);
        assert_eq!(Usage::InOut.merge(Usage::In), Usage::InOut);
        assert_eq!(Usage::Out.merge(Usage::InOut), Usage::InOut);
    }

    #[test]
    fn usage_parses_known_tags() {
        assert_eq!("inout".parse::<Usage>().unwrap(), Usage::InOut);
        assert_eq!(Usage::Out.to_string(), "out");
        assert!(matches!("both".parse::<Usage>(), Err(Error::InvalidUsage(tag)) if tag == "both"));
    }

    #[test]
    fn model_type_serializes_kind_inline() {
        let ty = ModelType {
            name: "Status".into(),
            source: None,
            usage: Usage::Out,
            embedded: true,
            kind: ModelKind::Enumeration {
                base: JsonType::String,
                values: vec!["OPEN".into()],
            },
        };

        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["kind"], "enumeration");
        assert_eq!(json["baseType"], "string");
        assert_eq!(json["usage"], "out");

        let back: ModelType = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }
}
