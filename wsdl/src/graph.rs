//! The parsed WSDL object graph handed to the model compiler.
//!
//! Types and elements are keyed by `{namespace}localName`, operations by
//! name. A [`TypeRef`] only carries an `xmlType` when it points at a type
//! declared in [`Wsdl::types`]; built-in XML Schema types travel as a bare
//! `jsonType` tag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{QualifiedName, SYNTHETIC_SUFFIX_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Date,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Use {
    Encoded,
    #[default]
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Style {
    Rpc,
    #[default]
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoapVersion {
    #[default]
    #[serde(rename = "1.1")]
    Soap11,
    #[serde(rename = "1.2")]
    Soap12,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_enum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_type: Option<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<MaxOccurs>,
    #[serde(flatten)]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_attr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<QualifiedName>,
    #[serde(default)]
    pub content: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerated_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_synthetic: bool,
    #[serde(default)]
    pub ns_checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub name: String,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<QualifiedName>,
    #[serde(flatten)]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, rename = "use")]
    pub encoding: Use,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Payload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoapAddress {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_https: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wsdl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub version: SoapVersion,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub types: BTreeMap<String, SchemaType>,
    #[serde(default)]
    pub elements: BTreeMap<String, Element>,
    #[serde(default)]
    pub operations: BTreeMap<String, Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_address: Option<SoapAddress>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_min_occurs() -> u32 {
    1
}

impl From<i64> for MaxOccurs {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::Unbounded
        } else {
            Self::Bounded(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<MaxOccurs> for i64 {
    fn from(value: MaxOccurs) -> Self {
        match value {
            MaxOccurs::Bounded(bound) => i64::from(bound),
            MaxOccurs::Unbounded => -1,
        }
    }
}

impl TypeRef {
    pub fn primitive(json_type: JsonType) -> Self {
        Self {
            json_type: Some(json_type),
            ..Self::default()
        }
    }

    pub fn schema(name: QualifiedName) -> Self {
        Self {
            xml_type: Some(name),
            ..Self::default()
        }
    }

    pub fn enumeration(base: JsonType, name: QualifiedName) -> Self {
        Self {
            json_type: Some(base),
            is_enum: true,
            xml_type: Some(name),
        }
    }
}

impl Field {
    pub fn new<S: Into<String>>(name: S, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            min_occurs: 1,
            max_occurs: None,
            ty,
            is_attr: false,
        }
    }

    /// More than one occurrence allowed, either a bound above one or unbounded.
    pub fn is_repeating(&self) -> bool {
        match self.max_occurs {
            Some(MaxOccurs::Bounded(bound)) => bound > 1,
            Some(MaxOccurs::Unbounded) => true,
            None => false,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_occurs == Some(MaxOccurs::Unbounded)
    }

    /// No declared upper bound, or a bound of exactly one.
    pub fn is_singular(&self) -> bool {
        matches!(self.max_occurs, None | Some(MaxOccurs::Bounded(1)))
    }
}

impl SchemaType {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Synthetic types are known by the element they were declared in.
    pub fn stem(&self) -> &str {
        if !self.is_synthetic {
            return &self.name;
        }

        self.name
            .len()
            .checked_sub(SYNTHETIC_SUFFIX_LEN)
            .and_then(|end| self.name.get(..end))
            .unwrap_or(&self.name)
    }

    pub fn unique_name(&self) -> String {
        if self.is_synthetic {
            self.name.clone()
        } else {
            format!("{}_{}", self.name, self.ns_checksum)
        }
    }

    pub fn is_soap_array(&self) -> bool {
        self.base_type
            .as_ref()
            .map_or(false, QualifiedName::is_soap_array)
    }

    pub fn is_enumeration(&self) -> bool {
        self.enumerated_values.is_some()
    }

    /// The base type whose fields are inherited, skipping built-in bases.
    pub fn inherited_base(&self) -> Option<&QualifiedName> {
        self.base_type.as_ref().filter(|base| !base.is_builtin())
    }
}

impl Element {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

impl SoapAddress {
    pub fn endpoint(&self) -> String {
        let scheme = if self.is_https { "https" } else { "http" };

        match self.port {
            Some(port) => format!("{}://{}:{}{}", scheme, self.hostname, port, self.path),
            None => format!("{}://{}{}", scheme, self.hostname, self.path),
        }
    }
}

impl Wsdl {
    pub fn schema_type(&self, name: &QualifiedName) -> Option<&SchemaType> {
        self.types.get(&name.key())
    }

    pub fn element(&self, name: &QualifiedName) -> Option<&Element> {
        self.elements.get(&name.key())
    }

    pub fn insert_type(&mut self, ty: SchemaType) {
        self.types.insert(ty.qualified_name().key(), ty);
    }

    pub fn insert_element(&mut self, element: Element) {
        self.elements.insert(element.qualified_name().key(), element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_occurs_maps_negative_to_unbounded() {
        assert_eq!(MaxOccurs::from(-1), MaxOccurs::Unbounded);
        assert_eq!(MaxOccurs::from(5), MaxOccurs::Bounded(5));
        assert_eq!(i64::from(MaxOccurs::Unbounded), -1);
    }

    #[test]
    fn field_occurrence_helpers() {
        let mut field = Field::new("lines", TypeRef::primitive(JsonType::String));
        assert!(field.is_singular());
        assert!(!field.is_repeating());

        field.max_occurs = Some(MaxOccurs::Bounded(5));
        assert!(field.is_repeating());
        assert!(!field.is_singular());
        assert!(!field.is_unbounded());

        field.max_occurs = Some(MaxOccurs::Unbounded);
        assert!(field.is_repeating());
        assert!(field.is_unbounded());
    }

    #[test]
    fn synthetic_stem_strips_suffix() {
        let ty = SchemaType {
            namespace: Some("urn:orders".into()),
            name: "GetOrder_000001".into(),
            base_type: None,
            content: Vec::new(),
            enumerated_values: None,
            json_type: None,
            is_synthetic: true,
            ns_checksum: "0badf00d".into(),
        };

        assert_eq!(ty.stem(), "GetOrder");
        assert_eq!(ty.unique_name(), "GetOrder_000001");
    }

    #[test]
    fn endpoint_includes_port_when_present() {
        let address = SoapAddress {
            hostname: "soap.example.com".into(),
            port: Some(8443),
            path: "/orders".into(),
            is_https: true,
        };

        assert_eq!(address.endpoint(), "https://soap.example.com:8443/orders");
    }

    #[test]
    fn graph_reads_loader_json() {
        let wsdl: Wsdl = serde_json::from_str(
            r#"{
                "namespace": "urn:orders",
                "version": "1.1",
                "style": "RPC",
                "types": {
                    "{urn:orders}Order": {
                        "ns": "urn:orders",
                        "name": "Order",
                        "nsChecksum": "1a2b3c4d",
                        "content": [
                            {"name": "id", "jsonType": "string", "minOccurs": 0},
                            {"name": "lines", "xmlType": {"ns": "urn:orders", "name": "Line"}, "maxOccurs": -1}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let order = &wsdl.types["{urn:orders}Order"];
        assert_eq!(wsdl.style, Style::Rpc);
        assert_eq!(order.content[0].min_occurs, 0);
        assert_eq!(order.content[0].ty.json_type, Some(JsonType::String));
        assert!(order.content[1].is_unbounded());
        assert_eq!(order.content[1].min_occurs, 1);
    }
}
