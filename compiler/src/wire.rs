//! Wire descriptors: what the request/response engine needs to build and
//! parse SOAP envelopes without going back to the WSDL.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wsdlproxy_wsdl::{
    graph::{MaxOccurs, SoapAddress, SoapVersion, Style, TypeRef},
    QualifiedName,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpOptions {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub path: String,
    pub is_https: bool,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_name: Option<String>,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<QualifiedName>,
    #[serde(flatten)]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_array: bool,
}

/// A field lifted out of a wrapper part into a top-level parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotedParam {
    /// The request part the field is serialized back into.
    pub parent_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_name: Option<String>,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_attr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub op_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_ns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_action: Option<String>,
    pub is_encoded: bool,
    pub style: Style,
    pub soap_version: SoapVersion,
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescriptor {
    pub is_encoded: bool,
    pub style: Style,
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeserializationHint {
    pub remove_envelope: bool,
    pub soap_encoded: bool,
    /// Singleton wrapper levels between the response body and the returned value.
    pub skip_levels: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestDescriptor>,
    /// Promoted parameter name to the field it came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_params: Option<BTreeMap<String, PromotedParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deserialization: Option<DeserializationHint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_name: Option<String>,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub min_occurs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<MaxOccurs>,
    #[serde(flatten)]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_attr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireType {
    /// `{namespace}name`
    pub full_name: String,
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<QualifiedName>,
    pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireService {
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_options: Option<HttpOptions>,
    pub operations: BTreeMap<String, WireOperation>,
    pub types: Vec<WireType>,
}

impl From<&SoapAddress> for HttpOptions {
    fn from(address: &SoapAddress) -> Self {
        Self {
            hostname: address.hostname.clone(),
            port: address.port,
            path: address.path.clone(),
            is_https: address.is_https,
            method: "POST".to_owned(),
        }
    }
}

impl WireService {
    pub fn wire_type(&self, full_name: &str) -> Option<&WireType> {
        self.types.iter().find(|ty| ty.full_name == full_name)
    }
}

impl WireType {
    pub fn field(&self, name: &str) -> Option<&WireField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
