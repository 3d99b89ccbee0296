use serde::{Deserialize, Serialize};
use std::fmt;

use super::graph::{MaxOccurs, SoapVersion, Style, Use};

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAPENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SOAP11_BINDING_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const SOAP12_BINDING_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";

/// Local name of the SOAP 1.1 encoding array base type.
pub const SOAP_ARRAY: &str = "Array";

/// Anonymous types are named `<stem>_NNNNNN`; the suffix is always this long.
pub const SYNTHETIC_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(default, rename = "ns", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Type(QualifiedName),
    Element(QualifiedName),
    Any,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub namespace: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: Option<MaxOccurs>,
    pub kind: FieldKind,
    pub is_attr: bool,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Struct {
        base: Option<QualifiedName>,
        fields: Vec<Field>,
    },
    Simple {
        base: Option<QualifiedName>,
        values: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Type {
    pub name: QualifiedName,
    pub kind: TypeKind,
    pub synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QualifiedName,
    pub ty: Option<QualifiedName>,
}

#[derive(Debug, Clone)]
pub enum PartKind {
    Element(QualifiedName),
    Type(QualifiedName),
}

#[derive(Debug, Clone)]
pub struct MessagePart {
    pub name: String,
    pub kind: PartKind,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: QualifiedName,
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub documentation: Option<String>,
    pub input: Option<QualifiedName>,
    pub output: Option<QualifiedName>,
}

#[derive(Debug, Clone)]
pub struct PortType {
    pub name: QualifiedName,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyUse {
    pub encoding: Use,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BindingOperation {
    pub name: String,
    pub action: Option<String>,
    pub style: Option<Style>,
    pub input: Option<BodyUse>,
    pub output: Option<BodyUse>,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: QualifiedName,
    pub ty: QualifiedName,
    pub version: Option<SoapVersion>,
    pub style: Option<Style>,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    pub binding: QualifiedName,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub ports: Vec<Port>,
}

/// Raw sections of a WSDL document and everything it imports, before the
/// operations are joined with their messages and bindings.
#[derive(Default, Debug, Clone)]
pub struct Definition {
    pub target_namespace: Option<String>,
    pub types: Vec<Type>,
    pub elements: Vec<Element>,
    pub messages: Vec<Message>,
    pub port_types: Vec<PortType>,
    pub bindings: Vec<Binding>,
    pub services: Vec<Service>,
}

impl QualifiedName {
    pub fn new<N: Into<String>, S: Into<String>>(namespace: Option<N>, name: S) -> Self {
        Self {
            namespace: namespace.map(Into::into),
            name: name.into(),
        }
    }

    pub fn local<S: Into<String>>(name: S) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// The `{namespace}localName` key used by the graph maps.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// Built-in XML Schema and SOAP encoding types never get a model of their own.
    pub fn is_builtin(&self) -> bool {
        self.is_in(XSD_NS) || self.is_in(SOAPENC_NS)
    }

    pub fn is_soap_array(&self) -> bool {
        self.is_in(SOAPENC_NS) && self.name == SOAP_ARRAY
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{}}}{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Definition {
    pub fn message(&self, name: &QualifiedName) -> Option<&Message> {
        self.messages.iter().find(|message| message.name == *name)
    }

    pub fn port_type(&self, name: &QualifiedName) -> Option<&PortType> {
        self.port_types.iter().find(|port_type| port_type.name == *name)
    }

    pub fn binding(&self, name: &QualifiedName) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.name == *name)
    }

    pub fn element(&self, name: &QualifiedName) -> Option<&Element> {
        self.elements.iter().find(|element| element.name == *name)
    }
}

pub fn synthetic_name(stem: &str, index: usize) -> String {
    format!("{}_{:06}", stem, index % 1_000_000)
}
