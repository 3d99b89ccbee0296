//! Small builder for in-memory WSDL graphs.

#![allow(dead_code)]

use wsdlproxy_wsdl::{
    graph::{
        Field, JsonType, MaxOccurs, Operation, Part, Payload, SchemaType, SoapAddress, Style,
        TypeRef, Use, Wsdl,
    },
    types::SOAPENC_NS,
    QualifiedName,
};

pub const NS: &str = "urn:test";

pub fn qn(name: &str) -> QualifiedName {
    QualifiedName::new(Some(NS), name)
}

pub fn string() -> TypeRef {
    TypeRef::primitive(JsonType::String)
}

pub fn number() -> TypeRef {
    TypeRef::primitive(JsonType::Number)
}

pub fn of(name: &str) -> TypeRef {
    TypeRef::schema(qn(name))
}

pub fn field(name: &str, ty: TypeRef) -> Field {
    Field::new(name, ty)
}

pub fn optional(name: &str, ty: TypeRef) -> Field {
    Field {
        min_occurs: 0,
        ..Field::new(name, ty)
    }
}

pub fn repeated(name: &str, ty: TypeRef, max: MaxOccurs) -> Field {
    Field {
        max_occurs: Some(max),
        ..Field::new(name, ty)
    }
}

pub fn element_part(name: &str, element: &str) -> Part {
    Part {
        name: name.into(),
        namespace: Some(NS.into()),
        element: Some(qn(element)),
        ty: TypeRef::default(),
    }
}

pub fn type_part(name: &str, ty: TypeRef) -> Part {
    Part {
        name: name.into(),
        namespace: None,
        element: None,
        ty,
    }
}

fn checksum(namespace: &str) -> String {
    format!("{:08x}", namespace.bytes().map(u32::from).sum::<u32>())
}

pub struct GraphBuilder {
    wsdl: Wsdl,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            wsdl: Wsdl {
                namespace: Some(NS.into()),
                soap_address: Some(SoapAddress {
                    hostname: "soap.test".into(),
                    port: None,
                    path: "/service".into(),
                    is_https: false,
                }),
                ..Wsdl::default()
            },
        }
    }

    pub fn schema_type(mut self, ty: SchemaType) -> Self {
        self.wsdl.insert_type(ty);
        self
    }

    pub fn complex_in(self, namespace: &str, name: &str, content: Vec<Field>) -> Self {
        self.schema_type(SchemaType {
            namespace: Some(namespace.into()),
            name: name.into(),
            base_type: None,
            content,
            enumerated_values: None,
            json_type: None,
            is_synthetic: false,
            ns_checksum: checksum(namespace),
        })
    }

    pub fn complex(self, name: &str, content: Vec<Field>) -> Self {
        self.complex_in(NS, name, content)
    }

    pub fn extends(mut self, name: &str, base: &str, content: Vec<Field>) -> Self {
        self = self.complex(name, content);
        if let Some(ty) = self.wsdl.types.get_mut(&qn(name).key()) {
            ty.base_type = Some(qn(base));
        }
        self
    }

    pub fn array(mut self, name: &str, item: TypeRef) -> Self {
        self = self.complex(name, vec![repeated("item", item, MaxOccurs::Unbounded)]);
        if let Some(ty) = self.wsdl.types.get_mut(&qn(name).key()) {
            ty.base_type = Some(QualifiedName::new(Some(SOAPENC_NS), "Array"));
        }
        self
    }

    pub fn enumeration(self, name: &str, values: &[&str]) -> Self {
        self.schema_type(SchemaType {
            namespace: Some(NS.into()),
            name: name.into(),
            base_type: Some(QualifiedName::new(
                Some("http://www.w3.org/2001/XMLSchema"),
                "string",
            )),
            content: Vec::new(),
            enumerated_values: Some(values.iter().map(|value| value.to_string()).collect()),
            json_type: Some(JsonType::String),
            is_synthetic: false,
            ns_checksum: checksum(NS),
        })
    }

    pub fn element(mut self, name: &str, ty: TypeRef) -> Self {
        self.wsdl.insert_element(wsdlproxy_wsdl::graph::Element {
            namespace: Some(NS.into()),
            name: name.into(),
            ty,
        });
        self
    }

    fn payload(encoding: Use, parts: Vec<Part>) -> Option<Payload> {
        if parts.is_empty() {
            None
        } else {
            Some(Payload { encoding, parts })
        }
    }

    pub fn operation(self, name: &str, input: Vec<Part>, output: Vec<Part>) -> Self {
        self.operation_with(name, Use::Literal, input, output)
    }

    pub fn encoded_operation(mut self, name: &str, input: Vec<Part>, output: Vec<Part>) -> Self {
        self = self.operation_with(name, Use::Encoded, input, output);
        if let Some(operation) = self.wsdl.operations.get_mut(name) {
            operation.style = Some(Style::Rpc);
        }
        self
    }

    fn operation_with(mut self, name: &str, encoding: Use, input: Vec<Part>, output: Vec<Part>) -> Self {
        self.wsdl.operations.insert(
            name.into(),
            Operation {
                name: name.into(),
                namespace: None,
                soap_action: Some(format!("{}#{}", NS, name)),
                style: None,
                documentation: None,
                input: Self::payload(encoding, input),
                output: Self::payload(encoding, output),
            },
        );
        self
    }

    pub fn build(self) -> Wsdl {
        self.wsdl
    }
}
