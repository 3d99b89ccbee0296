use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

use super::{
    error,
    graph::{self, JsonType, Payload, SoapAddress, SoapVersion, TypeRef, Wsdl},
    types::{self as wsdl, Definition, FieldKind, PartKind, QualifiedName, TypeKind, SOAPENC_NS, XSD_NS},
};

/// Simple types may restrict other simple types; stop following after this many.
const MAX_SIMPLE_DEPTH: usize = 32;

pub fn xsd_json_type(name: &str) -> JsonType {
    match name {
        "boolean" => JsonType::Boolean,
        "date" | "dateTime" | "time" => JsonType::Date,
        "int" | "integer" | "long" | "short" | "byte" | "decimal" | "float" | "double"
        | "unsignedInt" | "unsignedLong" | "unsignedShort" | "unsignedByte" | "positiveInteger"
        | "negativeInteger" | "nonPositiveInteger" | "nonNegativeInteger" => JsonType::Number,
        _ => JsonType::String,
    }
}

pub fn checksum(namespace: Option<&str>) -> String {
    format!("{:08x}", crc32fast::hash(namespace.unwrap_or_default().as_bytes()))
}

fn soap_address(location: &str) -> Result<SoapAddress, error::Error> {
    let url = Url::parse(location)?;

    let path = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_owned(),
    };

    Ok(SoapAddress {
        hostname: url.host_str().unwrap_or_default().to_owned(),
        port: url.port(),
        path,
        is_https: url.scheme() == "https",
    })
}

struct Resolver<'a> {
    definition: &'a Definition,
    simple_types: HashMap<&'a QualifiedName, (&'a Option<QualifiedName>, &'a [String])>,
}

impl<'a> Resolver<'a> {
    fn new(definition: &'a Definition) -> Self {
        let simple_types = definition
            .types
            .iter()
            .filter_map(|ty| match &ty.kind {
                TypeKind::Simple { base, values } => Some((&ty.name, (base, values.as_slice()))),
                TypeKind::Struct { .. } => None,
            })
            .collect();

        Self {
            definition,
            simple_types,
        }
    }

    fn simple_base(&self, base: Option<&QualifiedName>) -> JsonType {
        let mut current = base;

        for _ in 0..MAX_SIMPLE_DEPTH {
            let name = match current {
                Some(name) => name,
                None => return JsonType::String,
            };

            if name.is_builtin() {
                return xsd_json_type(&name.name);
            }

            match self.simple_types.get(name) {
                Some((base, _)) => current = base.as_ref(),
                None => return JsonType::String,
            }
        }

        warn!(?base, "simple type restriction chain too deep");
        JsonType::String
    }

    fn type_ref(&self, name: Option<&QualifiedName>) -> TypeRef {
        let name = match name {
            Some(name) => name,
            None => return TypeRef::primitive(JsonType::String),
        };

        if name.is_in(XSD_NS) || (name.is_in(SOAPENC_NS) && !name.is_soap_array()) {
            return TypeRef::primitive(xsd_json_type(&name.name));
        }

        match self.simple_types.get(name) {
            Some((base, values)) => {
                let base = self.simple_base(base.as_ref());

                if values.is_empty() {
                    TypeRef::primitive(base)
                } else {
                    TypeRef::enumeration(base, name.clone())
                }
            }

            None => TypeRef::schema(name.clone()),
        }
    }

    fn field(&self, field: &wsdl::Field) -> Result<graph::Field, error::Error> {
        let ty = match &field.kind {
            FieldKind::Type(name) => self.type_ref(Some(name)),
            FieldKind::Element(name) => {
                let element = self.definition.element(name).ok_or_else(|| {
                    error::Error::UnresolvedReference {
                        kind: "element",
                        name: name.key(),
                    }
                })?;
                self.type_ref(element.ty.as_ref())
            }
            FieldKind::Any => TypeRef::primitive(JsonType::String),
        };

        Ok(graph::Field {
            name: field.name.clone(),
            namespace: field.namespace.clone(),
            min_occurs: field.min_occurs,
            max_occurs: field.max_occurs,
            ty,
            is_attr: field.is_attr,
        })
    }

    fn schema_type(&self, ty: &wsdl::Type) -> Result<graph::SchemaType, error::Error> {
        let namespace = ty.name.namespace.clone();
        let ns_checksum = checksum(namespace.as_deref());

        let schema_type = match &ty.kind {
            TypeKind::Struct { base, fields } => graph::SchemaType {
                namespace,
                name: ty.name.name.clone(),
                base_type: base.clone(),
                content: fields
                    .iter()
                    .map(|field| self.field(field))
                    .collect::<Result<_, _>>()?,
                enumerated_values: None,
                json_type: None,
                is_synthetic: ty.synthetic,
                ns_checksum,
            },

            TypeKind::Simple { base, values } => graph::SchemaType {
                namespace,
                name: ty.name.name.clone(),
                base_type: base.clone(),
                content: Vec::new(),
                enumerated_values: Some(values.clone()).filter(|values| !values.is_empty()),
                json_type: Some(self.simple_base(base.as_ref())),
                is_synthetic: ty.synthetic,
                ns_checksum,
            },
        };

        Ok(schema_type)
    }

    fn payload(
        &self,
        message: &QualifiedName,
        body: Option<&wsdl::BodyUse>,
    ) -> Result<Payload, error::Error> {
        let message = self.definition.message(message).ok_or_else(|| {
            error::Error::UnresolvedReference {
                kind: "message",
                name: message.key(),
            }
        })?;

        let parts = message
            .parts
            .iter()
            .map(|part| match &part.kind {
                PartKind::Element(element) => graph::Part {
                    name: part.name.clone(),
                    namespace: element.namespace.clone(),
                    element: Some(element.clone()),
                    ty: TypeRef::default(),
                },
                PartKind::Type(ty) => graph::Part {
                    name: part.name.clone(),
                    namespace: None,
                    element: None,
                    ty: self.type_ref(Some(ty)),
                },
            })
            .collect();

        Ok(Payload {
            encoding: body.map(|body| body.encoding).unwrap_or_default(),
            parts,
        })
    }
}

/// Picks the port the proxy talks to: the first SOAP 1.1 port, else the first SOAP port.
fn select_port(definition: &Definition) -> Option<(Option<&wsdl::Port>, &wsdl::Binding)> {
    let ports = definition
        .services
        .iter()
        .flat_map(|service| service.ports.iter())
        .filter_map(|port| {
            definition
                .binding(&port.binding)
                .filter(|binding| binding.version.is_some())
                .map(|binding| (port, binding))
        })
        .collect::<Vec<_>>();

    let preferred = ports
        .iter()
        .find(|(_, binding)| binding.version == Some(SoapVersion::Soap11))
        .or_else(|| ports.first());

    match preferred {
        Some((port, binding)) => Some((Some(*port), *binding)),
        None => definition
            .bindings
            .iter()
            .find(|binding| binding.version.is_some())
            .map(|binding| (None, binding)),
    }
}

pub fn preprocess(definition: &Definition) -> Result<Wsdl, error::Error> {
    let resolver = Resolver::new(definition);

    let mut result = Wsdl {
        namespace: definition.target_namespace.clone(),
        ..Wsdl::default()
    };

    for ty in &definition.types {
        result.insert_type(resolver.schema_type(ty)?);
    }

    for element in &definition.elements {
        result.insert_element(graph::Element {
            namespace: element.name.namespace.clone(),
            name: element.name.name.clone(),
            ty: resolver.type_ref(element.ty.as_ref()),
        });
    }

    let (port, binding) = select_port(definition).ok_or(error::Error::NoSoapPort)?;
    debug!(binding = %binding.name, "selected SOAP binding");

    result.version = binding.version.unwrap_or_default();
    result.style = binding.style.unwrap_or_default();
    result.soap_address = port
        .and_then(|port| port.location.as_deref())
        .map(soap_address)
        .transpose()?;

    let port_type = definition.port_type(&binding.ty).ok_or_else(|| {
        error::Error::UnresolvedReference {
            kind: "portType",
            name: binding.ty.key(),
        }
    })?;

    for operation in &port_type.operations {
        let bound = binding
            .operations
            .iter()
            .find(|bound| bound.name == operation.name);

        let input_body = bound.and_then(|bound| bound.input.as_ref());
        let output_body = bound.and_then(|bound| bound.output.as_ref());

        let input = operation
            .input
            .as_ref()
            .map(|message| resolver.payload(message, input_body))
            .transpose()?;
        let output = operation
            .output
            .as_ref()
            .map(|message| resolver.payload(message, output_body))
            .transpose()?;

        result.operations.insert(
            operation.name.clone(),
            graph::Operation {
                name: operation.name.clone(),
                namespace: input_body.and_then(|body| body.namespace.clone()),
                soap_action: bound.and_then(|bound| bound.action.clone()),
                style: bound.and_then(|bound| bound.style),
                documentation: operation.documentation.clone(),
                input,
                output,
            },
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_types_map_to_json_tags() {
        assert_eq!(xsd_json_type("string"), JsonType::String);
        assert_eq!(xsd_json_type("unsignedShort"), JsonType::Number);
        assert_eq!(xsd_json_type("dateTime"), JsonType::Date);
        assert_eq!(xsd_json_type("boolean"), JsonType::Boolean);
        assert_eq!(xsd_json_type("base64Binary"), JsonType::String);
    }

    #[test]
    fn checksum_is_stable_hex() {
        let first = checksum(Some("urn:orders"));
        assert_eq!(first.len(), 8);
        assert_eq!(first, checksum(Some("urn:orders")));
        assert_ne!(first, checksum(Some("urn:billing")));
    }

    #[test]
    fn address_splits_url() {
        let address = soap_address("https://soap.example.com:8443/svc/orders?wsdl").unwrap();
        assert_eq!(address.hostname, "soap.example.com");
        assert_eq!(address.port, Some(8443));
        assert_eq!(address.path, "/svc/orders?wsdl");
        assert!(address.is_https);
    }
}
