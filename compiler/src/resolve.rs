use wsdlproxy_wsdl::{
    graph::{JsonType, SchemaType, TypeRef, Wsdl},
    QualifiedName,
};

use super::{directory::TypeDirectory, error::Error, names::host_type};

/// Arrays of arrays deeper than this are treated as malformed.
const MAX_ARRAY_NESTING: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Primitive(JsonType),
    Complex,
    Enum,
}

/// One resolved type reference. For arrays everything but `is_array`
/// describes the element type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor<'w> {
    pub target: String,
    pub is_array: bool,
    pub class: TypeClass,
    pub schema_type: Option<&'w SchemaType>,
}

impl<'w> TypeDescriptor<'w> {
    fn primitive(json_type: JsonType) -> Self {
        Self {
            target: host_type(json_type).to_owned(),
            is_array: false,
            class: TypeClass::Primitive(json_type),
            schema_type: None,
        }
    }

    /// Complex and enum types end up in the model; primitives do not.
    pub fn is_modeled(&self) -> bool {
        matches!(self.class, TypeClass::Complex | TypeClass::Enum)
    }

    /// The wrapper type whose fields may be promoted to parameters.
    pub fn wrapper(&self) -> Option<&'w SchemaType> {
        match self.class {
            TypeClass::Complex if !self.is_array => self.schema_type,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'d, 'w> {
    wsdl: &'w Wsdl,
    directory: &'d TypeDirectory,
}

impl<'d, 'w> Resolver<'d, 'w> {
    pub fn new(wsdl: &'w Wsdl, directory: &'d TypeDirectory) -> Self {
        Self { wsdl, directory }
    }

    pub fn lookup(&self, name: &QualifiedName) -> Result<&'w SchemaType, Error> {
        self.wsdl
            .schema_type(name)
            .ok_or_else(|| Error::SchemaReference(name.key()))
    }

    pub fn resolve(&self, reference: &TypeRef) -> Result<TypeDescriptor<'w>, Error> {
        self.resolve_nested(reference, 0)
    }

    fn resolve_nested(&self, reference: &TypeRef, depth: usize) -> Result<TypeDescriptor<'w>, Error> {
        if let Some(json_type) = reference.json_type {
            if !reference.is_enum || json_type != JsonType::String {
                return Ok(TypeDescriptor::primitive(json_type));
            }
        }

        let name = match &reference.xml_type {
            Some(name) => name,
            None => {
                return Ok(TypeDescriptor::primitive(
                    reference.json_type.unwrap_or(JsonType::String),
                ))
            }
        };

        let ty = self.lookup(name)?;

        if ty.is_soap_array() {
            let item = match ty.content.first() {
                Some(item) if depth < MAX_ARRAY_NESTING => item,
                _ => return Err(Error::MalformedArray(name.key())),
            };

            let element = self.resolve_nested(&item.ty, depth + 1)?;
            return Ok(TypeDescriptor {
                is_array: true,
                ..element
            });
        }

        Ok(self.describe(ty))
    }

    /// Classifies a schema type reached without going through a reference.
    pub fn describe(&self, ty: &'w SchemaType) -> TypeDescriptor<'w> {
        let class = if ty.is_enumeration() {
            TypeClass::Enum
        } else if let Some(json_type) = ty.json_type {
            return TypeDescriptor::primitive(json_type);
        } else {
            TypeClass::Complex
        };

        TypeDescriptor {
            target: self.directory.target_name(ty),
            is_array: false,
            class,
            schema_type: Some(ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsdlproxy_wsdl::graph::{Field, MaxOccurs};

    const NS: &str = "urn:shop";

    fn name(local: &str) -> QualifiedName {
        QualifiedName::new(Some(NS), local)
    }

    fn complex(local: &str, content: Vec<Field>) -> SchemaType {
        SchemaType {
            namespace: Some(NS.into()),
            name: local.into(),
            base_type: None,
            content,
            enumerated_values: None,
            json_type: None,
            is_synthetic: false,
            ns_checksum: "5ca1ab1e".into(),
        }
    }

    fn shop() -> Wsdl {
        let mut wsdl = Wsdl::default();

        wsdl.insert_type(complex("Order", vec![Field::new("id", TypeRef::primitive(JsonType::String))]));

        let mut item = Field::new("item", TypeRef::schema(name("Order")));
        item.max_occurs = Some(MaxOccurs::Unbounded);
        let mut array = complex("ArrayOfOrder", vec![item]);
        array.base_type = Some(QualifiedName::new(
            Some(wsdlproxy_wsdl::types::SOAPENC_NS),
            "Array",
        ));
        wsdl.insert_type(array);

        let mut status = complex("Status", Vec::new());
        status.enumerated_values = Some(vec!["NEW".into()]);
        status.json_type = Some(JsonType::String);
        wsdl.insert_type(status);

        wsdl
    }

    #[test]
    fn primitives_use_host_names() {
        let wsdl = shop();
        let directory = TypeDirectory::build(wsdl.types.values());
        let resolver = Resolver::new(&wsdl, &directory);

        let number = resolver.resolve(&TypeRef::primitive(JsonType::Number)).unwrap();
        assert_eq!(number.target, "Real");
        assert_eq!(number.class, TypeClass::Primitive(JsonType::Number));

        let untyped = resolver.resolve(&TypeRef::default()).unwrap();
        assert_eq!(untyped.target, "String");
    }

    #[test]
    fn soap_array_resolves_to_element() {
        let wsdl = shop();
        let directory = TypeDirectory::build(wsdl.types.values());
        let resolver = Resolver::new(&wsdl, &directory);

        let array = resolver.resolve(&TypeRef::schema(name("ArrayOfOrder"))).unwrap();
        assert!(array.is_array);
        assert_eq!(array.class, TypeClass::Complex);
        assert_eq!(array.target, "Order");
        assert_eq!(array.schema_type.map(|ty| ty.name.as_str()), Some("Order"));
        assert!(array.wrapper().is_none());
    }

    #[test]
    fn string_enumerations_are_modeled() {
        let wsdl = shop();
        let directory = TypeDirectory::build(wsdl.types.values());
        let resolver = Resolver::new(&wsdl, &directory);

        let status = resolver
            .resolve(&TypeRef::enumeration(JsonType::String, name("Status")))
            .unwrap();
        assert_eq!(status.class, TypeClass::Enum);
        assert_eq!(status.target, "Status");

        let numeric = resolver
            .resolve(&TypeRef::enumeration(JsonType::Number, name("Status")))
            .unwrap();
        assert_eq!(numeric.class, TypeClass::Primitive(JsonType::Number));
    }

    #[test]
    fn dangling_reference_fails() {
        let wsdl = shop();
        let directory = TypeDirectory::build(wsdl.types.values());
        let resolver = Resolver::new(&wsdl, &directory);

        let result = resolver.resolve(&TypeRef::schema(name("Missing")));
        assert!(matches!(result, Err(Error::SchemaReference(key)) if key == "{urn:shop}Missing"));
    }

    #[test]
    fn array_without_item_is_malformed() {
        let mut wsdl = shop();
        let mut empty = complex("ArrayOfNothing", Vec::new());
        empty.base_type = Some(QualifiedName::new(Some(wsdlproxy_wsdl::types::SOAPENC_NS), "Array"));
        wsdl.insert_type(empty);

        let directory = TypeDirectory::build(wsdl.types.values());
        let resolver = Resolver::new(&wsdl, &directory);

        let result = resolver.resolve(&TypeRef::schema(name("ArrayOfNothing")));
        assert!(matches!(result, Err(Error::MalformedArray(_))));
    }
}
