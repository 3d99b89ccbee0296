//! Turns a compiled service into the ordered commands that provision it in
//! the host type registry.

use serde::Serialize;
use serde_json::{Map, Value};
use wsdlproxy_wsdl::graph::JsonType;

use super::{
    error::Error,
    model::{ModelKind, ModelType, OperationModel, Parameter, Property, ServiceDescriptor},
    names::host_type,
};

/// Package every generated external system is created under.
pub const GLOBAL_PACKAGE: &str = "wsdlProxy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMode {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "directive", rename_all = "camelCase")]
pub enum Directive {
    CreateExternalSystem(ExternalSystem),
    UpdateExternalSystem(ExternalSystem),
    #[serde(rename_all = "camelCase")]
    DeleteOperations {
        type_name: String,
    },
    AlterType(TypeDefinition),
    BindType(TypeBinding),
    CreateAndBindOperation(OperationBinding),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSystem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_address: Option<String>,
    pub proxy_configuration: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    Scalar,
    Embedded,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerationValue {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    pub type_name: String,
    pub storage: Storage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar_base_type: Option<String>,
    pub is_enumerated: bool,
    pub extension_allowed: bool,
    pub externally_sourced: bool,
    pub replace: bool,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<EnumerationValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProps {
    pub read_strategy: &'static str,
    pub cache_mode: &'static str,
    pub source_strategy: &'static str,
    pub unique_external_id: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBinding {
    pub type_name: String,
    pub target_type: String,
    pub external_system: String,
    pub binding_props: BindingProps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBinding {
    pub target_type: String,
    pub name: String,
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub parameters: Vec<Parameter>,
}

const SYNC_BINDING: BindingProps = BindingProps {
    read_strategy: "sync",
    cache_mode: "direct",
    source_strategy: "sync",
    unique_external_id: true,
};

/// Reserved names are replaced by their safe alternates on the host side.
fn host_properties(properties: &[Property]) -> Vec<Property> {
    properties
        .iter()
        .map(|property| Property {
            name: property.binding_name().to_owned(),
            safe_name: None,
            ..property.clone()
        })
        .collect()
}

fn enum_directives(directives: &mut Vec<Directive>, name: &str, base: JsonType, values: &[String]) {
    directives.push(Directive::DeleteOperations {
        type_name: name.to_owned(),
    });

    directives.push(Directive::AlterType(TypeDefinition {
        type_name: name.to_owned(),
        storage: Storage::Scalar,
        base_table: None,
        scalar_base_type: Some(host_type(base).to_owned()),
        is_enumerated: true,
        extension_allowed: true,
        externally_sourced: true,
        replace: true,
        properties: Vec::new(),
        enumeration: values
            .iter()
            .map(|value| EnumerationValue {
                value: value.clone(),
                label: value.clone(),
            })
            .collect(),
    }));
}

fn object_directives(
    directives: &mut Vec<Directive>,
    descriptor: &ServiceDescriptor,
    name: &str,
    properties: &[Property],
    embedded: bool,
    operations: &[OperationModel],
) {
    directives.push(Directive::DeleteOperations {
        type_name: name.to_owned(),
    });

    directives.push(Directive::AlterType(TypeDefinition {
        type_name: name.to_owned(),
        storage: if embedded {
            Storage::Embedded
        } else {
            Storage::Virtual
        },
        base_table: Some(descriptor.service_type.clone()).filter(|_| embedded),
        scalar_base_type: None,
        is_enumerated: false,
        extension_allowed: true,
        externally_sourced: true,
        replace: true,
        properties: host_properties(properties),
        enumeration: Vec::new(),
    }));

    directives.push(Directive::BindType(TypeBinding {
        type_name: name.to_owned(),
        target_type: name.to_owned(),
        external_system: descriptor.name.clone(),
        binding_props: SYNC_BINDING,
    }));

    for operation in operations {
        directives.push(Directive::CreateAndBindOperation(OperationBinding {
            target_type: name.to_owned(),
            name: operation.name.clone(),
            object_type: name.to_owned(),
            return_type: operation.return_type.clone(),
            parameters: operation.parameters.clone(),
        }));
    }
}

fn type_directives(directives: &mut Vec<Directive>, descriptor: &ServiceDescriptor, ty: &ModelType) {
    match &ty.kind {
        ModelKind::Enumeration { base, values } => enum_directives(directives, &ty.name, *base, values),
        ModelKind::Object { properties } => {
            object_directives(directives, descriptor, &ty.name, properties, ty.embedded, &[])
        }
    }
}

/// Builds the directive list for `descriptor`: the external system first,
/// then the service type with its operations, then every model type.
pub fn build(descriptor: &ServiceDescriptor, mode: SystemMode) -> Result<Vec<Directive>, Error> {
    let proxy_configuration = descriptor.proxy_configuration()?;

    let mut directives = vec![match mode {
        SystemMode::Create => Directive::CreateExternalSystem(ExternalSystem {
            name: Some(descriptor.name.clone()),
            global_package_name: Some(GLOBAL_PACKAGE.to_owned()),
            access_address: descriptor.endpoint.clone(),
            proxy_configuration,
        }),
        SystemMode::Update => Directive::UpdateExternalSystem(ExternalSystem {
            name: None,
            global_package_name: None,
            access_address: None,
            proxy_configuration,
        }),
    }];

    object_directives(
        &mut directives,
        descriptor,
        &descriptor.service_type,
        &[],
        false,
        &descriptor.operations,
    );

    for ty in &descriptor.types {
        type_directives(&mut directives, descriptor, ty);
    }

    Ok(directives)
}
