use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, info};
use wsdlproxy_wsdl::graph::{JsonType, Operation, SchemaType, SoapAddress, TypeRef, Use, Wsdl};

use super::{
    config::CompileRequest,
    directory::TypeDirectory,
    error::Error,
    flatten::CachedType,
    generate::OperationPlan,
    model::{
        Cardinality, ModelKind, ModelType, OperationModel, Parameter, ParameterCardinality,
        Property, ServiceDescriptor, Usage,
    },
    names::HostNames,
    normalize::{self, PartView},
    resolve::{Resolver, TypeClass},
    wire::{PromotedParam, WirePart},
};

/// State shared by every operation of one compilation run.
pub(crate) struct Compilation<'w> {
    pub wsdl: &'w Wsdl,
    pub directory: TypeDirectory,
    pub names: HostNames,
    /// Model types in first-encounter order, keyed by target name.
    pub model_types: IndexMap<String, CachedType<'w>>,
    /// Base types only needed on the wire, keyed by `{namespace}name`.
    pub other_types: BTreeMap<String, &'w SchemaType>,
}

struct CompiledOperation<'w> {
    model: OperationModel,
    return_wrapper: Option<ModelType>,
    plan: OperationPlan<'w>,
}

impl<'w> Compilation<'w> {
    pub fn new(wsdl: &'w Wsdl, names: HostNames) -> Self {
        Self {
            wsdl,
            directory: TypeDirectory::build(wsdl.types.values()),
            names,
            model_types: IndexMap::new(),
            other_types: BTreeMap::new(),
        }
    }

    pub fn resolver(&self) -> Resolver<'_, 'w> {
        Resolver::new(self.wsdl, &self.directory)
    }

    fn compile_operation(&mut self, operation: &'w Operation) -> Result<CompiledOperation<'w>, Error> {
        debug!(operation = %operation.name, "compiling operation");

        let mut parameters = Vec::new();
        let mut promoted = None;

        let request = match &operation.input {
            Some(input) => {
                let views = normalize::part_views(self.wsdl, &input.parts)?;
                let simplified = normalize::simplify_request_params(&self.resolver(), &views)?;
                let signature = simplified.as_deref().unwrap_or(&views);
                let siblings = sibling_names(signature);

                for view in signature {
                    parameters.push(self.parameter(view, &siblings, Usage::In)?);
                }

                promoted = simplified.as_ref().map(|params| {
                    params
                        .iter()
                        .filter(|view| view.origin.is_some())
                        .map(|view| self.promoted_param(view, &siblings))
                        .collect()
                });

                Some(self.wire_parts(&views, input.encoding)?)
            }

            None => None,
        };

        let mut outputs = Vec::new();
        let mut skip_levels = 0;

        let response = match &operation.output {
            Some(output) => {
                let mut views = normalize::part_views(self.wsdl, &output.parts)?;

                if let Some(unwrapped) = normalize::unwrap_response(&self.resolver(), &views)? {
                    debug!(
                        operation = %operation.name,
                        skip_levels = unwrapped.skip_levels,
                        "unwrapped response"
                    );

                    skip_levels = unwrapped.skip_levels;
                    views = vec![unwrapped.view];
                }

                let siblings = sibling_names(&views);
                for view in &views {
                    outputs.push(self.parameter(view, &siblings, Usage::Out)?);
                }

                Some(self.wire_parts(&views, output.encoding)?)
            }

            None => None,
        };

        let mut return_wrapper = None;
        let return_type = match outputs.as_slice() {
            [] => None,
            [single] => Some(single.type_name.clone()),
            several => {
                let name = format!("{}__returnType", operation.name);

                return_wrapper = Some(ModelType {
                    name: name.clone(),
                    source: None,
                    usage: Usage::Out,
                    embedded: false,
                    kind: ModelKind::Object {
                        properties: several
                            .iter()
                            .map(|output| Property {
                                name: output.name.clone(),
                                safe_name: output.safe_name.clone(),
                                type_name: output.type_name.clone(),
                                cardinality: Cardinality::One,
                                required: false,
                            })
                            .collect(),
                    },
                });

                Some(name)
            }
        };

        Ok(CompiledOperation {
            model: OperationModel {
                name: operation.name.clone(),
                documentation: operation.documentation.clone(),
                parameters,
                return_type,
            },
            return_wrapper,
            plan: OperationPlan {
                operation,
                request,
                promoted,
                response,
                skip_levels,
            },
        })
    }

    /// Resolves a part for the operation signature and models its type.
    fn parameter(
        &mut self,
        view: &PartView<'w>,
        siblings: &[&str],
        usage: Usage,
    ) -> Result<Parameter, Error> {
        let descriptor = self.resolver().resolve(view.ty)?;
        self.process_type(&descriptor, usage, false)?;

        Ok(Parameter {
            name: view.name.to_owned(),
            safe_name: self.names.safe_name_among(view.name, siblings),
            cardinality: if descriptor.is_array {
                ParameterCardinality::Many
            } else {
                ParameterCardinality::One
            },
            type_name: descriptor.target,
        })
    }

    fn promoted_param(&self, view: &PartView<'w>, siblings: &[&str]) -> PromotedParam {
        PromotedParam {
            parent_name: view.origin.unwrap_or_default().to_owned(),
            name: view.name.to_owned(),
            safe_name: self.names.safe_name_among(view.name, siblings),
            namespace: view.namespace.map(str::to_owned),
            ty: view.ty.clone(),
            is_attr: view.is_attr,
        }
    }

    fn wire_parts(&self, views: &[PartView<'w>], encoding: Use) -> Result<Vec<WirePart>, Error> {
        let siblings = sibling_names(views);

        views
            .iter()
            .map(|view| self.wire_part(view, &siblings, encoding == Use::Encoded))
            .collect()
    }

    /// Encoded array parts are described by their element type.
    fn wire_part(
        &self,
        view: &PartView<'w>,
        siblings: &[&str],
        encoded: bool,
    ) -> Result<WirePart, Error> {
        let mut part = WirePart {
            name: view.name.to_owned(),
            safe_name: self.names.safe_name_among(view.name, siblings),
            namespace: view.namespace.map(str::to_owned),
            element: view.element.cloned(),
            ty: view.ty.clone(),
            is_array: false,
        };

        if !encoded {
            return Ok(part);
        }

        let descriptor = self.resolver().resolve(view.ty)?;
        if descriptor.is_array {
            part.is_array = true;
            part.ty = match (descriptor.class, descriptor.schema_type) {
                (TypeClass::Primitive(json_type), _) => TypeRef::primitive(json_type),
                (TypeClass::Enum, Some(item)) => TypeRef::enumeration(
                    item.json_type.unwrap_or(JsonType::String),
                    item.qualified_name(),
                ),
                (_, Some(item)) => TypeRef::schema(item.qualified_name()),
                (_, None) => part.ty,
            };
        }

        Ok(part)
    }

    fn into_model_types(self) -> Vec<ModelType> {
        self.model_types
            .into_iter()
            .map(|(name, cached)| cached.into_model(name))
            .collect()
    }
}

fn sibling_names<'w>(views: &[PartView<'w>]) -> Vec<&'w str> {
    views.iter().map(|view| view.name).collect()
}

/// Compiles the enabled operations of `wsdl` into a service descriptor.
///
/// Every call owns its directory and type cache; nothing is shared between runs.
pub fn compile(wsdl: &Wsdl, request: &CompileRequest) -> Result<ServiceDescriptor, Error> {
    let enabled = request.enabled_operations();
    if enabled.is_empty() {
        return Err(Error::NoOperations);
    }

    let service_type = request.service_type();
    let mut compilation = Compilation::new(wsdl, HostNames::new(request.reserved_names.iter().cloned()));

    let mut operations = Vec::with_capacity(enabled.len());
    let mut return_wrappers = Vec::new();
    let mut plans = Vec::with_capacity(enabled.len());

    for name in enabled {
        let operation = wsdl
            .operations
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_owned()))?;

        let compiled = compilation.compile_operation(operation)?;
        operations.push(compiled.model);
        return_wrappers.extend(compiled.return_wrapper);
        plans.push(compiled.plan);
    }

    let wire = compilation.generate(&service_type, plans)?;

    let mut types = compilation.into_model_types();
    types.extend(return_wrappers);

    let endpoint = request
        .config
        .soap_address
        .clone()
        .or_else(|| wsdl.soap_address.as_ref().map(SoapAddress::endpoint));

    info!(
        service = %request.service_name,
        operations = operations.len(),
        types = types.len(),
        wire_types = wire.types.len(),
        "compiled service model"
    );

    Ok(ServiceDescriptor {
        name: request.service_name.clone(),
        endpoint,
        service_type,
        operations,
        types,
        wire,
        proxy_config: request.config.clone(),
    })
}
