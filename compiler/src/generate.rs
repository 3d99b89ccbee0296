//! Assembles the wire descriptors once every operation has been modeled.

use std::collections::{BTreeMap, HashSet};
use wsdlproxy_wsdl::graph::{Field, Operation, Payload, SchemaType, Use};

use super::{
    compile::Compilation,
    error::Error,
    wire::{
        DeserializationHint, HttpOptions, PromotedParam, RequestDescriptor, ResponseDescriptor,
        WireField, WireOperation, WirePart, WireService, WireType,
    },
};

/// Per-operation wire information gathered while modeling.
#[derive(Debug, Clone)]
pub(crate) struct OperationPlan<'w> {
    pub operation: &'w Operation,
    pub request: Option<Vec<WirePart>>,
    pub promoted: Option<Vec<PromotedParam>>,
    pub response: Option<Vec<WirePart>>,
    pub skip_levels: u32,
}

fn is_encoded(payload: Option<&Payload>) -> bool {
    payload.map_or(false, |payload| payload.encoding == Use::Encoded)
}

impl<'w> Compilation<'w> {
    pub(crate) fn generate(
        &self,
        service_type: &str,
        plans: Vec<OperationPlan<'w>>,
    ) -> Result<WireService, Error> {
        let mut referenced: BTreeMap<String, &'w SchemaType> = self
            .model_types
            .values()
            .filter(|cached| !cached.source.is_enumeration())
            .map(|cached| (cached.source.qualified_name().key(), cached.source))
            .collect();

        referenced.extend(self.other_types.iter().map(|(key, ty)| (key.clone(), *ty)));

        let mut operations = BTreeMap::new();

        for plan in plans {
            let parts = plan.request.iter().chain(plan.response.iter()).flatten();

            for part in parts {
                let name = match &part.ty.xml_type {
                    Some(name) => name,
                    None => continue,
                };

                let key = name.key();
                if !referenced.contains_key(&key) {
                    let ty = self.resolver().lookup(name)?;
                    if !ty.is_enumeration() {
                        referenced.insert(key, ty);
                    }
                }
            }

            operations.insert(plan.operation.name.clone(), self.wire_operation(plan));
        }

        self.collect_reachable(&mut referenced)?;

        let types = referenced
            .into_iter()
            .map(|(full_name, ty)| self.wire_type(full_name, ty))
            .collect::<Result<_, _>>()?;

        Ok(WireService {
            service_type: service_type.to_owned(),
            http_options: self.wsdl.soap_address.as_ref().map(HttpOptions::from),
            operations,
            types,
        })
    }

    /// Adds every type reachable from `referenced` through bases and fields.
    /// Arrays are walked through but not listed, since their fields are inlined.
    fn collect_reachable(&self, referenced: &mut BTreeMap<String, &'w SchemaType>) -> Result<(), Error> {
        let mut visited: HashSet<String> = referenced.keys().cloned().collect();
        let mut pending: Vec<&'w SchemaType> = referenced.values().copied().collect();

        while let Some(ty) = pending.pop() {
            let fields = ty
                .content
                .iter()
                .filter(|field| !field.ty.is_enum)
                .filter_map(|field| field.ty.xml_type.as_ref());

            for name in ty.inherited_base().into_iter().chain(fields) {
                if !visited.insert(name.key()) {
                    continue;
                }

                let target = self.resolver().lookup(name)?;
                if target.is_enumeration() {
                    continue;
                }

                if !target.is_soap_array() {
                    referenced.insert(name.key(), target);
                }
                pending.push(target);
            }
        }

        Ok(())
    }

    fn wire_operation(&self, plan: OperationPlan<'w>) -> WireOperation {
        let operation = plan.operation;
        let style = operation.style.unwrap_or(self.wsdl.style);
        let output_encoded = is_encoded(operation.output.as_ref());

        WireOperation {
            request: plan.request.map(|parts| RequestDescriptor {
                op_name: operation.name.clone(),
                op_ns: operation
                    .namespace
                    .clone()
                    .or_else(|| self.wsdl.namespace.clone()),
                soap_action: operation.soap_action.clone(),
                is_encoded: is_encoded(operation.input.as_ref()),
                style,
                soap_version: self.wsdl.version,
                parts,
            }),

            input_params: plan.promoted.map(|params| {
                params
                    .into_iter()
                    .map(|param| (param.name.clone(), param))
                    .collect()
            }),

            response: plan.response.map(|parts| ResponseDescriptor {
                is_encoded: output_encoded,
                style,
                parts,
            }),

            deserialization: operation.output.as_ref().map(|_| DeserializationHint {
                remove_envelope: true,
                soap_encoded: output_encoded,
                skip_levels: plan.skip_levels,
            }),
        }
    }

    fn wire_type(&self, full_name: String, ty: &'w SchemaType) -> Result<WireType, Error> {
        let siblings: Vec<&str> = ty.content.iter().map(|field| field.name.as_str()).collect();

        Ok(WireType {
            full_name,
            namespace: ty.namespace.clone(),
            name: ty.name.clone(),
            base_type: ty.base_type.clone(),
            fields: ty
                .content
                .iter()
                .map(|field| self.wire_field(field, &siblings))
                .collect::<Result<_, _>>()?,
        })
    }

    /// SOAP arrays are inlined as repeated element fields; enums travel as their primitive.
    fn wire_field(&self, field: &Field, siblings: &[&str]) -> Result<WireField, Error> {
        let mut wire = WireField {
            name: field.name.clone(),
            safe_name: self.names.safe_name_among(&field.name, siblings),
            namespace: field.namespace.clone(),
            min_occurs: field.min_occurs,
            max_occurs: field.max_occurs,
            ty: field.ty.clone(),
            is_array: false,
            is_attr: field.is_attr,
        };

        if let Some(name) = &field.ty.xml_type {
            let ty = self.resolver().lookup(name)?;

            if ty.is_soap_array() {
                if let Some(item) = ty.content.first() {
                    wire.is_array = true;
                    wire.ty = item.ty.clone();
                }
            }
        }

        if wire.ty.is_enum {
            wire.ty.xml_type = None;
        }

        Ok(wire)
    }
}
