//! Flattens complex types and their bases into deduplicated model types.

use tracing::trace;
use wsdlproxy_wsdl::{
    graph::{JsonType, SchemaType},
    QualifiedName,
};

use super::{
    compile::Compilation,
    error::Error,
    model::{Cardinality, ModelKind, ModelType, Property, Usage},
    resolve::{TypeClass, TypeDescriptor},
};

#[derive(Debug, Clone)]
pub(crate) enum CachedBody {
    /// Registered but still being flattened.
    Pending,
    Object(Vec<Property>),
    Enumeration { base: JsonType, values: Vec<String> },
}

#[derive(Debug, Clone)]
pub(crate) struct CachedType<'w> {
    pub source: &'w SchemaType,
    pub usage: Usage,
    pub embedded: bool,
    pub body: CachedBody,
}

impl<'w> CachedType<'w> {
    pub fn into_model(self, name: String) -> ModelType {
        let kind = match self.body {
            CachedBody::Enumeration { base, values } => ModelKind::Enumeration { base, values },
            CachedBody::Object(properties) => ModelKind::Object { properties },
            CachedBody::Pending => ModelKind::Object {
                properties: Vec::new(),
            },
        };

        ModelType {
            name,
            source: Some(self.source.qualified_name()),
            usage: self.usage,
            embedded: self.embedded,
            kind,
        }
    }
}

impl<'w> Compilation<'w> {
    /// Adds the type behind `descriptor` to the model, or widens the usage
    /// of the entry already there.
    pub(crate) fn process_type(
        &mut self,
        descriptor: &TypeDescriptor<'w>,
        usage: Usage,
        embedded: bool,
    ) -> Result<(), Error> {
        let source = match descriptor.schema_type {
            Some(source) if descriptor.is_modeled() => source,
            _ => return Ok(()),
        };

        if let Some(cached) = self.model_types.get_mut(&descriptor.target) {
            cached.usage = cached.usage.merge(usage);
            return Ok(());
        }

        trace!(ty = %descriptor.target, %usage, "flattening type");

        // The entry must exist before recursing: cycles stop on presence.
        self.model_types.insert(
            descriptor.target.clone(),
            CachedType {
                source,
                usage,
                embedded,
                body: CachedBody::Pending,
            },
        );

        let body = if descriptor.class == TypeClass::Enum {
            CachedBody::Enumeration {
                base: source.json_type.unwrap_or(JsonType::String),
                values: source.enumerated_values.clone().unwrap_or_default(),
            }
        } else {
            let mut properties = Vec::new();
            let mut lineage = vec![source.qualified_name()];
            self.flatten_fields(source, usage, &mut properties, &mut lineage)?;
            self.assign_safe_names(&mut properties);
            CachedBody::Object(properties)
        };

        if let Some(cached) = self.model_types.get_mut(&descriptor.target) {
            cached.body = body;
        }

        Ok(())
    }

    /// Inherited and own fields share one namespace, so alternates are
    /// picked against the whole flattened list.
    fn assign_safe_names(&self, properties: &mut [Property]) {
        let names: Vec<String> = properties.iter().map(|property| property.name.clone()).collect();
        let siblings: Vec<&str> = names.iter().map(String::as_str).collect();

        for property in properties.iter_mut() {
            property.safe_name = self.names.safe_name_among(&property.name, &siblings);
        }
    }

    /// Base fields first, then the type's own.
    fn flatten_fields(
        &mut self,
        ty: &'w SchemaType,
        usage: Usage,
        properties: &mut Vec<Property>,
        lineage: &mut Vec<QualifiedName>,
    ) -> Result<(), Error> {
        if let Some(base_name) = ty.inherited_base() {
            if lineage.contains(base_name) {
                return Err(Error::CircularBase(base_name.key()));
            }

            let base = self.resolver().lookup(base_name)?;
            self.other_types.entry(base_name.key()).or_insert(base);

            lineage.push(base_name.clone());
            self.flatten_fields(base, usage, properties, lineage)?;
        }

        for field in &ty.content {
            let descriptor = self.resolver().resolve(&field.ty)?;

            properties.push(Property {
                name: field.name.clone(),
                safe_name: None,
                type_name: descriptor.target.clone(),
                cardinality: if field.is_repeating() || descriptor.is_array {
                    Cardinality::OneToMany
                } else {
                    Cardinality::One
                },
                required: field.min_occurs != 0,
            });

            if descriptor.is_modeled() {
                self.process_type(&descriptor, usage, true)?;
            }
        }

        Ok(())
    }
}
