//! Reshapes operation part lists before they are modeled.

use std::collections::HashSet;
use wsdlproxy_wsdl::{
    graph::{Field, Part, TypeRef, Wsdl},
    QualifiedName,
};

use super::{error::Error, resolve::Resolver, resolve::TypeClass};

/// A request or response part, or a field standing in for one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartView<'w> {
    pub name: &'w str,
    pub namespace: Option<&'w str>,
    pub element: Option<&'w QualifiedName>,
    pub ty: &'w TypeRef,
    /// Part a promoted field belongs to.
    pub origin: Option<&'w str>,
    pub is_attr: bool,
}

/// The sole response part after unwrapping singleton wrappers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unwrapped<'w> {
    pub view: PartView<'w>,
    pub skip_levels: u32,
}

impl<'w> PartView<'w> {
    /// Element parts take the element's type.
    pub fn of_part(wsdl: &'w Wsdl, part: &'w Part) -> Result<Self, Error> {
        let ty = match &part.element {
            Some(element) => {
                &wsdl
                    .element(element)
                    .ok_or_else(|| Error::SchemaReference(element.key()))?
                    .ty
            }
            None => &part.ty,
        };

        Ok(Self {
            name: &part.name,
            namespace: part.namespace.as_deref(),
            element: part.element.as_ref(),
            ty,
            origin: None,
            is_attr: false,
        })
    }

    pub fn of_field(field: &'w Field, origin: Option<&'w str>) -> Self {
        Self {
            name: &field.name,
            namespace: field.namespace.as_deref(),
            element: None,
            ty: &field.ty,
            origin,
            is_attr: field.is_attr,
        }
    }

    fn key(&self) -> &'w str {
        self.element.map_or(self.name, |element| element.name.as_str())
    }
}

pub fn part_views<'w>(wsdl: &'w Wsdl, parts: &'w [Part]) -> Result<Vec<PartView<'w>>, Error> {
    parts.iter().map(|part| PartView::of_part(wsdl, part)).collect()
}

/// Replaces complex wrapper parts by their singular fields.
///
/// Returns `None` when no part needed promoting.
pub fn simplify_request_params<'w>(
    resolver: &Resolver<'_, 'w>,
    parts: &[PartView<'w>],
) -> Result<Option<Vec<PartView<'w>>>, Error> {
    let mut promoted = false;
    let mut seen = HashSet::new();
    let mut params = Vec::new();

    for part in parts {
        match resolver.resolve(part.ty)?.wrapper() {
            Some(wrapper) => {
                promoted = true;

                for field in &wrapper.content {
                    if field.is_singular() && seen.insert(field.name.as_str()) {
                        params.push(PartView::of_field(field, Some(part.name)));
                    }
                }
            }

            None => {
                if seen.insert(part.key()) {
                    params.push(*part);
                }
            }
        }
    }

    Ok(if promoted { Some(params) } else { None })
}

/// Descends through singleton wrappers around a sole response part.
pub fn unwrap_response<'w>(
    resolver: &Resolver<'_, 'w>,
    parts: &[PartView<'w>],
) -> Result<Option<Unwrapped<'w>>, Error> {
    let part = match parts {
        [part] => part,
        _ => return Ok(None),
    };

    let mut current = match resolver.resolve(part.ty)?.wrapper() {
        Some(wrapper) => wrapper,
        None => return Ok(None),
    };

    let mut visited = HashSet::new();
    visited.insert(current.qualified_name());

    let mut skip_levels = 0;
    let mut innermost = None;

    while let [field] = current.content.as_slice() {
        if field.is_unbounded() {
            break;
        }

        skip_levels += 1;
        innermost = Some(field);

        let inner = resolver.resolve(&field.ty)?;
        if inner.is_array || matches!(inner.class, TypeClass::Primitive(_)) {
            break;
        }

        match inner.schema_type {
            Some(next) if visited.insert(next.qualified_name()) => current = next,
            _ => break,
        }
    }

    Ok(innermost.map(|field| Unwrapped {
        view: PartView::of_field(field, None),
        skip_levels,
    }))
}
