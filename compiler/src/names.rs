//! Naming rules of the host type system.

use std::collections::HashSet;
use wsdlproxy_wsdl::graph::JsonType;

/// Property names the host registry claims for itself.
pub const RESERVED_NAMES: &[&str] = &[
    "class",
    "externalId",
    "object",
    "operations",
    "properties",
    "type",
];

pub fn host_type(json_type: JsonType) -> &'static str {
    match json_type {
        JsonType::String => "String",
        JsonType::Number => "Real",
        JsonType::Boolean => "Boolean",
        JsonType::Date => "Date",
        JsonType::Other => "String",
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostNames {
    extra: HashSet<String>,
}

impl HostNames {
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(extra: I) -> Self {
        Self {
            extra: extra.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name) || self.extra.contains(name)
    }

    /// The alternate name a reserved identifier is bound under on the host side.
    pub fn safe_name(&self, name: &str) -> Option<String> {
        self.safe_name_among(name, &[])
    }

    /// Like [`HostNames::safe_name`], but never hands out a name one of
    /// `siblings` already uses.
    pub fn safe_name_among(&self, name: &str, siblings: &[&str]) -> Option<String> {
        if !self.is_reserved(name) {
            return None;
        }

        let mut candidate = format!("{}_", name);
        while siblings.contains(&candidate.as_str()) {
            candidate.push('_');
        }

        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tags_map_to_host_types() {
        assert_eq!(host_type(JsonType::String), "String");
        assert_eq!(host_type(JsonType::Number), "Real");
        assert_eq!(host_type(JsonType::Boolean), "Boolean");
        assert_eq!(host_type(JsonType::Date), "Date");
        assert_eq!(host_type(JsonType::Other), "String");
    }

    #[test]
    fn reserved_names_get_safe_alternates() {
        let names = HostNames::new(["status"]);

        assert_eq!(names.safe_name("type").as_deref(), Some("type_"));
        assert_eq!(names.safe_name("status").as_deref(), Some("status_"));
        assert_eq!(names.safe_name("total"), None);
    }

    #[test]
    fn safe_names_avoid_sibling_fields() {
        let names = HostNames::default();

        assert_eq!(
            names.safe_name_among("type", &["type", "type_", "size"]).as_deref(),
            Some("type__")
        );
        assert_eq!(
            names.safe_name_among("type", &["type", "type_", "type__"]).as_deref(),
            Some("type___")
        );
        assert_eq!(names.safe_name_among("size", &["type_", "size"]), None);
    }
}
