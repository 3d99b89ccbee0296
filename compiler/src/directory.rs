use std::collections::HashMap;
use wsdlproxy_wsdl::graph::SchemaType;

/// How many schema types share each unqualified key.
///
/// A key seen more than once forces every type with that key onto its
/// namespace-qualified unique name.
#[derive(Debug, Clone, Default)]
pub struct TypeDirectory {
    counts: HashMap<String, usize>,
}

impl TypeDirectory {
    pub fn build<'a, I>(types: I) -> Self
    where
        I: IntoIterator<Item = &'a SchemaType>,
    {
        let mut counts = HashMap::new();

        for ty in types {
            *counts.entry(ty.stem().to_owned()).or_insert(0) += 1;
        }

        Self { counts }
    }

    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn target_name(&self, ty: &SchemaType) -> String {
        let key = ty.stem();

        if self.count(key) > 1 {
            ty.unique_name()
        } else {
            key.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_type(namespace: &str, name: &str, synthetic: bool) -> SchemaType {
        SchemaType {
            namespace: Some(namespace.into()),
            name: name.into(),
            base_type: None,
            content: Vec::new(),
            enumerated_values: None,
            json_type: None,
            is_synthetic: synthetic,
            ns_checksum: format!("{:0>8}", namespace.len()),
        }
    }

    #[test]
    fn colliding_names_are_qualified() {
        let items = [
            schema_type("urn:a", "Item", false),
            schema_type("urn:bb", "Item", false),
            schema_type("urn:a", "Widget", false),
        ];
        let directory = TypeDirectory::build(&items);

        assert_eq!(directory.count("Item"), 2);
        assert_eq!(directory.target_name(&items[0]), "Item_00000005");
        assert_eq!(directory.target_name(&items[1]), "Item_00000006");
        assert_eq!(directory.target_name(&items[2]), "Widget");
    }

    #[test]
    fn synthetic_types_count_under_their_stem() {
        let types = [
            schema_type("urn:a", "Lookup_000001", true),
            schema_type("urn:a", "Lookup", false),
            schema_type("urn:a", "Report_000002", true),
        ];
        let directory = TypeDirectory::build(&types);

        assert_eq!(directory.count("Lookup"), 2);
        assert_eq!(directory.target_name(&types[0]), "Lookup_000001");
        assert_eq!(directory.target_name(&types[1]), "Lookup_00000005");
        assert_eq!(directory.target_name(&types[2]), "Report");
    }
}
