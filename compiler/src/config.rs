use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Caller overrides merged over the generated proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Endpoint used instead of the address declared by the WSDL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soap_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    pub service_name: String,
    /// Enabled operations, compiled in this order.
    pub operations: Vec<String>,
    /// Host identifiers reserved on top of the built-in set.
    pub reserved_names: Vec<String>,
    pub config: ProxyConfig,
}

impl CompileRequest {
    pub fn new<S, I, O>(service_name: S, operations: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        Self {
            service_name: service_name.into(),
            operations: operations.into_iter().map(Into::into).collect(),
            reserved_names: Vec::new(),
            config: ProxyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reserved_names<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.reserved_names.extend(names);
        self
    }

    /// Enabled operation names with repeats dropped, first mention wins.
    pub fn enabled_operations(&self) -> Vec<&str> {
        let mut enabled: Vec<&str> = Vec::with_capacity(self.operations.len());

        for operation in &self.operations {
            if !enabled.contains(&operation.as_str()) {
                enabled.push(operation);
            }
        }

        enabled
    }

    pub fn service_type(&self) -> String {
        format!("{}_ServiceType", self.service_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_operations_are_enabled_once() {
        let request = CompileRequest::new("Shop", ["Get", "Put", "Get"]);

        assert_eq!(request.enabled_operations(), ["Get", "Put"]);
        assert_eq!(request.service_type(), "Shop_ServiceType");
    }

    #[test]
    fn proxy_config_keeps_unknown_keys() {
        let config: ProxyConfig = serde_json::from_str(
            r#"{"soapAddress": "http://override", "username": "svc", "timeout": 30}"#,
        )
        .unwrap();

        assert_eq!(config.soap_address.as_deref(), Some("http://override"));
        assert_eq!(config.username.as_deref(), Some("svc"));
        assert_eq!(config.extra["timeout"], 30);
    }
}
