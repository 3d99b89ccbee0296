use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

use wsdlproxy_compiler::ProxyConfig;

use super::Error;

/// Settings file for the `model` command.
///
/// ```toml
/// service = "Orders"
/// operations = ["GetOrder"]
/// reserved_names = ["owner"]
///
/// [proxy]
/// soapAddress = "https://staging.example.com/orders"
/// username = "svc"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: Option<String>,
    pub operations: Vec<String>,
    pub reserved_names: Vec<String>,
    pub proxy: ProxyConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        debug!(path = %path.display(), "reading settings");
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_gives_defaults() {
        let settings = Settings::load(None).unwrap();

        assert!(settings.service.is_none());
        assert!(settings.operations.is_empty());
        assert_eq!(settings.proxy, ProxyConfig::default());
    }

    #[test]
    fn reads_toml_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
service = "Orders"
operations = ["GetOrder", "ListOrders"]
reserved_names = ["owner"]

[proxy]
soapAddress = "https://staging.example.com/orders"
username = "svc"
timeout = 30
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.service.as_deref(), Some("Orders"));
        assert_eq!(settings.operations, ["GetOrder", "ListOrders"]);
        assert_eq!(settings.reserved_names, ["owner"]);
        assert_eq!(
            settings.proxy.soap_address.as_deref(),
            Some("https://staging.example.com/orders")
        );
        assert_eq!(settings.proxy.username.as_deref(), Some("svc"));
        assert_eq!(settings.proxy.extra["timeout"], 30);
    }

    #[test]
    fn malformed_settings_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "operations = \"GetOrder\"").unwrap();

        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(Error::SettingsError(_))
        ));
    }
}
