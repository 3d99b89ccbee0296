use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("Unable to open file")]
    FileOpenError(quick_xml::Error),

    #[error("Unable to get file from server")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Element <{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Namespace prefix {0} is not declared")]
    UnknownPrefix(String),

    #[error("Invalid value {value:?} for {attribute}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    #[error("{kind} {name} is referenced but never declared")]
    UnresolvedReference { kind: &'static str, name: String },

    #[error("The document declares no SOAP service port")]
    NoSoapPort,
}
