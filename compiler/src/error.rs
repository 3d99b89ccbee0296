use thiserror::Error;

/// Every variant aborts the whole compilation; no partial model is returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No operations were enabled")]
    NoOperations,

    #[error("Operation {0} is not declared by the WSDL")]
    UnknownOperation(String),

    #[error("Schema reference {0} is not declared by the WSDL")]
    SchemaReference(String),

    #[error("{0} is not a valid type usage")]
    InvalidUsage(String),

    #[error("SOAP array {0} has no usable element type")]
    MalformedArray(String),

    #[error("Type {0} derives from itself")]
    CircularBase(String),

    #[error("Unable to render proxy configuration")]
    Serialization(#[from] serde_json::Error),
}
