use std::path::Path;
use url::Url;

mod parser;
mod preprocessor;

pub mod error;
pub mod graph;
pub mod types;

pub use graph::Wsdl;
pub use types::QualifiedName;

/// Loads the WSDL at `url` (a URL or a local path), following its imports,
/// and assembles the object graph of its SOAP port.
pub fn parse<S: AsRef<str>>(url: S) -> Result<Wsdl, error::Error> {
    let url = {
        match Url::parse(url.as_ref()) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(
                Path::new(url.as_ref())
                    .canonicalize()
                    .map_err(|err| error::Error::PathConversionError(Some(err)))?,
            )
            .map_err(|()| error::Error::PathConversionError(None))?,
            Err(err) => return Err(err.into()),
        }
    };

    let definition = parser::parse(url)?;
    preprocessor::preprocess(&definition)
}

/// Same as [`parse`] for a document already in memory. Imports must use absolute URLs.
pub fn parse_str(xml: &str) -> Result<Wsdl, error::Error> {
    let definition = parser::parse_str(xml)?;
    preprocessor::preprocess(&definition)
}
