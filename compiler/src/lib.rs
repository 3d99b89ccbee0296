//! Compiles a loaded WSDL graph into a host object model plus the wire
//! descriptors a SOAP request/response engine runs from.

mod compile;
mod flatten;
mod generate;

pub mod config;
pub mod directive;
pub mod directory;
pub mod error;
pub mod model;
pub mod names;
pub mod normalize;
pub mod resolve;
pub mod wire;

pub use compile::compile;
pub use config::{CompileRequest, ProxyConfig};
pub use model::ServiceDescriptor;
