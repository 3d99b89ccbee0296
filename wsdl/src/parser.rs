use quick_xml::{
    events::{attributes::Attributes, BytesStart, BytesText, Event},
    Reader,
};
use std::{
    collections::HashSet,
    io::{BufRead, BufReader},
};
use tracing::{debug, trace, warn};
use url::Url;

use super::{
    error,
    graph::{MaxOccurs, SoapVersion, Style, Use},
    types::{
        synthetic_name, Binding, BindingOperation, BodyUse, Definition, Element, Field, FieldKind,
        Message, MessagePart, Operation, PartKind, Port, PortType, QualifiedName, Service, Type,
        TypeKind, SOAP11_BINDING_NS, SOAP12_BINDING_NS,
    },
};

fn get_attributes<B: BufRead, const N: usize>(
    reader: &Reader<B>,
    attributes: Attributes<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], error::Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in attributes {
        let attribute = attribute?;
        let (prefix, key) = split_namespaced_name(reader.decode(attribute.key)?);

        if prefix == Some("xmlns") || key == "xmlns" {
            continue;
        }

        if let Some(index) = names.iter().position(|name| *name == key) {
            result[index] = Some(reader.decode(attribute.value.as_ref())?.to_owned());
        }
    }

    Ok(result)
}

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

fn required(value: Option<String>, element: &str, attribute: &'static str) -> Result<String, error::Error> {
    value.ok_or_else(|| error::Error::MissingAttribute {
        element: element.to_owned(),
        attribute,
    })
}

fn parse_min_occurs(value: Option<String>) -> Result<u32, error::Error> {
    match value {
        Some(value) => value.trim().parse().map_err(|_| error::Error::InvalidAttribute {
            attribute: "minOccurs",
            value,
        }),
        None => Ok(1),
    }
}

fn parse_max_occurs(value: Option<String>) -> Result<Option<MaxOccurs>, error::Error> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some("unbounded") => Ok(Some(MaxOccurs::Unbounded)),
        Some(bound) => bound
            .parse()
            .map(|bound| Some(MaxOccurs::Bounded(bound)))
            .map_err(|_| error::Error::InvalidAttribute {
                attribute: "maxOccurs",
                value: bound.to_owned(),
            }),
    }
}

fn parse_style(value: Option<String>) -> Result<Option<Style>, error::Error> {
    match value.as_deref() {
        None => Ok(None),
        Some(style) if style.eq_ignore_ascii_case("rpc") => Ok(Some(Style::Rpc)),
        Some(style) if style.eq_ignore_ascii_case("document") => Ok(Some(Style::Document)),
        Some(style) => Err(error::Error::InvalidAttribute {
            attribute: "style",
            value: style.to_owned(),
        }),
    }
}

fn parse_use(value: Option<String>) -> Result<Use, error::Error> {
    match value.as_deref() {
        None => Ok(Use::Literal),
        Some(encoding) if encoding.eq_ignore_ascii_case("literal") => Ok(Use::Literal),
        Some(encoding) if encoding.eq_ignore_ascii_case("encoded") => Ok(Use::Encoded),
        Some(encoding) => Err(error::Error::InvalidAttribute {
            attribute: "use",
            value: encoding.to_owned(),
        }),
    }
}

fn binding_version(namespace: Option<&str>) -> Option<SoapVersion> {
    match namespace {
        Some(SOAP11_BINDING_NS) => Some(SoapVersion::Soap11),
        Some(SOAP12_BINDING_NS) => Some(SoapVersion::Soap12),
        _ => None,
    }
}

/// `tns:Order[]` and `tns:Order[,][]` both name `tns:Order`.
fn array_element_type(array_type: &str) -> &str {
    array_type
        .find('[')
        .map_or(array_type, |index| &array_type[..index])
}

#[derive(Default)]
struct Frame {
    prefixes: Vec<(Option<String>, String)>,
    target: Option<String>,
}

/// Namespace declarations in scope, one frame per open element.
#[derive(Default)]
struct Scopes {
    frames: Vec<Frame>,
}

impl Scopes {
    fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn namespace(&self, prefix: Option<&str>) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .prefixes
                .iter()
                .find(|(declared, _)| declared.as_deref() == prefix)
                .map(|(_, namespace)| namespace.as_str())
        })
    }

    fn target(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.target.as_deref())
    }

    fn target_namespaced(&self, name: String) -> QualifiedName {
        QualifiedName::new(self.target(), name)
    }

    fn resolve(&self, prefixed_name: &str) -> Result<QualifiedName, error::Error> {
        let (prefix, local_name) = split_namespaced_name(prefixed_name.trim());

        match (prefix, self.namespace(prefix)) {
            (_, Some(namespace)) => Ok(QualifiedName::new(Some(namespace), local_name)),
            (None, None) => Ok(QualifiedName::local(local_name)),
            (Some(prefix), None) => Err(error::Error::UnknownPrefix(prefix.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Root,
    Definitions,
    Types,
    Schema,
    Element,
    ComplexType,
    ComplexContent,
    Derivation,
    Group,
    LocalElement,
    Attribute,
    SimpleType,
    Restriction,
    Message,
    PortType,
    Operation,
    Binding,
    BindingOperation,
    BindingBody,
    Service,
    Port,
    Leaf,
}

#[derive(Debug)]
enum ParseState {
    Definitions,
    Types,
    Schema,
    Element {
        name: QualifiedName,
        ty: Option<QualifiedName>,
    },
    ComplexType {
        name: Option<QualifiedName>,
        base: Option<QualifiedName>,
        fields: Vec<Field>,
        array_of: Option<QualifiedName>,
    },
    ComplexContent,
    Derivation,
    Group {
        choice: bool,
    },
    LocalElement(Field),
    Attribute(Field),
    SimpleType {
        name: Option<QualifiedName>,
        base: Option<QualifiedName>,
        values: Vec<String>,
    },
    Restriction,
    Message {
        name: QualifiedName,
        parts: Vec<MessagePart>,
    },
    Part(MessagePart),
    PortType {
        name: QualifiedName,
        operations: Vec<Operation>,
    },
    Operation(Operation),
    Documentation(String),
    Binding(Binding),
    BindingOperation(BindingOperation),
    BindingBody {
        output: bool,
        body: BodyUse,
    },
    Service(Service),
    Port(Port),
    Other(String),
}

impl ParseState {
    fn context(&self) -> Context {
        match self {
            Self::Definitions => Context::Definitions,
            Self::Types => Context::Types,
            Self::Schema => Context::Schema,
            Self::Element { .. } => Context::Element,
            Self::ComplexType { .. } => Context::ComplexType,
            Self::ComplexContent => Context::ComplexContent,
            Self::Derivation => Context::Derivation,
            Self::Group { .. } => Context::Group,
            Self::LocalElement(_) => Context::LocalElement,
            Self::Attribute(_) => Context::Attribute,
            Self::SimpleType { .. } => Context::SimpleType,
            Self::Restriction => Context::Restriction,
            Self::Message { .. } => Context::Message,
            Self::PortType { .. } => Context::PortType,
            Self::Operation(_) => Context::Operation,
            Self::Binding(_) => Context::Binding,
            Self::BindingOperation(_) => Context::BindingOperation,
            Self::BindingBody { .. } => Context::BindingBody,
            Self::Service(_) => Context::Service,
            Self::Port(_) => Context::Port,
            Self::Part(_) | Self::Documentation(_) | Self::Other(_) => Context::Leaf,
        }
    }
}

fn enclosing_complex_type(stack: &mut [ParseState]) -> Option<&mut ParseState> {
    stack
        .iter_mut()
        .rev()
        .find(|state| matches!(state, ParseState::ComplexType { .. }))
}

fn enclosing_simple_type(stack: &mut [ParseState]) -> Option<&mut ParseState> {
    stack
        .iter_mut()
        .rev()
        .find(|state| matches!(state, ParseState::SimpleType { .. }))
}

fn in_choice(stack: &[ParseState]) -> bool {
    matches!(stack.last(), Some(ParseState::Group { choice: true }))
}

struct Document {
    url: Option<Url>,
    stack: Vec<ParseState>,
    scopes: Scopes,
}

struct Parser {
    definition: Definition,
    visited: HashSet<Url>,
    anonymous: usize,
}

impl Parser {
    fn new() -> Self {
        Self {
            definition: Default::default(),
            visited: HashSet::new(),
            anonymous: 0,
        }
    }

    fn locate(&self, base: Option<&Url>, location: &str) -> Result<Url, error::Error> {
        match base {
            Some(base) => Ok(base.join(location)?),
            None => Ok(Url::parse(location)?),
        }
    }

    fn parse_url(&mut self, url: Url) -> Result<(), error::Error> {
        if !self.visited.insert(url.clone()) {
            debug!(%url, "already parsed, skipping");
            return Ok(());
        }

        debug!(%url, "parsing document");

        let result = match url.scheme() {
            "file" => self.parse_xml(
                Some(url.clone()),
                Reader::from_file(
                    url.to_file_path()
                        .map_err(|()| error::Error::PathConversionError(None))?,
                )
                .map_err(error::Error::FileOpenError)?,
            ),

            "http" | "https" => self.parse_xml(
                Some(url.clone()),
                Reader::from_reader(BufReader::new(reqwest::blocking::get(url.clone())?)),
            ),

            other => Err(error::Error::UnsupportedScheme(other.into())),
        };

        debug!(%url, "finished document");
        result
    }

    fn parse_xml<B: BufRead>(&mut self, url: Option<Url>, mut reader: Reader<B>) -> Result<(), error::Error> {
        reader.trim_text(true);

        let mut document = Document {
            url,
            stack: Vec::new(),
            scopes: Scopes::default(),
        };
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => self.handle_start(&mut document, &reader, &start)?,
                Event::End(..) => self.handle_end(&mut document)?,

                Event::Empty(start) => {
                    self.handle_start(&mut document, &reader, &start)?;
                    self.handle_end(&mut document)?;
                }

                Event::Text(text) => self.handle_text(&mut document, &reader, &text)?,
                Event::Eof => break,
                _ => (),
            }

            buffer.clear();
        }

        Ok(())
    }

    fn handle_text<B: BufRead>(
        &mut self,
        document: &mut Document,
        reader: &Reader<B>,
        text: &BytesText<'_>,
    ) -> Result<(), error::Error> {
        if let Some(ParseState::Documentation(documentation)) = document.stack.last_mut() {
            if !documentation.is_empty() {
                documentation.push(' ');
            }
            documentation.push_str(text.unescape_and_decode(reader)?.trim());
        }

        Ok(())
    }

    fn handle_start<B: BufRead>(
        &mut self,
        document: &mut Document,
        reader: &Reader<B>,
        start: &BytesStart<'_>,
    ) -> Result<(), error::Error> {
        let (prefix, local_name) = split_namespaced_name(reader.decode(start.name())?);

        let mut frame = Frame::default();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?;
            let value = reader.decode(attribute.value.as_ref())?;

            match split_namespaced_name(key) {
                (None, "xmlns") => frame.prefixes.push((None, value.to_owned())),
                (Some("xmlns"), declared) => {
                    frame.prefixes.push((Some(declared.to_owned()), value.to_owned()))
                }
                (None, "targetNamespace") if matches!(local_name, "definitions" | "schema") => {
                    frame.target = Some(value.to_owned())
                }
                _ => (),
            }
        }
        document.scopes.push(frame);

        let namespace = document.scopes.namespace(prefix).map(ToOwned::to_owned);
        let context = document
            .stack
            .last()
            .map_or(Context::Root, ParseState::context);

        let mut new_state = ParseState::Other(local_name.to_owned());

        match (context, local_name) {
            (Context::Root, "definitions") => {
                if self.definition.target_namespace.is_none() {
                    self.definition.target_namespace = document.scopes.target().map(ToOwned::to_owned);
                }
                new_state = ParseState::Definitions;
            }

            (Context::Root, "schema") | (Context::Types, "schema") => new_state = ParseState::Schema,

            (Context::Definitions, "import")
            | (Context::Types | Context::Schema, "import" | "include") => {
                let [location, schema_location] =
                    get_attributes(reader, start.attributes(), ["location", "schemaLocation"])?;

                if let Some(location) = location.or(schema_location) {
                    let url = self.locate(document.url.as_ref(), &location)?;
                    self.parse_url(url)?;
                    debug!(url = ?document.url, "back to document");
                }
            }

            (Context::Definitions, "types") => new_state = ParseState::Types,

            (Context::Definitions, "message") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;
                let name = required(name, local_name, "name")?;

                new_state = ParseState::Message {
                    name: document.scopes.target_namespaced(name),
                    parts: Vec::new(),
                };
            }

            (Context::Message, "part") => {
                let [name, element, ty] =
                    get_attributes(reader, start.attributes(), ["name", "element", "type"])?;
                let name = required(name, local_name, "name")?;

                let kind = match (element, ty) {
                    (Some(element), _) => PartKind::Element(document.scopes.resolve(&element)?),
                    (None, Some(ty)) => PartKind::Type(document.scopes.resolve(&ty)?),
                    (None, None) => {
                        return Err(error::Error::MissingAttribute {
                            element: local_name.to_owned(),
                            attribute: "element",
                        })
                    }
                };

                new_state = ParseState::Part(MessagePart { name, kind });
            }

            (Context::Definitions, "portType") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;
                let name = required(name, local_name, "name")?;

                new_state = ParseState::PortType {
                    name: document.scopes.target_namespaced(name),
                    operations: Vec::new(),
                };
            }

            (Context::PortType, "operation") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                new_state = ParseState::Operation(Operation {
                    name: required(name, local_name, "name")?,
                    documentation: None,
                    input: None,
                    output: None,
                });
            }

            (Context::Operation, "documentation") => {
                new_state = ParseState::Documentation(String::new())
            }

            (Context::Operation, "input" | "output") => {
                let [message] = get_attributes(reader, start.attributes(), ["message"])?;
                let message = document.scopes.resolve(&required(message, local_name, "message")?)?;

                if let Some(ParseState::Operation(operation)) = document.stack.last_mut() {
                    if local_name == "input" {
                        operation.input = Some(message);
                    } else {
                        operation.output = Some(message);
                    }
                }
            }

            (Context::Definitions, "binding") => {
                let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;
                let name = required(name, local_name, "name")?;
                let ty = document.scopes.resolve(&required(ty, local_name, "type")?)?;

                new_state = ParseState::Binding(Binding {
                    name: document.scopes.target_namespaced(name),
                    ty,
                    version: None,
                    style: None,
                    operations: Vec::new(),
                });
            }

            (Context::Binding, "binding") => {
                let [style] = get_attributes(reader, start.attributes(), ["style"])?;
                let style = parse_style(style)?;

                if let Some(ParseState::Binding(binding)) = document.stack.last_mut() {
                    binding.version = binding_version(namespace.as_deref());
                    binding.style = style;
                }
            }

            (Context::Binding, "operation") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                new_state = ParseState::BindingOperation(BindingOperation {
                    name: required(name, local_name, "name")?,
                    action: None,
                    style: None,
                    input: None,
                    output: None,
                });
            }

            (Context::BindingOperation, "operation") => {
                let [action, style] =
                    get_attributes(reader, start.attributes(), ["soapAction", "style"])?;
                let style = parse_style(style)?;

                if let Some(ParseState::BindingOperation(operation)) = document.stack.last_mut() {
                    operation.action = action.filter(|action| !action.is_empty());
                    operation.style = style;
                }
            }

            (Context::BindingOperation, "input" | "output") => {
                new_state = ParseState::BindingBody {
                    output: local_name == "output",
                    body: BodyUse::default(),
                }
            }

            (Context::BindingBody, "body") => {
                let [encoding, body_namespace] =
                    get_attributes(reader, start.attributes(), ["use", "namespace"])?;
                let encoding = parse_use(encoding)?;

                if let Some(ParseState::BindingBody { body, .. }) = document.stack.last_mut() {
                    body.encoding = encoding;
                    body.namespace = body_namespace;
                }
            }

            (Context::Definitions, "service") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                new_state = ParseState::Service(Service {
                    name: required(name, local_name, "name")?,
                    ports: Vec::new(),
                });
            }

            (Context::Service, "port") => {
                let [name, binding] = get_attributes(reader, start.attributes(), ["name", "binding"])?;
                let name = required(name, local_name, "name")?;
                let binding = document.scopes.resolve(&required(binding, local_name, "binding")?)?;

                new_state = ParseState::Port(Port {
                    name,
                    binding,
                    location: None,
                });
            }

            (Context::Port, "address") if binding_version(namespace.as_deref()).is_some() => {
                let [location] = get_attributes(reader, start.attributes(), ["location"])?;

                if let Some(ParseState::Port(port)) = document.stack.last_mut() {
                    port.location = Some(required(location, local_name, "location")?);
                }
            }

            (Context::Schema, "element") => {
                let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;
                let name = required(name, local_name, "name")?;
                let ty = ty.map(|ty| document.scopes.resolve(&ty)).transpose()?;

                new_state = ParseState::Element {
                    name: document.scopes.target_namespaced(name),
                    ty,
                };
            }

            (Context::Schema, "complexType") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;
                let name = required(name, local_name, "name")?;

                new_state = ParseState::ComplexType {
                    name: Some(document.scopes.target_namespaced(name)),
                    base: None,
                    fields: Vec::new(),
                    array_of: None,
                };
            }

            (Context::Element | Context::LocalElement, "complexType") => {
                new_state = ParseState::ComplexType {
                    name: None,
                    base: None,
                    fields: Vec::new(),
                    array_of: None,
                }
            }

            (Context::Schema, "simpleType") => {
                let [name] = get_attributes(reader, start.attributes(), ["name"])?;
                let name = required(name, local_name, "name")?;

                new_state = ParseState::SimpleType {
                    name: Some(document.scopes.target_namespaced(name)),
                    base: None,
                    values: Vec::new(),
                };
            }

            (Context::Element | Context::LocalElement | Context::Attribute, "simpleType") => {
                new_state = ParseState::SimpleType {
                    name: None,
                    base: None,
                    values: Vec::new(),
                }
            }

            (Context::ComplexType | Context::Derivation, "sequence" | "all" | "choice")
            | (Context::Group, "sequence" | "all" | "choice") => {
                new_state = ParseState::Group {
                    choice: local_name == "choice",
                }
            }

            (Context::ComplexType, "complexContent" | "simpleContent") => {
                new_state = ParseState::ComplexContent
            }

            (Context::ComplexContent, "extension" | "restriction") => {
                let [base] = get_attributes(reader, start.attributes(), ["base"])?;
                let base = document.scopes.resolve(&required(base, local_name, "base")?)?;

                if local_name == "extension" || base.is_soap_array() {
                    if let Some(ParseState::ComplexType { base: slot, .. }) =
                        enclosing_complex_type(&mut document.stack)
                    {
                        *slot = Some(base);
                    }
                }

                new_state = ParseState::Derivation;
            }

            (Context::ComplexType | Context::Derivation, "attribute") => {
                let [name, ty, reference, array_type, usage] = get_attributes(
                    reader,
                    start.attributes(),
                    ["name", "type", "ref", "arrayType", "use"],
                )?;

                match (name, reference) {
                    (Some(name), _) => {
                        let kind = match ty {
                            Some(ty) => FieldKind::Type(document.scopes.resolve(&ty)?),
                            None => FieldKind::Any,
                        };

                        new_state = ParseState::Attribute(Field {
                            name,
                            namespace: None,
                            min_occurs: u32::from(usage.as_deref() == Some("required")),
                            max_occurs: None,
                            kind,
                            is_attr: true,
                        });
                    }

                    (None, Some(reference)) if reference.ends_with("arrayType") => {
                        if let Some(array_type) = array_type {
                            let element = document.scopes.resolve(array_element_type(&array_type))?;

                            if let Some(ParseState::ComplexType { array_of, .. }) =
                                enclosing_complex_type(&mut document.stack)
                            {
                                *array_of = Some(element);
                            }
                        }
                    }

                    _ => trace!("ignoring attribute reference"),
                }
            }

            (Context::Group, "element") => {
                let [name, ty, reference, min_occurs, max_occurs] = get_attributes(
                    reader,
                    start.attributes(),
                    ["name", "type", "ref", "minOccurs", "maxOccurs"],
                )?;

                let (name, kind) = match (name, reference) {
                    (_, Some(reference)) => {
                        let reference = document.scopes.resolve(&reference)?;
                        (reference.name.clone(), FieldKind::Element(reference))
                    }
                    (Some(name), None) => {
                        let kind = match ty {
                            Some(ty) => FieldKind::Type(document.scopes.resolve(&ty)?),
                            None => FieldKind::Any,
                        };
                        (name, kind)
                    }
                    (None, None) => {
                        return Err(error::Error::MissingAttribute {
                            element: local_name.to_owned(),
                            attribute: "name",
                        })
                    }
                };

                let min_occurs = if in_choice(&document.stack) {
                    0
                } else {
                    parse_min_occurs(min_occurs)?
                };

                new_state = ParseState::LocalElement(Field {
                    name,
                    namespace: document.scopes.target().map(ToOwned::to_owned),
                    min_occurs,
                    max_occurs: parse_max_occurs(max_occurs)?,
                    kind,
                    is_attr: false,
                });
            }

            (Context::SimpleType, "restriction") => {
                let [base] = get_attributes(reader, start.attributes(), ["base"])?;
                let base = base.map(|base| document.scopes.resolve(&base)).transpose()?;

                if let Some(ParseState::SimpleType { base: slot, .. }) = document.stack.last_mut() {
                    *slot = base;
                }

                new_state = ParseState::Restriction;
            }

            (Context::Restriction, "enumeration") => {
                let [value] = get_attributes(reader, start.attributes(), ["value"])?;

                if let Some(ParseState::SimpleType { values, .. }) =
                    enclosing_simple_type(&mut document.stack)
                {
                    values.push(required(value, local_name, "value")?);
                }
            }

            _ => trace!(element = local_name, context = ?context, "skipping element"),
        }

        document.stack.push(new_state);
        Ok(())
    }

    /// Names an anonymous type after the element, field or attribute declaring it.
    fn anonymous_name(&mut self, document: &Document) -> Option<QualifiedName> {
        let stem = match document.stack.last()? {
            ParseState::Element { name, .. } => name.name.as_str(),
            ParseState::LocalElement(field) | ParseState::Attribute(field) => field.name.as_str(),
            _ => return None,
        };

        self.anonymous += 1;
        Some(QualifiedName::new(
            document.scopes.target(),
            synthetic_name(stem, self.anonymous),
        ))
    }

    fn adopt_anonymous(&mut self, document: &mut Document, kind: TypeKind) {
        let name = if let Some(name) = self.anonymous_name(document) {
            name
        } else {
            warn!("anonymous type outside of an element declaration");
            return;
        };

        match document.stack.last_mut() {
            Some(ParseState::Element { ty, .. }) => *ty = Some(name.clone()),
            Some(ParseState::LocalElement(field) | ParseState::Attribute(field)) => {
                field.kind = FieldKind::Type(name.clone())
            }
            _ => (),
        }

        self.definition.types.push(Type {
            name,
            kind,
            synthetic: true,
        });
    }

    fn handle_end(&mut self, document: &mut Document) -> Result<(), error::Error> {
        let finished_state = document.stack.pop();
        document.scopes.pop();

        match finished_state {
            Some(ParseState::Element { name, ty }) => {
                self.definition.elements.push(Element { name, ty })
            }

            Some(ParseState::ComplexType {
                name,
                base,
                mut fields,
                array_of,
            }) => {
                if let Some(element) = array_of.filter(|_| fields.is_empty()) {
                    fields.push(Field {
                        name: "item".to_owned(),
                        namespace: None,
                        min_occurs: 0,
                        max_occurs: Some(MaxOccurs::Unbounded),
                        kind: FieldKind::Type(element),
                        is_attr: false,
                    });
                }

                let kind = TypeKind::Struct { base, fields };
                match name {
                    Some(name) => self.definition.types.push(Type {
                        name,
                        kind,
                        synthetic: false,
                    }),
                    None => self.adopt_anonymous(document, kind),
                }
            }

            Some(ParseState::SimpleType { name, base, values }) => {
                let kind = TypeKind::Simple { base, values };
                match name {
                    Some(name) => self.definition.types.push(Type {
                        name,
                        kind,
                        synthetic: false,
                    }),
                    None => self.adopt_anonymous(document, kind),
                }
            }

            Some(ParseState::LocalElement(field) | ParseState::Attribute(field)) => {
                if let Some(ParseState::ComplexType { fields, .. }) =
                    enclosing_complex_type(&mut document.stack)
                {
                    fields.push(field);
                }
            }

            Some(ParseState::Message { name, parts }) => {
                self.definition.messages.push(Message { name, parts })
            }

            Some(ParseState::Part(part)) => {
                if let Some(ParseState::Message { parts, .. }) = document.stack.last_mut() {
                    parts.push(part);
                }
            }

            Some(ParseState::PortType { name, operations }) => {
                self.definition
                    .port_types
                    .push(PortType { name, operations })
            }

            Some(ParseState::Operation(operation)) => {
                if let Some(ParseState::PortType { operations, .. }) = document.stack.last_mut() {
                    operations.push(operation);
                }
            }

            Some(ParseState::Documentation(text)) => {
                if let Some(ParseState::Operation(operation)) = document.stack.last_mut() {
                    operation.documentation = Some(text).filter(|text| !text.is_empty());
                }
            }

            Some(ParseState::Binding(binding)) => self.definition.bindings.push(binding),

            Some(ParseState::BindingOperation(operation)) => {
                if let Some(ParseState::Binding(binding)) = document.stack.last_mut() {
                    binding.operations.push(operation);
                }
            }

            Some(ParseState::BindingBody { output, body }) => {
                if let Some(ParseState::BindingOperation(operation)) = document.stack.last_mut() {
                    if output {
                        operation.output = Some(body);
                    } else {
                        operation.input = Some(body);
                    }
                }
            }

            Some(ParseState::Service(service)) => self.definition.services.push(service),

            Some(ParseState::Port(port)) => {
                if let Some(ParseState::Service(service)) = document.stack.last_mut() {
                    service.ports.push(port);
                }
            }

            _ => (),
        }

        Ok(())
    }
}

pub fn parse(url: Url) -> Result<Definition, error::Error> {
    let mut parser = Parser::new();
    parser.parse_url(url)?;
    Ok(parser.definition)
}

pub fn parse_str(xml: &str) -> Result<Definition, error::Error> {
    let mut parser = Parser::new();
    parser.parse_xml(None, Reader::from_str(xml))?;
    Ok(parser.definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_type_strips_dimensions() {
        assert_eq!(array_element_type("tns:Order[]"), "tns:Order");
        assert_eq!(array_element_type("tns:Order[,][]"), "tns:Order");
        assert_eq!(array_element_type("xsd:string"), "xsd:string");
    }

    #[test]
    fn occurs_attributes() {
        assert_eq!(parse_min_occurs(None).unwrap(), 1);
        assert_eq!(parse_min_occurs(Some("0".into())).unwrap(), 0);
        assert_eq!(parse_max_occurs(Some("unbounded".into())).unwrap(), Some(MaxOccurs::Unbounded));
        assert_eq!(parse_max_occurs(Some("5".into())).unwrap(), Some(MaxOccurs::Bounded(5)));
        assert!(parse_max_occurs(Some("many".into())).is_err());
    }

    #[test]
    fn undeclared_prefix_is_an_error() {
        let scopes = Scopes::default();
        assert!(matches!(
            scopes.resolve("tns:Order"),
            Err(error::Error::UnknownPrefix(prefix)) if prefix == "tns"
        ));
        assert_eq!(scopes.resolve("Order").unwrap(), QualifiedName::local("Order"));
    }

    #[test]
    fn inner_scopes_shadow_outer_prefixes() {
        let mut scopes = Scopes::default();
        scopes.push(Frame {
            prefixes: vec![(Some("tns".into()), "urn:outer".into())],
            target: Some("urn:outer".into()),
        });
        scopes.push(Frame {
            prefixes: vec![(Some("tns".into()), "urn:inner".into())],
            target: None,
        });

        assert_eq!(scopes.resolve("tns:A").unwrap().namespace.as_deref(), Some("urn:inner"));
        assert_eq!(scopes.target(), Some("urn:outer"));

        scopes.pop();
        assert_eq!(scopes.resolve("tns:A").unwrap().namespace.as_deref(), Some("urn:outer"));
    }
}
