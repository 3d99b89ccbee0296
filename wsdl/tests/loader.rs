//! Loader tests against a small document/literal WSDL.

use std::io::Write;

use wsdlproxy_wsdl::{
    self as wsdl,
    graph::{JsonType, MaxOccurs, SoapVersion, Style, TypeRef, Use},
    types::SOAPENC_NS,
    QualifiedName,
};

const ORDERS: &str = include_str!("fixtures/orders.wsdl");

fn orders(name: &str) -> QualifiedName {
    QualifiedName::new(Some("urn:orders"), name)
}

#[test]
fn anonymous_element_types_become_synthetic() {
    let graph = wsdl::parse_str(ORDERS).unwrap();

    let request = graph.element(&orders("GetOrder")).unwrap();
    assert_eq!(request.ty, TypeRef::schema(orders("GetOrder_000001")));

    let wrapper = graph.schema_type(&orders("GetOrder_000001")).unwrap();
    assert!(wrapper.is_synthetic);
    assert_eq!(wrapper.stem(), "GetOrder");
    assert_eq!(wrapper.content.len(), 1);
    assert_eq!(wrapper.content[0].name, "orderId");
    assert_eq!(wrapper.content[0].ty, TypeRef::primitive(JsonType::String));

    let response = graph.element(&orders("GetOrderResponse")).unwrap();
    assert_eq!(response.ty, TypeRef::schema(orders("GetOrderResponse_000002")));
}

#[test]
fn extension_records_base_and_own_fields() {
    let graph = wsdl::parse_str(ORDERS).unwrap();
    let order = graph.schema_type(&orders("Order")).unwrap();

    assert_eq!(order.base_type, Some(orders("Entity")));
    assert_eq!(order.inherited_base(), Some(&orders("Entity")));

    let names: Vec<_> = order.content.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, ["total", "status", "lines", "currency"]);

    assert_eq!(order.content[0].ty, TypeRef::primitive(JsonType::Number));
    assert_eq!(order.content[1].ty, TypeRef::enumeration(JsonType::String, orders("Status")));
    assert_eq!(order.content[1].min_occurs, 0);
    assert_eq!(order.content[2].ty, TypeRef::schema(orders("ArrayOfOrderLine")));
    assert!(order.content[3].is_attr);
    assert_eq!(order.content[3].min_occurs, 0);
    assert!(!order.is_synthetic);
    assert_eq!(order.ns_checksum.len(), 8);
}

#[test]
fn soap_encoded_array_gets_item_field() {
    let graph = wsdl::parse_str(ORDERS).unwrap();
    let array = graph.schema_type(&orders("ArrayOfOrderLine")).unwrap();

    assert!(array.is_soap_array());
    assert_eq!(array.base_type, Some(QualifiedName::new(Some(SOAPENC_NS), "Array")));
    assert_eq!(array.content.len(), 1);
    assert_eq!(array.content[0].ty, TypeRef::schema(orders("OrderLine")));
    assert_eq!(array.content[0].max_occurs, Some(MaxOccurs::Unbounded));
}

#[test]
fn enumerations_keep_values_and_base() {
    let graph = wsdl::parse_str(ORDERS).unwrap();
    let status = graph.schema_type(&orders("Status")).unwrap();

    assert_eq!(status.enumerated_values, Some(vec!["OPEN".to_owned(), "CLOSED".to_owned()]));
    assert_eq!(status.json_type, Some(JsonType::String));
    assert!(status.is_enumeration());
}

#[test]
fn operations_join_messages_and_binding() {
    let graph = wsdl::parse_str(ORDERS).unwrap();

    assert_eq!(graph.namespace.as_deref(), Some("urn:orders"));
    assert_eq!(graph.version, SoapVersion::Soap11);
    assert_eq!(graph.style, Style::Document);

    let operation = &graph.operations["GetOrder"];
    assert_eq!(operation.soap_action.as_deref(), Some("urn:orders#GetOrder"));
    assert_eq!(operation.documentation.as_deref(), Some("Fetches a single order."));
    assert_eq!(operation.style, None);

    let input = operation.input.as_ref().unwrap();
    assert_eq!(input.encoding, Use::Literal);
    assert_eq!(input.parts.len(), 1);
    assert_eq!(input.parts[0].name, "parameters");
    assert_eq!(input.parts[0].element, Some(orders("GetOrder")));

    let output = operation.output.as_ref().unwrap();
    assert_eq!(output.parts[0].element, Some(orders("GetOrderResponse")));
}

#[test]
fn address_comes_from_soap_port() {
    let graph = wsdl::parse_str(ORDERS).unwrap();
    let address = graph.soap_address.as_ref().unwrap();

    assert_eq!(address.hostname, "soap.example.com");
    assert_eq!(address.port, Some(8443));
    assert_eq!(address.path, "/orders");
    assert!(address.is_https);
    assert_eq!(address.endpoint(), "https://soap.example.com:8443/orders");
}

#[test]
fn parses_from_local_path() {
    let mut file = tempfile::Builder::new().suffix(".wsdl").tempfile().unwrap();
    file.write_all(ORDERS.as_bytes()).unwrap();

    let graph = wsdl::parse(file.path().to_str().unwrap()).unwrap();
    assert!(graph.operations.contains_key("GetOrder"));
}

#[test]
fn document_without_soap_port_is_rejected() {
    let result = wsdl::parse_str(
        r#"<definitions targetNamespace="urn:empty" xmlns="http://schemas.xmlsoap.org/wsdl/"/>"#,
    );

    assert!(matches!(result, Err(wsdl::error::Error::NoSoapPort)));
}

#[test]
fn graph_round_trips_through_json() {
    let graph = wsdl::parse_str(ORDERS).unwrap();
    let json = serde_json::to_string(&graph).unwrap();
    let back: wsdl::Wsdl = serde_json::from_str(&json).unwrap();

    assert_eq!(back, graph);
}
