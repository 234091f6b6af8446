//! Shared fixtures: a recording in-memory transport and response builders

#![allow(dead_code)]

use std::cell::RefCell;

use openml_evaluations::{HttpResponse, OpenMlClient, Result, Transport};

type Responder = Box<dyn Fn(&str) -> HttpResponse>;

/// Transport that answers from a closure and records every endpoint asked for.
pub struct MockTransport {
    responder: Responder,
    calls: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&str) -> HttpResponse + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Transport for MockTransport {
    fn get(&self, endpoint: &str) -> Result<HttpResponse> {
        self.calls.borrow_mut().push(endpoint.to_string());
        Ok((self.responder)(endpoint))
    }
}

pub fn client(responder: impl Fn(&str) -> HttpResponse + 'static) -> OpenMlClient<MockTransport> {
    OpenMlClient::with_transport(MockTransport::new(responder))
}

/// Value following `key` in a `/key/value/` path.
pub fn segment<'a>(endpoint: &'a str, key: &str) -> Option<&'a str> {
    let parts: Vec<&str> = endpoint.split('/').collect();
    parts
        .windows(2)
        .find(|pair| pair[0] == key)
        .map(|pair| pair[1])
}

pub fn segment_u64(endpoint: &str, key: &str) -> Option<u64> {
    segment(endpoint, key).and_then(|v| v.parse().ok())
}

pub fn segment_ids(endpoint: &str, key: &str) -> Vec<u64> {
    segment(endpoint, key)
        .map(|v| v.split(',').filter_map(|id| id.parse().ok()).collect())
        .unwrap_or_default()
}

/// `(run_id, setup_id, flow_id, value)`
pub type Row = (u64, u64, u64, f64);

pub fn evaluation_element(&(run, setup, flow, value): &Row) -> String {
    format!(
        "<oml:evaluation>\
         <oml:run_id>{run}</oml:run_id><oml:task_id>59</oml:task_id>\
         <oml:setup_id>{setup}</oml:setup_id><oml:flow_id>{flow}</oml:flow_id>\
         <oml:flow_name>flow-{flow}</oml:flow_name><oml:data_id>61</oml:data_id>\
         <oml:data_name>iris</oml:data_name><oml:function>predictive_accuracy</oml:function>\
         <oml:upload_time>2014-04-06 23:30:40</oml:upload_time>\
         <oml:value>{value}</oml:value>\
         </oml:evaluation>"
    )
}

pub fn evaluations_xml(rows: &[Row]) -> String {
    let body: String = rows.iter().map(evaluation_element).collect();
    format!(r#"<oml:evaluations xmlns:oml="http://openml.org/openml">{body}</oml:evaluations>"#)
}

pub fn setup_element(setup_id: u64) -> String {
    format!(
        "<oml:setup>\
         <oml:setup_id>{setup_id}</oml:setup_id><oml:flow_id>7</oml:flow_id>\
         <oml:parameter>\
         <oml:id>1</oml:id><oml:flow_id>7</oml:flow_id><oml:flow_name>svc</oml:flow_name>\
         <oml:full_name>svc(1)_C</oml:full_name><oml:parameter_name>C</oml:parameter_name>\
         <oml:data_type>float</oml:data_type><oml:default_value>1.0</oml:default_value>\
         <oml:value>{setup_id}.5</oml:value>\
         </oml:parameter>\
         </oml:setup>"
    )
}

pub fn setups_xml(ids: &[u64]) -> String {
    let body: String = ids.iter().map(|&id| setup_element(id)).collect();
    format!(r#"<oml:setups xmlns:oml="http://openml.org/openml">{body}</oml:setups>"#)
}

pub fn error_xml(code: u32, message: &str) -> String {
    format!(
        r#"<oml:error xmlns:oml="http://openml.org/openml"><oml:code>{code}</oml:code><oml:message>{message}</oml:message></oml:error>"#
    )
}

pub fn no_results() -> HttpResponse {
    HttpResponse::new(412, error_xml(542, "No results"))
}

/// Serve `rows` honouring the `limit`/`offset` path segments, and answer
/// setup lookups with one setup per requested ID in `known_setups`.
pub fn server(rows: Vec<Row>, known_setups: Vec<u64>) -> impl Fn(&str) -> HttpResponse {
    move |endpoint| {
        if endpoint.starts_with("evaluation/list") {
            let limit = segment_u64(endpoint, "limit").unwrap_or(u64::MAX) as usize;
            let offset = segment_u64(endpoint, "offset").unwrap_or(0) as usize;
            let page: Vec<Row> = rows.iter().skip(offset).take(limit).copied().collect();
            if page.is_empty() {
                return no_results();
            }
            HttpResponse::ok(evaluations_xml(&page))
        } else if endpoint.starts_with("setup/list") {
            let found: Vec<u64> = segment_ids(endpoint, "setup")
                .into_iter()
                .filter(|id| known_setups.contains(id))
                .collect();
            if found.is_empty() {
                return HttpResponse::new(412, error_xml(674, "No results"));
            }
            HttpResponse::ok(setups_xml(&found))
        } else {
            HttpResponse::new(404, "not found")
        }
    }
}
