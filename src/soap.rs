// src/soap.rs
//! Minimal SOAP 1.1 caller for the two fixed ERP/hotline operations.
//!
//! Only one-parameter operations are supported: the envelope is built from a
//! template, and the reply is reduced to the text (or raw XML) of the
//! response element's first child.

use crate::error::SoapError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub struct SoapClient {
    client: Client,
    endpoint: String,
    login: String,
    password: String,
    namespace: String,
}

impl SoapClient {
    pub fn new(
        wsdl_url: &str,
        login: &str,
        password: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Self, SoapError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SoapError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(SoapClient {
            client,
            endpoint: endpoint_from_wsdl(wsdl_url),
            login: login.to_string(),
            password: password.to_string(),
            namespace: namespace.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke `operation` with a single named argument and return the result.
    pub fn call(&self, operation: &str, parameter: &str, value: &str) -> Result<String, SoapError> {
        let body = build_envelope(&self.namespace, operation, parameter, value);
        tracing::debug!("SOAP {} -> {}", operation, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.login, Some(&self.password))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/xml; charset=utf-8"),
            )
            .header("SOAPAction", format!("\"{}\"", operation))
            .body(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        // Faults come back as 500 with a regular envelope
        match parse_response(&text) {
            Err(SoapError::Malformed(_)) if !status.is_success() => Err(SoapError::Status {
                status: status.as_u16(),
                body: text,
            }),
            other => other,
        }
    }
}

/// Service endpoint for a WSDL URL: the same URL without its `?wsdl` query.
pub fn endpoint_from_wsdl(wsdl_url: &str) -> String {
    match wsdl_url.rfind('?') {
        Some(idx) if wsdl_url[idx + 1..].eq_ignore_ascii_case("wsdl") => {
            wsdl_url[..idx].to_string()
        }
        _ => wsdl_url.to_string(),
    }
}

pub fn build_envelope(namespace: &str, operation: &str, parameter: &str, value: &str) -> String {
    let (open, prefix) = if namespace.is_empty() {
        (operation.to_string(), String::new())
    } else {
        (
            format!("m:{} xmlns:m=\"{}\"", operation, escape_xml(namespace)),
            "m:".to_string(),
        )
    };

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<soap:Envelope xmlns:soap=\"{env}\"><soap:Body>\
<{open}><{p}{param}>{value}</{p}{param}></{p}{op}>\
</soap:Body></soap:Envelope>",
        env = ENVELOPE_NS,
        open = open,
        p = prefix,
        param = parameter,
        value = escape_xml(value),
        op = operation,
    )
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Extract the call result from a response envelope.
pub fn parse_response(text: &str) -> Result<String, SoapError> {
    let xml = roxmltree::Document::parse(text)
        .map_err(|e| SoapError::Malformed(format!("XML parse failed: {e}")))?;

    let body = xml
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Body")
        .ok_or_else(|| SoapError::Malformed("no Body element".to_string()))?;

    let response = body
        .children()
        .find(|n| n.is_element())
        .ok_or_else(|| SoapError::Malformed("empty Body".to_string()))?;

    if response.tag_name().name() == "Fault" {
        let reason = response
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "faultstring")
            .and_then(|n| n.text())
            .unwrap_or("unknown fault");
        return Err(SoapError::Fault(reason.trim().to_string()));
    }

    let result = response.children().find(|n| n.is_element()).unwrap_or(response);
    if result.children().any(|n| n.is_element()) {
        // Structured results are handed back verbatim
        Ok(text[result.range()].to_string())
    } else {
        Ok(result.text().unwrap_or_default().to_string())
    }
}
