// src/pipeline/extract.rs
//! Typed field extraction for client records and their table rows.
//!
//! A missing property is an ordinary outcome here, so every field comes back
//! as a `Result` and the pipeline decides what to log.

use crate::document::{Properties, Record, Row};
use crate::error::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;

pub const SYSTEMS_TABLE: &str = "systems";
pub const EMPLOYEES_TABLE: &str = "Client_Employees";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("valid email pattern"));

/// Client fields in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    To,
    Name,
    FullName,
    Inn,
    Comment,
    Active,
}

impl ClientField {
    pub const ALL: [ClientField; 6] = [
        ClientField::To,
        ClientField::Name,
        ClientField::FullName,
        ClientField::Inn,
        ClientField::Comment,
        ClientField::Active,
    ];

    /// Name used in error messages
    pub fn key(self) -> &'static str {
        match self {
            ClientField::To => "to",
            ClientField::Name => "name",
            ClientField::FullName => "fullName",
            ClientField::Inn => "inn",
            ClientField::Comment => "comment",
            ClientField::Active => "active",
        }
    }

    /// Property name in the export
    pub fn property(self) -> &'static str {
        match self {
            ClientField::To => "id",
            ClientField::Name => "name",
            ClientField::FullName => "title",
            ClientField::Inn => "inn",
            ClientField::Comment => "verbose_title",
            ClientField::Active => "active",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome {
    pub field: ClientField,
    pub value: Result<String, FieldError>,
}

/// Per-field results for one client record
#[derive(Debug, Clone, PartialEq)]
pub struct ClientExtraction {
    pub outcomes: Vec<FieldOutcome>,
}

impl ClientExtraction {
    pub fn failures(&self) -> impl Iterator<Item = (ClientField, &FieldError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.value.as_ref().err().map(|e| (o.field, e)))
    }

    /// Collapse into plain fields; a failed field becomes empty.
    pub fn into_fields(self) -> ClientFields {
        let mut fields = ClientFields::default();
        for outcome in self.outcomes {
            let value = outcome.value.unwrap_or_default();
            match outcome.field {
                ClientField::To => fields.to = value,
                ClientField::Name => fields.name = value,
                ClientField::FullName => fields.full_name = value,
                ClientField::Inn => fields.inn = value,
                ClientField::Comment => fields.comment = value,
                ClientField::Active => fields.active = value == "true",
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFields {
    /// External system identifier
    pub to: String,
    pub name: String,
    pub full_name: String,
    pub inn: String,
    pub comment: String,
    pub active: bool,
}

impl ClientFields {
    /// Records without an id or a name are not imported.
    pub fn is_identifiable(&self) -> bool {
        !self.to.is_empty() && !self.name.is_empty()
    }
}

pub fn extract_client(record: &Record) -> ClientExtraction {
    let outcomes = ClientField::ALL
        .iter()
        .map(|&field| FieldOutcome {
            field,
            value: text_field(&record.properties, field.property()),
        })
        .collect();
    ClientExtraction { outcomes }
}

fn text_field(properties: &Properties, name: &str) -> Result<String, FieldError> {
    properties.get(name).map(|v| v.to_string())
}

/// One row of the `systems` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRow {
    pub distr: String,
    /// Upper-cased abbreviation
    pub abbr: String,
}

pub fn extract_system(row: &Row) -> Result<SystemRow, FieldError> {
    let distr = row.properties.get("distr")?.to_string();
    let abbr = row.properties.get("abbr")?.to_uppercase();
    Ok(SystemRow { distr, abbr })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Build an employee from a `Client_Employees` row. `ordinal` is the 1-based
/// count of employees successfully derived for this client so far, used in
/// the placeholder address.
pub fn extract_employee(
    row: &Row,
    ordinal: usize,
    client_id: &str,
) -> Result<EmployeeRecord, FieldError> {
    let full_name = row.properties.get("name")?.replace('\t', " ");
    let (first_name, last_name) = split_name(&full_name);

    let email = match row.properties.optional("email").map(str::trim) {
        Some(address) if EMAIL_PATTERN.is_match(address) => address.to_string(),
        _ => placeholder_email(ordinal, client_id),
    };

    Ok(EmployeeRecord {
        full_name,
        first_name,
        last_name,
        email,
    })
}

/// Split at the first space: the last name comes first in the export. The
/// first name keeps its leading space.
pub fn split_name(full_name: &str) -> (String, String) {
    match full_name.find(' ') {
        Some(idx) => (full_name[idx..].to_string(), full_name[..idx].to_string()),
        None => (".".to_string(), full_name.to_string()),
    }
}

pub fn placeholder_email(ordinal: usize, client_id: &str) -> String {
    format!("client{}-{}@noemail.ru", ordinal, client_id)
}
