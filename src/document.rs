// src/document.rs
//! Owned model of the ERP XML export.
//!
//! The export is a flat list of `Объект` elements under the root. Each object
//! carries its type and sequence number as attributes, scalar values as
//! `Свойство`/`Значение` pairs and repeating sections as
//! `ТабличнаяЧасть`/`Запись` rows.

use crate::error::{FieldError, ImportError};
use indexmap::IndexMap;
use std::path::Path;

pub const OBJECT_TAG: &str = "Объект";
pub const KIND_ATTR: &str = "Тип";
pub const SEQUENCE_ATTR: &str = "Нпп";
pub const PROPERTY_TAG: &str = "Свойство";
pub const NAME_ATTR: &str = "Имя";
pub const VALUE_TAG: &str = "Значение";
pub const TABLE_TAG: &str = "ТабличнаяЧасть";
pub const ROW_TAG: &str = "Запись";

/// Type discriminator of client catalogue objects
pub const CLIENTS_KIND: &str = "СправочникСсылка.Clients";

/// Named scalar values of a record or table row. `None` means the property
/// exists but has no `Значение` text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: IndexMap<String, Option<String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property; the first occurrence of a name wins, like a path lookup would.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.values.entry(name.into()).or_insert(value);
    }

    /// Trimmed value of a property.
    pub fn get(&self, name: &str) -> Result<&str, FieldError> {
        match self.values.get(name) {
            None => Err(FieldError::Missing(name.to_string())),
            Some(None) => Err(FieldError::NoValue(name.to_string())),
            Some(Some(value)) => Ok(value.trim()),
        }
    }

    /// Like `get`, but a missing or empty property is `None` rather than an error.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One `Запись` of a table section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: String,
    pub sequence_id: String,
    pub properties: Properties,
    tables: IndexMap<String, Vec<Row>>,
}

impl Record {
    pub fn new(kind: impl Into<String>, sequence_id: impl Into<String>) -> Self {
        Record {
            kind: kind.into(),
            sequence_id: sequence_id.into(),
            properties: Properties::new(),
            tables: IndexMap::new(),
        }
    }

    pub fn is_client(&self) -> bool {
        self.kind == CLIENTS_KIND
    }

    /// Rows of a named table; an absent table has no rows.
    pub fn table(&self, name: &str) -> &[Row] {
        self.tables.get(name).map(|rows| rows.as_slice()).unwrap_or(&[])
    }

    /// Append rows to a table, creating it if needed. Rows of repeated
    /// sections with the same name are concatenated in document order.
    pub fn push_rows(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.tables.entry(name.into()).or_default().extend(rows);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    pub records: Vec<Record>,
}

impl SourceDocument {
    /// Read and parse the export. Both failures are fatal for a run.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ImportError::SourceUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document = Self::parse(&text).map_err(|message| ImportError::SourceMalformed {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::info!(
            "Loaded {} objects ({} clients) from {}",
            document.records.len(),
            document.clients().count(),
            path.display()
        );
        Ok(document)
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| format!("XML parse failed: {e}"))?;

        let records = child_elements(xml.root_element(), OBJECT_TAG)
            .map(parse_record)
            .collect();

        Ok(SourceDocument { records })
    }

    /// Client records in document order
    pub fn clients(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_client())
    }
}

fn child_elements<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn parse_record(node: roxmltree::Node) -> Record {
    let sequence_id = node.attribute(SEQUENCE_ATTR).unwrap_or_default();
    if sequence_id.is_empty() {
        tracing::warn!("Object without {} attribute", SEQUENCE_ATTR);
    }

    let mut record = Record::new(node.attribute(KIND_ATTR).unwrap_or_default(), sequence_id);
    record.properties = parse_properties(node);

    for table in child_elements(node, TABLE_TAG) {
        let name = table.attribute(NAME_ATTR).unwrap_or_default();
        let rows = child_elements(table, ROW_TAG)
            .map(|row| Row {
                properties: parse_properties(row),
            })
            .collect();
        record.push_rows(name, rows);
    }

    record
}

fn parse_properties(node: roxmltree::Node) -> Properties {
    let mut properties = Properties::new();
    for property in child_elements(node, PROPERTY_TAG) {
        let Some(name) = property.attribute(NAME_ATTR) else {
            continue;
        };
        let value = child_elements(property, VALUE_TAG)
            .next()
            .and_then(|v| v.text())
            .map(|text| text.to_string());
        properties.insert(name, value);
    }
    properties
}
