use crate::error::ImportError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;

/// Width the distribution number is zero-padded to in cache keys
pub const DISTR_WIDTH: usize = 6;

/// Mapping of system abbreviation to the code used in cache keys.
#[derive(Debug, Clone, Default)]
pub struct SystemCodeTable {
    codes: IndexMap<String, String>,
}

impl SystemCodeTable {
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::SystemCodes {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|message| ImportError::SystemCodes {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a JSON object; codes may be strings or numbers.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let raw: Map<String, Value> =
            serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {e}"))?;

        let mut codes = IndexMap::with_capacity(raw.len());
        for (abbr, value) in raw {
            let code = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => return Err(format!("Code for '{abbr}' is not a string or number: {other}")),
            };
            codes.insert(abbr, code);
        }
        Ok(SystemCodeTable { codes })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SystemCodeTable {
            codes: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn resolve(&self, abbr: &str) -> Option<&str> {
        self.codes.get(abbr).map(|s| s.as_str())
    }
}

/// `{code}_{distr}` with distr left-padded with zeros to six characters.
pub fn cache_key(code: &str, distr: &str) -> String {
    format!("{}_{}", code, zero_pad(distr, DISTR_WIDTH))
}

fn zero_pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    // Keep a leading sign in front of the padding
    let (sign, digits) = match value.chars().next() {
        Some(c @ ('+' | '-')) => (c.to_string(), &value[1..]),
        _ => (String::new(), value),
    };
    format!("{}{}{}", sign, "0".repeat(width - len), digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_padding() {
        assert_eq!(cache_key("42", "7"), "42_000007");
        assert_eq!(cache_key("42", "123456"), "42_123456");
        assert_eq!(cache_key("42", "1234567"), "42_1234567");
        assert_eq!(cache_key("42", "-7"), "42_-00007");
    }

    #[test]
    fn test_from_json_mixed_values() {
        let table = SystemCodeTable::from_json(r#"{"XY": "42", "ZZ": 17}"#).unwrap();
        assert_eq!(table.resolve("XY"), Some("42"));
        assert_eq!(table.resolve("ZZ"), Some("17"));
        assert_eq!(table.resolve("QQ"), None);
    }

    #[test]
    fn test_load_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.json");
        std::fs::write(&path, r#"{"ZZ": 17, "AA": "3", "MM": 9}"#).unwrap();

        let table = SystemCodeTable::load(&path).unwrap();
        let abbrs: Vec<&str> = table.codes.keys().map(|k| k.as_str()).collect();
        assert_eq!(abbrs, vec!["ZZ", "AA", "MM"]);
        assert_eq!(table.resolve("AA"), Some("3"));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        assert!(SystemCodeTable::from_json(r#"{"XY": {"code": 1}}"#).is_err());
        assert!(SystemCodeTable::from_json("[1, 2]").is_err());
    }
}
