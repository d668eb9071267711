use crate::domain::fields;
use quick_xml::escape::partial_escape;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Root element of every serialized request.
pub const REQUEST_ROOT: &str = "gatewayRequest";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// A flat bag of request fields sent to the gateway.
///
/// Fields are optional by omission: setting a field to `None` removes it,
/// so the serialized document only carries what the caller supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayRequest {
    fields: BTreeMap<String, String>,
}

impl GatewayRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts `key` when `value` is present, removes it otherwise.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.fields.insert(key.to_string(), value.to_string());
            }
            None => {
                self.fields.remove(key);
            }
        }
    }

    /// Upserts `key` unconditionally.
    pub fn put(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Stores a decimal amount in its canonical string form.
    pub fn set_decimal(&mut self, key: &str, value: Option<Decimal>) {
        self.set(key, value.map(|v| v.normalize().to_string()).as_deref());
    }

    /// Removes `key` whether or not it was present.
    pub fn clear(&mut self, key: &str) {
        self.fields.remove(key);
    }

    /// Strips the diagnostic fields left behind by an earlier failover loop.
    pub fn clear_failure_context(&mut self) {
        for key in fields::FAILURE_CONTEXT {
            self.clear(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Reads `key` as a decimal; unparsable values read as `None`.
    pub fn get_decimal(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(|v| Decimal::from_str(v.trim()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the request as a flat XML document.
    ///
    /// Only `&`, `<` and `>` are escaped in values. Quotes are left alone
    /// because values are only ever written as element text.
    pub fn serialize(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        xml.push('<');
        xml.push_str(REQUEST_ROOT);
        xml.push('>');
        for (key, value) in &self.fields {
            xml.push('<');
            xml.push_str(key);
            xml.push('>');
            xml.push_str(&partial_escape(value.as_str()));
            xml.push_str("</");
            xml.push_str(key);
            xml.push('>');
        }
        xml.push_str("</");
        xml.push_str(REQUEST_ROOT);
        xml.push('>');
        xml
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GatewayRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
