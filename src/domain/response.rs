use crate::domain::fields;
use crate::domain::outcome::{
    Outcome, REASON_INVALID_RESPONSE, RESPONSE_REQUEST_ERROR, RESPONSE_SYSTEM_ERROR,
};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Root element expected on every gateway reply.
pub const RESPONSE_ROOT: &str = "gatewayResponse";

/// A flat bag of fields parsed from a gateway reply.
///
/// Parsing never fails: a payload that cannot be read turns into a
/// synthetic system error, so callers can always branch on the response code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GatewayResponse {
    fields: BTreeMap<String, String>,
}

impl GatewayResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every stored field. Called before each host attempt so values
    /// from one attempt never leak into the next.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

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

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn get_decimal(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(|v| Decimal::from_str(v.trim()).ok())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn response_code(&self) -> Option<&str> {
        self.get(fields::RESPONSE_CODE)
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.get(fields::REASON_CODE)
    }

    pub fn guid(&self) -> Option<&str> {
        self.get(fields::GUID)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::classify(self.response_code(), self.reason_code())
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

    /// Replaces the bag with a transient failure carrying `reason`.
    pub fn set_transient_failure(&mut self, reason: &str, detail: Option<&str>) {
        self.reset();
        self.set(fields::RESPONSE_CODE, Some(RESPONSE_SYSTEM_ERROR));
        self.set(fields::REASON_CODE, Some(reason));
        self.set(fields::EXCEPTION, detail);
    }

    /// Replaces the bag with a local request error carrying `reason`.
    pub fn set_local_failure(&mut self, reason: &str) {
        self.reset();
        self.set(fields::RESPONSE_CODE, Some(RESPONSE_REQUEST_ERROR));
        self.set(fields::REASON_CODE, Some(reason));
    }

    /// Parses a gateway reply into this bag.
    ///
    /// Every direct child of the root with non-empty text is stored under its
    /// tag name. Unknown tags are kept as-is. A reply without a
    /// `responseCode` is treated like an unreadable one, so a parsed bag
    /// always carries a response code.
    pub fn parse(&mut self, xml: &str) {
        self.reset();
        match read_fields(xml) {
            Ok(parsed) if parsed.contains_key(fields::RESPONSE_CODE) => self.fields = parsed,
            _ => self.set_transient_failure(REASON_INVALID_RESPONSE, Some(xml)),
        }
    }

    /// Convenience constructor around [`GatewayResponse::parse`].
    pub fn from_xml(xml: &str) -> Self {
        let mut response = Self::new();
        response.parse(xml);
        response
    }
}

#[derive(Debug)]
struct Malformed;

fn read_fields(xml: &str) -> Result<BTreeMap<String, String>, Malformed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields = BTreeMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event().map_err(|_| Malformed)? {
            Event::Start(e) => {
                depth += 1;
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|_| Malformed)?
                    .to_string();
                match depth {
                    1 if name == RESPONSE_ROOT && !seen_root => seen_root = true,
                    1 => return Err(Malformed),
                    2 => current = Some((name, String::new())),
                    _ => {}
                }
            }
            Event::Empty(_) if depth == 0 => return Err(Malformed),
            Event::Text(t) if depth == 2 => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(|_| Malformed)?);
                }
            }
            Event::CData(c) if depth == 2 => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(std::str::from_utf8(&c).map_err(|_| Malformed)?);
                }
            }
            Event::End(_) => {
                if depth == 2
                    && let Some((name, text)) = current.take()
                    && !text.is_empty()
                {
                    fields.insert(name, text);
                }
                depth = depth.checked_sub(1).ok_or(Malformed)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root || depth != 0 {
        return Err(Malformed);
    }
    Ok(fields)
}
