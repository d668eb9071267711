#![allow(dead_code)]

use paygate::application::router::TransactionRouter;
use paygate::config::RouterConfig;
use paygate::domain::fields;
use paygate::domain::ports::TransportError;
use paygate::infrastructure::in_memory::{ScriptedTransport, render_response};
use paygate::infrastructure::random::FixedRotation;

pub type TestRouter = TransactionRouter<ScriptedTransport, FixedRotation>;

/// Long GUID owned by host 0x11 (`gw-17.paygate.net`).
pub const GUID_HOST_17: &str = "1100C5E8A4B2F11D";

pub fn reply(code: &str, reason: &str, guid: Option<&str>) -> Result<String, TransportError> {
    let mut pairs = vec![(fields::RESPONSE_CODE, code), (fields::REASON_CODE, reason)];
    if let Some(guid) = guid {
        pairs.push((fields::GUID, guid));
    }
    Ok(render_response(&pairs))
}

pub fn success(guid: Option<&str>) -> Result<String, TransportError> {
    reply("0", "0", guid)
}

pub fn transient(reason: &str) -> Result<String, TransportError> {
    reply("3", reason, None)
}

pub fn pool(size: usize) -> Vec<String> {
    (1..=size).map(|i| format!("gw-{i}.example.com")).collect()
}

pub fn router_with_pool(hosts: Vec<String>, transport: &ScriptedTransport) -> TestRouter {
    let config = RouterConfig {
        hosts: Some(hosts),
        base_host: Some("gateway.example.com".to_string()),
        ..RouterConfig::default()
    };
    TransactionRouter::new(config, transport.clone(), FixedRotation(0))
}

pub fn default_router(transport: &ScriptedTransport) -> TestRouter {
    TransactionRouter::new(RouterConfig::default(), transport.clone(), FixedRotation(0))
}
