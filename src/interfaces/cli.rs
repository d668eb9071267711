use crate::application::router::TransactionRouter;
use crate::config::{DeploymentMode, RouterConfig};
use crate::domain::fields;
use crate::domain::ports::{HostRotation, Transport};
use crate::domain::request::GatewayRequest;
use crate::domain::response::GatewayResponse;
use crate::error::{GatewayError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send a transaction through the payment gateway router", long_about = None)]
pub struct Cli {
    /// Transaction to perform
    #[arg(value_enum)]
    pub verb: Verb,

    /// Router configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the test host pool
    #[arg(long)]
    pub test_mode: bool,

    /// Send the request to this host instead of the pool
    #[arg(long)]
    pub server: Option<String>,

    /// Request field as key=value. May be repeated.
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    AuthOnly,
    Purchase,
    Ticket,
    Credit,
    Void,
    Confirm,
    CardScrub,
    RebillUpdate,
    RebillCancel,
    Lookup,
    Xsell,
}

impl Verb {
    pub async fn run<T: Transport, R: HostRotation>(
        self,
        router: &TransactionRouter<T, R>,
        request: &mut GatewayRequest,
    ) -> GatewayResponse {
        match self {
            Verb::AuthOnly => router.perform_auth_only(request).await,
            Verb::Purchase => router.perform_purchase(request).await,
            Verb::Ticket => router.perform_ticket(request).await,
            Verb::Credit => router.perform_credit(request).await,
            Verb::Void => router.perform_void(request).await,
            Verb::Confirm => router.perform_confirmation(request).await,
            Verb::CardScrub => router.perform_card_scrub(request).await,
            Verb::RebillUpdate => router.perform_rebill_update(request).await,
            Verb::RebillCancel => router.perform_rebill_cancel(request).await,
            Verb::Lookup => router.perform_lookup(request).await,
            Verb::Xsell => router.generate_xsell(request).await,
        }
    }
}

impl Cli {
    /// Loads the config file if given and applies the command-line mode.
    pub fn router_config(&self) -> Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::load(path)?,
            None => RouterConfig::default(),
        };
        if self.test_mode {
            config.mode = DeploymentMode::Test;
        }
        Ok(config)
    }

    pub fn request(&self) -> GatewayRequest {
        let mut request: GatewayRequest = self.fields.iter().cloned().collect();
        request.set(fields::GATEWAY_SERVER, self.server.as_deref());
        request
    }
}

/// Parses a `key=value` argument. The value may be empty or contain `=`.
pub fn parse_field(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(GatewayError::InvalidField(format!(
            "expected key=value, got {arg:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("amount=9.99").unwrap(),
            ("amount".to_string(), "9.99".to_string())
        );
        assert_eq!(
            parse_field("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(matches!(parse_field("amount"), Err(GatewayError::InvalidField(_))));
        assert!(matches!(parse_field("=1"), Err(GatewayError::InvalidField(_))));
    }

    #[test]
    fn test_cli_builds_request() {
        let cli = Cli::parse_from([
            "paygate",
            "--server",
            "gw-16.paygate.net",
            "-f",
            "merchantID=1",
            "--field",
            "amount=2.50",
            "purchase",
        ]);

        assert_eq!(cli.verb, Verb::Purchase);
        let request = cli.request();
        assert_eq!(request.get(fields::MERCHANT_ID), Some("1"));
        assert_eq!(request.get(fields::AMOUNT), Some("2.50"));
        assert_eq!(request.get(fields::GATEWAY_SERVER), Some("gw-16.paygate.net"));
    }

    #[test]
    fn test_test_mode_flag() {
        let cli = Cli::parse_from(["paygate", "--test-mode", "lookup"]);
        assert_eq!(cli.router_config().unwrap().mode, DeploymentMode::Test);
    }
}
