use crate::config::{CallSettings, RouterConfig};
use crate::domain::fields::{self, transaction_type};
use crate::domain::outcome::{Outcome, REASON_BUGCHECK, REASON_INVALID_REFERENCE_GUID};
use crate::domain::ports::{HostRotation, Transport};
use crate::domain::request::GatewayRequest;
use crate::domain::response::GatewayResponse;
use crate::domain::routing;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

/// Routes gateway transactions across hosts.
///
/// Untargeted calls fail over across the host pool on transient (`"3"`)
/// results. Calls that reference an earlier transaction are sent to the one
/// host encoded in its GUID, without failover. Money-moving verbs are
/// confirmed with a second targeted call once the first one succeeds.
///
/// Two behaviours are kept on purpose and callers should be aware of them:
/// - running out of hosts is not reported distinctly; the caller sees the
///   last host's `"3"` exactly as if a single host had a one-off error.
/// - a targeted call whose owning host is down fails outright.
///
/// The router holds only configuration, so one instance can serve
/// concurrent calls. Request and response bags are per call.
pub struct TransactionRouter<T: Transport, R: HostRotation> {
    config: RouterConfig,
    transport: T,
    rotation: R,
}

impl<T: Transport, R: HostRotation> TransactionRouter<T, R> {
    /// Creates a router.
    ///
    /// # Arguments
    ///
    /// * `config` - Host pool and connection defaults, fixed for the router's life.
    /// * `transport` - Sends one serialized request to one host.
    /// * `rotation` - Picks the first host of each untargeted call.
    pub fn new(config: RouterConfig, transport: T, rotation: R) -> Self {
        Self {
            config,
            transport,
            rotation,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Sends `request` to any host of the pool, failing over on `"3"`.
    ///
    /// Each failed host is recorded in the request's failure-context fields
    /// before the next one is tried. The first non-transient result is
    /// returned; when every host fails, the last host's codes are returned.
    pub async fn send_any_host(
        &self,
        request: &mut GatewayRequest,
        response: &mut GatewayResponse,
    ) -> Outcome {
        let settings = self.config.call_settings(request);
        let mut hosts = match &settings.server_override {
            Some(host) => vec![host.clone()],
            None => self.config.host_pool(),
        };
        if hosts.len() > 1 {
            let start = self.rotation.start_index(hosts.len()) % hosts.len();
            hosts.rotate_left(start);
        }

        request.clear_failure_context();

        if hosts.is_empty() {
            response.set_transient_failure(REASON_BUGCHECK, Some("no gateway hosts configured"));
            return response.outcome();
        }

        let attempts = hosts.len();
        let mut outcome = Outcome::Transient { reason: None };
        for (attempt, host) in hosts.iter().enumerate() {
            outcome = self.send_to_host(&settings, host, request, response).await;
            if !outcome.is_transient() {
                return outcome;
            }

            warn!(
                host = %host,
                attempt = attempt + 1,
                attempts,
                reason_code = ?response.reason_code(),
                "transient gateway failure"
            );
            request.set(fields::FAILED_SERVER, Some(host.as_str()));
            request.set(fields::FAILED_RESPONSE_CODE, response.response_code());
            request.set(fields::FAILED_REASON_CODE, response.reason_code());
            request.set(fields::FAILED_GUID, response.guid());
        }
        outcome
    }

    /// Sends `request` to the host that owns its `referenceGUID`.
    ///
    /// A missing or non-hex reference fails locally with `"4"`/`"410"`
    /// before any network call. Exactly one attempt is made otherwise.
    pub async fn send_targeted_host(
        &self,
        request: &mut GatewayRequest,
        response: &mut GatewayResponse,
    ) -> Outcome {
        let settings = self.config.call_settings(request);
        request.clear_failure_context();

        let index = match request.get(fields::REFERENCE_GUID).map(routing::server_index) {
            Some(Ok(index)) => index,
            _ => {
                debug!("missing or invalid reference GUID");
                response.set_local_failure(REASON_INVALID_REFERENCE_GUID);
                return response.outcome();
            }
        };

        let host = settings
            .server_override
            .clone()
            .unwrap_or_else(|| routing::targeted_host(self.config.base_host(), index));
        self.send_to_host(&settings, &host, request, response).await
    }

    async fn send_to_host(
        &self,
        settings: &CallSettings,
        host: &str,
        request: &GatewayRequest,
        response: &mut GatewayResponse,
    ) -> Outcome {
        response.reset();
        let endpoint = settings.endpoint(host);
        debug!(url = %endpoint, "sending gateway request");

        match self.transport.post(&endpoint, &request.serialize()).await {
            Ok(reply) => response.parse(&reply),
            Err(err) => {
                warn!(url = %endpoint, error = %err, "gateway call failed");
                let detail = err.to_string();
                response.set_transient_failure(err.reason_code(), Some(detail.as_str()));
            }
        }
        response.outcome()
    }

    /// Confirms a successful primary result on the host that produced it.
    ///
    /// On confirmation failure the primary response keeps its other fields
    /// but takes the confirmation's response and reason codes: the gateway
    /// may already have moved money, so the result must be reconciled.
    ///
    /// A successful primary reply without a `guidNo` cannot be confirmed and
    /// downgrades to `4`/`410`, the same codes as a bad caller reference.
    /// That case is logged separately so the two can be told apart.
    async fn confirm(
        &self,
        primary_request: &GatewayRequest,
        primary: &mut GatewayResponse,
    ) -> Outcome {
        if primary.guid().is_none() {
            warn!("successful reply carried no guidNo, confirmation cannot be routed");
        }

        let mut request = GatewayRequest::new();
        request.put(fields::TRANSACTION_TYPE, transaction_type::CONFIRM);
        request.set(fields::REFERENCE_GUID, primary.guid());
        for key in [fields::MERCHANT_ID, fields::MERCHANT_PASSWORD]
            .into_iter()
            .chain(fields::CONNECTION_OVERRIDES)
        {
            request.set(key, primary_request.get(key));
        }

        let mut response = GatewayResponse::new();
        let outcome = self.send_targeted_host(&mut request, &mut response).await;
        if outcome.is_success() {
            return primary.outcome();
        }

        warn!(
            guid = ?primary.guid(),
            response_code = ?response.response_code(),
            reason_code = ?response.reason_code(),
            "confirmation failed, transaction status unknown"
        );
        primary.set(fields::RESPONSE_CODE, response.response_code());
        primary.set(fields::REASON_CODE, response.reason_code());
        primary.outcome()
    }

    async fn run_untargeted(&self, request: &mut GatewayRequest) -> GatewayResponse {
        let mut response = GatewayResponse::new();
        self.send_any_host(request, &mut response).await;
        response
    }

    async fn run_targeted(&self, request: &mut GatewayRequest) -> GatewayResponse {
        let mut response = GatewayResponse::new();
        self.send_targeted_host(request, &mut response).await;
        response
    }

    /// Targeted when the request references a prior transaction.
    async fn run_by_reference(&self, request: &mut GatewayRequest) -> GatewayResponse {
        if request.contains(fields::REFERENCE_GUID) {
            self.run_targeted(request).await
        } else {
            self.run_untargeted(request).await
        }
    }

    async fn run_confirmed(&self, request: &mut GatewayRequest) -> GatewayResponse {
        let mut response = GatewayResponse::new();
        if self.send_any_host(request, &mut response).await.is_success() {
            self.confirm(request, &mut response).await;
        }
        response
    }

    fn completed(response: GatewayResponse) -> GatewayResponse {
        info!(
            response_code = ?response.response_code(),
            reason_code = ?response.reason_code(),
            guid = ?response.guid(),
            "transaction completed"
        );
        response
    }

    /// Authorizes without capturing, then confirms.
    #[instrument(skip_all, fields(transaction_type = transaction_type::AUTH_ONLY))]
    pub async fn perform_auth_only(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::AUTH_ONLY);
        Self::completed(self.run_confirmed(request).await)
    }

    /// Authorizes and captures, then confirms.
    #[instrument(skip_all, fields(transaction_type = transaction_type::PURCHASE))]
    pub async fn perform_purchase(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::PURCHASE);
        Self::completed(self.run_confirmed(request).await)
    }

    /// Captures a prior authorization on the host that owns it.
    #[instrument(skip_all, fields(transaction_type = transaction_type::TICKET))]
    pub async fn perform_ticket(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::TICKET);
        Self::completed(self.run_targeted(request).await)
    }

    #[instrument(skip_all, fields(transaction_type = transaction_type::VOID))]
    pub async fn perform_void(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::VOID);
        Self::completed(self.run_targeted(request).await)
    }

    #[instrument(skip_all, fields(transaction_type = transaction_type::CREDIT))]
    pub async fn perform_credit(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::CREDIT);
        Self::completed(self.run_by_reference(request).await)
    }

    #[instrument(skip_all, fields(transaction_type = transaction_type::LOOKUP))]
    pub async fn perform_lookup(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::LOOKUP);
        Self::completed(self.run_by_reference(request).await)
    }

    #[instrument(skip_all, fields(transaction_type = transaction_type::CARD_SCRUB))]
    pub async fn perform_card_scrub(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::CARD_SCRUB);
        Self::completed(self.run_untargeted(request).await)
    }

    /// Updates a rebill schedule.
    ///
    /// A strictly positive `amount` charges a prorated amount now, so the
    /// update is confirmed like a purchase. Otherwise it is a single call.
    #[instrument(skip_all, fields(transaction_type = transaction_type::REBILL_UPDATE))]
    pub async fn perform_rebill_update(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::REBILL_UPDATE);
        let prorated = request
            .get_decimal(fields::AMOUNT)
            .is_some_and(|amount| amount > Decimal::ZERO);

        let response = if prorated {
            self.run_confirmed(request).await
        } else {
            self.run_untargeted(request).await
        };
        Self::completed(response)
    }

    #[instrument(skip_all, fields(transaction_type = transaction_type::REBILL_CANCEL))]
    pub async fn perform_rebill_cancel(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::REBILL_CANCEL);
        Self::completed(self.run_untargeted(request).await)
    }

    /// Generates a cross-sell from the transaction named in `xsellReferenceXact`.
    #[instrument(skip_all, fields(transaction_type = transaction_type::GENERATE_XSELL))]
    pub async fn generate_xsell(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::GENERATE_XSELL);
        let reference = request.get(fields::XSELL_REFERENCE).map(str::to_string);
        request.set(fields::REFERENCE_GUID, reference.as_deref());
        Self::completed(self.run_by_reference(request).await)
    }

    /// Confirms the transaction named by the request's `referenceGUID`.
    #[instrument(skip_all, fields(transaction_type = transaction_type::CONFIRM))]
    pub async fn perform_confirmation(&self, request: &mut GatewayRequest) -> GatewayResponse {
        request.put(fields::TRANSACTION_TYPE, transaction_type::CONFIRM);
        Self::completed(self.run_targeted(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentMode;
    use crate::domain::ports::TransportError;
    use crate::infrastructure::in_memory::{ScriptedTransport, render_response};
    use crate::infrastructure::random::FixedRotation;
    use tracing_test::traced_test;

    fn router(
        config: RouterConfig,
        transport: &ScriptedTransport,
    ) -> TransactionRouter<ScriptedTransport, FixedRotation> {
        TransactionRouter::new(config, transport.clone(), FixedRotation(0))
    }

    fn reply(code: &str, reason: &str, guid: Option<&str>) -> Result<String, TransportError> {
        let mut fields = vec![(fields::RESPONSE_CODE, code), (fields::REASON_CODE, reason)];
        if let Some(guid) = guid {
            fields.push((fields::GUID, guid));
        }
        Ok(render_response(&fields))
    }

    #[tokio::test]
    async fn test_failover_records_failure_context() {
        let transport = ScriptedTransport::new([
            reply("3", "301", Some("10000000000000AB")),
            reply("0", "0", Some("11000000000000AB")),
        ]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let mut response = GatewayResponse::new();
        let outcome = router.send_any_host(&mut request, &mut response).await;

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            transport.hosts().await,
            vec!["gw-16.paygate.net", "gw-17.paygate.net"]
        );
        assert_eq!(request.get(fields::FAILED_SERVER), Some("gw-16.paygate.net"));
        assert_eq!(request.get(fields::FAILED_RESPONSE_CODE), Some("3"));
        assert_eq!(request.get(fields::FAILED_REASON_CODE), Some("301"));
        assert_eq!(request.get(fields::FAILED_GUID), Some("10000000000000AB"));

        // The second attempt carried the first host's failure forward.
        let calls = transport.calls().await;
        assert!(!calls[0].body.contains(fields::FAILED_SERVER));
        assert!(calls[1].body.contains("<failedServer>gw-16.paygate.net</failedServer>"));
    }

    #[tokio::test]
    async fn test_stale_failure_context_is_cleared() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::for_mode(DeploymentMode::Test), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::FAILED_SERVER, "old-host");
        request.put(fields::FAILED_GUID, "old-guid");
        let mut response = GatewayResponse::new();
        router.send_any_host(&mut request, &mut response).await;

        assert!(!request.contains(fields::FAILED_SERVER));
        assert!(!transport.calls().await[0].body.contains("old-host"));
    }

    #[tokio::test]
    async fn test_response_is_reset_between_attempts() {
        let transport = ScriptedTransport::new([
            Ok(render_response(&[
                (fields::RESPONSE_CODE, "3"),
                (fields::AUTH_NO, "stale"),
            ])),
            reply("0", "0", None),
        ]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let mut response = GatewayResponse::new();
        router.send_any_host(&mut request, &mut response).await;

        assert_eq!(response.get(fields::AUTH_NO), None);
        assert_eq!(response.response_code(), Some("0"));
    }

    #[tokio::test]
    async fn test_transport_errors_become_transient_codes() {
        let transport = ScriptedTransport::new([
            Err(TransportError::ConnectionRefused),
            Err(TransportError::Timeout),
        ]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let mut response = GatewayResponse::new();
        let outcome = router.send_any_host(&mut request, &mut response).await;

        assert_eq!(
            outcome,
            Outcome::Transient {
                reason: Some("303".to_string())
            }
        );
        assert_eq!(request.get(fields::FAILED_REASON_CODE), Some("303"));
        assert!(response.get(fields::EXCEPTION).is_some());
    }

    #[tokio::test]
    async fn test_server_override_pins_untargeted_calls() {
        let transport = ScriptedTransport::new([reply("3", "307", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::GATEWAY_SERVER, "pinned.paygate.net");
        let mut response = GatewayResponse::new();
        router.send_any_host(&mut request, &mut response).await;

        assert_eq!(transport.hosts().await, vec!["pinned.paygate.net"]);
    }

    #[tokio::test]
    async fn test_empty_pool_reports_transient_without_calls() {
        let config = RouterConfig {
            hosts: Some(vec![]),
            ..RouterConfig::default()
        };
        let transport = ScriptedTransport::new([]);
        let router = router(config, &transport);

        let mut request = GatewayRequest::new();
        let mut response = GatewayResponse::new();
        let outcome = router.send_any_host(&mut request, &mut response).await;

        assert!(outcome.is_transient());
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_targeted_host_from_guid() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::REFERENCE_GUID, "7A00C5E8A4B2F11D");
        let mut response = GatewayResponse::new();
        router.send_targeted_host(&mut request, &mut response).await;

        assert_eq!(transport.hosts().await, vec!["gw-122.paygate.net"]);
    }

    #[tokio::test]
    async fn test_confirm_request_carries_credentials_and_guid() {
        let transport = ScriptedTransport::new([
            reply("0", "0", Some("1100C5E8A4B2F11D")),
            reply("0", "0", None),
        ]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::MERCHANT_ID, "1");
        request.put(fields::MERCHANT_PASSWORD, "secret");
        request.put(fields::CARD_NUMBER, "4111111111111111");
        router.perform_purchase(&mut request).await;

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 2);
        let confirm = &calls[1];
        assert_eq!(confirm.endpoint.host, "gw-17.paygate.net");
        assert!(confirm.body.contains("<transactionType>CC_CONFIRM</transactionType>"));
        assert!(confirm.body.contains("<referenceGUID>1100C5E8A4B2F11D</referenceGUID>"));
        assert!(confirm.body.contains("<merchantPassword>secret</merchantPassword>"));
        assert!(!confirm.body.contains(fields::CARD_NUMBER));
    }

    #[tokio::test]
    async fn test_confirm_without_guid_downgrades_to_local_failure() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let response = router.perform_auth_only(&mut request).await;

        assert_eq!(response.response_code(), Some("4"));
        assert_eq!(response.reason_code(), Some("410"));
        assert_eq!(transport.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_xsell_copies_reference() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::XSELL_REFERENCE, "3000000000000000");
        router.generate_xsell(&mut request).await;

        assert_eq!(request.get(fields::REFERENCE_GUID), Some("3000000000000000"));
        assert_eq!(transport.hosts().await, vec!["gw-48.paygate.net"]);
    }

    #[tokio::test]
    async fn test_xsell_without_reference_drops_stale_routing_reference() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        request.put(fields::REFERENCE_GUID, "3000000000000000");
        router.generate_xsell(&mut request).await;

        assert!(!request.contains(fields::REFERENCE_GUID));
        assert_eq!(transport.hosts().await, vec!["gw-16.paygate.net"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_confirmation_is_logged() {
        let transport = ScriptedTransport::new([
            reply("0", "0", Some("11000000000000AB")),
            Err(TransportError::ConnectionRefused),
        ]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let response = router.perform_purchase(&mut request).await;

        assert_eq!(response.reason_code(), Some("301"));
        assert!(logs_contain("confirmation failed"));
        assert!(logs_contain("gateway call failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_confirmation_without_guid_is_logged() {
        let transport = ScriptedTransport::new([reply("0", "0", None)]);
        let router = router(RouterConfig::default(), &transport);

        let mut request = GatewayRequest::new();
        let response = router.perform_auth_only(&mut request).await;

        assert_eq!(response.response_code(), Some("4"));
        assert_eq!(response.reason_code(), Some("410"));
        assert_eq!(transport.calls().await.len(), 1);
        assert!(logs_contain("confirmation cannot be routed"));
    }
}
