//! Wire field names shared by requests and responses.
//!
//! The gateway contract is an open string-keyed map, so callers may send
//! keys that are not listed here. The router only interprets the fields in
//! the first few groups.

// Routing and result fields interpreted by the router.
pub const TRANSACTION_TYPE: &str = "transactionType";
pub const RESPONSE_CODE: &str = "responseCode";
pub const REASON_CODE: &str = "reasonCode";
pub const GUID: &str = "guidNo";
pub const REFERENCE_GUID: &str = "referenceGUID";
pub const EXCEPTION: &str = "exception";

/// Amount to charge now. On a rebill update this is the prorated charge;
/// a strictly positive value makes the update money-moving.
pub const AMOUNT: &str = "amount";

/// Caller-side reference used by cross-sell generation.
pub const XSELL_REFERENCE: &str = "xsellReferenceXact";

pub const MERCHANT_ID: &str = "merchantID";
pub const MERCHANT_PASSWORD: &str = "merchantPassword";

// Failure context carried forward between host attempts.
pub const FAILED_SERVER: &str = "failedServer";
pub const FAILED_RESPONSE_CODE: &str = "failedResponseCode";
pub const FAILED_REASON_CODE: &str = "failedReasonCode";
pub const FAILED_GUID: &str = "failedGUID";

pub const FAILURE_CONTEXT: [&str; 4] = [
    FAILED_SERVER,
    FAILED_RESPONSE_CODE,
    FAILED_REASON_CODE,
    FAILED_GUID,
];

// Reserved per-call connection overrides.
pub const GATEWAY_SERVER: &str = "gatewayServer";
pub const GATEWAY_PROTOCOL: &str = "gatewayProtocol";
pub const GATEWAY_PORT: &str = "gatewayPortNo";
pub const GATEWAY_SERVLET: &str = "gatewayServlet";
pub const GATEWAY_CONNECT_TIMEOUT: &str = "gatewayConnectTimeout";
pub const GATEWAY_READ_TIMEOUT: &str = "gatewayReadTimeout";

pub const CONNECTION_OVERRIDES: [&str; 6] = [
    GATEWAY_SERVER,
    GATEWAY_PROTOCOL,
    GATEWAY_PORT,
    GATEWAY_SERVLET,
    GATEWAY_CONNECT_TIMEOUT,
    GATEWAY_READ_TIMEOUT,
];

// Common caller fields.
pub const VERSION: &str = "version";
pub const CURRENCY: &str = "currency";
pub const CARD_NUMBER: &str = "cardNo";
pub const EXPIRE_MONTH: &str = "expireMonth";
pub const EXPIRE_YEAR: &str = "expireYear";
pub const CVV2: &str = "cvv2";
pub const CUSTOMER_ID: &str = "merchantCustomerID";
pub const INVOICE_ID: &str = "merchantInvoiceID";
pub const CUSTOMER_FIRSTNAME: &str = "customerFirstName";
pub const CUSTOMER_LASTNAME: &str = "customerLastName";
pub const EMAIL: &str = "email";
pub const BILLING_ADDRESS: &str = "billingAddress";
pub const BILLING_CITY: &str = "billingCity";
pub const BILLING_ZIPCODE: &str = "billingZipCode";
pub const BILLING_COUNTRY: &str = "billingCountry";
pub const IPADDRESS: &str = "ipAddress";
pub const REBILL_FREQUENCY: &str = "rebillFrequency";
pub const REBILL_AMOUNT: &str = "rebillAmount";
pub const REBILL_START: &str = "rebillStart";
pub const REBILL_END_DATE: &str = "rebillEndDate";
pub const REBILL_COUNT: &str = "rebillCount";

// Response-only fields worth naming.
pub const AUTH_NO: &str = "authNo";
pub const AVS_RESPONSE: &str = "avsResponse";
pub const CVV2_CODE: &str = "cvv2Code";
pub const SCRUB_RESULTS: &str = "scrubResults";
pub const APPROVED_AMOUNT: &str = "approvedAmount";

/// Values of the `transactionType` field.
pub mod transaction_type {
    pub const AUTH_ONLY: &str = "CC_AUTH";
    pub const PURCHASE: &str = "CC_PURCHASE";
    pub const TICKET: &str = "CC_TICKET";
    pub const CREDIT: &str = "CC_CREDIT";
    pub const VOID: &str = "CC_VOID";
    pub const CONFIRM: &str = "CC_CONFIRM";
    pub const CARD_SCRUB: &str = "CARD_SCRUB";
    pub const REBILL_UPDATE: &str = "REBILL_UPDATE";
    pub const REBILL_CANCEL: &str = "REBILL_CANCEL";
    pub const LOOKUP: &str = "LOOKUP";
    pub const GENERATE_XSELL: &str = "GENERATE_XSELL";
}
