//! Router-level classification of gateway response codes.

pub const RESPONSE_SUCCESS: &str = "0";
pub const RESPONSE_SYSTEM_ERROR: &str = "3";
pub const RESPONSE_REQUEST_ERROR: &str = "4";

pub const REASON_UNABLE_TO_CONNECT: &str = "301";
pub const REASON_RESPONSE_READ_TIMEOUT: &str = "303";
pub const REASON_BUGCHECK: &str = "307";
pub const REASON_INVALID_RESPONSE: &str = "400";
pub const REASON_INVALID_REFERENCE_GUID: &str = "410";

/// What a response code means to the router.
///
/// Only `Transient` results are eligible for host failover. Every code the
/// router does not own is carried through untouched as a `Decline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Transient { reason: Option<String> },
    LocalValidation { reason: Option<String> },
    Decline { code: String, reason: Option<String> },
}

impl Outcome {
    /// Classifies a raw response/reason pair.
    ///
    /// A reply without any response code is unusable and treated as transient.
    pub fn classify(code: Option<&str>, reason: Option<&str>) -> Self {
        let reason = reason.map(str::to_string);
        match code {
            Some(RESPONSE_SUCCESS) => Outcome::Success,
            Some(RESPONSE_SYSTEM_ERROR) | None => Outcome::Transient { reason },
            Some(RESPONSE_REQUEST_ERROR) => Outcome::LocalValidation { reason },
            Some(code) => Outcome::Decline {
                code: code.to_string(),
                reason,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Outcome::Transient { .. })
    }
}
