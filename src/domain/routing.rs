//! GUID-based host selection for follow-up transactions.
//!
//! A GUID returned by the gateway encodes the index of the host that owns
//! the transaction in its leading hex characters.

/// GUIDs longer than this carry a two-digit host prefix.
pub const SHORT_GUID_MAX_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGuid;

/// Extracts the owning host index from a GUID.
///
/// Uses the first hex digit for GUIDs of at most 15 characters and the
/// first two for longer ones.
pub fn server_index(guid: &str) -> Result<u8, InvalidGuid> {
    let prefix_len = if guid.len() > SHORT_GUID_MAX_LEN { 2 } else { 1 };
    let prefix = guid.get(..prefix_len).ok_or(InvalidGuid)?;
    if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InvalidGuid);
    }
    u8::from_str_radix(prefix, 16).map_err(|_| InvalidGuid)
}

/// Builds the hostname of host `index` from a base DNS name.
///
/// `gw.paygate.net` with index 7 becomes `gw-7.paygate.net`. A base without
/// any `.` gets the suffix appended.
pub fn targeted_host(base: &str, index: u8) -> String {
    match base.split_once('.') {
        Some((head, tail)) => format!("{head}-{index}.{tail}"),
        None => format!("{base}-{index}"),
    }
}
