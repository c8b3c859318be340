//! Client IP address handling for votes and view records.

use std::net::IpAddr;

use quill_common::{AppError, AppResult};

/// Parse a client address and return its canonical text form.
///
/// IPv6 addresses are compressed and lowercased, and IPv4-mapped IPv6
/// addresses collapse to plain IPv4, so one client always yields the same
/// string.
pub fn normalize_ip(raw: &str) -> AppResult<String> {
    let addr: IpAddr = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid IP address: {raw}")))?;

    Ok(addr.to_canonical().to_string())
}
