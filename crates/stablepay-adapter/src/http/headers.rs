/*
[INPUT]:  Nothing (fixed literal values)
[OUTPUT]: Security header map attached to every hosted API call
[POS]:    HTTP layer - contractual request headers
[UPDATE]: When the hosted API changes its header contract
*/

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=63072000; includeSubdomains; preload";
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; img-src 'self'; script-src 'self'; style-src 'self'; object-src 'none'; frame-ancestors 'none'; ancestors 'self ';";
pub const CONTENT_TYPE_OPTIONS: &str = "nosniff";
pub const FRAME_OPTIONS: &str = "DENY";
pub const XSS_PROTECTION: &str = "1; mode=block";

/// All five fixed security headers, in a fresh map
pub fn security_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(8);
    let fixed = [
        ("strict-transport-security", STRICT_TRANSPORT_SECURITY),
        ("content-security-policy", CONTENT_SECURITY_POLICY),
        ("x-content-type-options", CONTENT_TYPE_OPTIONS),
        ("x-frame-options", FRAME_OPTIONS),
        ("x-xss-protection", XSS_PROTECTION),
    ];
    for (name, value) in fixed {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}
