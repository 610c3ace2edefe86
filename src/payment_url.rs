//! Shareable payment URL construction
//!
//! The checkout page renders a QR code whose payload is a `solana:` URL
//! wrapping the merchant's checkout endpoint. The wallet dereferences the
//! embedded URL to fetch the composed transaction. The reference key rides
//! in the query string, which is how it survives from composition to the
//! confirmation watcher without any server-side state.

use std::fmt::Write;

/// Build the `solana:` payment URL for a checkout endpoint and its query
/// parameters. The inner URL is percent-encoded in full, as wallets expect.
pub fn payment_url(checkout_endpoint: &str, params: &[(&str, String)]) -> String {
    let mut inner = String::from(checkout_endpoint);
    for (i, (key, value)) in params.iter().enumerate() {
        inner.push(if i == 0 { '?' } else { '&' });
        inner.push_str(key);
        inner.push('=');
        inner.push_str(value);
    }
    format!("solana:{}", percent_encode(&inner))
}

/// Percent-encode everything outside the unreserved set.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_endpoint_in_solana_scheme() {
        let url = payment_url(
            "https://shop.example/api/checkout",
            &[
                ("amount", "1.5".to_string()),
                ("tokenMint", "So11111111111111111111111111111111111111112".to_string()),
            ],
        );
        assert!(url.starts_with("solana:https%3A%2F%2Fshop.example%2Fapi%2Fcheckout"));
        assert!(url.contains("amount%3D1.5"));
        assert!(url.contains("%26tokenMint%3D"));
    }

    #[test]
    fn no_params_means_no_query_separator() {
        let url = payment_url("https://shop.example/api/checkout", &[]);
        assert!(!url.contains("%3F"));
    }

    #[test]
    fn percent_encoding_is_uppercase_hex() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("/"), "%2F");
        assert_eq!(percent_encode("safe-._~"), "safe-._~");
    }
}
