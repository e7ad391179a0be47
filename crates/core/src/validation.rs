//! Pure input validation.
//!
//! Nothing here touches persistence; every function is a plain check over its
//! arguments.

use thiserror::Error;
use url::Url;

/// Shortest token lifetime accepted by the gateway, in minutes.
pub const MIN_TOKEN_EXPIRY_MINUTES: i32 = 20;

/// Longest token lifetime accepted by the gateway, in minutes.
pub const MAX_TOKEN_EXPIRY_MINUTES: i32 = 3600;

/// Characters that may never appear in a terminal name.
pub const INSECURE_CHARACTERS: &[char] = &['%', '&', '$', '#', '`', '<', '>', '\'', '"', '{', '}', '='];

/// Delimiters accepted between entries of a hashed-card-number list.
pub const CARD_HASH_DELIMITERS: &[char] = &['|', ',', ';'];

/// Reasons a redirect URL is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UrlError {
    /// Not an absolute URL, or missing a host.
    #[error("url is not a valid absolute url")]
    Malformed,
    /// Scheme other than `http` or `https`.
    #[error("url scheme must be http or https")]
    UnsupportedScheme,
}

/// Returns true for a local mobile number: `09XXXXXXXXX` or `9XXXXXXXXX`.
pub fn is_valid_phone_number(number: &str) -> bool {
    let rest = if number.len() == 11 {
        number.strip_prefix("09")
    } else if number.len() == 10 {
        number.strip_prefix('9')
    } else {
        None
    };

    rest.is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Validates a redirect URL: absolute, non-empty host, `http` or `https`.
pub fn validate_redirect_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw).map_err(|_| UrlError::Malformed)?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::Malformed);
    }

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UrlError::UnsupportedScheme),
    }
}

/// Splits a hashed-card-number list on `|`, `,` or `;` and trims each entry.
///
/// Empty entries are kept so callers can reject them.
pub fn split_card_hashes(list: &str) -> Vec<&str> {
    list.split(CARD_HASH_DELIMITERS).map(str::trim).collect()
}

/// Clamps a requested token lifetime into the accepted range.
pub fn clamp_token_expiry_minutes(minutes: i32) -> i32 {
    minutes.clamp(MIN_TOKEN_EXPIRY_MINUTES, MAX_TOKEN_EXPIRY_MINUTES)
}

/// Returns true if the text contains a character usable for markup or
/// injection attacks in downstream systems.
pub fn has_insecure_characters(text: &str) -> bool {
    text.contains(INSECURE_CHARACTERS)
}
