//! Card number hashing and masking.

use sha2::{Digest, Sha256};

/// Masks the third quarter of a 16-digit card number.
///
/// `1234567890123456` becomes `12345678****3456`. Card numbers of any other
/// length are returned unchanged.
pub fn mask_card_number(pan: &str) -> String {
    let chars: Vec<char> = pan.chars().collect();
    if chars.len() != 16 {
        return pan.to_string();
    }

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if (8..12).contains(&i) { '*' } else { *c })
        .collect()
}

/// Hex-encoded SHA-256 of the card number.
pub fn hash_card_number(pan: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pan.as_bytes());
    format!("{:x}", hasher.finalize())
}
