//! Identifier generation: prefixed record ids and the immutable
//! patient barcode.

use rand::Rng;
use uuid::Uuid;

/// Opaque record id with an entity prefix, e.g. `APT_6f9e...`.
pub fn new_record_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

pub fn appointment_id() -> String {
    new_record_id("APT")
}

pub fn message_id() -> String {
    new_record_id("MSG")
}

pub fn consultation_id() -> String {
    new_record_id("CON")
}

const BARCODE_LEN: usize = 20;

/// Patient identifier code: `#` + uppercased base36 of a millisecond
/// timestamp followed by random base36, truncated to 20 characters.
/// Assigned once at profile creation and never changed afterward;
/// collisions are treated as negligible, not deduplicated.
pub fn generate_barcode() -> String {
    let mut code = to_base36(chrono::Utc::now().timestamp_millis() as u128).to_uppercase();
    let mut rng = rand::thread_rng();
    while code.len() < BARCODE_LEN {
        code.push_str(&to_base36(rng.gen::<u64>() as u128).to_uppercase());
    }
    code.truncate(BARCODE_LEN);
    format!("#{code}")
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_carry_prefix() {
        assert!(appointment_id().starts_with("APT_"));
        assert!(message_id().starts_with("MSG_"));
        assert!(consultation_id().starts_with("CON_"));
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(appointment_id(), appointment_id());
    }

    #[test]
    fn barcode_shape() {
        let code = generate_barcode();
        assert!(code.starts_with('#'));
        assert_eq!(code.len(), 1 + BARCODE_LEN);
        assert!(code[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn barcodes_differ() {
        assert_ne!(generate_barcode(), generate_barcode());
    }

    #[test]
    fn base36_round_trip_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
