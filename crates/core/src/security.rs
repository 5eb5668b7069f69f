//! Secret comparison helpers.

/// Constant-time string comparison to prevent timing attacks.
///
/// Length is not secret: strings of different length compare unequal
/// immediately.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
