//! Integer percentage helpers.

/// `part / whole` as a whole percentage, rounded half away from zero.
///
/// Returns 0 when `whole` is 0 and 100 once `part` reaches `whole`. Below
/// that the result is capped at 99, so 100 always means "complete".
pub fn percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    if part >= whole {
        return 100;
    }
    // (part * 100 / whole) + 0.5, kept in integers.
    let numerator = u128::from(part)
        .saturating_mul(200)
        .saturating_add(u128::from(whole));
    let denominator = u128::from(whole).saturating_mul(2);
    let rounded = numerator.checked_div(denominator).unwrap_or(0).min(99);
    u8::try_from(rounded).unwrap_or(99)
}
