//! Numeric helpers centralizing digit arithmetic and lossy casts.

use num_traits::cast::cast;
use smallvec::SmallVec;

/// Decimal digits of a `u64`, most significant first. Twenty covers `u64::MAX`.
pub type DigitBuf = SmallVec<[u8; 20]>;

/// Split a value into its decimal digits, left to right. Zero yields `[0]`.
#[must_use]
pub fn decimal_digits(value: u64) -> DigitBuf {
    let mut digits = DigitBuf::new();
    let mut rest = value;
    loop {
        digits.push(u8::try_from(rest % 10).unwrap_or(0));
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

/// Number of decimal digits in `value`; zero has one digit.
#[must_use]
pub fn digit_count(value: u64) -> u8 {
    u8::try_from(decimal_digits(value).len()).unwrap_or(u8::MAX)
}

/// `10^exp`, saturating at `u64::MAX`.
#[must_use]
pub fn pow10(exp: u8) -> u64 {
    10_u64.checked_pow(u32::from(exp)).unwrap_or(u64::MAX)
}

/// Inclusive bounds of all values with between `min_digits` and `max_digits` digits.
///
/// One-digit ranges start at zero so `0` remains representable.
#[must_use]
pub fn digit_bounds(min_digits: u8, max_digits: u8) -> (u64, u64) {
    let low = if min_digits <= 1 {
        0
    } else {
        pow10(min_digits - 1)
    };
    let high = pow10(max_digits).saturating_sub(1);
    (low, high)
}

/// Clamp a unit sample into `[0, 1)`, mapping non-finite values to zero.
#[must_use]
pub fn sanitize_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0 - f64::EPSILON)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Scale a unit sample onto `0..span`, never returning `span` itself.
#[must_use]
pub fn unit_to_offset(unit: f64, span: u64) -> u64 {
    if span == 0 {
        return 0;
    }
    let scaled = (sanitize_unit(unit) * u64_to_f64(span)).floor();
    let offset = cast::<f64, u64>(scaled).unwrap_or(0);
    offset.min(span - 1)
}
