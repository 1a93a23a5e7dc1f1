//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor-divide an attribute delta by two, the D&D-style modifier.
///
/// `attribute_modifier(9)` is `-1`, not `0`.
#[must_use]
pub fn attribute_modifier(attribute: u32) -> i32 {
    let value = cast::<u32, i32>(attribute).unwrap_or(i32::MAX);
    (value - 10).div_euclid(2)
}

/// Ceil a f64 and clamp it to the u32 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(value.min(max).ceil()).unwrap_or(u32::MAX)
}

/// Convert a signed value into u32, flooring negatives at zero.
#[must_use]
pub fn clamp_i32_to_u32(value: i32) -> u32 {
    cast::<i32, u32>(value.max(0)).unwrap_or(0)
}

/// Convert a u32 into i32, saturating at `i32::MAX`.
#[must_use]
pub fn u32_to_i32(value: u32) -> i32 {
    cast::<u32, i32>(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_floors_toward_negative_infinity() {
        assert_eq!(attribute_modifier(10), 0);
        assert_eq!(attribute_modifier(11), 0);
        assert_eq!(attribute_modifier(14), 2);
        assert_eq!(attribute_modifier(9), -1);
        assert_eq!(attribute_modifier(0), -5);
    }

    #[test]
    fn ceil_handles_non_finite_and_negative() {
        assert_eq!(ceil_f64_to_u32(1.2), 2);
        assert_eq!(ceil_f64_to_u32(3.0), 3);
        assert_eq!(ceil_f64_to_u32(f64::NAN), 0);
        assert_eq!(ceil_f64_to_u32(-4.0), 0);
        assert_eq!(ceil_f64_to_u32(f64::from(u32::MAX) * 2.0), u32::MAX);
    }

    #[test]
    fn signed_conversions_saturate() {
        assert_eq!(clamp_i32_to_u32(-7), 0);
        assert_eq!(clamp_i32_to_u32(7), 7);
        assert_eq!(u32_to_i32(u32::MAX), i32::MAX);
    }
}
