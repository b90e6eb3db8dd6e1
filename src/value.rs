// value.rs — The value domain shared by every grid and both engines.
//
// Cells are small unsigned integers of a fixed bit width. Sums are built in a
// wider accumulator and clamped to MAX_VALUE exactly once per cell, so a
// table never wraps around:
//
//   true sum:      0 ... 255 ... 510 ... 1020
//   stored value:  0 ... 255 ... 255 ... 255
//
// The width is a compile-time choice. Changing `Value` to u16 re-derives
// MAX_VALUE below, but the GPU surfaces (`R8Uint` input) and the staging
// layout in gpu/surface.rs are sized for one byte per cell and must be
// revisited together with it.

/// One cell of a grid.
pub type Value = u8;

/// Wide running sum used before the final clamp. Large enough for
/// `INPUT_MAX_WIDTH * INPUT_MAX_HEIGHT * MAX_VALUE` with room to spare.
pub type Accumulator = u64;

/// Number of bits in a `Value`.
pub const VALUE_BITS: u32 = Value::BITS;

/// Largest representable cell value (2^N − 1).
pub const MAX_VALUE: Value = Value::MAX;

/// Number of decimal digits in `MAX_VALUE` (3 for u8). Used to size printed
/// columns.
pub const MAX_VALUE_DIGITS: usize = decimal_digits(MAX_VALUE as u64);

/// Clamp an accumulated sum into the value domain.
#[inline]
pub fn saturate(sum: Accumulator) -> Value {
    if sum > MAX_VALUE as Accumulator {
        MAX_VALUE
    } else {
        sum as Value
    }
}

const fn decimal_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_value_matches_bit_width() {
        assert_eq!(VALUE_BITS, 8);
        assert_eq!(MAX_VALUE as u64, (1u64 << VALUE_BITS) - 1);
        assert_eq!(MAX_VALUE_DIGITS, 3);
    }

    #[test]
    fn test_saturate_passes_small_values() {
        assert_eq!(saturate(0), 0);
        assert_eq!(saturate(42), 42);
        assert_eq!(saturate(255), 255);
    }

    #[test]
    fn test_saturate_clamps_instead_of_wrapping() {
        // 256 would wrap to 0 and 1020 to 252 under modular arithmetic.
        assert_eq!(saturate(256), MAX_VALUE);
        assert_eq!(saturate(1020), MAX_VALUE);
        assert_eq!(saturate(Accumulator::MAX), MAX_VALUE);
    }

    #[test]
    fn test_decimal_digits() {
        assert_eq!(decimal_digits(0), 1);
        assert_eq!(decimal_digits(9), 1);
        assert_eq!(decimal_digits(10), 2);
        assert_eq!(decimal_digits(65535), 5);
    }
}
