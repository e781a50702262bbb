//! Utilities for converting between temperature scales and geological
//! time units.

use crate::constants::{SECONDS_PER_MYR, SECONDS_PER_YEAR, TO_KELVIN};

/// Converts Celsius to Kelvin.
pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + TO_KELVIN
}

/// Converts Kelvin to Celsius.
pub fn kelvin_to_celsius(temp_k: f64) -> f64 {
    temp_k - TO_KELVIN
}

/// Converts an age in millions of years to seconds.
pub fn myr_to_seconds(age_myr: f64) -> f64 {
    age_myr * SECONDS_PER_MYR
}

pub fn years_to_seconds(years: f64) -> f64 {
    years * SECONDS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kelvin_roundtrip() {
        assert_abs_diff_eq!(celsius_to_kelvin(0.0), 273.15);
        assert_abs_diff_eq!(kelvin_to_celsius(celsius_to_kelvin(1350.0)), 1350.0, epsilon = 1e-9);
    }

    #[test]
    fn test_myr_to_seconds() {
        assert_abs_diff_eq!(myr_to_seconds(1.0), years_to_seconds(1.0e6), epsilon = 1.0);
        assert_abs_diff_eq!(years_to_seconds(1.0), 31_557_600.0);
    }
}
