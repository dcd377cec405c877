//! Trip fare calculation.

use serde::{Deserialize, Serialize};

/// Floor applied to every fare, in currency units.
pub const MINIMUM_FARE: f64 = 5.00;

/// Per-kilometer rate in currency units.
pub const PER_KM_RATE: f64 = 1.50;

/// Multiplier applied to safety-mode rides.
pub const SAFETY_SURCHARGE: f64 = 1.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub minimum_fare: f64,
    pub per_km_rate: f64,
    pub safety_surcharge: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            minimum_fare: MINIMUM_FARE,
            per_km_rate: PER_KM_RATE,
            safety_surcharge: SAFETY_SURCHARGE,
        }
    }
}

impl PricingConfig {
    /// Formula: `max(minimum_fare, km * per_km_rate)`, times the surcharge in
    /// safety mode.
    pub fn trip_fare(&self, distance_m: f64, safety_mode: bool) -> f64 {
        let fare = self
            .minimum_fare
            .max(distance_m / 1_000.0 * self.per_km_rate);
        if safety_mode {
            fare * self.safety_surcharge
        } else {
            fare
        }
    }

    /// Surcharge as a whole percentage, e.g. `10` for 1.10.
    pub fn surcharge_percent(&self) -> i64 {
        ((self.safety_surcharge - 1.0) * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_trip_pays_minimum_fare() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.trip_fare(500.0, false), MINIMUM_FARE);
    }

    #[test]
    fn long_trip_pays_distance_rate() {
        let pricing = PricingConfig::default();
        let fare = pricing.trip_fare(10_000.0, false);
        assert!((fare - 15.0).abs() < 1e-9);
    }

    #[test]
    fn safety_mode_adds_surcharge() {
        let pricing = PricingConfig::default();
        let fare = pricing.trip_fare(10_000.0, true);
        assert!((fare - 16.5).abs() < 1e-9);
        assert_eq!(pricing.surcharge_percent(), 10);
    }
}
