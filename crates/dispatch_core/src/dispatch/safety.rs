//! Safety filter applied to candidates when a rider asks for safety mode.
//!
//! The filter is a [`SafetyPolicy`] trait object so the trust rule can be
//! replaced without touching matching.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::Driver;

/// Decides whether a driver may serve a safety-mode ride.
pub trait SafetyPolicy: Send + Sync {
    fn admits(&self, driver: &Driver) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Trust categories that require a high rating.
    pub filtered_categories: Vec<String>,
    pub min_rating: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            filtered_categories: vec!["unverified".to_string()],
            min_rating: 4.7,
        }
    }
}

/// Excludes a driver whose trust category is filtered AND whose rating is
/// below the threshold. Either condition alone is not enough.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRatingPolicy {
    filtered_categories: BTreeSet<String>,
    min_rating: f64,
}

impl CategoryRatingPolicy {
    pub fn new(filtered_categories: impl IntoIterator<Item = String>, min_rating: f64) -> Self {
        Self {
            filtered_categories: filtered_categories.into_iter().collect(),
            min_rating,
        }
    }
}

impl From<&SafetyConfig> for CategoryRatingPolicy {
    fn from(config: &SafetyConfig) -> Self {
        Self::new(config.filtered_categories.iter().cloned(), config.min_rating)
    }
}

impl SafetyPolicy for CategoryRatingPolicy {
    fn admits(&self, driver: &Driver) -> bool {
        let filtered = driver
            .attributes
            .trust_category
            .as_ref()
            .is_some_and(|category| self.filtered_categories.contains(category));
        !(filtered && driver.rating < self.min_rating)
    }
}

/// Admits every driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl SafetyPolicy for AdmitAll {
    fn admits(&self, _driver: &Driver) -> bool {
        true
    }
}
