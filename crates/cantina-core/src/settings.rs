//! # Store Settings
//!
//! Store-wide limits read once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CANTINA_*`)
//! 2. Defaults (this file)
//!
//! Values that fail to parse are ignored and the default is kept.

use serde::{Deserialize, Serialize};

use crate::validation::parse_price_cents;
use crate::{
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_PROMO_BRAND, MAX_PRICE_CENTS, MAX_STOCK_QUANTITY,
    PROMO_CODE_PREFIX,
};

/// Limits and defaults shared by the validator, catalog and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Stock at or below this (and above zero) is "low".
    pub low_stock_threshold: i64,

    /// Highest accepted unit price, in cents.
    pub max_price_cents: i64,

    /// Highest accepted stock quantity.
    pub max_stock: i64,

    /// Brand stored for PROMO items entered without one.
    pub promo_brand: String,

    /// Prefix of generated PROMO codes (`PROMO-123456`).
    pub promo_code_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            max_price_cents: MAX_PRICE_CENTS,
            max_stock: MAX_STOCK_QUANTITY,
            promo_brand: DEFAULT_PROMO_BRAND.to_string(),
            promo_code_prefix: PROMO_CODE_PREFIX.to_string(),
        }
    }
}

impl StoreSettings {
    /// Builds settings from a key lookup, falling back to defaults.
    ///
    /// ## Keys
    /// - `CANTINA_LOW_STOCK_THRESHOLD`: integer ≥ 0
    /// - `CANTINA_PROMO_BRAND`: non-blank text
    /// - `CANTINA_MAX_PRICE`: decimal price ("9999999,00" or "9999999.00")
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = StoreSettings::default();

        if let Some(raw) = lookup("CANTINA_LOW_STOCK_THRESHOLD") {
            if let Ok(threshold) = raw.trim().parse::<i64>() {
                if threshold >= 0 {
                    settings.low_stock_threshold = threshold;
                }
            }
        }

        if let Some(brand) = lookup("CANTINA_PROMO_BRAND") {
            let brand = brand.trim();
            if !brand.is_empty() {
                settings.promo_brand = brand.to_string();
            }
        }

        if let Some(raw) = lookup("CANTINA_MAX_PRICE") {
            if let Ok(cents) = parse_price_cents(&raw) {
                if cents > 0 {
                    settings.max_price_cents = cents;
                }
            }
        }

        settings
    }

    /// Builds settings from the process environment.
    pub fn from_env() -> Self {
        StoreSettings::from_lookup(|key| std::env::var(key).ok())
    }
}
