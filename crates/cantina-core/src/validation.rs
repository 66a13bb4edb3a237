//! # Validation Module
//!
//! The Field Validator: turns raw product-form text into a [`Product`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                       │
//! │  └── Collects raw text, shows the first error next to its field        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Trims, checks lengths (in characters, not bytes)                  │
//! │  ├── Parses stock and price ("1.234,50" style input is NOT accepted,   │
//! │  │   a single ',' or '.' decimal separator is)                         │
//! │  └── Applies PROMO defaults (generated code, placeholder brand)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(code)                                                      │
//! │  └── CHECK(stock >= 0), CHECK(price_cents >= 0)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Order
//! [`validate_all`] checks `category → code → name → size → brand → quantity
//! → price` and stops at the first failure. Category goes first because it
//! decides whether code and brand are optional.
//!
//! ## Usage
//! ```rust
//! use cantina_core::validation::{validate_all, ProductForm};
//! use cantina_core::Category;
//!
//! let form = ProductForm {
//!     code: "7790895000997".into(),
//!     name: "Cola".into(),
//!     category: "Gaseosa".into(),
//!     size: "500ml".into(),
//!     brand: "Coca-Cola".into(),
//!     quantity: "10".into(),
//!     price: "100,00".into(),
//! };
//!
//! let product = validate_all(&form).unwrap();
//! assert_eq!(product.category, Category::Gaseosa);
//! assert_eq!(product.price_cents, 10_000);
//! ```

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::settings::StoreSettings;
use crate::types::{Category, Product};
use crate::MAX_STOCK_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const CODE_MIN_LEN: usize = 3;
const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 100;
const SIZE_MAX_LEN: usize = 50;
const BRAND_MIN_LEN: usize = 2;
const BRAND_MAX_LEN: usize = 50;

/// Generated PROMO codes use the clock reading modulo this.
const PROMO_SUFFIX_RANGE: i64 = 1_000_000;

// =============================================================================
// Product Form
// =============================================================================

/// Raw product form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductForm {
    pub code: String,
    pub name: String,
    pub category: String,
    pub size: String,
    pub brand: String,
    /// Stock on hand.
    pub quantity: String,
    pub price: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = char_len(value);
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates the category label. The match is exact: `"PROMO"`, not `"Promo"`.
pub fn validate_category(raw: &str) -> ValidationResult<Category> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required("category"));
    }
    raw.parse()
}

/// Validates a product code.
///
/// ## Rules
/// - Non-PROMO: required, at least 3 characters
/// - PROMO: optional; a given code still needs 3 characters
///
/// Returns `None` for a blank PROMO code.
///
/// ## Example
/// ```rust
/// use cantina_core::validation::validate_code;
/// use cantina_core::Category;
///
/// assert!(validate_code("C1", Category::Gaseosa).is_err());
/// assert_eq!(validate_code("  ", Category::Promo).unwrap(), None);
/// assert_eq!(validate_code(" C100 ", Category::Vino).unwrap(), Some("C100".to_string()));
/// ```
pub fn validate_code(raw: &str, category: Category) -> ValidationResult<Option<String>> {
    let code = raw.trim();

    if code.is_empty() {
        if category.is_promo() {
            return Ok(None);
        }
        return Err(required("code"));
    }

    if char_len(code) < CODE_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: CODE_MIN_LEN,
        });
    }

    Ok(Some(code.to_string()))
}

/// Validates a product name: required, 2 to 100 characters.
pub fn validate_name(raw: &str) -> ValidationResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(required("name"));
    }
    check_length("name", name, NAME_MIN_LEN, NAME_MAX_LEN)?;
    Ok(name.to_string())
}

/// Validates a container size: required, at most 50 characters.
pub fn validate_size(raw: &str) -> ValidationResult<String> {
    let size = raw.trim();
    if size.is_empty() {
        return Err(required("size"));
    }
    check_length("size", size, 1, SIZE_MAX_LEN)?;
    Ok(size.to_string())
}

/// Validates a brand.
///
/// ## Rules
/// - Non-PROMO: required, 2 to 50 characters
/// - PROMO: optional, at most 50 characters
///
/// Returns `None` for a blank PROMO brand.
pub fn validate_brand(raw: &str, category: Category) -> ValidationResult<Option<String>> {
    let brand = raw.trim();

    if category.is_promo() {
        if brand.is_empty() {
            return Ok(None);
        }
        check_length("brand", brand, 1, BRAND_MAX_LEN)?;
        return Ok(Some(brand.to_string()));
    }

    if brand.is_empty() {
        return Err(required("brand"));
    }
    check_length("brand", brand, BRAND_MIN_LEN, BRAND_MAX_LEN)?;
    Ok(Some(brand.to_string()))
}

/// Validates the stock quantity: an integer in `0..=max_stock`.
pub fn validate_quantity(raw: &str, max_stock: i64) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required("quantity"));
    }

    let quantity: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if quantity < 0 || quantity > max_stock {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: max_stock,
        });
    }

    Ok(quantity)
}

/// Parses decimal price text into cents.
///
/// Accepts `,` or `.` as the decimal separator. The value is rounded to two
/// places with banker's rounding, so `"0.125"` is 12 cents and `"0.135"` is
/// 14. Negative values are rejected; there is no upper bound here.
///
/// ## Example
/// ```rust
/// use cantina_core::validation::parse_price_cents;
///
/// assert_eq!(parse_price_cents("100,00").unwrap(), 10_000);
/// assert_eq!(parse_price_cents("33.333").unwrap(), 3_333);
/// assert!(parse_price_cents("abc").is_err());
/// assert!(parse_price_cents("-1").is_err());
/// ```
pub fn parse_price_cents(raw: &str) -> ValidationResult<i64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(required("price"));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "must be a number".to_string(),
    };

    let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX / 100,
        });
    }

    value
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(invalid)
}

/// Validates a price and returns it in cents: `0 ≤ price ≤ max_price_cents`.
pub fn validate_price(raw: &str, max_price_cents: i64) -> ValidationResult<i64> {
    let cents = parse_price_cents(raw).map_err(|err| match err {
        ValidationError::OutOfRange { field, .. } => ValidationError::OutOfRange {
            field,
            min: 0,
            max: max_price_cents / 100,
        },
        other => other,
    })?;

    if cents > max_price_cents {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: max_price_cents / 100,
        });
    }

    Ok(cents)
}

/// Validates a cart line quantity: positive and within the stock limit.
pub fn validate_cart_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Trims a catalog search term. Any length is accepted; an empty result
/// means "match everything".
pub fn normalize_search_term(term: &str) -> String {
    term.trim().to_string()
}

/// Placeholder code for a PROMO item entered without one.
pub fn generate_promo_code(prefix: &str, now_millis: i64) -> String {
    format!("{}-{}", prefix, now_millis.rem_euclid(PROMO_SUFFIX_RANGE))
}

// =============================================================================
// Whole-Form Validation
// =============================================================================

/// Validates every field with default settings and the current clock.
pub fn validate_all(form: &ProductForm) -> ValidationResult<Product> {
    validate_all_with(
        form,
        &StoreSettings::default(),
        chrono::Utc::now().timestamp_millis(),
    )
}

/// Validates every field in order, returning the first failure.
///
/// On success the record is normalized: fields trimmed, price in cents, and
/// for PROMO a blank code becomes `"{prefix}-{now_millis mod 1_000_000}"` and
/// a blank brand becomes `settings.promo_brand`.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product form: Save                                                     │
/// │                                                                         │
/// │  category "PROMO", code "", brand "", price "1500,5"                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_all_with(form, settings, now) ← THIS FUNCTION                │
/// │       │                                                                 │
/// │       ├── first failing field? → Error, form re-prompts that field     │
/// │       │                                                                 │
/// │       └── OK → Product { code: "PROMO-482913",                         │
/// │                          brand: "Combo Cantina", price_cents: 150050 }  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_all_with(
    form: &ProductForm,
    settings: &StoreSettings,
    now_millis: i64,
) -> ValidationResult<Product> {
    let category = validate_category(&form.category)?;
    let code = validate_code(&form.code, category)?;
    let name = validate_name(&form.name)?;
    let size = validate_size(&form.size)?;
    let brand = validate_brand(&form.brand, category)?;
    let stock = validate_quantity(&form.quantity, settings.max_stock)?;
    let price_cents = validate_price(&form.price, settings.max_price_cents)?;

    let code =
        code.unwrap_or_else(|| generate_promo_code(&settings.promo_code_prefix, now_millis));
    let brand = brand.unwrap_or_else(|| settings.promo_brand.clone());

    Ok(Product {
        code,
        name,
        category,
        size,
        brand,
        stock,
        price_cents,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
