//! # Checkout Cart
//!
//! The list of `(code, quantity)` lines a cashier builds before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Scan / type code ───────► add(code, qty) ──────► merge or push line    │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► lines[i].qty = n      │
//! │                                                                         │
//! │  Remove line ────────────► remove(code) ────────► lines.remove(i)       │
//! │                                                                         │
//! │  Checkout ───────────────► SaleEngine::record_sale(&cart, ..)           │
//! │                                                                         │
//! │  NOTE: The cart holds no prices. Price and stock are read inside the    │
//! │        sale transaction, so a stale cart cannot undercharge.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cart built with [`Cart::from`] keeps its lines exactly as given, repeated
//! codes included. The sale engine checks stock against the combined demand
//! of repeated codes either way.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_cart_quantity;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product code, exactly as the catalog stores it.
    pub code: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(code: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            code: code.into(),
            quantity,
        }
    }
}

/// The checkout cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds units of a product, merging into an existing line for the code.
    ///
    /// Fails if `quantity` is not positive or the merged quantity exceeds
    /// the stock limit.
    pub fn add(&mut self, code: impl Into<String>, quantity: i64) -> CoreResult<()> {
        validate_cart_quantity(quantity)?;
        let code = code.into();

        if let Some(line) = self.lines.iter_mut().find(|l| l.code == code) {
            let merged = line.quantity + quantity;
            validate_cart_quantity(merged)?;
            line.quantity = merged;
            return Ok(());
        }

        self.lines.push(CartLine { code, quantity });
        Ok(())
    }

    /// Sets the quantity of an existing line. Zero removes the line.
    pub fn set_quantity(&mut self, code: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove(code).map(|_| ());
        }
        validate_cart_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.code == code) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(code.to_string())),
        }
    }

    /// Removes the line for `code`, returning it.
    pub fn remove(&mut self, code: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.code == code)
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }
}

impl FromIterator<(String, i64)> for Cart {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Cart {
            lines: iter
                .into_iter()
                .map(|(code, quantity)| CartLine { code, quantity })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_same_code() {
        let mut cart = Cart::new();
        cart.add("C100", 2).unwrap();
        cart.add("C100", 3).unwrap();
        cart.add("B200", 1).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0], CartLine::new("C100", 5));
        assert_eq!(cart.unit_count(), 6);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        assert!(cart.add("C100", 0).is_err());
        assert!(cart.add("C100", -1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add("C100", 2).unwrap();
        cart.set_quantity("C100", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_on_missing_code_fails() {
        let mut cart = Cart::new();
        let err = cart.set_quantity("NOPE", 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(code) if code == "NOPE"));
    }

    #[test]
    fn test_from_lines_keeps_repeated_codes() {
        let cart = Cart::from(vec![CartLine::new("C100", 1), CartLine::new("C100", 2)]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.unit_count(), 3);
    }
}
