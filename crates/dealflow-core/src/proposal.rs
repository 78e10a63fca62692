//! Proposal record.
//!
//! The single mutable business record of a session: the negotiated terms of
//! the Northstar Enterprises deal. Discount and total always change together
//! through [`Proposal::apply_revision`]; no partial-update path exists.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// Commercial constants
// ---------------------------------------------------------------------------

/// Seats quoted in the proposal.
pub const SEAT_COUNT: u32 = 500;

/// Price per seat per month, in dollars.
pub const UNIT_PRICE: f64 = 30.0;

/// Discount the agent's first draft carries. The suggestion gate keys off
/// this value: once the discount moves away from it, the revision chip is
/// withdrawn.
pub const INITIAL_DISCOUNT_PERCENT: f64 = 15.0;

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// Negotiated terms of the deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Volume discount applied to the base total, in percent.
    pub discount_percent: f64,
    /// Price per seat per month, in dollars.
    pub unit_price: f64,
    /// Monthly total after discount, in dollars. Not re-derived on read;
    /// set together with the discount by [`Proposal::apply_revision`].
    pub total: f64,
}

impl Proposal {
    /// The record as seeded at session start: 500 seats at $30 with a 15%
    /// discount, totalling $12,750/month.
    pub fn initial() -> Self {
        // Derived through the same formula revisions use.
        let total = round_to_cents(
            UNIT_PRICE * f64::from(SEAT_COUNT) * (1.0 - INITIAL_DISCOUNT_PERCENT / 100.0),
        );
        Self {
            discount_percent: INITIAL_DISCOUNT_PERCENT,
            unit_price: UNIT_PRICE,
            total,
        }
    }

    /// Monthly total before any discount.
    pub fn base_total(&self) -> f64 {
        self.unit_price * f64::from(SEAT_COUNT)
    }

    /// Atomically replace the discount and recompute the total.
    ///
    /// The total is `unit_price x seats x (1 - discount/100)`, rounded to
    /// cents. On error the record is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDiscount`] if `new_discount` is negative,
    /// not finite, or at least 100.
    pub fn apply_revision(&mut self, new_discount: f64) -> Result<()> {
        if !new_discount.is_finite() || !(0.0..100.0).contains(&new_discount) {
            return Err(CoreError::InvalidDiscount {
                value: new_discount,
            });
        }

        let total = round_to_cents(self.base_total() * (1.0 - new_discount / 100.0));
        tracing::info!(
            old_discount = self.discount_percent,
            new_discount,
            total,
            "proposal revised"
        );
        self.discount_percent = new_discount;
        self.total = total;
        Ok(())
    }

    /// Whether the discount still matches the seeded value.
    pub fn is_initial_discount(&self) -> bool {
        (self.discount_percent - INITIAL_DISCOUNT_PERCENT).abs() < f64::EPSILON
    }
}

impl Default for Proposal {
    fn default() -> Self {
        Self::initial()
    }
}

/// Round a dollar amount to currency precision (two decimal places).
fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
