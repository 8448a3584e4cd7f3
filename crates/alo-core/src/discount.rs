//! # Discount Evaluator
//!
//! Decides whether a coupon applies to a checkout and how much it takes off.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate(coupon, ctx)                                                  │
//! │                                                                         │
//! │  1. missing / is_active = false ──► NotFoundOrInactive                  │
//! │  2. now <  starts_at             ──► NotYetValid                        │
//! │  3. now >  ends_at               ──► Expired        (ends_at inclusive) │
//! │  4. usage_count >= usage_limit   ──► UsageLimitReached                  │
//! │  5. subtotal < min_order         ──► BelowMinimum { required }          │
//! │  6. raw discount by kind                                                │
//! │       PERCENT  subtotal × pct (floor), then min(cap)                    │
//! │       AMOUNT   value                                                    │
//! │       COMBO    value                                                    │
//! │       FREESHIP shipping fee (0 when not supplied)                       │
//! │  7. discount = clamp(raw, 0, subtotal)                                  │
//! │  8. success + message                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pure By Construction
//! Nothing here touches the clock, the database or the coupon's usage count.
//! Pressing "apply coupon" five times yields five identical previews; the
//! database layer increments usage only when an order is confirmed.
//!
//! ## Example
//! ```rust
//! use alo_core::discount::{evaluate, CheckoutContext};
//! use alo_core::Money;
//! use chrono::Utc;
//!
//! let ctx = CheckoutContext::new(Money::from_major(80_000), Utc::now());
//! let result = evaluate(None, &ctx);
//!
//! assert!(!result.success);
//! assert_eq!(result.discount, Money::zero());
//! assert_eq!(result.message, "Coupon not found or inactive");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Coupon, CouponSummary, DiscountKind, Percent};

// =============================================================================
// Checkout Context
// =============================================================================

/// Everything the evaluator needs besides the coupon itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutContext {
    /// Sum of line items before discount and shipping.
    pub subtotal: Money,

    /// Evaluation instant, supplied by the caller.
    pub now: DateTime<Utc>,

    /// Only consulted by `FREESHIP` coupons.
    pub shipping_fee: Option<Money>,
}

impl CheckoutContext {
    pub fn new(subtotal: Money, now: DateTime<Utc>) -> Self {
        CheckoutContext {
            subtotal,
            now,
            shipping_fee: None,
        }
    }

    pub fn with_shipping_fee(mut self, fee: Money) -> Self {
        self.shipping_fee = Some(fee);
        self
    }
}

// =============================================================================
// Rejection
// =============================================================================

/// Why a coupon was declined.
///
/// These are routine outcomes, rendered to the customer as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "reason", rename_all = "snake_case")]
#[ts(export)]
pub enum Rejection {
    NotFoundOrInactive,
    NotYetValid,
    Expired,
    UsageLimitReached,
    BelowMinimum { required: Money },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFoundOrInactive => f.write_str("Coupon not found or inactive"),
            Rejection::NotYetValid => f.write_str("Coupon is not yet valid"),
            Rejection::Expired => f.write_str("Coupon has expired"),
            Rejection::UsageLimitReached => f.write_str("Coupon usage limit reached"),
            Rejection::BelowMinimum { required } => {
                write!(f, "Order amount too low: minimum {} required", required)
            }
        }
    }
}

// =============================================================================
// Evaluation Result
// =============================================================================

/// Outcome of [`evaluate`], handed to the checkout UI.
///
/// ```json
/// { "success": false, "discount": 0,
///   "message": "Coupon has expired",
///   "rejection": { "reason": "expired" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EvaluationResult {
    pub success: bool,

    /// Zero whenever `success` is false.
    pub discount: Money,

    /// Ready to show to the customer.
    pub message: String,

    /// Machine-readable reason, `None` on success.
    pub rejection: Option<Rejection>,
}

impl EvaluationResult {
    pub fn applied(discount: Money, message: impl Into<String>) -> Self {
        EvaluationResult {
            success: true,
            discount,
            message: message.into(),
            rejection: None,
        }
    }

    pub fn rejected(rejection: Rejection) -> Self {
        EvaluationResult {
            success: false,
            discount: Money::zero(),
            message: rejection.to_string(),
            rejection: Some(rejection),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates `coupon` against a checkout.
///
/// `None` stands for a code that did not resolve to a coupon. A negative
/// subtotal is treated as zero.
pub fn evaluate(coupon: Option<&Coupon>, ctx: &CheckoutContext) -> EvaluationResult {
    match check_applicable(coupon, ctx) {
        Ok(coupon) => apply(coupon, ctx),
        Err(rejection) => EvaluationResult::rejected(rejection),
    }
}

/// Summaries of every coupon that would apply to this checkout, in input order.
pub fn eligible(coupons: &[Coupon], ctx: &CheckoutContext) -> Vec<CouponSummary> {
    coupons
        .iter()
        .filter(|c| check_applicable(Some(*c), ctx).is_ok())
        .map(Coupon::summary)
        .collect()
}

fn check_applicable<'a>(
    coupon: Option<&'a Coupon>,
    ctx: &CheckoutContext,
) -> Result<&'a Coupon, Rejection> {
    let coupon = coupon
        .filter(|c| c.is_active)
        .ok_or(Rejection::NotFoundOrInactive)?;

    if !coupon.has_started(ctx.now) {
        return Err(Rejection::NotYetValid);
    }

    if coupon.is_expired(ctx.now) {
        return Err(Rejection::Expired);
    }

    if coupon.is_exhausted() {
        return Err(Rejection::UsageLimitReached);
    }

    if let Some(required) = coupon.min_order() {
        if ctx.subtotal.non_negative() < required {
            return Err(Rejection::BelowMinimum { required });
        }
    }

    Ok(coupon)
}

fn apply(coupon: &Coupon, ctx: &CheckoutContext) -> EvaluationResult {
    let subtotal = ctx.subtotal.non_negative();

    match coupon.discount_kind {
        DiscountKind::Percent => {
            let pct = coupon.percent().unwrap_or(Percent::from_bps(0));
            let raw = subtotal.percent_of(pct);

            match coupon.max_discount() {
                Some(cap) if raw > cap => {
                    let discount = clamp_to_subtotal(cap, subtotal);
                    EvaluationResult::applied(
                        discount,
                        format!("Applied {} off, capped at {}", pct, cap),
                    )
                }
                _ => {
                    let discount = clamp_to_subtotal(raw, subtotal);
                    EvaluationResult::applied(
                        discount,
                        format!("Applied {} off: -{}", pct, discount),
                    )
                }
            }
        }
        DiscountKind::Amount => {
            let discount = clamp_to_subtotal(Money::from_minor(coupon.discount_value), subtotal);
            EvaluationResult::applied(discount, format!("Applied {}: -{}", coupon.code, discount))
        }
        DiscountKind::Combo => {
            let discount = clamp_to_subtotal(Money::from_minor(coupon.discount_value), subtotal);
            EvaluationResult::applied(
                discount,
                format!("Combo {} applied: -{}", coupon.code, discount),
            )
        }
        DiscountKind::FreeShip => {
            let discount = clamp_to_subtotal(ctx.shipping_fee.unwrap_or_default(), subtotal);
            EvaluationResult::applied(discount, format!("Free shipping applied: -{}", discount))
        }
    }
}

#[inline]
fn clamp_to_subtotal(raw: Money, subtotal: Money) -> Money {
    raw.min(subtotal).non_negative()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap()
    }

    fn mid() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn coupon(kind: DiscountKind, value: i64) -> Coupon {
        Coupon {
            id: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
            code: "ALO".to_string(),
            description: None,
            discount_kind: kind,
            discount_value: value,
            min_order_minor: None,
            max_discount_minor: None,
            starts_at: start(),
            ends_at: Some(end()),
            usage_limit: None,
            usage_count: 0,
            is_active: true,
            created_at: start(),
            updated_at: start(),
        }
    }

    fn percent(whole: u32) -> Coupon {
        coupon(DiscountKind::Percent, Percent::from_whole(whole).bps() as i64)
    }

    fn amount(major: i64) -> Coupon {
        coupon(DiscountKind::Amount, Money::from_major(major).minor_units())
    }

    fn ctx(subtotal_major: i64) -> CheckoutContext {
        CheckoutContext::new(Money::from_major(subtotal_major), mid())
    }

    #[test]
    fn test_missing_coupon() {
        let result = evaluate(None, &ctx(100_000));
        assert!(!result.success);
        assert_eq!(result.rejection, Some(Rejection::NotFoundOrInactive));
        assert_eq!(result.discount, Money::zero());
    }

    #[test]
    fn test_inactive_flag() {
        let mut c = amount(10_000);
        c.is_active = false;
        let result = evaluate(Some(&c), &ctx(100_000));
        assert_eq!(result.rejection, Some(Rejection::NotFoundOrInactive));
    }

    #[test]
    fn test_not_yet_valid() {
        let c = amount(10_000);
        let early = CheckoutContext::new(Money::from_major(100_000), start() - Duration::seconds(1));
        assert_eq!(evaluate(Some(&c), &early).rejection, Some(Rejection::NotYetValid));

        let on_start = CheckoutContext::new(Money::from_major(100_000), start());
        assert!(evaluate(Some(&c), &on_start).success);
    }

    #[test]
    fn test_expiry_boundary() {
        let c = amount(10_000);

        let at_end = CheckoutContext::new(Money::from_major(100_000), end());
        assert!(evaluate(Some(&c), &at_end).success);

        let after_end = CheckoutContext::new(
            Money::from_major(100_000),
            end() + Duration::nanoseconds(1),
        );
        let result = evaluate(Some(&c), &after_end);
        assert!(!result.success);
        assert_eq!(result.rejection, Some(Rejection::Expired));
    }

    #[test]
    fn test_open_ended_window() {
        let mut c = amount(10_000);
        c.ends_at = None;
        let far_future = CheckoutContext::new(
            Money::from_major(100_000),
            end() + Duration::days(3_650),
        );
        assert!(evaluate(Some(&c), &far_future).success);
    }

    #[test]
    fn test_usage_limit_boundary() {
        let mut c = amount(10_000);
        c.usage_limit = Some(5);

        c.usage_count = 4;
        assert!(evaluate(Some(&c), &ctx(100_000)).success);

        c.usage_count = 5;
        let result = evaluate(Some(&c), &ctx(100_000));
        assert_eq!(result.rejection, Some(Rejection::UsageLimitReached));
    }

    #[test]
    fn test_minimum_order() {
        let mut c = amount(10_000);
        c.min_order_minor = Some(Money::from_major(150_000).minor_units());

        for subtotal in [150_000, 150_001, 400_000, 10_000_000] {
            assert!(evaluate(Some(&c), &ctx(subtotal)).success, "subtotal {}", subtotal);
        }

        for subtotal in [0, 1, 149_999] {
            let result = evaluate(Some(&c), &ctx(subtotal));
            assert_eq!(
                result.rejection,
                Some(Rejection::BelowMinimum {
                    required: Money::from_major(150_000)
                })
            );
        }

        let result = evaluate(Some(&c), &ctx(20_000));
        assert_eq!(result.message, "Order amount too low: minimum 150,000 required");
    }

    #[test]
    fn test_percent_cap() {
        let mut c = percent(20);
        c.max_discount_minor = Some(Money::from_major(50_000).minor_units());

        let result = evaluate(Some(&c), &ctx(1_000_000));
        assert!(result.success);
        assert_eq!(result.discount, Money::from_major(50_000));
        assert_eq!(result.message, "Applied 20% off, capped at 50,000");
    }

    #[test]
    fn test_percent_under_cap() {
        let mut c = percent(10);
        c.max_discount_minor = Some(Money::from_major(50_000).minor_units());

        let result = evaluate(Some(&c), &ctx(120_000));
        assert_eq!(result.discount, Money::from_major(12_000));
        assert_eq!(result.message, "Applied 10% off: -12,000");
    }

    #[test]
    fn test_percent_rounds_down() {
        let c = coupon(DiscountKind::Percent, 1_500);
        let odd = CheckoutContext::new(Money::from_minor(333), mid());
        // 333 × 15% = 49.95 → 49
        assert_eq!(evaluate(Some(&c), &odd).discount, Money::from_minor(49));
    }

    #[test]
    fn test_amount_clamped_to_subtotal() {
        let c = amount(100_000);
        let result = evaluate(Some(&c), &ctx(50_000));
        assert!(result.success);
        assert_eq!(result.discount, Money::from_major(50_000));
    }

    #[test]
    fn test_combo_is_fixed_amount() {
        let c = coupon(DiscountKind::Combo, Money::from_major(30_000).minor_units());
        let result = evaluate(Some(&c), &ctx(90_000));
        assert_eq!(result.discount, Money::from_major(30_000));
        assert!(result.message.starts_with("Combo ALO applied"));
    }

    #[test]
    fn test_freeship_without_fee() {
        let c = coupon(DiscountKind::FreeShip, 0);
        let result = evaluate(Some(&c), &ctx(90_000));
        assert!(result.success);
        assert_eq!(result.discount, Money::zero());
    }

    #[test]
    fn test_freeship_with_fee() {
        let c = coupon(DiscountKind::FreeShip, 0);
        let with_fee = ctx(90_000).with_shipping_fee(Money::from_major(15_000));
        let result = evaluate(Some(&c), &with_fee);
        assert_eq!(result.discount, Money::from_major(15_000));
        assert_eq!(result.message, "Free shipping applied: -15,000");
    }

    #[test]
    fn test_negative_subtotal_treated_as_zero() {
        let c = amount(10_000);
        let neg = CheckoutContext::new(Money::from_minor(-500), mid());
        let result = evaluate(Some(&c), &neg);
        assert!(result.success);
        assert_eq!(result.discount, Money::zero());
    }

    #[test]
    fn test_discount_never_exceeds_subtotal_or_cap() {
        let mut capped = percent(100);
        capped.max_discount_minor = Some(Money::from_major(25_000).minor_units());
        let flat = amount(70_000);

        for subtotal in [0, 1, 10_000, 25_000, 60_000, 1_000_000] {
            let c = ctx(subtotal);
            let a = evaluate(Some(&capped), &c);
            assert!(a.discount <= c.subtotal);
            assert!(a.discount <= Money::from_major(25_000));

            let b = evaluate(Some(&flat), &c);
            assert!(b.discount <= c.subtotal);
            assert!(!b.discount.is_negative());
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut c = percent(15);
        c.usage_limit = Some(1);
        let checkout = ctx(200_000);

        let first = evaluate(Some(&c), &checkout);
        let second = evaluate(Some(&c), &checkout);
        assert_eq!(first, second);
        assert_eq!(c.usage_count, 0);
    }

    #[test]
    fn test_rejection_order() {
        // Expired and exhausted at once: expiry is reported first.
        let mut c = amount(10_000);
        c.usage_limit = Some(1);
        c.usage_count = 1;
        let late = CheckoutContext::new(Money::from_major(100_000), end() + Duration::days(1));
        assert_eq!(evaluate(Some(&c), &late).rejection, Some(Rejection::Expired));
    }

    #[test]
    fn test_eligible_filters_and_keeps_order() {
        let mut big_min = amount(5_000);
        big_min.code = "BIG".to_string();
        big_min.min_order_minor = Some(Money::from_major(500_000).minor_units());

        let mut ten = percent(10);
        ten.code = "TEN".to_string();

        let mut off = amount(5_000);
        off.code = "OFF".to_string();
        off.is_active = false;

        let mut ship = coupon(DiscountKind::FreeShip, 0);
        ship.code = "SHIP".to_string();

        let codes: Vec<String> = eligible(&[big_min, ten, off, ship], &ctx(100_000))
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(codes, vec!["TEN".to_string(), "SHIP".to_string()]);
    }

    #[test]
    fn test_result_serialization() {
        let result = EvaluationResult::rejected(Rejection::Expired);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["rejection"]["reason"], "expired");
        assert_eq!(json["message"], "Coupon has expired");
    }
}
