//! # Domain Types
//!
//! Coupon domain types used throughout Alotrabong.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │  CouponDraft    │   │   Redemption    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  admin payload  │   │  coupon_id (FK) │       │
//! │  │  code (business)│──►│  validated then │   │  user_id        │       │
//! │  │  discount_kind  │   │  into_coupon()  │   │  order_id       │       │
//! │  │  usage_count    │   └─────────────────┘   └─────────────────┘       │
//! │  └────────┬────────┘                                                    │
//! │           │ derived at read time, never stored                         │
//! │           ▼                                                             │
//! │  CouponStatus · CouponSummary · CouponStats · describe()               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4, immutable, used for relations
//! - `code`: the human-typed business identifier (e.g. `ALO20`)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;
use crate::EXPIRING_SOON_DAYS;

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// `1000` = 10%, `1250` = 12.5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a whole number, e.g. `from_whole(10)` = 10%.
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percent(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

/// Renders `10%`, `12.5%`, `0.25%`.
impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{}%", whole),
            f10 if f10 % 10 == 0 => write!(f, "{}.{}%", whole, f10 / 10),
            _ => write!(f, "{}.{:02}%", whole, frac),
        }
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// How a coupon's `discount_value` is interpreted.
///
/// | Kind       | `discount_value` meaning        |
/// |------------|---------------------------------|
/// | `Percent`  | basis points of the subtotal    |
/// | `Amount`   | fixed minor units               |
/// | `FreeShip` | ignored, the shipping fee is waived |
/// | `Combo`    | fixed minor units (combo price cut) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum DiscountKind {
    Percent,
    Amount,
    FreeShip,
    Combo,
}

impl DiscountKind {
    /// Canonical storage/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percent => "PERCENT",
            DiscountKind::Amount => "AMOUNT",
            DiscountKind::FreeShip => "FREESHIP",
            DiscountKind::Combo => "COMBO",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parse for admin input: case-insensitive, accepts a few aliases
/// that older data used (`PERCENTAGE`, `FIXED`, `FREE_SHIP`).
impl FromStr for DiscountKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERCENT" | "PERCENTAGE" => Ok(DiscountKind::Percent),
            "AMOUNT" | "FIXED" => Ok(DiscountKind::Amount),
            "FREESHIP" | "FREE_SHIP" => Ok(DiscountKind::FreeShip),
            "COMBO" => Ok(DiscountKind::Combo),
            _ => Err(ValidationError::NotAllowed {
                field: "discount_type".to_string(),
                allowed: ["PERCENT", "AMOUNT", "FREESHIP", "COMBO"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A persisted coupon/promotion definition.
///
/// Read-only to the evaluator. `usage_count` is only ever changed by the
/// redemption path in the database layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer-facing code, stored upper-cased. Unique.
    pub code: String,

    pub description: Option<String>,

    pub discount_kind: DiscountKind,

    /// Basis points for `Percent`, minor units for `Amount`/`Combo`.
    pub discount_value: i64,

    /// Minimum subtotal (minor units) required to apply the coupon.
    pub min_order_minor: Option<i64>,

    /// Cap on a `Percent` discount (minor units).
    pub max_discount_minor: Option<i64>,

    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,

    /// `None` means the coupon never ends.
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,

    /// `None` means unlimited redemptions.
    pub usage_limit: Option<i64>,

    /// Successful redemptions so far.
    pub usage_count: i64,

    /// Admin switch. Soft-delete and the expiry sweeper both clear it.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Percentage for `Percent` coupons.
    pub fn percent(&self) -> Option<Percent> {
        match self.discount_kind {
            DiscountKind::Percent => Some(Percent::from_bps(
                self.discount_value.clamp(0, u32::MAX as i64) as u32,
            )),
            _ => None,
        }
    }

    /// Fixed amount for `Amount` and `Combo` coupons.
    pub fn amount(&self) -> Option<Money> {
        match self.discount_kind {
            DiscountKind::Amount | DiscountKind::Combo => {
                Some(Money::from_minor(self.discount_value))
            }
            _ => None,
        }
    }

    #[inline]
    pub fn min_order(&self) -> Option<Money> {
        self.min_order_minor.map(Money::from_minor)
    }

    /// The cap only applies to `Percent` coupons.
    #[inline]
    pub fn max_discount(&self) -> Option<Money> {
        match self.discount_kind {
            DiscountKind::Percent => self.max_discount_minor.map(Money::from_minor),
            _ => None,
        }
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }

    /// True once `now` is strictly after `ends_at`; the end instant itself is valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|end| now > end)
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Redemptions left before the limit, `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<i64> {
        self.usage_limit
            .map(|limit| (limit - self.usage_count).max(0))
    }

    /// Display status at `now`.
    ///
    /// Precedence: admin switch, then expiry, then exhaustion, then start date.
    pub fn status(&self, now: DateTime<Utc>) -> CouponStatus {
        if !self.is_active {
            CouponStatus::Inactive
        } else if self.is_expired(now) {
            CouponStatus::Expired
        } else if self.is_exhausted() {
            CouponStatus::Exhausted
        } else if !self.has_started(now) {
            CouponStatus::Scheduled
        } else {
            CouponStatus::Active
        }
    }

    pub fn is_active_now(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == CouponStatus::Active
    }

    /// Whole days until `ends_at`; negative once passed, `None` if unbounded.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.ends_at.map(|end| (end - now).num_days())
    }

    /// Active coupon whose end falls inside `(now, now + window)`.
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.is_active
            && self
                .ends_at
                .is_some_and(|end| end > now && end < now + window)
    }

    /// Short human description, e.g. `10% off, max 50,000, min order 100,000`.
    pub fn describe(&self) -> String {
        let mut text = match self.discount_kind {
            DiscountKind::Percent => match self.percent() {
                Some(pct) => format!("{} off", pct),
                None => String::new(),
            },
            DiscountKind::Amount => format!("{} off", Money::from_minor(self.discount_value)),
            DiscountKind::FreeShip => "Free shipping".to_string(),
            DiscountKind::Combo => format!("Combo {} off", Money::from_minor(self.discount_value)),
        };

        if let Some(cap) = self.max_discount() {
            text.push_str(&format!(", max {}", cap));
        }
        if let Some(min) = self.min_order().filter(|m| m.is_positive()) {
            text.push_str(&format!(", min order {}", min));
        }
        text
    }

    /// Lightweight view for the checkout coupon picker.
    pub fn summary(&self) -> CouponSummary {
        CouponSummary {
            code: self.code.clone(),
            kind: self.discount_kind,
            value: self.discount_value,
            min_subtotal: self.min_order().unwrap_or_default(),
            max_discount: self.max_discount(),
            ends_at: self.ends_at,
            description: self.describe(),
        }
    }
}

// =============================================================================
// Coupon Status
// =============================================================================

/// Derived lifecycle state shown in admin lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CouponStatus {
    /// Switched off by an admin or the sweeper.
    Inactive,
    /// Active flag set, start date in the future.
    Scheduled,
    Active,
    Expired,
    /// Usage limit reached.
    Exhausted,
}

impl CouponStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            CouponStatus::Inactive => "Inactive",
            CouponStatus::Scheduled => "Scheduled",
            CouponStatus::Active => "Active",
            CouponStatus::Expired => "Expired",
            CouponStatus::Exhausted => "Used up",
        }
    }
}

// =============================================================================
// Coupon Summary
// =============================================================================

/// Checkout-facing coupon view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponSummary {
    pub code: String,
    pub kind: DiscountKind,
    /// Raw value, read through `kind`.
    pub value: i64,
    /// Zero when the coupon has no minimum.
    pub min_subtotal: Money,
    pub max_discount: Option<Money>,
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,
    pub description: String,
}

// =============================================================================
// Coupon Draft
// =============================================================================

/// Admin create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponDraft {
    pub code: String,
    pub description: Option<String>,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub min_order_minor: Option<i64>,
    pub max_discount_minor: Option<i64>,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i64>,
    /// Defaults to `true` on create, unchanged on update.
    pub is_active: Option<bool>,
}

impl CouponDraft {
    /// Validates every field and returns the normalized code.
    pub fn validate(&self) -> CoreResult<String> {
        let code = validation::normalize_code(&self.code)?;
        validation::validate_description(self.description.as_deref())?;
        validation::validate_discount(self.discount_kind, self.discount_value)?;
        validation::validate_optional_amount("min_order_amount", self.min_order_minor)?;
        validation::validate_optional_amount("max_discount_amount", self.max_discount_minor)?;
        validation::validate_window(self.starts_at, self.ends_at)?;
        validation::validate_usage_limit(self.usage_limit)?;
        Ok(code)
    }

    /// Builds a brand new coupon with zero usage.
    pub fn into_coupon(self, id: String, now: DateTime<Utc>) -> CoreResult<Coupon> {
        let code = self.validate()?;

        Ok(Coupon {
            id,
            code,
            description: clean_description(self.description),
            discount_kind: self.discount_kind,
            discount_value: self.discount_value,
            min_order_minor: self.min_order_minor,
            max_discount_minor: self.max_discount_minor,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            usage_limit: self.usage_limit,
            usage_count: 0,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the draft over an existing coupon.
    ///
    /// Identity, `usage_count` and `created_at` are preserved.
    pub fn apply_to(self, existing: &Coupon, now: DateTime<Utc>) -> CoreResult<Coupon> {
        let code = self.validate()?;

        Ok(Coupon {
            id: existing.id.clone(),
            code,
            description: clean_description(self.description),
            discount_kind: self.discount_kind,
            discount_value: self.discount_value,
            min_order_minor: self.min_order_minor,
            max_discount_minor: self.max_discount_minor,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            usage_limit: self.usage_limit,
            usage_count: existing.usage_count,
            is_active: self.is_active.unwrap_or(existing.is_active),
            created_at: existing.created_at,
            updated_at: now,
        })
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

// =============================================================================
// Coupon Stats
// =============================================================================

/// Admin dashboard counters, computed from a coupon list at `now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponStats {
    pub total: u64,
    /// Flag set and not yet ended.
    pub active: u64,
    /// Active and ending within [`EXPIRING_SOON_DAYS`].
    pub expiring_soon: u64,
    /// Ended before `now`, whatever the flag says.
    pub expired: u64,
}

impl CouponStats {
    pub fn compute(coupons: &[Coupon], now: DateTime<Utc>) -> Self {
        let window = Duration::days(EXPIRING_SOON_DAYS);

        coupons.iter().fold(CouponStats::default(), |mut stats, c| {
            stats.total += 1;
            if c.is_active && c.ends_at.map_or(true, |end| end > now) {
                stats.active += 1;
            }
            if c.expires_within(now, window) {
                stats.expiring_soon += 1;
            }
            if c.ends_at.is_some_and(|end| end < now) {
                stats.expired += 1;
            }
            stats
        })
    }
}

// =============================================================================
// Redemption
// =============================================================================

/// A recorded use of a coupon on a confirmed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Redemption {
    pub id: String,
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    /// Discount actually granted (minor units).
    pub discount_minor: i64,
    #[ts(as = "String")]
    pub redeemed_at: DateTime<Utc>,
}

impl Redemption {
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_minor(self.discount_minor)
    }
}

/// What the order-placement workflow hands over after checkout succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    pub discount: Money,
}

impl RedemptionRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_uuid(&self.coupon_id)?;
        validation::validate_identifier("user_id", &self.user_id)?;
        validation::validate_identifier("order_id", &self.order_id)?;
        validation::validate_optional_amount("discount", Some(self.discount.minor_units()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn coupon() -> Coupon {
        Coupon {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            code: "ALO10".to_string(),
            description: None,
            discount_kind: DiscountKind::Percent,
            discount_value: 1_000,
            min_order_minor: Some(Money::from_major(100_000).minor_units()),
            max_discount_minor: Some(Money::from_major(50_000).minor_units()),
            starts_at: at(1),
            ends_at: Some(at(20)),
            usage_limit: Some(10),
            usage_count: 3,
            is_active: true,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn draft() -> CouponDraft {
        CouponDraft {
            code: "  sale-20 ".to_string(),
            description: Some("  Spring sale  ".to_string()),
            discount_kind: DiscountKind::Amount,
            discount_value: Money::from_major(20_000).minor_units(),
            min_order_minor: None,
            max_discount_minor: None,
            starts_at: at(1),
            ends_at: None,
            usage_limit: None,
            is_active: None,
        }
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_whole(10).to_string(), "10%");
        assert_eq!(Percent::from_bps(1_250).to_string(), "12.5%");
        assert_eq!(Percent::from_bps(25).to_string(), "0.25%");
    }

    #[test]
    fn test_discount_kind_parse() {
        assert_eq!("percent".parse::<DiscountKind>().unwrap(), DiscountKind::Percent);
        assert_eq!(" PERCENTAGE ".parse::<DiscountKind>().unwrap(), DiscountKind::Percent);
        assert_eq!("FreeShip".parse::<DiscountKind>().unwrap(), DiscountKind::FreeShip);
        assert_eq!("combo".parse::<DiscountKind>().unwrap(), DiscountKind::Combo);
        assert!("BOGO".parse::<DiscountKind>().is_err());
    }

    #[test]
    fn test_discount_kind_serde_names() {
        let json = serde_json::to_string(&DiscountKind::FreeShip).unwrap();
        assert_eq!(json, "\"FREESHIP\"");
    }

    #[test]
    fn test_status_precedence() {
        let mut c = coupon();
        assert_eq!(c.status(at(10)), CouponStatus::Active);
        assert_eq!(c.status(at(21)), CouponStatus::Expired);

        c.usage_count = 10;
        assert_eq!(c.status(at(10)), CouponStatus::Exhausted);

        c.is_active = false;
        assert_eq!(c.status(at(10)), CouponStatus::Inactive);

        let mut future = coupon();
        future.starts_at = at(15);
        assert_eq!(future.status(at(10)), CouponStatus::Scheduled);
        assert!(!future.is_active_now(at(10)));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let c = coupon();
        let end = c.ends_at.unwrap();
        assert!(!c.is_expired(end));
        assert!(c.is_expired(end + Duration::nanoseconds(1)));
    }

    #[test]
    fn test_remaining_uses_and_days() {
        let c = coupon();
        assert_eq!(c.remaining_uses(), Some(7));
        assert_eq!(c.days_until_expiry(at(10)), Some(10));
        assert_eq!(c.days_until_expiry(at(25)), Some(-5));

        let mut unlimited = coupon();
        unlimited.usage_limit = None;
        unlimited.ends_at = None;
        assert_eq!(unlimited.remaining_uses(), None);
        assert_eq!(unlimited.days_until_expiry(at(10)), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(coupon().describe(), "10% off, max 50,000, min order 100,000");

        let mut ship = coupon();
        ship.discount_kind = DiscountKind::FreeShip;
        ship.min_order_minor = None;
        assert_eq!(ship.describe(), "Free shipping");
    }

    #[test]
    fn test_summary_zero_safe_minimum() {
        let mut c = coupon();
        c.min_order_minor = None;
        let summary = c.summary();
        assert_eq!(summary.min_subtotal, Money::zero());
        assert_eq!(summary.max_discount, Some(Money::from_major(50_000)));
        assert_eq!(summary.code, "ALO10");
    }

    #[test]
    fn test_max_discount_ignored_for_amount() {
        let mut c = coupon();
        c.discount_kind = DiscountKind::Amount;
        assert_eq!(c.max_discount(), None);
        assert_eq!(c.percent(), None);
        assert_eq!(c.amount(), Some(Money::from_minor(1_000)));
    }

    #[test]
    fn test_draft_into_coupon_normalizes() {
        let c = draft()
            .into_coupon("550e8400-e29b-41d4-a716-446655440000".to_string(), at(2))
            .unwrap();
        assert_eq!(c.code, "SALE-20");
        assert_eq!(c.description.as_deref(), Some("Spring sale"));
        assert!(c.is_active);
        assert_eq!(c.usage_count, 0);
        assert_eq!(c.created_at, at(2));
    }

    #[test]
    fn test_draft_apply_preserves_usage() {
        let existing = coupon();
        let mut d = draft();
        d.is_active = None;
        let updated = d.apply_to(&existing, at(5)).unwrap();

        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.usage_count, 3);
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(updated.updated_at, at(5));
        assert!(updated.is_active);
    }

    #[test]
    fn test_draft_rejects_bad_window() {
        let mut d = draft();
        d.ends_at = Some(at(1) - Duration::days(1));
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_stats() {
        let now = at(10);
        let active = coupon();

        let mut soon = coupon();
        soon.ends_at = Some(at(12));

        let mut ended = coupon();
        ended.ends_at = Some(at(5));

        let mut off = coupon();
        off.is_active = false;
        off.ends_at = None;

        let stats = CouponStats::compute(&[active, soon, ended, off], now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.expiring_soon, 1);
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn test_redemption_request_validation() {
        let ok = RedemptionRequest {
            coupon_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            user_id: "user-1".to_string(),
            order_id: "order-1".to_string(),
            discount: Money::from_major(10_000),
        };
        assert!(ok.validate().is_ok());

        let bad = RedemptionRequest {
            user_id: " ".to_string(),
            ..ok
        };
        assert!(bad.validate().is_err());
    }
}
