//! # Validation Module
//!
//! Input validation for coupon administration and redemption.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Admin form / checkout UI                                      │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by CouponDraft::validate)                 │
//! │  └── Business rules: code shape, ranges, validity window                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  └── UNIQUE(code), UNIQUE(coupon_id, user_id, order_id), CHECKs         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use alo_core::validation::normalize_code;
//!
//! assert_eq!(normalize_code(" alo20 ").unwrap(), "ALO20");
//! assert!(normalize_code("has space").is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::DiscountKind;
use crate::{MAX_CODE_LEN, MAX_DESCRIPTION_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for a percent discount, in basis points (100%).
const MAX_PERCENT_BPS: i64 = 10_000;

/// Upper bound for user/order identifiers coming from other services.
const MAX_IDENTIFIER_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code and returns its canonical form.
///
/// ## Rules
/// - Trimmed, must not be empty
/// - At most [`MAX_CODE_LEN`] characters
/// - Letters, digits, hyphen, underscore only
/// - Stored upper-cased so `alo20` and `ALO20` are the same coupon
pub fn normalize_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates an optional description (max [`MAX_DESCRIPTION_LEN`] chars).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    if let Some(text) = description {
        if text.trim().chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }

    Ok(())
}

/// Validates an identifier handed over by another service (user, order).
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a discount value against its kind.
///
/// ## Rules
/// ```text
/// PERCENT   → 1 ..= 10000 bps (0.01% .. 100%)
/// AMOUNT    → > 0 minor units
/// COMBO     → > 0 minor units
/// FREESHIP  → value ignored, must not be negative
/// ```
pub fn validate_discount(kind: DiscountKind, value: i64) -> ValidationResult<()> {
    match kind {
        DiscountKind::Percent => {
            if !(1..=MAX_PERCENT_BPS).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: "discount_value".to_string(),
                    min: 1,
                    max: MAX_PERCENT_BPS,
                });
            }
        }
        DiscountKind::Amount | DiscountKind::Combo => {
            if value <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "discount_value".to_string(),
                });
            }
        }
        DiscountKind::FreeShip => {
            validate_optional_amount("discount_value", Some(value))?;
        }
    }

    Ok(())
}

/// Validates an optional money field in minor units (must be >= 0).
pub fn validate_optional_amount(field: &str, minor: Option<i64>) -> ValidationResult<()> {
    match minor {
        Some(value) if value < 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates a usage limit (must be positive when present).
pub fn validate_usage_limit(limit: Option<i64>) -> ValidationResult<()> {
    match limit {
        Some(value) if value <= 0 => Err(ValidationError::MustBePositive {
            field: "usage_limit".to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Time Validators
// =============================================================================

/// Validates a validity window. An open end is always fine.
pub fn validate_window(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    match ends_at {
        Some(end) if end < starts_at => Err(ValidationError::InvalidWindow),
        _ => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use alo_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("ALO20").unwrap(), "ALO20");
        assert_eq!(normalize_code("  freeship_q3 ").unwrap(), "FREESHIP_Q3");
        assert_eq!(normalize_code("tet-2025").unwrap(), "TET-2025");

        assert!(normalize_code("").is_err());
        assert!(normalize_code("   ").is_err());
        assert!(normalize_code("has space").is_err());
        assert!(normalize_code("giảm50").is_err());
        assert!(normalize_code(&"A".repeat(41)).is_err());
        assert!(normalize_code(&"A".repeat(40)).is_ok());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("Weekend deal")).is_ok());
        assert!(validate_description(Some(&"x".repeat(201))).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountKind::Percent, 1).is_ok());
        assert!(validate_discount(DiscountKind::Percent, 10_000).is_ok());
        assert!(validate_discount(DiscountKind::Percent, 0).is_err());
        assert!(validate_discount(DiscountKind::Percent, 10_001).is_err());

        assert!(validate_discount(DiscountKind::Amount, 2_000_000).is_ok());
        assert!(validate_discount(DiscountKind::Amount, 0).is_err());
        assert!(validate_discount(DiscountKind::Combo, -5).is_err());

        assert!(validate_discount(DiscountKind::FreeShip, 0).is_ok());
        assert!(validate_discount(DiscountKind::FreeShip, -1).is_err());
    }

    #[test]
    fn test_validate_amounts_and_limits() {
        assert!(validate_optional_amount("min_order_amount", None).is_ok());
        assert!(validate_optional_amount("min_order_amount", Some(0)).is_ok());
        assert!(validate_optional_amount("min_order_amount", Some(-1)).is_err());

        assert!(validate_usage_limit(None).is_ok());
        assert!(validate_usage_limit(Some(1)).is_ok());
        assert!(validate_usage_limit(Some(0)).is_err());
    }

    #[test]
    fn test_validate_window() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_window(start, None).is_ok());
        assert!(validate_window(start, Some(start)).is_ok());
        assert!(validate_window(start, Some(start + Duration::days(3))).is_ok());
        assert!(matches!(
            validate_window(start, Some(start - Duration::seconds(1))),
            Err(ValidationError::InvalidWindow)
        ));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("order_id", "ORD-1001").is_ok());
        assert!(validate_identifier("order_id", "").is_err());
        assert!(validate_identifier("order_id", &"9".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
