//! # alo-core: Pure Coupon Logic for Alotrabong
//!
//! This crate holds the coupon business rules of the Alotrabong
//! food-ordering platform as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Alotrabong Coupon Flow                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Checkout UI / Order placement                      │   │
//! │  │     "Apply coupon" ──► preview ──► place order ──► redeem       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ alo-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ discount  │  │ validation│  │   │
//! │  │   │  Coupon   │  │   Money   │  │ evaluate  │  │  drafts   │  │   │
//! │  │   │  Stats    │  │  Percent  │  │ eligible  │  │  codes    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  alo-db (Database Layer)                        │   │
//! │  │         coupons, coupon_redemptions, atomic usage counter       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Coupon, drafts, summaries, stats, redemptions
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`discount`] - The discount evaluator
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use alo_core::discount::{evaluate, CheckoutContext};
//! use alo_core::{Coupon, DiscountKind, Money};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let coupon = Coupon {
//!     id: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
//!     code: "ALO20".to_string(),
//!     description: None,
//!     discount_kind: DiscountKind::Percent,
//!     discount_value: 2_000, // 20%
//!     min_order_minor: None,
//!     max_discount_minor: Some(Money::from_major(50_000).minor_units()),
//!     starts_at: now - Duration::days(1),
//!     ends_at: None,
//!     usage_limit: None,
//!     usage_count: 0,
//!     is_active: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let ctx = CheckoutContext::new(Money::from_major(1_000_000), now);
//! let result = evaluate(Some(&coupon), &ctx);
//!
//! assert!(result.success);
//! assert_eq!(result.discount, Money::from_major(50_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::{evaluate, CheckoutContext, EvaluationResult, Rejection};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum coupon code length (matches the `code` column width upstream).
pub const MAX_CODE_LEN: usize = 40;

/// Maximum coupon description length.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Window used by the admin dashboard's "expiring soon" counter.
pub const EXPIRING_SOON_DAYS: i64 = 7;
