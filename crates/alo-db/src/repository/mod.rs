//! # Repository Module
//!
//! Database repository implementations for coupons.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Calls What                                       │
//! │                                                                         │
//! │  Checkout UI          Order workflow         Admin / Sweeper            │
//! │       │                     │                      │                    │
//! │       │ preview(code)       │ redeem(request)      │ create / update    │
//! │       │ eligible(ctx)       │                      │ deactivate_expired │
//! │       ▼                     ▼                      ▼                    │
//! │  CouponRepository    RedemptionRepository    CouponRepository           │
//! │       │                     │                      │                    │
//! │       └─────────────────────┴──────────────────────┘                    │
//! │                             │  SQL                                      │
//! │                             ▼                                           │
//! │                      SQLite Database                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CouponRepository`](coupon::CouponRepository) - lookup, CRUD, search, sweeping
//! - [`RedemptionRepository`](redemption::RedemptionRepository) - usage counting

pub mod coupon;
pub mod redemption;

/// Column list shared by every `SELECT` that maps onto `alo_core::Coupon`.
pub(crate) const COUPON_COLUMNS: &str = "id, code, description, discount_kind, discount_value, \
     min_order_minor, max_discount_minor, starts_at, ends_at, usage_limit, usage_count, \
     is_active, created_at, updated_at";
