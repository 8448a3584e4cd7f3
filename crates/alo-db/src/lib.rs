//! # alo-db: Database Layer for Alotrabong Coupons
//!
//! SQLite persistence for coupons and their redemptions, using sqlx for
//! async access. Discount math lives in `alo-core`; this crate loads the
//! coupon and hands it over.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Alotrabong Coupon Data Flow                         │
//! │                                                                         │
//! │  Checkout / admin handler        coupon-sweeper (hourly)               │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     alo-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌──────────────┐ │   │
//! │  │   │   Database    │    │   Repositories   │   │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                  │   │  (embedded)  │ │   │
//! │  │   │               │    │ CouponRepo       │   │              │ │   │
//! │  │   │ SqlitePool    │◄───│ RedemptionRepo   │   │ 001_coupons  │ │   │
//! │  │   └───────────────┘    └──────────────────┘   └──────────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (alotrabong.db)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Coupon and redemption repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use alo_core::{CheckoutContext, Money};
//! use alo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("alotrabong.db")).await?;
//!
//! let ctx = CheckoutContext::new(Money::from_major(300_000), chrono::Utc::now());
//! let preview = db.coupons().preview("ALO20", &ctx).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::coupon::CouponRepository;
pub use repository::redemption::RedemptionRepository;
