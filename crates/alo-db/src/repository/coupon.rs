//! # Coupon Repository
//!
//! Database operations for coupons.
//!
//! ## Key Operations
//! - Code lookup for checkout previews and the eligible-coupon list
//! - Admin CRUD, search, activate/deactivate
//! - Expiry sweeping and dashboard stats
//!
//! ## Checkout Preview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Preview Works                                  │
//! │                                                                         │
//! │  Customer types: " alo20 "                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize → "ALO20"  (blank or malformed → not found)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... WHERE code = 'ALO20' AND is_active = 1                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  alo_core::evaluate(coupon, ctx) → EvaluationResult                    │
//! │                                                                         │
//! │  Nothing is written. Usage is only counted on redemption.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Time-window checks run in Rust against the caller's `now`, never in SQL.

use alo_core::{
    discount, evaluate, validation, CheckoutContext, CoreError, Coupon, CouponDraft,
    CouponStats, CouponSummary, EvaluationResult,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::COUPON_COLUMNS;
use crate::error::{DbError, DbResult};

/// Repository for coupon database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CouponRepository::new(pool);
///
/// let ctx = CheckoutContext::new(Money::from_major(300_000), Utc::now());
/// let result = repo.preview("ALO20", &ctx).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Evaluates a customer-entered code against a checkout.
    ///
    /// Unknown, blank, malformed and switched-off codes all come back as a
    /// `NotFoundOrInactive` rejection, not as an error.
    pub async fn preview(&self, code: &str, ctx: &CheckoutContext) -> DbResult<EvaluationResult> {
        let coupon = self.find_active_by_code(code).await?;
        let result = evaluate(coupon.as_ref(), ctx);

        debug!(
            code = %code.trim(),
            subtotal = %ctx.subtotal,
            success = result.success,
            discount = %result.discount,
            "Coupon preview"
        );

        Ok(result)
    }

    /// Summaries of every active coupon the checkout qualifies for.
    pub async fn eligible(&self, ctx: &CheckoutContext) -> DbResult<Vec<CouponSummary>> {
        let active = self.list_active().await?;
        let eligible = discount::eligible(&active, ctx);

        debug!(
            candidates = active.len(),
            eligible = eligible.len(),
            "Eligible coupons computed"
        );

        Ok(eligible)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets a coupon by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Finds a coupon by code, active or not. Input is trimmed and upper-cased.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let Some(code) = canonical_code(code) else {
            return Ok(None);
        };

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Finds a coupon by code only if its active flag is set.
    pub async fn find_active_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let Some(code) = canonical_code(code) else {
            return Ok(None);
        };

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1 AND is_active = 1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// All coupons with the active flag set, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Coupon>> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE is_active = 1 ORDER BY created_at DESC, code"
        );

        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(coupons)
    }

    /// Every coupon, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC, code");

        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(coupons)
    }

    /// Admin search: case-insensitive substring match on the code.
    ///
    /// An empty query lists everything, paged.
    pub async fn search(&self, query: &str, limit: u32, offset: u32) -> DbResult<Vec<Coupon>> {
        let pattern = like_pattern(query);

        debug!(query = %query.trim(), limit, offset, "Searching coupons");

        let sql = format!(
            r#"
            SELECT {COUPON_COLUMNS}
            FROM coupons
            WHERE code LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, code
            LIMIT ?2 OFFSET ?3
            "#
        );

        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = coupons.len(), "Search returned coupons");
        Ok(coupons)
    }

    /// Total number of coupons `search` would page through.
    pub async fn count_matching(&self, query: &str) -> DbResult<u64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM coupons WHERE code LIKE ?1 ESCAPE '\'"#)
                .bind(like_pattern(query))
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    /// Dashboard counters at `now`.
    pub async fn stats(&self, now: DateTime<Utc>) -> DbResult<CouponStats> {
        let coupons = self.list_all().await?;
        Ok(CouponStats::compute(&coupons, now))
    }

    // =========================================================================
    // Admin writes
    // =========================================================================

    /// Validates a draft and stores it as a new coupon with zero usage.
    ///
    /// ## Errors
    /// - `DbError::Domain(CoreError::Validation(_))` for a bad draft
    /// - `DbError::Domain(CoreError::DuplicateCode(_))` if the code is taken
    pub async fn create(&self, draft: CouponDraft, now: DateTime<Utc>) -> DbResult<Coupon> {
        let coupon = draft.into_coupon(generate_coupon_id(), now)?;

        if self.find_by_code(&coupon.code).await?.is_some() {
            return Err(CoreError::DuplicateCode(coupon.code).into());
        }

        self.insert(&coupon).await?;

        info!(id = %coupon.id, code = %coupon.code, kind = %coupon.discount_kind, "Coupon created");
        Ok(coupon)
    }

    /// Inserts a fully-built coupon row as-is.
    ///
    /// `create` is the validated path; this one trusts its input and is used
    /// for imports and by tests that need a specific `usage_count`.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_kind, discount_value,
                min_order_minor, max_discount_minor, starts_at, ends_at,
                usage_limit, usage_count, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_kind)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_minor)
        .bind(coupon.max_discount_minor)
        .bind(coupon.starts_at)
        .bind(coupon.ends_at)
        .bind(coupon.usage_limit)
        .bind(coupon.usage_count)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code_or(e, &coupon.code))?;

        Ok(())
    }

    /// Replaces the editable fields of an existing coupon.
    ///
    /// `usage_count` and `created_at` are never touched. `is_active` keeps
    /// its stored value when the draft leaves it unset.
    pub async fn update(&self, id: &str, draft: CouponDraft, now: DateTime<Utc>) -> DbResult<Coupon> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Coupon", id))?;

        let updated = draft.apply_to(&existing, now)?;

        if updated.code != existing.code {
            if let Some(other) = self.find_by_code(&updated.code).await? {
                if other.id != existing.id {
                    return Err(CoreError::DuplicateCode(updated.code).into());
                }
            }
        }

        sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?2,
                description = ?3,
                discount_kind = ?4,
                discount_value = ?5,
                min_order_minor = ?6,
                max_discount_minor = ?7,
                starts_at = ?8,
                ends_at = ?9,
                usage_limit = ?10,
                is_active = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.code)
        .bind(&updated.description)
        .bind(updated.discount_kind)
        .bind(updated.discount_value)
        .bind(updated.min_order_minor)
        .bind(updated.max_discount_minor)
        .bind(updated.starts_at)
        .bind(updated.ends_at)
        .bind(updated.usage_limit)
        .bind(updated.is_active)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code_or(e, &updated.code))?;

        info!(id = %updated.id, code = %updated.code, "Coupon updated");

        // Re-read so a redemption that landed meanwhile shows in usage_count.
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Coupon", id))
    }

    /// Switches the active flag.
    pub async fn set_active(&self, id: &str, active: bool, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query("UPDATE coupons SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        info!(id = %id, active, "Coupon active flag changed");
        Ok(())
    }

    /// Deletes a coupon and, by cascade, its redemptions.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        info!(id = %id, "Coupon deleted");
        Ok(())
    }

    /// Clears the active flag on every active coupon whose end has passed.
    ///
    /// Returns how many coupons were switched off. Running it twice at the
    /// same `now` switches off nothing the second time.
    pub async fn deactivate_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let expired: Vec<Coupon> = self
            .list_active()
            .await?
            .into_iter()
            .filter(|c| c.is_expired(now))
            .collect();

        if expired.is_empty() {
            debug!("No expired coupons to deactivate");
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Only writes inside the transaction, so it never needs a lock upgrade.
        let mut deactivated = 0;
        for coupon in &expired {
            let result = sqlx::query(
                "UPDATE coupons SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
            )
            .bind(&coupon.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                info!(code = %coupon.code, ends_at = ?coupon.ends_at, "Auto-deactivated expired coupon");
                deactivated += result.rows_affected();
            } else {
                warn!(code = %coupon.code, "Coupon changed before it could be deactivated");
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(deactivated)
    }

    /// Total number of coupons.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

/// Canonical stored form of a customer-entered code, `None` if it cannot
/// name any coupon.
fn canonical_code(code: &str) -> Option<String> {
    validation::normalize_code(code).ok()
}

/// Maps a unique-index hit on `coupons.code` to `DuplicateCode`.
fn duplicate_code_or(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.ends_with("code") => {
            DbError::Domain(CoreError::DuplicateCode(code.to_string()))
        }
        other => other,
    }
}

/// `%QUERY%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_uppercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn generate_coupon_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
