//! # Redemption Repository
//!
//! Records coupon use on confirmed orders and keeps `usage_count` honest.
//!
//! ## Redeem Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    1. UPDATE coupons                                                    │
//! │         SET usage_count = usage_count + 1                               │
//! │       WHERE id = ? AND is_active = 1                                    │
//! │         AND (usage_limit IS NULL OR usage_count < usage_limit)          │
//! │    2. SELECT coupon                       missing   → NotFound          │
//! │    3. flag + window at `now`              outside   → CouponInactive    │
//! │       step 1 matched 0 rows                         → UsageLimitReached │
//! │    4. INSERT coupon_redemptions           duplicate → UniqueViolation   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The increment must stay the first statement: it takes the write lock
//! before anything is read, and concurrent writers are waited out under
//! `DbConfig::busy_timeout`. A read-first transaction cannot upgrade once
//! another writer commits ("database is locked").
//!
//! Any failure drops the transaction, so the increment and the redemption
//! row land together or not at all.

use alo_core::{Coupon, Redemption, RedemptionRequest};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::COUPON_COLUMNS;
use crate::error::{DbError, DbResult};

/// Repository for coupon redemptions.
#[derive(Debug, Clone)]
pub struct RedemptionRepository {
    pool: SqlitePool,
}

impl RedemptionRepository {
    /// Creates a new RedemptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RedemptionRepository { pool }
    }

    /// Counts one use of a coupon for `(user_id, order_id)`.
    ///
    /// ## Errors
    /// - `NotFound` if the coupon does not exist
    /// - `CouponInactive` if it is switched off or outside its window at `now`
    /// - `UsageLimitReached` if every allowed use is taken
    /// - `UniqueViolation` if this order already redeemed this coupon
    ///
    /// ## Example
    /// ```rust,ignore
    /// let redemption = db.redemptions().redeem(RedemptionRequest {
    ///     coupon_id: coupon.id.clone(),
    ///     user_id: "user-42".into(),
    ///     order_id: "order-1001".into(),
    ///     discount: preview.discount,
    /// }, Utc::now()).await?;
    /// ```
    pub async fn redeem(&self, request: RedemptionRequest, now: DateTime<Utc>) -> DbResult<Redemption> {
        request.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let claimed = sqlx::query(
            r#"
            UPDATE coupons
            SET usage_count = usage_count + 1, updated_at = ?2
            WHERE id = ?1
              AND is_active = 1
              AND (usage_limit IS NULL OR usage_count < usage_limit)
            "#,
        )
        .bind(&request.coupon_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(&request.coupon_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Coupon", &request.coupon_id))?;

        if !coupon.is_active || !coupon.has_started(now) || coupon.is_expired(now) {
            warn!(code = %coupon.code, status = ?coupon.status(now), "Redemption refused");
            return Err(DbError::CouponInactive { code: coupon.code });
        }

        if !claimed {
            warn!(code = %coupon.code, limit = ?coupon.usage_limit, "Usage limit reached");
            return Err(DbError::UsageLimitReached { code: coupon.code });
        }

        let redemption = Redemption {
            id: Uuid::new_v4().to_string(),
            coupon_id: coupon.id.clone(),
            user_id: request.user_id,
            order_id: request.order_id,
            discount_minor: request.discount.minor_units(),
            redeemed_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO coupon_redemptions (
                id, coupon_id, user_id, order_id, discount_minor, redeemed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&redemption.id)
        .bind(&redemption.coupon_id)
        .bind(&redemption.user_id)
        .bind(&redemption.order_id)
        .bind(redemption.discount_minor)
        .bind(redemption.redeemed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(
                "redemption",
                format!("{}/{}/{}", coupon.code, redemption.user_id, redemption.order_id),
            ),
            other => other,
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            code = %coupon.code,
            order_id = %redemption.order_id,
            discount = %redemption.discount(),
            "Coupon redeemed"
        );

        Ok(redemption)
    }

    /// Redemptions of one coupon, oldest first.
    pub async fn list_for_coupon(&self, coupon_id: &str) -> DbResult<Vec<Redemption>> {
        let redemptions = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT id, coupon_id, user_id, order_id, discount_minor, redeemed_at
            FROM coupon_redemptions
            WHERE coupon_id = ?1
            ORDER BY redeemed_at, id
            "#,
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(coupon_id = %coupon_id, count = redemptions.len(), "Listed redemptions");
        Ok(redemptions)
    }

    /// How many times `user_id` has redeemed the coupon.
    pub async fn count_for_user(&self, coupon_id: &str, user_id: &str) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = ?1 AND user_id = ?2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
