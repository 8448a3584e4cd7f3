//! # Sweep Loop
//!
//! ```text
//! startup ──► tick (immediate) ──► sweep_once ──► wait interval ──► tick ...
//!                                      │
//!                                      ├── deactivate_expired(now)
//!                                      └── stats(now)  (logged)
//!
//! shutdown signal ──► loop exits between sweeps
//! ```
//!
//! A failed sweep is logged and the next tick tries again.

use std::future::Future;
use std::time::Duration;

use alo_core::CouponStats;
use alo_db::Database;
use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::error::SweeperResult;

/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub deactivated: u64,
    pub stats: CouponStats,
}

/// Deactivates coupons that ended before `now` and reports current stats.
pub async fn sweep_once(db: &Database, now: DateTime<Utc>) -> SweeperResult<SweepReport> {
    let coupons = db.coupons();

    let deactivated = coupons.deactivate_expired(now).await?;
    let stats = coupons.stats(now).await?;

    Ok(SweepReport { deactivated, stats })
}

/// Sweeps at startup and then every `period` until `shutdown` resolves.
///
/// Returns the number of sweeps attempted.
pub async fn run<F>(db: &Database, period: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut sweeps = 0;

    info!(interval_secs = period.as_secs(), "Coupon sweeper started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Sweeper received shutdown");
                break;
            }

            _ = ticker.tick() => {
                sweeps += 1;
                debug!(sweep = sweeps, "Running coupon sweep");

                match sweep_once(db, Utc::now()).await {
                    Ok(report) => info!(
                        deactivated = report.deactivated,
                        total = report.stats.total,
                        active = report.stats.active,
                        expiring_soon = report.stats.expiring_soon,
                        expired = report.stats.expired,
                        "Coupon sweep complete"
                    ),
                    Err(e) => error!(error = %e, "Coupon sweep failed"),
                }
            }
        }
    }

    info!(sweeps, "Coupon sweeper stopped");
    sweeps
}
