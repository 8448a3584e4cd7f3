//! # Seed Data Generator
//!
//! Populates the database with demo coupons for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p alo-db --bin seed
//!
//! # Specify database path
//! cargo run -p alo-db --bin seed -- --db ./data/alotrabong.db
//!
//! # Preview a 300,000 checkout against the seeded coupons
//! cargo run -p alo-db --bin seed -- --subtotal 300000
//! ```
//!
//! ## Generated Coupons
//! One coupon per discount kind plus a few lifecycle edge cases:
//! - `WELCOME10`: 10% off, capped at 50,000
//! - `SAVE20K`: 20,000 off orders from 150,000
//! - `FREESHIP`: free shipping from 100,000
//! - `COMBO2`: 35,000 combo discount, limited to 100 uses
//! - `FLASH50`: 50% off, already ended (shows up as expired)
//! - `NEXTMONTH`: 15% off, starting in 30 days

use alo_core::{CheckoutContext, CouponDraft, DiscountKind, Money};
use alo_db::{Database, DbConfig};
use chrono::{Duration, Utc};
use std::env;

/// (code, kind, value, min order, max discount, start offset days, end offset days, limit, description)
type DemoCoupon = (
    &'static str,
    DiscountKind,
    i64,
    Option<i64>,
    Option<i64>,
    i64,
    Option<i64>,
    Option<i64>,
    &'static str,
);

/// Demo coupons; amounts in major units, percents in basis points.
const DEMO_COUPONS: &[DemoCoupon] = &[
    (
        "WELCOME10",
        DiscountKind::Percent,
        1_000,
        None,
        Some(50_000),
        -1,
        Some(90),
        None,
        "Welcome offer for new customers",
    ),
    (
        "SAVE20K",
        DiscountKind::Amount,
        20_000,
        Some(150_000),
        None,
        -1,
        Some(30),
        Some(500),
        "20,000 off larger orders",
    ),
    (
        "FREESHIP",
        DiscountKind::FreeShip,
        0,
        Some(100_000),
        None,
        -1,
        None,
        None,
        "Free delivery",
    ),
    (
        "COMBO2",
        DiscountKind::Combo,
        35_000,
        Some(200_000),
        None,
        -1,
        Some(14),
        Some(100),
        "Two-dish combo deal",
    ),
    (
        "FLASH50",
        DiscountKind::Percent,
        5_000,
        None,
        Some(100_000),
        -10,
        Some(-2),
        None,
        "Weekend flash sale",
    ),
    (
        "NEXTMONTH",
        DiscountKind::Percent,
        1_500,
        Some(50_000),
        Some(75_000),
        30,
        Some(60),
        None,
        "Early announcement",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./alotrabong.db");
    let mut subtotal = Money::from_major(300_000);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--subtotal" | "-s" => {
                if i + 1 < args.len() {
                    subtotal = parse_subtotal(&args[i + 1])
                        .ok_or_else(|| format!("invalid --subtotal: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Alotrabong Coupon Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./alotrabong.db)");
                println!("  -s, --subtotal <N>     Checkout subtotal to preview (default: 300000)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Alotrabong Coupon Seeder");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let now = Utc::now();
    let coupons = db.coupons();

    let existing = coupons.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} coupons", existing);
        println!("  Skipping seed to avoid duplicates.");
    } else {
        println!();
        println!("Creating coupons...");

        for draft in DEMO_COUPONS.iter().map(|demo| demo_draft(demo, now)) {
            let code = draft.code.clone();
            match coupons.create(draft, now).await {
                Ok(coupon) => println!("  {:<10} {}", coupon.code, coupon.describe()),
                Err(e) => eprintln!("Failed to create {}: {}", code, e),
            }
        }
    }

    let stats = coupons.stats(now).await?;
    println!();
    println!(
        "Stats: {} total, {} active, {} expiring soon, {} expired",
        stats.total, stats.active, stats.expiring_soon, stats.expired
    );

    // Preview every demo code against one checkout
    let ctx = CheckoutContext::new(subtotal, now)
        .with_shipping_fee(Money::from_major(15_000));

    println!();
    println!("Previews for a {} checkout:", ctx.subtotal);
    for (code, ..) in DEMO_COUPONS {
        let result = coupons.preview(code, &ctx).await?;
        println!("  {:<10} {}", code, serde_json::to_string(&result)?);
    }

    let eligible = coupons.eligible(&ctx).await?;
    println!();
    println!("Eligible: {}", serde_json::to_string_pretty(&eligible)?);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Parses a non-negative subtotal in major units.
fn parse_subtotal(arg: &str) -> Option<Money> {
    arg.trim()
        .parse::<i64>()
        .ok()
        .filter(|major| *major >= 0)
        .and_then(Money::checked_from_major)
}

fn demo_draft(demo: &DemoCoupon, now: chrono::DateTime<Utc>) -> CouponDraft {
    let (code, kind, value, min_order, max_discount, start_days, end_days, limit, description) =
        *demo;

    // Percent values are already basis points; everything else is money.
    let discount_value = match kind {
        DiscountKind::Percent => value,
        _ => Money::from_major(value).minor_units(),
    };

    CouponDraft {
        code: code.to_string(),
        description: Some(description.to_string()),
        discount_kind: kind,
        discount_value,
        min_order_minor: min_order.map(|m| Money::from_major(m).minor_units()),
        max_discount_minor: max_discount.map(|m| Money::from_major(m).minor_units()),
        starts_at: now + Duration::days(start_days),
        ends_at: end_days.map(|d| now + Duration::days(d)),
        usage_limit: limit,
        is_active: None,
    }
}
