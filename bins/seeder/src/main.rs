//! Database seeder for fxserve development and testing.
//!
//! Seeds current exchange rates for all supported currencies plus 30 days
//! of rate history for local development.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use fxserve_db::entities::{exchange_rates, rate_history};

/// USD-relative rates (approximate values for testing).
const RATES: [(&str, &str); 10] = [
    ("USD", "1.0"),
    ("EUR", "0.92"),
    ("GBP", "0.79"),
    ("JPY", "149.50"),
    ("AUD", "1.53"),
    ("CAD", "1.36"),
    ("CHF", "0.88"),
    ("CNY", "7.24"),
    ("SEK", "10.45"),
    ("NZD", "1.64"),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = fxserve_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding current exchange rates...");
    seed_current_rates(&db).await;

    println!("Seeding rate history...");
    seed_rate_history(&db).await;

    println!("Seeding complete!");
}

/// Seeds the current rate for every supported currency.
async fn seed_current_rates(db: &DatabaseConnection) {
    let mut inserted = 0;

    for (code, rate) in RATES {
        // Skip currencies that are already seeded
        if exchange_rates::Entity::find_by_id(code)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  {code} already seeded, skipping...");
            continue;
        }

        let row = exchange_rates::ActiveModel {
            currency_code: Set(code.to_string()),
            rate: Set(Decimal::from_str(rate).unwrap()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = row.insert(db).await {
            eprintln!("Failed to insert rate for {code}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} current rates");
}

/// Seeds 30 days of rate history with a small daily variation.
async fn seed_rate_history(db: &DatabaseConnection) {
    let now = Utc::now();
    let mut inserted = 0;

    for day_offset in 0..30i64 {
        let recorded_at = now - Duration::days(day_offset);

        for (code, base_rate) in RATES {
            // USD is the base currency and never moves
            let rate_value = if code == "USD" {
                Decimal::ONE
            } else {
                // 0.1% daily variation to simulate market movement,
                // Decimal throughout to avoid float arithmetic
                let variation_pct = if day_offset % 2 == 0 {
                    Decimal::from(day_offset) * Decimal::from_str("0.001").unwrap()
                } else {
                    Decimal::from(day_offset) * Decimal::from_str("-0.001").unwrap()
                };
                let variation = Decimal::ONE + variation_pct;
                (Decimal::from_str(base_rate).unwrap() * variation).round_dp(8)
            };

            let entry = rate_history::ActiveModel {
                id: Set(Uuid::new_v4()),
                currency_code: Set(code.to_string()),
                rate: Set(rate_value),
                recorded_at: Set(recorded_at.into()),
                source: Set("seeder".to_string()),
            };

            if let Err(e) = entry.insert(db).await {
                if !e.to_string().contains("duplicate key") {
                    eprintln!("Failed to insert history for {code}: {e}");
                }
            } else {
                inserted += 1;
            }
        }
    }

    println!("  Inserted {inserted} history entries (30 days x 10 currencies)");
}
