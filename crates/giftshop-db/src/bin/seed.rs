//! # Seed Data Generator
//!
//! Populates a development database with a small, realistic gift shop.
//!
//! ## Usage
//! ```bash
//! # Seed ./giftshop_dev.db
//! cargo run -p giftshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p giftshop-db --bin seed -- --db ./data/giftshop.db
//!
//! # More log output
//! RUST_LOG=debug cargo run -p giftshop-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Manufacturers, one of them renamed twice
//! - Gifts across every gift type, a few with price changes
//! - Posts, one of them superseded by a new version
//! - Workers on those posts
//! - Buyers and a handful of sales, one cancelled

use chrono::{Duration, TimeZone, Utc};
use giftshop_core::{
    Buyer, BuyerStorage, DiscountType, Gift, GiftStorage, GiftType, Manufacturer,
    ManufacturerStorage, Money, Post, PostStorage, PostType, Sale, SaleStorage, Validate, Worker,
    WorkerStorage,
};
use giftshop_db::{Database, DbConfig};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MANUFACTURERS: &[&str] = &["Acme", "Northwind", "Lindt", "Hasbro", "Penguin"];

const GIFTS: &[(&str, GiftType, usize, i64)] = &[
    ("Mug", GiftType::Accessories, 0, 1_000),
    ("Keychain", GiftType::Accessories, 1, 450),
    ("Watercolor Set", GiftType::Art, 1, 3_200),
    ("Dark Chocolate Box", GiftType::Chocolate, 2, 1_850),
    ("Truffle Collection", GiftType::Chocolate, 2, 4_900),
    ("Board Game", GiftType::Toys, 3, 5_500),
    ("Plush Bear", GiftType::Toys, 3, 2_100),
    ("Poetry Anthology", GiftType::Books, 4, 1_600),
];

const POSTS: &[(&str, PostType, i64)] = &[
    ("Clerk", PostType::Assistant, 45_000),
    ("Floor Supervisor", PostType::Supervisor, 60_000),
    ("Store Manager", PostType::Manager, 90_000),
];

const WORKERS: &[(&str, usize, i32, i32)] = &[
    ("Petrov Ivan", 0, 1995, 2016),
    ("Sidorova Anna", 0, 2000, 2019),
    ("Kuznetsov Oleg", 1, 1988, 2012),
    ("Smirnova Elena", 2, 1979, 2005),
];

const BUYERS: &[(&str, &str, f64)] = &[
    ("Ivanova Maria", "+7 912 345-67-89", 5.0),
    ("Fedorov Pavel", "8(495)123-45-67", 10.0),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,giftshop=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./giftshop_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gift Shop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./giftshop_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    if !db.manufacturers().list().await?.is_empty() {
        warn!("Database already has data, skipping seed. Delete the file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Manufacturers
    let mut manufacturers = Vec::with_capacity(MANUFACTURERS.len());
    for name in MANUFACTURERS {
        let m = Manufacturer::new(*name);
        m.validate()?;
        db.manufacturers().add(&m).await?;
        manufacturers.push(m);
    }
    let mut renamed = manufacturers[1].clone();
    renamed.rename("Northwind Traders");
    db.manufacturers().update(&renamed).await?;
    renamed.rename("Northwind Gifts");
    db.manufacturers().update(&renamed).await?;
    info!(count = manufacturers.len(), "Manufacturers created");

    // Gifts, with price history on every other one
    let mut gifts = Vec::with_capacity(GIFTS.len());
    for (idx, (name, gift_type, manufacturer, cents)) in GIFTS.iter().enumerate() {
        let mut gift = Gift::new(
            *name,
            *gift_type,
            &manufacturers[*manufacturer].id,
            Money::from_cents(*cents),
        );
        gift.validate()?;
        db.gifts().add(&gift).await?;

        if idx % 2 == 0 {
            gift.price = Money::from_cents(cents + cents / 10);
            db.gifts().update(&gift).await?;
        }
        gifts.push(gift);
    }
    info!(count = gifts.len(), "Gifts created");

    // Posts, the first one gets a raise
    let mut posts = Vec::with_capacity(POSTS.len());
    for (name, post_type, cents) in POSTS {
        let post = Post::new(*name, *post_type, Money::from_cents(*cents));
        post.validate()?;
        db.posts().add(&post).await?;
        posts.push(post);
    }
    let mut raised = posts[0].clone();
    raised.salary = Money::from_cents(48_000);
    db.posts().update(&raised).await?;
    info!(count = posts.len(), "Posts created");

    // Workers
    let mut workers = Vec::with_capacity(WORKERS.len());
    for (fio, post, born, hired) in WORKERS {
        let birth = Utc.with_ymd_and_hms(*born, 3, 15, 0, 0, 0).single();
        let employment = Utc.with_ymd_and_hms(*hired, 9, 1, 0, 0, 0).single();
        let (Some(birth), Some(employment)) = (birth, employment) else {
            continue;
        };
        let worker = Worker::new(*fio, &posts[*post].id, birth, employment);
        worker.validate()?;
        db.workers().add(&worker).await?;
        workers.push(worker);
    }
    info!(count = workers.len(), "Workers created");

    // Buyers
    let mut buyers = Vec::with_capacity(BUYERS.len());
    for (fio, phone, discount) in BUYERS {
        let buyer = Buyer::new(*fio, *phone, *discount);
        buyer.validate()?;
        db.buyers().add(&buyer).await?;
        buyers.push(buyer);
    }
    info!(count = buyers.len(), "Buyers created");

    // Sales over the last week
    let mut sales = 0;
    for day in 0..7_i64 {
        let worker = &workers[day as usize % workers.len()];
        let first = &gifts[day as usize % gifts.len()];
        let second = &gifts[(day as usize + 3) % gifts.len()];
        let buyer = (day % 3 != 0).then(|| buyers[day as usize % buyers.len()].id.clone());
        let (discount_type, discount) = match &buyer {
            Some(_) => (DiscountType::RegularCustomer, Money::from_cents(100)),
            None => (DiscountType::None, Money::from_cents(0)),
        };

        let mut sale = Sale::new(
            &worker.id,
            buyer,
            first.price + second.price * 2_i64,
            discount_type,
            discount,
        )
        .with_gift(&first.id, 1)
        .with_gift(&second.id, 2);
        sale.sale_date = Utc::now() - Duration::days(day);
        sale.validate()?;

        db.sales().add(&sale).await?;
        sales += 1;

        if day == 6 {
            db.sales().cancel(&sale.id).await?;
        }
    }
    info!(count = sales, "Sales created");

    info!(elapsed = ?start.elapsed(), "Seed complete");
    Ok(())
}
