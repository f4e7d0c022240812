//! # giftshop-db: Database Layer
//!
//! SQLite persistence for the gift shop. Every repository implements one of
//! the storage contracts declared in `giftshop-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gift Shop Data Flow                              │
//! │                                                                         │
//! │  giftshop-logic (GiftLogic::update_gift)                                │
//! │       │  Arc<dyn GiftStorage>                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   giftshop-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │ (repository/)  │    │  (embedded)  │   │    │
//! │  │   │               │    │                │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ GiftRepository │    │ 001_initial  │   │    │
//! │  │   │ DbConfig      │    │ PostRepository │    │ _schema.sql  │   │    │
//! │  │   │               │    │ SaleRepository │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (GIFTSHOP_DB_PATH)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Engine error types and their translation to `CoreError`
//! - [`repository`] - One repository per entity
//!
//! ## Usage
//!
//! ```rust,ignore
//! use giftshop_db::{Database, DbConfig};
//! use giftshop_core::GiftStorage;
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! let history = db.gifts().get_history(&gift_id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::buyer::BuyerRepository;
pub use repository::gift::GiftRepository;
pub use repository::manufacturer::ManufacturerRepository;
pub use repository::post::PostRepository;
pub use repository::salary::SalaryRepository;
pub use repository::sale::SaleRepository;
pub use repository::worker::WorkerRepository;
