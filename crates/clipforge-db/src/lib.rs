//! Clipforge-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for clipforge using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use clipforge_db::pool::{init_pool, get_conn};
//! use clipforge_db::queries::template_jobs;
//! use clipforge_common::VideoSource;
//!
//! let pool = init_pool("/var/lib/clipforge/db.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let job = template_jobs::create_job(&conn, "My job", VideoSource::Upload, "/media/in.mp4", &[]).unwrap();
//! println!("Created job: {}", job.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
