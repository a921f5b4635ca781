//! # Rekur Core Library
//!
//! The recurring task series engine behind the `rekur` reminder scheduler.
//! A recurring definition is materialized as a chain of concrete task
//! instances that can later be edited or deleted one occurrence at a time or
//! from an occurrence onwards.
//!
//! ## Core Modules
//!
//! - [`cadence`]: Calendar stepping for daily, weekly and monthly series
//! - [`series`]: Series identity, generation plans and due-date shifting
//! - [`scheduler`]: The [`TaskScheduler`](scheduler::TaskScheduler) service
//! - [`repository`]: The owner-scoped store gateway and its SQLite and
//!   in-memory implementations
//! - [`models`]: Task instances, drafts, patches and scopes
//! - [`config`]: Scheduler tunables
//! - [`db`]: Database connection and migration management
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rekur_core::{
//!     cadence::Cadence, config::SchedulerConfig, models::TaskDefinition,
//!     repository::SqliteTaskStore, scheduler::TaskScheduler,
//! };
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteTaskStore::connect("tasks.db").await?;
//!     let scheduler = TaskScheduler::new(store, SchedulerConfig::default());
//!
//!     let definition = TaskDefinition {
//!         title: "Pay rent".to_string(),
//!         recurring_type: Some(Cadence::Monthly),
//!         occurrences: 12,
//!         ..Default::default()
//!     };
//!     let created = scheduler.create_task(Uuid::now_v7(), definition).await?;
//!     println!("Created {} occurrences", created.instances().len());
//!
//!     Ok(())
//! }
//! ```

pub mod cadence;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod series;
