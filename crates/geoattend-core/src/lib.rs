//! # Geoattend Core Library
//!
//! This library provides the core business logic for the Geoattend
//! location-based attendance tracker. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary; any GUI is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Evaluator**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `evaluate_tick()` for slot progress
//! - **Storage**: SQLite-based schedule and attendance storage and
//!   TOML-based configuration
//! - **Geo**: Pluggable location providers (HTTP location bridge,
//!   fixed positions) behind the [`GeoProvider`] trait
//! - **Aggregator**: Dual original/modified monthly attendance
//!   percentages with minimum-threshold warnings
//!
//! ## Key Components
//!
//! - [`AttendanceEvaluator`]: Per-tick slot evaluation state machine
//! - [`AttendanceScheduler`]: Background tick loop for a session
//! - [`Database`]: Schedule, profile and day-bucket persistence
//! - [`Config`]: Application configuration management

pub mod aggregator;
pub mod clock;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod geo;
pub mod notify;
pub mod record;
pub mod runner;
pub mod schedule;
pub mod storage;

pub use aggregator::MonthlySummary;
pub use error::{ConfigError, CoreError, DatabaseError, GeoError, ValidationError};
pub use evaluator::{AttendanceEvaluator, TickReport};
pub use events::{AttendanceMetric, Event};
pub use geo::{Coordinates, FixedGeoProvider, GeoProvider, HttpGeoProvider};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use record::{AttendanceRecord, AttendanceStatus, DayBucket, DayRecord};
pub use runner::{AttendanceScheduler, SchedulerHandle, SessionContext};
pub use schedule::{ScheduleSlot, SlotLocation, Weekday};
pub use storage::{Config, Database};
