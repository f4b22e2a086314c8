//! Clinic Fixture Seeder
//!
//! Fills a clinic database with realistic, internally consistent test data.
//!
//! ```text
//! reset ─► specialties ─► doctors ─► patients ─► medications
//!                                                    │
//!          prescriptions ◄─ treatments ◄─ visits ◄───┘
//! ```
//!
//! Text and dates come from a [`TextProvider`], choices from any
//! [`rand::Rng`], and records go through a [`FixtureStore`]. Seeding the
//! provider and the generator with the same value reproduces a run.
//!
//! # Modules
//!
//! - [`seeder`]: the staged [`Seeder`]
//! - [`provider`]: [`TextProvider`] and the `fake`-backed [`FakeProvider`]
//! - [`store`]: [`FixtureStore`], implemented for [`clinic_core::Database`]
//! - [`config`]: [`SeedConfig`] counts and probabilities
//! - [`catalog`]: fixed specialty and medication fixtures
//! - [`summary`]: per-stage outcome counts

pub mod catalog;
pub mod config;
pub mod error;
pub mod provider;
pub mod seeder;
pub mod store;
pub mod summary;

pub use config::SeedConfig;
pub use error::{SeedError, SeedResult};
pub use provider::{FakeProvider, TextProvider};
pub use seeder::Seeder;
pub use store::{EntityKind, FixtureStore};
pub use summary::{RecordOutcome, SeedSummary, StageSummary};
