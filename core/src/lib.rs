//! Domain core for the Trailbound tour booking backend.
//!
//! This crate implements the "Functional Core, Imperative Shell" split: all
//! business rules live here behind provider traits, while the HTTP layer
//! (`trailbound-web`) and the storage layer (`trailbound-postgres`) plug in
//! at the seams.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Imperative Shell (Axum)           │  ← HTTP, JSON, auth headers
//! ├─────────────────────────────────────────┤
//! │       Services (this crate)             │  ← orchestration, sagas
//! │  - TourService / ReviewService / ...    │
//! │  - AggregateMaintainer, BookingGate     │
//! ├─────────────────────────────────────────┤
//! │       Providers (traits)                │  ← repositories, notifier,
//! │  implemented by postgres / testing      │    payment gateway, auth
//! └─────────────────────────────────────────┘
//! ```
//!
//! The two pieces with real invariants are:
//!
//! - [`query`]: translates untyped HTTP query strings into a structured
//!   [`query::QueryPlan`] (filter / sort / projection / pagination) that any
//!   repository backend can execute.
//! - [`ratings`]: keeps each tour's denormalized rating summary consistent
//!   with its committed review set, serialized per tour so concurrent review
//!   mutations cannot leave a stale aggregate behind.

pub mod booking_gate;
pub mod domain;
pub mod environment;
pub mod error;
pub mod policy;
pub mod providers;
pub mod query;
pub mod ratings;
pub mod services;

pub use environment::Environment;
pub use error::{Error, Result};
pub use policy::Actor;
