//! Core types and trait definitions for Podium, a record of who took part in
//! which events and competitions and what they achieved.
//!
//! Storage lives behind [`store::PodiumStore`]; this crate has no database
//! dependencies.

// Implementations use native `async fn`; the trait spells out `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod entry;
pub mod error;
pub mod kind;
pub mod person;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
