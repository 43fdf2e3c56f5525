//! Core types, store traits, and the two engines of the Spool watch diary:
//! the read-side feed aggregator and the achievement evaluator.
//!
//! This crate is deliberately free of HTTP and database dependencies; every
//! other crate in the workspace depends on it.

#![allow(async_fn_in_trait)]

pub mod achievement;
pub mod awards;
pub mod counter;
pub mod entry;
pub mod error;
pub mod feed;
pub mod social;
pub mod store;

pub use error::{Error, Result};
