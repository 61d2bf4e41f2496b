//! Core types and rules for the Vitrine catalog console.
//!
//! This crate is free of HTTP and terminal dependencies. It owns the
//! promotion configuration model, the activity evaluator, the form reducers
//! and the collaborator traits that the client crate implements.

pub mod actions;
pub mod activity;
pub mod api;
pub mod codec;
pub mod dates;
pub mod error;
pub mod fields;
pub mod form;
pub mod product;
pub mod promotion;
pub mod remote;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
