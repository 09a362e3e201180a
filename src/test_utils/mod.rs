//! Shared fixtures for the unit tests of every module
mod common;

pub use common::*;
