//! New-release reconciliation library - shared modules for the binary.

pub mod catalog;
pub mod collection;
pub mod interval;
pub mod models;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod safety;
pub mod stats;
