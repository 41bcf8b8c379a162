//! Fractional Ownership & Regulated Transfer (FORT)
//!
//! This crate re-exports all the components of the FORT system.

pub use fort_core::*;
pub use fort_ledger::*;
