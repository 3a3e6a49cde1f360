//! Rust client library for the Duitku payment gateway.
//!
//! This crate provides a typed client for the
//! [Duitku](https://duitku.com/) payment gateway API (transaction
//! creation, status polling, payment-method listing, callback
//! verification), plus a standalone [`qris`] module that turns a
//! merchant's static QRIS string into a dynamic, amount-bearing EMVCo
//! payload.

pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod qris;
pub mod signature;
pub mod store;

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
