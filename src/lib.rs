//! Payment Service - Stripe-backed payment records
//!
//! Stores payments, settles them from signed processor webhooks, and
//! reports statistics over trailing calendar windows.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
