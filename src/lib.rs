//! Storefront
//!
//! Core of a small storefront: a paged remote product catalog with local
//! search, category filtering and sorting, plus a cart and a favorites list
//! that live in memory and are mirrored into `SQLite` so they survive restarts.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod context;
pub mod database;
pub mod favorites;
pub mod filters;
pub mod ids;
pub mod mirror;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;

#[cfg(test)]
mod test_support;
