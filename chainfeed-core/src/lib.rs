#![cfg_attr(docsrs, feature(doc_cfg))]
//! Core types for acquiring prices from on-chain state.
//!
//! This crate holds everything that does not touch the network: account
//! addresses, provider tickers and price responses, the SPL token account
//! layout, decimal price arithmetic, provider configuration and the tracked
//! currency-pair registry.
//!
//! ## Computing a price from two vault balances
//!
//! ```rust
//! use chainfeed_core::utils::calculate_price;
//! use std::str::FromStr;
//!
//! // 1 SOL (9 decimals) against 150 USDC (6 decimals)
//! let price = calculate_price(1_000_000_000, 150_000_000, 9, 6).unwrap();
//! assert_eq!(price, bigdecimal::BigDecimal::from_str("150").unwrap());
//! ```
pub mod types;

/// Configuration consumed by providers and fetchers
pub mod config;

/// Tracked currency-pair registry
pub mod registry;

/// Various utilities
pub mod utils;

// re-export the decimal type prices are expressed in
pub use bigdecimal;
