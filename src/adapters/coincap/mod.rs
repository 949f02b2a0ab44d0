//! CoinCap Adapter
//!
//! Implementation of the PriceSource port for the CoinCap REST API.
//! Validates status and content type before decoding the JSON body.

mod client;

pub use client::{CoinCapClient, decode_body};
