//! Client SDK for the NFT market mock chain.
//!
//! This crate provides a typed wrapper over the mock chain's JSON-RPC
//! interface: every market operation, the admin helpers, and the
//! read-only queries.

pub mod rpc;

pub use rpc::MarketRpc;
