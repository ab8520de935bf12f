//! Market module: fixed-price listings and English auctions over unique
//! assets, settled in native value or fungible tokens.
//!
//! The module owns the full sale lifecycle:
//!
//! - Role-gated asset minting through the in-memory ownership registry
//! - Fixed-price listings with atomic buy-or-cancel settlement
//! - Timed auctions with monotonically increasing escrowed bids and
//!   refund-on-outbid
//! - Custody accounting: assets and funds under an active sale are held
//!   by the market vault until settlement or cancellation
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `queries`: Read-only state access
//! - `state`: In-memory market state
//! - `assets`: Ownership provider (mint / owner_of / transfer)
//! - `bank`: Payment rail (native and token ledgers, vault escrow)
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use market_module::{handlers, CallContext, MarketState};
//!
//! let mut state = MarketState::new();
//! let ctx = CallContext { ... };
//!
//! // Mint and list an asset
//! let asset_id = handlers::handle_create_item(&mut state, &ctx, uri)?;
//! handlers::handle_list_item(&mut state, &ctx, asset_id, price, currency)?;
//! ```

pub mod assets;
pub mod bank;
pub mod call;
pub mod error;
pub mod genesis;
pub mod handlers;
pub mod queries;
pub mod state;

pub use call::MarketCall;
pub use error::MarketError;
pub use genesis::{MarketGenesisConfig, MarketParams, AUCTION_DURATION};
pub use handlers::{CallContext, HandlerResult};
pub use queries::{MarketQuery, MarketQueryResponse};
pub use state::MarketState;
