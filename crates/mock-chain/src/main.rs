//! Mock chain server for local testing of the NFT market.
//!
//! This provides a JSON-RPC server that simulates the execution
//! environment for the market module without requiring a real blockchain:
//! serialized transactional calls, a controllable block height and
//! timestamp, admin endpoints for genesis and funding, and read-only
//! queries over module state.

use anyhow::Result;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use market_module::{
    genesis::{BalanceConfig, MarketGenesisConfig, MarketParams, TokenGenesisConfig},
    handlers, queries, CallContext, MarketCall, MarketState,
};
use market_types::{role_id, AssetId};

mod types;
use types::*;

/// Shared chain state.
struct ChainState {
    /// Module state
    market: MarketState,
    /// Current block height (simulated)
    block_height: u64,
    /// Current timestamp (simulated, can be advanced)
    timestamp: u64,
}

impl ChainState {
    fn new() -> Self {
        Self {
            market: MarketState::new(),
            block_height: 0,
            timestamp: 0,
        }
    }

    fn advance_block(&mut self) {
        self.block_height += 1;
        self.timestamp += 12; // ~12 second blocks
    }

    fn set_timestamp(&mut self, ts: u64) {
        self.timestamp = ts;
    }
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MarketChainApi {
    // ============ Admin Methods ============

    /// Reset the chain to the given genesis config.
    #[method(name = "admin_init")]
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned>;

    /// Advance the chain by one block.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Set the current timestamp (for testing time-dependent logic).
    #[method(name = "admin_setTimestamp")]
    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned>;

    /// Credit native funds to an account.
    #[method(name = "admin_fundNative")]
    async fn admin_fund_native(&self, params: FundNativeParams) -> Result<bool, ErrorObjectOwned>;

    /// Credit token funds to an account.
    #[method(name = "admin_mintToken")]
    async fn admin_mint_token(&self, params: MintTokenParams) -> Result<bool, ErrorObjectOwned>;

    // ============ Token Rail ============

    /// Approve the market vault to pull tokens from the sender.
    #[method(name = "token_approve")]
    async fn token_approve(&self, params: ApproveParams) -> Result<bool, ErrorObjectOwned>;

    // ============ Market Methods ============

    /// Mint a new asset (minter role required).
    #[method(name = "market_createItem")]
    async fn market_create_item(&self, params: CreateItemParams)
        -> Result<AssetId, ErrorObjectOwned>;

    /// List an asset at a fixed price.
    #[method(name = "market_listItem")]
    async fn market_list_item(&self, params: ListItemParams) -> Result<bool, ErrorObjectOwned>;

    /// Buy a listed asset.
    #[method(name = "market_buyItem")]
    async fn market_buy_item(&self, params: BuyItemParams) -> Result<bool, ErrorObjectOwned>;

    /// Cancel a listing (seller only).
    #[method(name = "market_cancelListing")]
    async fn market_cancel_listing(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Put an asset under auction.
    #[method(name = "market_listItemOnAuction")]
    async fn market_list_item_on_auction(
        &self,
        params: ListAuctionParams,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Bid on a live auction.
    #[method(name = "market_makeBid")]
    async fn market_make_bid(&self, params: MakeBidParams) -> Result<bool, ErrorObjectOwned>;

    /// Settle an elapsed auction (anyone).
    #[method(name = "market_finishAuction")]
    async fn market_finish_auction(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Cancel a live auction (seller only).
    #[method(name = "market_cancelAuction")]
    async fn market_cancel_auction(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Grant a role by name (admin only).
    #[method(name = "market_grantRole")]
    async fn market_grant_role(&self, params: GrantRoleParams) -> Result<bool, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Get the owner of an asset.
    #[method(name = "query_ownerOf")]
    async fn query_owner_of(&self, asset_id: AssetId) -> Result<Option<String>, ErrorObjectOwned>;

    /// Get the metadata URI of an asset.
    #[method(name = "query_tokenUri")]
    async fn query_token_uri(&self, asset_id: AssetId)
        -> Result<Option<String>, ErrorObjectOwned>;

    /// Get the active listing for an asset.
    #[method(name = "query_getListing")]
    async fn query_get_listing(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<ListingRpc>, ErrorObjectOwned>;

    /// Get the active auction for an asset.
    #[method(name = "query_getAuction")]
    async fn query_get_auction(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<AuctionRpc>, ErrorObjectOwned>;

    /// Get the current auction price for an asset.
    #[method(name = "query_currentAuctionPrice")]
    async fn query_current_auction_price(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<u64>, ErrorObjectOwned>;

    /// List all active listings.
    #[method(name = "query_listListings")]
    async fn query_list_listings(&self) -> Result<Vec<ListingRpc>, ErrorObjectOwned>;

    /// List all active auctions.
    #[method(name = "query_listAuctions")]
    async fn query_list_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned>;

    /// Get an account's native balance.
    #[method(name = "query_nativeBalance")]
    async fn query_native_balance(&self, address: String) -> Result<u64, ErrorObjectOwned>;

    /// Get an account's token balance.
    #[method(name = "query_tokenBalance")]
    async fn query_token_balance(
        &self,
        token: String,
        address: String,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Get the observable event log (paginated).
    #[method(name = "query_getEvents")]
    async fn query_get_events(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<MarketEventRpc>, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MarketChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MarketChainServer {
    fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ChainState::new())),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }

    fn parse(s: &str) -> Result<market_types::Address, ErrorObjectOwned> {
        parse_address(s).map_err(|e| Self::rpc_error(&e))
    }

    /// Apply one market call against the current simulated block.
    fn apply(
        &self,
        sender: &str,
        value: u64,
        call: MarketCall,
    ) -> Result<Option<AssetId>, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = CallContext {
            sender: Self::parse(sender)?,
            block_height: state.block_height,
            timestamp: state.timestamp,
            value,
        };
        handlers::apply_call(&mut state.market, &ctx, call)
            .map_err(|e| Self::rpc_error(&e.to_string()))
    }
}

#[async_trait]
impl MarketChainApiServer for MarketChainServer {
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned> {
        let admin = config.admin.as_deref().map(Self::parse).transpose()?;

        let mut minters = Vec::new();
        for minter in &config.minters {
            minters.push(Self::parse(minter)?);
        }

        let mut native_balances = Vec::new();
        for balance in &config.native_balances {
            native_balances.push(BalanceConfig {
                address: Self::parse(&balance.address)?,
                amount: balance.amount,
            });
        }

        let mut tokens = Vec::new();
        for token in &config.tokens {
            let mut balances = Vec::new();
            for balance in &token.balances {
                balances.push(BalanceConfig {
                    address: Self::parse(&balance.address)?,
                    amount: balance.amount,
                });
            }
            tokens.push(TokenGenesisConfig {
                token: Self::parse(&token.token)?,
                balances,
            });
        }

        let params = match config.auction_duration {
            Some(auction_duration) => MarketParams { auction_duration },
            None => MarketParams::default(),
        };

        let market = MarketGenesisConfig {
            admin,
            minters,
            native_balances,
            tokens,
            params,
        }
        .initialize()
        .map_err(|e| Self::rpc_error(&format!("Invalid genesis config: {}", e)))?;

        let mut state = self.state.write();
        state.market = market;
        if let Some(ts) = config.initial_timestamp {
            state.timestamp = ts;
        }

        info!("Chain initialized");
        Ok(true)
    }

    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.advance_block();
        Ok(BlockInfo {
            height: state.block_height,
            timestamp: state.timestamp,
        })
    }

    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.set_timestamp(timestamp);
        info!("Timestamp set to {}", timestamp);
        Ok(true)
    }

    async fn admin_fund_native(&self, params: FundNativeParams) -> Result<bool, ErrorObjectOwned> {
        let address = Self::parse(&params.address)?;
        let mut state = self.state.write();
        state.market.bank.deposit_native(address, params.amount);
        info!("Funded {} with {} native", params.address, params.amount);
        Ok(true)
    }

    async fn admin_mint_token(&self, params: MintTokenParams) -> Result<bool, ErrorObjectOwned> {
        let token = Self::parse(&params.token)?;
        let address = Self::parse(&params.address)?;
        let mut state = self.state.write();
        state.market.bank.mint_token(token, address, params.amount);
        info!(
            "Minted {} of token {} to {}",
            params.amount, params.token, params.address
        );
        Ok(true)
    }

    async fn token_approve(&self, params: ApproveParams) -> Result<bool, ErrorObjectOwned> {
        let owner = Self::parse(&params.sender)?;
        let token = Self::parse(&params.token)?;
        let mut state = self.state.write();
        state
            .market
            .bank
            .approve(token, owner, market_types::MARKET_VAULT, params.amount);
        info!(
            "{} approved the vault for {} of token {}",
            params.sender, params.amount, params.token
        );
        Ok(true)
    }

    async fn market_create_item(
        &self,
        params: CreateItemParams,
    ) -> Result<AssetId, ErrorObjectOwned> {
        let minted = self.apply(
            &params.sender,
            0,
            MarketCall::CreateItem { uri: params.uri },
        )?;
        let asset_id = minted.ok_or_else(|| Self::rpc_error("Mint returned no asset id"))?;
        info!("Created asset {} for {}", asset_id, params.sender);
        Ok(asset_id)
    }

    async fn market_list_item(&self, params: ListItemParams) -> Result<bool, ErrorObjectOwned> {
        let currency = parse_currency(&params.currency).map_err(|e| Self::rpc_error(&e))?;
        self.apply(
            &params.sender,
            0,
            MarketCall::ListItem {
                asset_id: params.asset_id,
                price: params.price,
                currency,
            },
        )?;
        info!(
            "Asset {} listed at {} ({})",
            params.asset_id, params.price, params.currency
        );
        Ok(true)
    }

    async fn market_buy_item(&self, params: BuyItemParams) -> Result<bool, ErrorObjectOwned> {
        self.apply(
            &params.sender,
            params.value,
            MarketCall::BuyItem {
                asset_id: params.asset_id,
            },
        )?;
        info!("Asset {} bought by {}", params.asset_id, params.sender);
        Ok(true)
    }

    async fn market_cancel_listing(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned> {
        self.apply(
            &params.sender,
            0,
            MarketCall::CancelListing {
                asset_id: params.asset_id,
            },
        )?;
        info!("Listing for asset {} cancelled", params.asset_id);
        Ok(true)
    }

    async fn market_list_item_on_auction(
        &self,
        params: ListAuctionParams,
    ) -> Result<bool, ErrorObjectOwned> {
        let currency = parse_currency(&params.currency).map_err(|e| Self::rpc_error(&e))?;
        self.apply(
            &params.sender,
            0,
            MarketCall::ListItemOnAuction {
                asset_id: params.asset_id,
                starting_price: params.starting_price,
                min_step: params.min_step,
                currency,
            },
        )?;
        info!(
            "Asset {} on auction from {} step {}",
            params.asset_id, params.starting_price, params.min_step
        );
        Ok(true)
    }

    async fn market_make_bid(&self, params: MakeBidParams) -> Result<bool, ErrorObjectOwned> {
        self.apply(
            &params.sender,
            params.value,
            MarketCall::MakeBid {
                asset_id: params.asset_id,
                amount: params.amount,
            },
        )?;
        info!(
            "Bid of {} on asset {} by {}",
            params.amount, params.asset_id, params.sender
        );
        Ok(true)
    }

    async fn market_finish_auction(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned> {
        self.apply(
            &params.sender,
            0,
            MarketCall::FinishAuction {
                asset_id: params.asset_id,
            },
        )?;
        info!("Auction for asset {} finished", params.asset_id);
        Ok(true)
    }

    async fn market_cancel_auction(
        &self,
        params: ItemActionParams,
    ) -> Result<bool, ErrorObjectOwned> {
        self.apply(
            &params.sender,
            0,
            MarketCall::CancelAuction {
                asset_id: params.asset_id,
            },
        )?;
        info!("Auction for asset {} cancelled", params.asset_id);
        Ok(true)
    }

    async fn market_grant_role(&self, params: GrantRoleParams) -> Result<bool, ErrorObjectOwned> {
        let account = Self::parse(&params.account)?;
        self.apply(
            &params.sender,
            0,
            MarketCall::GrantRole {
                role: role_id(&params.role),
                account,
            },
        )?;
        info!("Role {} granted to {}", params.role, params.account);
        Ok(true)
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(BlockInfo {
            height: state.block_height,
            timestamp: state.timestamp,
        })
    }

    async fn query_owner_of(&self, asset_id: AssetId) -> Result<Option<String>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.market.assets.owner_of(asset_id).map(hex::encode))
    }

    async fn query_token_uri(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<String>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.market.assets.token_uri(asset_id).map(str::to_string))
    }

    async fn query_get_listing(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<ListingRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .get_listing(asset_id)
            .map(|listing| ListingRpc::from_listing(asset_id, listing)))
    }

    async fn query_get_auction(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<AuctionRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .get_auction(asset_id)
            .map(|auction| AuctionRpc::from_auction(asset_id, auction)))
    }

    async fn query_current_auction_price(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<u64>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(queries::current_auction_price(&state.market, asset_id))
    }

    async fn query_list_listings(&self) -> Result<Vec<ListingRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let mut listings: Vec<ListingRpc> = state
            .market
            .listings
            .iter()
            .map(|(id, listing)| ListingRpc::from_listing(*id, listing))
            .collect();
        listings.sort_by_key(|listing| listing.asset_id);
        Ok(listings)
    }

    async fn query_list_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let mut auctions: Vec<AuctionRpc> = state
            .market
            .auctions
            .iter()
            .map(|(id, auction)| AuctionRpc::from_auction(*id, auction))
            .collect();
        auctions.sort_by_key(|auction| auction.asset_id);
        Ok(auctions)
    }

    async fn query_native_balance(&self, address: String) -> Result<u64, ErrorObjectOwned> {
        let address = Self::parse(&address)?;
        let state = self.state.read();
        Ok(state.market.bank.native_balance(&address))
    }

    async fn query_token_balance(
        &self,
        token: String,
        address: String,
    ) -> Result<u64, ErrorObjectOwned> {
        let token = Self::parse(&token)?;
        let address = Self::parse(&address)?;
        let state = self.state.read();
        Ok(state.market.bank.token_balance(&token, &address))
    }

    async fn query_get_events(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<MarketEventRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .market
            .events
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(MarketEventRpc::from)
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:9944".parse()?;

    info!("Starting mock chain server on {}", addr);

    let server = Server::builder().build(addr).await?;
    let handle = server.start(MarketChainServer::new().into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
