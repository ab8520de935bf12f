//! Typed JSON-RPC wrapper for the mock chain.

use anyhow::Result;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Block info response.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

/// Listing response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingRpc {
    pub asset_id: u64,
    pub seller: String,
    pub currency: String,
    pub price: u64,
}

/// Auction response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuctionRpc {
    pub asset_id: u64,
    pub seller: String,
    pub currency: String,
    pub current_bid: u64,
    pub min_step: u64,
    pub bid_count: u32,
    pub highest_bidder: Option<String>,
    pub start_time: u64,
    pub end_time: u64,
}

/// Flat event response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketEventRpc {
    pub kind: String,
    pub asset_id: u64,
    pub actor: String,
    pub currency: Option<String>,
    pub amount: Option<u64>,
    pub step: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub timestamp: Option<u64>,
}

/// Typed client over the mock chain RPC endpoint.
pub struct MarketRpc {
    client: HttpClient,
}

impl MarketRpc {
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self {
            client: HttpClientBuilder::default().build(url)?,
        })
    }

    // ---- market calls ----

    pub async fn create_item(&self, sender: &str, uri: &str) -> Result<u64> {
        let asset_id = self
            .client
            .request(
                "market_createItem",
                rpc_params![json!({ "sender": sender, "uri": uri })],
            )
            .await?;
        Ok(asset_id)
    }

    pub async fn list_item(
        &self,
        sender: &str,
        asset_id: u64,
        price: u64,
        currency: &str,
    ) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_listItem",
                rpc_params![json!({
                    "sender": sender,
                    "asset_id": asset_id,
                    "price": price,
                    "currency": currency,
                })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn buy_item(&self, sender: &str, asset_id: u64, value: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_buyItem",
                rpc_params![json!({
                    "sender": sender,
                    "asset_id": asset_id,
                    "value": value,
                })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn cancel_listing(&self, sender: &str, asset_id: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_cancelListing",
                rpc_params![json!({ "sender": sender, "asset_id": asset_id })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn list_item_on_auction(
        &self,
        sender: &str,
        asset_id: u64,
        starting_price: u64,
        min_step: u64,
        currency: &str,
    ) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_listItemOnAuction",
                rpc_params![json!({
                    "sender": sender,
                    "asset_id": asset_id,
                    "starting_price": starting_price,
                    "min_step": min_step,
                    "currency": currency,
                })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn make_bid(
        &self,
        sender: &str,
        asset_id: u64,
        amount: u64,
        value: u64,
    ) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_makeBid",
                rpc_params![json!({
                    "sender": sender,
                    "asset_id": asset_id,
                    "amount": amount,
                    "value": value,
                })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn finish_auction(&self, sender: &str, asset_id: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_finishAuction",
                rpc_params![json!({ "sender": sender, "asset_id": asset_id })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn cancel_auction(&self, sender: &str, asset_id: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_cancelAuction",
                rpc_params![json!({ "sender": sender, "asset_id": asset_id })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn grant_role(&self, sender: &str, role: &str, account: &str) -> Result<bool> {
        let ok = self
            .client
            .request(
                "market_grantRole",
                rpc_params![json!({
                    "sender": sender,
                    "role": role,
                    "account": account,
                })],
            )
            .await?;
        Ok(ok)
    }

    // ---- admin & token rail ----

    pub async fn init(&self, config: serde_json::Value) -> Result<bool> {
        let ok = self.client.request("admin_init", rpc_params![config]).await?;
        Ok(ok)
    }

    pub async fn advance_block(&self) -> Result<BlockInfo> {
        let info = self
            .client
            .request("admin_advanceBlock", rpc_params![])
            .await?;
        Ok(info)
    }

    pub async fn set_timestamp(&self, timestamp: u64) -> Result<bool> {
        let ok = self
            .client
            .request("admin_setTimestamp", rpc_params![timestamp])
            .await?;
        Ok(ok)
    }

    pub async fn fund_native(&self, address: &str, amount: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "admin_fundNative",
                rpc_params![json!({ "address": address, "amount": amount })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn mint_token(&self, token: &str, address: &str, amount: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "admin_mintToken",
                rpc_params![json!({
                    "token": token,
                    "address": address,
                    "amount": amount,
                })],
            )
            .await?;
        Ok(ok)
    }

    pub async fn approve(&self, sender: &str, token: &str, amount: u64) -> Result<bool> {
        let ok = self
            .client
            .request(
                "token_approve",
                rpc_params![json!({
                    "sender": sender,
                    "token": token,
                    "amount": amount,
                })],
            )
            .await?;
        Ok(ok)
    }

    // ---- queries ----

    pub async fn block_info(&self) -> Result<BlockInfo> {
        let info = self
            .client
            .request("chain_getBlockInfo", rpc_params![])
            .await?;
        Ok(info)
    }

    pub async fn owner_of(&self, asset_id: u64) -> Result<Option<String>> {
        let owner = self
            .client
            .request("query_ownerOf", rpc_params![asset_id])
            .await?;
        Ok(owner)
    }

    pub async fn get_listing(&self, asset_id: u64) -> Result<Option<ListingRpc>> {
        let listing = self
            .client
            .request("query_getListing", rpc_params![asset_id])
            .await?;
        Ok(listing)
    }

    pub async fn get_auction(&self, asset_id: u64) -> Result<Option<AuctionRpc>> {
        let auction = self
            .client
            .request("query_getAuction", rpc_params![asset_id])
            .await?;
        Ok(auction)
    }

    pub async fn current_auction_price(&self, asset_id: u64) -> Result<Option<u64>> {
        let price = self
            .client
            .request("query_currentAuctionPrice", rpc_params![asset_id])
            .await?;
        Ok(price)
    }

    pub async fn list_listings(&self) -> Result<Vec<ListingRpc>> {
        let listings = self
            .client
            .request("query_listListings", rpc_params![])
            .await?;
        Ok(listings)
    }

    pub async fn list_auctions(&self) -> Result<Vec<AuctionRpc>> {
        let auctions = self
            .client
            .request("query_listAuctions", rpc_params![])
            .await?;
        Ok(auctions)
    }

    pub async fn native_balance(&self, address: &str) -> Result<u64> {
        let balance = self
            .client
            .request("query_nativeBalance", rpc_params![address])
            .await?;
        Ok(balance)
    }

    pub async fn token_balance(&self, token: &str, address: &str) -> Result<u64> {
        let balance = self
            .client
            .request("query_tokenBalance", rpc_params![token, address])
            .await?;
        Ok(balance)
    }

    pub async fn events(&self, offset: u64, limit: u64) -> Result<Vec<MarketEventRpc>> {
        let events = self
            .client
            .request("query_getEvents", rpc_params![offset, limit])
            .await?;
        Ok(events)
    }
}
