//! Call handlers for the market module.
//!
//! These functions implement the business logic for each call type. Every
//! handler validates before it mutates, so any error leaves the state
//! exactly as it found it.

use crate::call::MarketCall;
use crate::error::MarketError;
use crate::state::MarketState;
use market_types::{
    admin_role, minter_role, Address, AssetId, Auction, Currency, Listing, MarketEvent, Role,
    MARKET_VAULT,
};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: u64,
    /// Native value attached to the call
    pub value: u64,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, MarketError>;

/// Handle CreateItem call.
///
/// Minting is gated on the minter capability; the new asset starts as
/// free property of the caller.
pub fn handle_create_item(
    state: &mut MarketState,
    ctx: &CallContext,
    uri: String,
) -> HandlerResult<AssetId> {
    if !state.has_role(minter_role(), &ctx.sender) {
        return Err(MarketError::NotOwner);
    }

    let asset_id = state.assets.mint(ctx.sender, uri);

    state.record_event(MarketEvent::CreateItem {
        owner: ctx.sender,
        asset_id,
    });

    Ok(asset_id)
}

/// Handle ListItem call.
pub fn handle_list_item(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
    price: u64,
    currency: Currency,
) -> HandlerResult<()> {
    let owner = state
        .assets
        .owner_of(asset_id)
        .ok_or(MarketError::AssetNotFound(asset_id))?;

    if state.is_on_sale(asset_id) {
        return Err(MarketError::AlreadyListed);
    }
    if owner != ctx.sender {
        return Err(MarketError::NotOwner);
    }
    if price == 0 {
        return Err(MarketError::InvalidPrice);
    }

    // Take custody for the duration of the sale.
    state.assets.transfer(asset_id, ctx.sender, MARKET_VAULT)?;

    state.listings.insert(
        asset_id,
        Listing {
            seller: ctx.sender,
            currency,
            price,
        },
    );

    state.record_event(MarketEvent::ListItem {
        seller: ctx.sender,
        asset_id,
        currency,
        price,
    });

    Ok(())
}

/// Handle BuyItem call.
///
/// Payment settlement and ownership transfer happen in the same call:
/// the price is pulled from the buyer, paid out to the seller, and the
/// asset leaves custody toward the buyer.
pub fn handle_buy_item(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
) -> HandlerResult<()> {
    let listing = state
        .get_listing(asset_id)
        .cloned()
        .ok_or(MarketError::NotSelling)?;

    state
        .bank
        .pull(listing.currency, ctx.sender, listing.price, ctx.value)?;
    state
        .bank
        .push(listing.currency, listing.seller, listing.price)?;
    state.assets.transfer(asset_id, MARKET_VAULT, ctx.sender)?;

    state.listings.remove(&asset_id);

    state.record_event(MarketEvent::BuyItem {
        buyer: ctx.sender,
        price: listing.price,
        asset_id,
    });

    Ok(())
}

/// Handle CancelListing call.
pub fn handle_cancel_listing(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
) -> HandlerResult<()> {
    let listing = state
        .get_listing(asset_id)
        .cloned()
        .ok_or(MarketError::NotOwner)?;
    if listing.seller != ctx.sender {
        return Err(MarketError::NotOwner);
    }

    state.assets.transfer(asset_id, MARKET_VAULT, listing.seller)?;
    state.listings.remove(&asset_id);

    state.record_event(MarketEvent::CancelListing {
        seller: ctx.sender,
        asset_id,
    });

    Ok(())
}

/// Handle ListItemOnAuction call.
pub fn handle_list_item_on_auction(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
    starting_price: u64,
    min_step: u64,
    currency: Currency,
) -> HandlerResult<()> {
    let owner = state
        .assets
        .owner_of(asset_id)
        .ok_or(MarketError::AssetNotFound(asset_id))?;

    if state.is_on_sale(asset_id) {
        return Err(MarketError::AlreadyListed);
    }
    if owner != ctx.sender {
        return Err(MarketError::NotOwner);
    }
    if starting_price == 0 || min_step == 0 {
        return Err(MarketError::InvalidPrice);
    }

    state.assets.transfer(asset_id, ctx.sender, MARKET_VAULT)?;

    let start_time = ctx.timestamp;
    let end_time = start_time + state.params.auction_duration;

    state.auctions.insert(
        asset_id,
        Auction {
            seller: ctx.sender,
            currency,
            current_bid: starting_price,
            min_step,
            bid_count: 0,
            highest_bidder: None,
            start_time,
            end_time,
        },
    );

    state.record_event(MarketEvent::ListItemOnAuction {
        seller: ctx.sender,
        currency,
        asset_id,
        starting_price,
        step: min_step,
        start_time,
        end_time,
    });

    Ok(())
}

/// Handle MakeBid call.
///
/// The accept threshold is always `current_bid + min_step`, whether or
/// not a bid has been accepted yet. The new bid is escrowed and the
/// previous highest bid, if any, refunded in full within the same call,
/// so no two bidders are ever credited as highest at once.
pub fn handle_make_bid(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
    amount: u64,
) -> HandlerResult<()> {
    let auction = state
        .get_auction(asset_id)
        .cloned()
        .ok_or(MarketError::NotSelling)?;

    if !auction.is_open(ctx.timestamp) {
        return Err(MarketError::AuctionOver);
    }

    let threshold = auction.current_bid + auction.min_step;
    if amount < threshold {
        return Err(MarketError::InsufficientBid {
            required: threshold,
            got: amount,
        });
    }

    state.bank.pull(auction.currency, ctx.sender, amount, ctx.value)?;
    if let Some(previous) = auction.highest_bidder {
        state.bank.push(auction.currency, previous, auction.current_bid)?;
    }

    if let Some(entry) = state.get_auction_mut(asset_id) {
        entry.current_bid = amount;
        entry.bid_count += 1;
        entry.highest_bidder = Some(ctx.sender);
    }

    state.record_event(MarketEvent::MakeBid {
        bidder: ctx.sender,
        asset_id,
        amount,
    });

    Ok(())
}

/// Handle FinishAuction call.
///
/// With two or more bids the sale succeeds: the highest bid is paid to
/// the seller and the asset goes to the highest bidder. With fewer the
/// auction fails to sell: the sole bid, if any, is refunded in full and
/// the asset returns to the seller.
pub fn handle_finish_auction(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
) -> HandlerResult<()> {
    let auction = state
        .get_auction(asset_id)
        .cloned()
        .ok_or(MarketError::AuctionNotActive)?;

    if auction.is_open(ctx.timestamp) {
        return Err(MarketError::AuctionNotOver);
    }

    let (winner, paid) = match auction.highest_bidder {
        Some(bidder) if auction.bid_count >= 2 => {
            state
                .bank
                .push(auction.currency, auction.seller, auction.current_bid)?;
            state.assets.transfer(asset_id, MARKET_VAULT, bidder)?;
            (bidder, auction.current_bid)
        }
        Some(bidder) => {
            // A single bidder is not a competitive sale.
            state
                .bank
                .push(auction.currency, bidder, auction.current_bid)?;
            state.assets.transfer(asset_id, MARKET_VAULT, auction.seller)?;
            (auction.seller, 0)
        }
        None => {
            state.assets.transfer(asset_id, MARKET_VAULT, auction.seller)?;
            (auction.seller, 0)
        }
    };

    state.auctions.remove(&asset_id);

    state.record_event(MarketEvent::FinishAuction {
        winner,
        asset_id,
        amount: paid,
        timestamp: ctx.timestamp,
    });

    Ok(())
}

/// Handle CancelAuction call.
///
/// Only the seller may cancel, and only while the window is open; once
/// it has elapsed, `finish_auction` is the sole way to settle.
pub fn handle_cancel_auction(
    state: &mut MarketState,
    ctx: &CallContext,
    asset_id: AssetId,
) -> HandlerResult<()> {
    let auction = state
        .get_auction(asset_id)
        .cloned()
        .ok_or(MarketError::NotOwner)?;
    if auction.seller != ctx.sender {
        return Err(MarketError::NotOwner);
    }
    if !auction.is_open(ctx.timestamp) {
        return Err(MarketError::AuctionAlreadyFinished);
    }

    if let Some(bidder) = auction.highest_bidder {
        state
            .bank
            .push(auction.currency, bidder, auction.current_bid)?;
    }
    state.assets.transfer(asset_id, MARKET_VAULT, auction.seller)?;
    state.auctions.remove(&asset_id);

    state.record_event(MarketEvent::CancelAuction {
        seller: ctx.sender,
        asset_id,
        timestamp: ctx.timestamp,
    });

    Ok(())
}

/// Handle GrantRole call.
pub fn handle_grant_role(
    state: &mut MarketState,
    ctx: &CallContext,
    role: Role,
    account: Address,
) -> HandlerResult<()> {
    if !state.has_role(admin_role(), &ctx.sender) {
        return Err(MarketError::NotOwner);
    }
    state.grant_role(role, account);
    Ok(())
}

/// Apply a serialized call message.
///
/// Calls applied through this entry point are totally ordered per asset
/// by their submission order. Returns the new asset id for `CreateItem`.
pub fn apply_call(
    state: &mut MarketState,
    ctx: &CallContext,
    call: MarketCall,
) -> HandlerResult<Option<AssetId>> {
    match call {
        MarketCall::CreateItem { uri } => handle_create_item(state, ctx, uri).map(Some),
        MarketCall::ListItem {
            asset_id,
            price,
            currency,
        } => handle_list_item(state, ctx, asset_id, price, currency).map(|_| None),
        MarketCall::BuyItem { asset_id } => handle_buy_item(state, ctx, asset_id).map(|_| None),
        MarketCall::CancelListing { asset_id } => {
            handle_cancel_listing(state, ctx, asset_id).map(|_| None)
        }
        MarketCall::ListItemOnAuction {
            asset_id,
            starting_price,
            min_step,
            currency,
        } => handle_list_item_on_auction(state, ctx, asset_id, starting_price, min_step, currency)
            .map(|_| None),
        MarketCall::MakeBid { asset_id, amount } => {
            handle_make_bid(state, ctx, asset_id, amount).map(|_| None)
        }
        MarketCall::FinishAuction { asset_id } => {
            handle_finish_auction(state, ctx, asset_id).map(|_| None)
        }
        MarketCall::CancelAuction { asset_id } => {
            handle_cancel_auction(state, ctx, asset_id).map(|_| None)
        }
        MarketCall::GrantRole { role, account } => {
            handle_grant_role(state, ctx, role, account).map(|_| None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::{BalanceConfig, MarketGenesisConfig, TokenGenesisConfig, AUCTION_DURATION};

    const ADMIN: Address = [0xAD; 32];
    const SELLER: Address = [1u8; 32];
    const BUYER: Address = [2u8; 32];
    const OTHER: Address = [3u8; 32];
    const TOKEN: Address = [0xAA; 32];

    fn ctx(sender: Address, timestamp: u64, value: u64) -> CallContext {
        CallContext {
            sender,
            block_height: 1,
            timestamp,
            value,
        }
    }

    fn setup_market() -> MarketState {
        let balances = |amount| {
            vec![
                BalanceConfig {
                    address: BUYER,
                    amount,
                },
                BalanceConfig {
                    address: OTHER,
                    amount,
                },
            ]
        };
        MarketGenesisConfig {
            admin: Some(ADMIN),
            minters: vec![SELLER],
            native_balances: balances(1000),
            tokens: vec![TokenGenesisConfig {
                token: TOKEN,
                balances: balances(1000),
            }],
            ..Default::default()
        }
        .initialize()
        .unwrap()
    }

    fn mint_asset(state: &mut MarketState) -> AssetId {
        handle_create_item(state, &ctx(SELLER, 0, 0), "ipfs://item".into()).unwrap()
    }

    fn list_on_auction(state: &mut MarketState, asset_id: AssetId, currency: Currency) {
        handle_list_item_on_auction(state, &ctx(SELLER, 100, 0), asset_id, 100, 10, currency)
            .unwrap();
    }

    #[test]
    fn test_create_item_requires_minter_role() {
        let mut state = setup_market();
        let result = handle_create_item(&mut state, &ctx(BUYER, 0, 0), "uri".into());
        assert_eq!(result, Err(MarketError::NotOwner));
    }

    #[test]
    fn test_create_item_mints_to_caller() {
        let mut state = setup_market();
        let first = mint_asset(&mut state);
        let second = mint_asset(&mut state);

        assert_eq!((first, second), (0, 1));
        assert_eq!(state.assets.owner_of(0), Some(SELLER));
        assert_eq!(
            state.events[0],
            MarketEvent::CreateItem {
                owner: SELLER,
                asset_id: 0
            }
        );
    }

    #[test]
    fn test_grant_role_requires_admin() {
        let mut state = setup_market();
        let result = handle_grant_role(&mut state, &ctx(OTHER, 0, 0), minter_role(), OTHER);
        assert_eq!(result, Err(MarketError::NotOwner));

        handle_grant_role(&mut state, &ctx(ADMIN, 0, 0), minter_role(), OTHER).unwrap();
        assert!(handle_create_item(&mut state, &ctx(OTHER, 0, 0), "uri".into()).is_ok());
    }

    #[test]
    fn test_list_item_takes_custody() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(MARKET_VAULT));
        assert_eq!(
            state.get_listing(id),
            Some(&Listing {
                seller: SELLER,
                currency: Currency::Native,
                price: 100,
            })
        );
    }

    #[test]
    fn test_list_item_rejects_non_owner() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        let result = handle_list_item(&mut state, &ctx(BUYER, 0, 0), id, 100, Currency::Native);
        assert_eq!(result, Err(MarketError::NotOwner));
    }

    #[test]
    fn test_list_item_rejects_zero_price() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        let result = handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 0, Currency::Native);
        assert_eq!(result, Err(MarketError::InvalidPrice));
        assert_eq!(state.assets.owner_of(id), Some(SELLER));
    }

    #[test]
    fn test_list_item_rejects_active_sale() {
        let mut state = setup_market();
        let listed = mint_asset(&mut state);
        let auctioned = mint_asset(&mut state);

        handle_list_item(&mut state, &ctx(SELLER, 0, 0), listed, 100, Currency::Native).unwrap();
        list_on_auction(&mut state, auctioned, Currency::Native);

        for id in [listed, auctioned] {
            let result = handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native);
            assert_eq!(result, Err(MarketError::AlreadyListed));
        }
    }

    #[test]
    fn test_buy_item_native_refunds_overpayment() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native).unwrap();

        // Attach 110 for a price of 100: only the price leaves the buyer.
        handle_buy_item(&mut state, &ctx(BUYER, 0, 110), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(BUYER));
        assert_eq!(state.bank.native_balance(&BUYER), 900);
        assert_eq!(state.bank.native_balance(&SELLER), 100);
        assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
        assert!(state.get_listing(id).is_none());
        assert!(state.events.contains(&MarketEvent::BuyItem {
            buyer: BUYER,
            price: 100,
            asset_id: id,
        }));
    }

    #[test]
    fn test_buy_item_rejects_insufficient_value() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native).unwrap();

        let result = handle_buy_item(&mut state, &ctx(BUYER, 0, 90), id);
        assert_eq!(
            result,
            Err(MarketError::InsufficientFunds {
                required: 100,
                got: 90
            })
        );
        assert_eq!(state.assets.owner_of(id), Some(MARKET_VAULT));
        assert_eq!(state.bank.native_balance(&BUYER), 1000);
    }

    #[test]
    fn test_buy_item_requires_listing() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        let result = handle_buy_item(&mut state, &ctx(BUYER, 0, 100), id);
        assert_eq!(result, Err(MarketError::NotSelling));
    }

    #[test]
    fn test_buy_item_token_rail() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Token(TOKEN)).unwrap();

        // Without approval the pull fails and nothing moves.
        assert!(handle_buy_item(&mut state, &ctx(BUYER, 0, 0), id).is_err());
        assert_eq!(state.bank.token_balance(&TOKEN, &BUYER), 1000);

        state.bank.approve(TOKEN, BUYER, MARKET_VAULT, 100);
        handle_buy_item(&mut state, &ctx(BUYER, 0, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(BUYER));
        assert_eq!(state.bank.token_balance(&TOKEN, &BUYER), 900);
        assert_eq!(state.bank.token_balance(&TOKEN, &SELLER), 100);
    }

    #[test]
    fn test_cancel_listing_returns_asset() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native).unwrap();

        handle_cancel_listing(&mut state, &ctx(SELLER, 0, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(SELLER));
        assert!(state.get_listing(id).is_none());
        // No payments moved.
        assert_eq!(state.bank.native_balance(&SELLER), 0);
    }

    #[test]
    fn test_cancel_listing_rejects_non_seller() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        // No listing at all: the caller cannot be its seller.
        assert_eq!(
            handle_cancel_listing(&mut state, &ctx(SELLER, 0, 0), id),
            Err(MarketError::NotOwner)
        );

        handle_list_item(&mut state, &ctx(SELLER, 0, 0), id, 100, Currency::Native).unwrap();
        assert_eq!(
            handle_cancel_listing(&mut state, &ctx(BUYER, 0, 0), id),
            Err(MarketError::NotOwner)
        );
    }

    #[test]
    fn test_auction_listing_sets_window() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        list_on_auction(&mut state, id, Currency::Native);

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.seller, SELLER);
        assert_eq!(auction.current_bid, 100);
        assert_eq!(auction.min_step, 10);
        assert_eq!(auction.bid_count, 0);
        assert_eq!(auction.highest_bidder, None);
        assert_eq!(auction.start_time, 100);
        assert_eq!(auction.end_time, 100 + AUCTION_DURATION);
        assert_eq!(state.assets.owner_of(id), Some(MARKET_VAULT));
    }

    #[test]
    fn test_auction_rejects_zero_price_or_step() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        for (price, step) in [(0, 10), (100, 0)] {
            let result = handle_list_item_on_auction(
                &mut state,
                &ctx(SELLER, 100, 0),
                id,
                price,
                step,
                Currency::Native,
            );
            assert_eq!(result, Err(MarketError::InvalidPrice));
        }
        assert_eq!(state.assets.owner_of(id), Some(SELLER));
    }

    #[test]
    fn test_make_bid_threshold_uniform() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        // First bid compares against starting price + step.
        let result = handle_make_bid(&mut state, &ctx(BUYER, 200, 109), id, 109);
        assert_eq!(
            result,
            Err(MarketError::InsufficientBid {
                required: 110,
                got: 109
            })
        );

        handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110).unwrap();

        // Subsequent bids compare against the stored bid + step.
        let result = handle_make_bid(&mut state, &ctx(OTHER, 300, 115), id, 115);
        assert_eq!(
            result,
            Err(MarketError::InsufficientBid {
                required: 120,
                got: 115
            })
        );

        handle_make_bid(&mut state, &ctx(OTHER, 300, 120), id, 120).unwrap();

        let auction = state.get_auction(id).unwrap();
        assert_eq!(auction.current_bid, 120);
        assert_eq!(auction.bid_count, 2);
        assert_eq!(auction.highest_bidder, Some(OTHER));
    }

    #[test]
    fn test_make_bid_refunds_previous_bidder() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110).unwrap();
        assert_eq!(state.bank.native_balance(&BUYER), 890);
        assert_eq!(state.bank.native_balance(&MARKET_VAULT), 110);

        handle_make_bid(&mut state, &ctx(OTHER, 300, 120), id, 120).unwrap();
        // Outbid: the previous bidder is whole again, only the top bid
        // stays in escrow.
        assert_eq!(state.bank.native_balance(&BUYER), 1000);
        assert_eq!(state.bank.native_balance(&OTHER), 880);
        assert_eq!(state.bank.native_balance(&MARKET_VAULT), 120);
    }

    #[test]
    fn test_make_bid_requires_attached_value() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        let result = handle_make_bid(&mut state, &ctx(BUYER, 200, 100), id, 110);
        assert_eq!(
            result,
            Err(MarketError::InsufficientFunds {
                required: 110,
                got: 100
            })
        );
    }

    #[test]
    fn test_make_bid_window() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        let end = 100 + AUCTION_DURATION;
        let result = handle_make_bid(&mut state, &ctx(BUYER, end, 110), id, 110);
        assert_eq!(result, Err(MarketError::AuctionOver));

        let result = handle_make_bid(&mut state, &ctx(BUYER, end - 1, 110), id, 110);
        assert!(result.is_ok());
    }

    #[test]
    fn test_make_bid_requires_auction() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        let result = handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110);
        assert_eq!(result, Err(MarketError::NotSelling));
    }

    #[test]
    fn test_finish_auction_pays_seller_and_transfers() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110).unwrap();
        handle_make_bid(&mut state, &ctx(OTHER, 300, 120), id, 120).unwrap();

        let end = 100 + AUCTION_DURATION;
        handle_finish_auction(&mut state, &ctx(BUYER, end, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(OTHER));
        assert_eq!(state.bank.native_balance(&SELLER), 120);
        assert_eq!(state.bank.native_balance(&BUYER), 1000);
        assert_eq!(state.bank.native_balance(&OTHER), 880);
        assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
        assert!(state.get_auction(id).is_none());
        assert!(state.events.contains(&MarketEvent::FinishAuction {
            winner: OTHER,
            asset_id: id,
            amount: 120,
            timestamp: end,
        }));
    }

    #[test]
    fn test_finish_auction_single_bid_fails_to_sell() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110).unwrap();

        let end = 100 + AUCTION_DURATION;
        handle_finish_auction(&mut state, &ctx(SELLER, end, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(SELLER));
        assert_eq!(state.bank.native_balance(&BUYER), 1000);
        assert_eq!(state.bank.native_balance(&SELLER), 0);
        assert!(state.events.contains(&MarketEvent::FinishAuction {
            winner: SELLER,
            asset_id: id,
            amount: 0,
            timestamp: end,
        }));
    }

    #[test]
    fn test_finish_auction_no_bids() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        let end = 100 + AUCTION_DURATION;
        handle_finish_auction(&mut state, &ctx(SELLER, end, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(SELLER));
        assert!(state.get_auction(id).is_none());
    }

    #[test]
    fn test_finish_auction_before_end() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        let result = handle_finish_auction(&mut state, &ctx(SELLER, 200, 0), id);
        assert_eq!(result, Err(MarketError::AuctionNotOver));
    }

    #[test]
    fn test_finish_auction_requires_auction() {
        let mut state = setup_market();
        let result = handle_finish_auction(&mut state, &ctx(SELLER, 200, 0), 0);
        assert_eq!(result, Err(MarketError::AuctionNotActive));
    }

    #[test]
    fn test_cancel_auction_refunds_bidder() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        handle_make_bid(&mut state, &ctx(BUYER, 200, 110), id, 110).unwrap();
        handle_cancel_auction(&mut state, &ctx(SELLER, 300, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(SELLER));
        assert_eq!(state.bank.native_balance(&BUYER), 1000);
        assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
        assert!(state.get_auction(id).is_none());
    }

    #[test]
    fn test_cancel_auction_after_window() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Native);

        let end = 100 + AUCTION_DURATION;
        let result = handle_cancel_auction(&mut state, &ctx(SELLER, end, 0), id);
        assert_eq!(result, Err(MarketError::AuctionAlreadyFinished));
    }

    #[test]
    fn test_cancel_auction_rejects_non_seller() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);

        // No auction: the caller cannot be its seller.
        assert_eq!(
            handle_cancel_auction(&mut state, &ctx(SELLER, 100, 0), id),
            Err(MarketError::NotOwner)
        );

        list_on_auction(&mut state, id, Currency::Native);
        assert_eq!(
            handle_cancel_auction(&mut state, &ctx(BUYER, 200, 0), id),
            Err(MarketError::NotOwner)
        );
    }

    #[test]
    fn test_token_auction_flow() {
        let mut state = setup_market();
        let id = mint_asset(&mut state);
        list_on_auction(&mut state, id, Currency::Token(TOKEN));

        state.bank.approve(TOKEN, BUYER, MARKET_VAULT, 110);
        state.bank.approve(TOKEN, OTHER, MARKET_VAULT, 120);

        handle_make_bid(&mut state, &ctx(BUYER, 200, 0), id, 110).unwrap();
        assert_eq!(state.bank.token_balance(&TOKEN, &BUYER), 890);

        handle_make_bid(&mut state, &ctx(OTHER, 300, 0), id, 120).unwrap();
        assert_eq!(state.bank.token_balance(&TOKEN, &BUYER), 1000);
        assert_eq!(state.bank.token_balance(&TOKEN, &OTHER), 880);

        let end = 100 + AUCTION_DURATION;
        handle_finish_auction(&mut state, &ctx(OTHER, end, 0), id).unwrap();

        assert_eq!(state.assets.owner_of(id), Some(OTHER));
        assert_eq!(state.bank.token_balance(&TOKEN, &SELLER), 120);
        assert_eq!(state.bank.token_balance(&TOKEN, &MARKET_VAULT), 0);
    }

    #[test]
    fn test_apply_call_dispatch() {
        let mut state = setup_market();

        let minted = apply_call(
            &mut state,
            &ctx(SELLER, 0, 0),
            MarketCall::CreateItem { uri: "uri".into() },
        )
        .unwrap();
        assert_eq!(minted, Some(0));

        apply_call(
            &mut state,
            &ctx(SELLER, 0, 0),
            MarketCall::ListItem {
                asset_id: 0,
                price: 100,
                currency: Currency::Native,
            },
        )
        .unwrap();

        let bought = apply_call(
            &mut state,
            &ctx(BUYER, 0, 100),
            MarketCall::BuyItem { asset_id: 0 },
        )
        .unwrap();
        assert_eq!(bought, None);
        assert_eq!(state.assets.owner_of(0), Some(BUYER));
    }
}
