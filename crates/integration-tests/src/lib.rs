//! End-to-end integration tests for the NFT market.
//!
//! These tests exercise the full sale lifecycle against the module APIs:
//! 1. Genesis and role setup
//! 2. Minting
//! 3. Fixed-price listing and purchase, or auction and bidding
//! 4. Settlement, refunds and custody release

use market_module::genesis::{BalanceConfig, MarketGenesisConfig, TokenGenesisConfig};
use market_module::{
    handlers, queries, CallContext, MarketCall, MarketError, MarketState, AUCTION_DURATION,
};
use market_types::{minter_role, Address, AssetId, Currency, MarketEvent, MARKET_VAULT};

const ADMIN: Address = [0xAD; 32];
const SELLER: Address = [0x51; 32];
const ALICE: Address = [0xA1; 32];
const BOB: Address = [0xB0; 32];
const TOKEN: Address = [0x70; 32];

const FUNDS: u64 = 1_000;

fn genesis() -> MarketState {
    let balances = vec![
        BalanceConfig {
            address: ALICE,
            amount: FUNDS,
        },
        BalanceConfig {
            address: BOB,
            amount: FUNDS,
        },
    ];
    MarketGenesisConfig {
        admin: Some(ADMIN),
        minters: vec![SELLER],
        native_balances: balances.clone(),
        tokens: vec![TokenGenesisConfig {
            token: TOKEN,
            balances,
        }],
        ..Default::default()
    }
    .initialize()
    .expect("valid genesis")
}

fn ctx(sender: Address, timestamp: u64, value: u64) -> CallContext {
    CallContext {
        sender,
        block_height: 0,
        timestamp,
        value,
    }
}

fn mint(state: &mut MarketState, at: u64) -> AssetId {
    handlers::handle_create_item(state, &ctx(SELLER, at, 0), "ipfs://asset".into()).unwrap()
}

/// Fixed-price sale over the native rail, with the buyer overpaying.
#[test]
fn test_fixed_price_sale_native() {
    let mut state = genesis();

    let asset = mint(&mut state, 0);
    handlers::handle_list_item(&mut state, &ctx(SELLER, 10, 0), asset, 100, Currency::Native)
        .unwrap();

    // While listed the asset sits in market custody.
    assert_eq!(state.assets.owner_of(asset), Some(MARKET_VAULT));

    // Buyer attaches 110 against a price of 100.
    handlers::handle_buy_item(&mut state, &ctx(ALICE, 20, 110), asset).unwrap();

    assert_eq!(state.assets.owner_of(asset), Some(ALICE));
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS - 100);
    assert_eq!(state.bank.native_balance(&SELLER), 100);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
    assert!(state.get_listing(asset).is_none());

    assert_eq!(
        state.events,
        vec![
            MarketEvent::CreateItem {
                owner: SELLER,
                asset_id: asset
            },
            MarketEvent::ListItem {
                seller: SELLER,
                asset_id: asset,
                currency: Currency::Native,
                price: 100
            },
            MarketEvent::BuyItem {
                buyer: ALICE,
                price: 100,
                asset_id: asset
            },
        ]
    );
}

/// Fixed-price sale over the token rail, settled through an allowance.
#[test]
fn test_fixed_price_sale_token() {
    let mut state = genesis();

    let asset = mint(&mut state, 0);
    handlers::handle_list_item(
        &mut state,
        &ctx(SELLER, 10, 0),
        asset,
        100,
        Currency::Token(TOKEN),
    )
    .unwrap();

    state.bank.approve(TOKEN, ALICE, MARKET_VAULT, 100);
    handlers::handle_buy_item(&mut state, &ctx(ALICE, 20, 0), asset).unwrap();

    assert_eq!(state.assets.owner_of(asset), Some(ALICE));
    assert_eq!(state.bank.token_balance(&TOKEN, &ALICE), FUNDS - 100);
    assert_eq!(state.bank.token_balance(&TOKEN, &SELLER), 100);
    assert_eq!(state.bank.allowance(&TOKEN, &ALICE, &MARKET_VAULT), 0);
    // Native balances untouched by a token sale.
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS);
}

/// Full auction over the native rail: two bids, an outbid refund, and a
/// settlement that pays the seller and transfers the asset.
#[test]
fn test_full_auction_flow_native() {
    let mut state = genesis();

    let asset = mint(&mut state, 0);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, 100, 0),
        asset,
        100,
        10,
        Currency::Native,
    )
    .unwrap();

    assert_eq!(queries::current_auction_price(&state, asset), Some(100));

    handlers::handle_make_bid(&mut state, &ctx(ALICE, 200, 110), asset, 110).unwrap();
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS - 110);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 110);
    assert_eq!(queries::current_auction_price(&state, asset), Some(110));

    handlers::handle_make_bid(&mut state, &ctx(BOB, 300, 120), asset, 120).unwrap();
    // Alice is refunded in full the moment she is outbid.
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS);
    assert_eq!(state.bank.native_balance(&BOB), FUNDS - 120);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 120);

    let end = 100 + AUCTION_DURATION;
    assert_eq!(queries::finishable_auctions(&state, end), vec![asset]);

    handlers::handle_finish_auction(&mut state, &ctx(ALICE, end, 0), asset).unwrap();

    assert_eq!(state.assets.owner_of(asset), Some(BOB));
    assert_eq!(state.bank.native_balance(&SELLER), 120);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
    assert!(state.get_auction(asset).is_none());
    assert!(state.events.contains(&MarketEvent::FinishAuction {
        winner: BOB,
        asset_id: asset,
        amount: 120,
        timestamp: end,
    }));
}

/// Full auction over the token rail with balances checked at every step.
#[test]
fn test_full_auction_flow_token() {
    let mut state = genesis();

    let asset = mint(&mut state, 0);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, 100, 0),
        asset,
        100,
        10,
        Currency::Token(TOKEN),
    )
    .unwrap();

    state.bank.approve(TOKEN, ALICE, MARKET_VAULT, 110);
    state.bank.approve(TOKEN, BOB, MARKET_VAULT, 120);

    handlers::handle_make_bid(&mut state, &ctx(ALICE, 200, 0), asset, 110).unwrap();
    assert_eq!(state.bank.token_balance(&TOKEN, &ALICE), FUNDS - 110);

    handlers::handle_make_bid(&mut state, &ctx(BOB, 300, 0), asset, 120).unwrap();
    assert_eq!(state.bank.token_balance(&TOKEN, &ALICE), FUNDS);
    assert_eq!(state.bank.token_balance(&TOKEN, &BOB), FUNDS - 120);
    assert_eq!(state.bank.token_balance(&TOKEN, &MARKET_VAULT), 120);

    let end = 100 + AUCTION_DURATION;
    handlers::handle_finish_auction(&mut state, &ctx(BOB, end, 0), asset).unwrap();

    assert_eq!(state.assets.owner_of(asset), Some(BOB));
    assert_eq!(state.bank.token_balance(&TOKEN, &SELLER), 120);
    assert_eq!(state.bank.token_balance(&TOKEN, &MARKET_VAULT), 0);
}

/// Auctions with fewer than two bids always fail to sell: the sole bid is
/// refunded in full and the asset returns to the seller.
#[test]
fn test_auction_under_participation() {
    let mut state = genesis();

    // Zero bids.
    let unbid = mint(&mut state, 0);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, 100, 0),
        unbid,
        100,
        10,
        Currency::Native,
    )
    .unwrap();
    let end = 100 + AUCTION_DURATION;
    handlers::handle_finish_auction(&mut state, &ctx(SELLER, end, 0), unbid).unwrap();
    assert_eq!(state.assets.owner_of(unbid), Some(SELLER));
    assert_eq!(state.bank.native_balance(&SELLER), 0);

    // Exactly one bid.
    let single = mint(&mut state, end);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, end, 0),
        single,
        100,
        10,
        Currency::Native,
    )
    .unwrap();
    handlers::handle_make_bid(&mut state, &ctx(ALICE, end + 10, 110), single, 110).unwrap();

    let end2 = end + AUCTION_DURATION;
    handlers::handle_finish_auction(&mut state, &ctx(SELLER, end2, 0), single).unwrap();

    assert_eq!(state.assets.owner_of(single), Some(SELLER));
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS);
    assert_eq!(state.bank.native_balance(&SELLER), 0);
    assert!(state.events.contains(&MarketEvent::FinishAuction {
        winner: SELLER,
        asset_id: single,
        amount: 0,
        timestamp: end2,
    }));
}

/// Cancellation matrix: listings and auctions, both rails, both outcomes.
#[test]
fn test_cancellations() {
    let mut state = genesis();

    // Listing cancel returns the asset with no payment movement.
    let listed = mint(&mut state, 0);
    handlers::handle_list_item(&mut state, &ctx(SELLER, 10, 0), listed, 100, Currency::Native)
        .unwrap();
    handlers::handle_cancel_listing(&mut state, &ctx(SELLER, 20, 0), listed).unwrap();
    assert_eq!(state.assets.owner_of(listed), Some(SELLER));

    // Auction cancel with a standing bid refunds the bidder.
    let auctioned = mint(&mut state, 0);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, 100, 0),
        auctioned,
        100,
        10,
        Currency::Native,
    )
    .unwrap();
    handlers::handle_make_bid(&mut state, &ctx(ALICE, 200, 110), auctioned, 110).unwrap();

    // A non-seller cannot cancel.
    assert_eq!(
        handlers::handle_cancel_auction(&mut state, &ctx(ALICE, 250, 0), auctioned),
        Err(MarketError::NotOwner)
    );

    handlers::handle_cancel_auction(&mut state, &ctx(SELLER, 300, 0), auctioned).unwrap();
    assert_eq!(state.assets.owner_of(auctioned), Some(SELLER));
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);

    // Once the window elapses, cancel is closed and only finish settles.
    let relisted = mint(&mut state, 400);
    handlers::handle_list_item_on_auction(
        &mut state,
        &ctx(SELLER, 400, 0),
        relisted,
        100,
        10,
        Currency::Native,
    )
    .unwrap();
    let end = 400 + AUCTION_DURATION;
    assert_eq!(
        handlers::handle_cancel_auction(&mut state, &ctx(SELLER, end, 0), relisted),
        Err(MarketError::AuctionAlreadyFinished)
    );
    handlers::handle_finish_auction(&mut state, &ctx(SELLER, end, 0), relisted).unwrap();
    assert_eq!(state.assets.owner_of(relisted), Some(SELLER));
}

/// Minting is gated on the minter capability granted at genesis or by the
/// admin afterwards.
#[test]
fn test_role_gated_minting() {
    let mut state = genesis();

    assert_eq!(
        handlers::handle_create_item(&mut state, &ctx(ALICE, 0, 0), "uri".into()),
        Err(MarketError::NotOwner)
    );

    handlers::handle_grant_role(&mut state, &ctx(ADMIN, 0, 0), minter_role(), ALICE).unwrap();
    let asset = handlers::handle_create_item(&mut state, &ctx(ALICE, 0, 0), "uri".into()).unwrap();
    assert_eq!(state.assets.owner_of(asset), Some(ALICE));
}

/// A serialized call stream applied in submission order drives the market
/// to the expected terminal state.
#[test]
fn test_serialized_call_stream() {
    let mut state = genesis();

    let stream: Vec<(Address, u64, u64, MarketCall)> = vec![
        (SELLER, 0, 0, MarketCall::CreateItem { uri: "uri".into() }),
        (
            SELLER,
            10,
            0,
            MarketCall::ListItemOnAuction {
                asset_id: 0,
                starting_price: 100,
                min_step: 10,
                currency: Currency::Native,
            },
        ),
        (ALICE, 20, 110, MarketCall::MakeBid { asset_id: 0, amount: 110 }),
        (BOB, 30, 120, MarketCall::MakeBid { asset_id: 0, amount: 120 }),
        (
            ALICE,
            10 + AUCTION_DURATION,
            0,
            MarketCall::FinishAuction { asset_id: 0 },
        ),
    ];

    for (sender, timestamp, value, call) in stream {
        // Round-trip through the canonical encoding, as a runtime would.
        let encoded = borsh::to_vec(&call).unwrap();
        let decoded: MarketCall = borsh::from_slice(&encoded).unwrap();
        handlers::apply_call(&mut state, &ctx(sender, timestamp, value), decoded).unwrap();
    }

    assert_eq!(state.assets.owner_of(0), Some(BOB));
    assert_eq!(state.bank.native_balance(&SELLER), 120);
    assert_eq!(state.bank.native_balance(&ALICE), FUNDS);
    assert_eq!(state.bank.native_balance(&BOB), FUNDS - 120);
    assert_eq!(state.bank.native_balance(&MARKET_VAULT), 0);
}
