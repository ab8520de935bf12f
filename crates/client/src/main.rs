//! CLI for interacting with the NFT market.
//!
//! This binary provides commands for:
//! - Minting and listing assets
//! - Buying listed assets and bidding in auctions
//! - Settling and cancelling sales
//! - Querying market state

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use market_client::MarketRpc;

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(about = "CLI for the NFT market mock chain")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the chain with a minimal genesis
    Init {
        /// Admin address (hex)
        #[arg(long)]
        admin: Option<String>,

        /// Minter addresses (hex, repeatable)
        #[arg(long)]
        minter: Vec<String>,

        /// Auction window in seconds (defaults to 3 days)
        #[arg(long)]
        auction_duration: Option<u64>,
    },

    /// Mint a new asset (minter role required)
    CreateItem {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Metadata URI
        #[arg(long)]
        uri: String,
    },

    /// List an asset at a fixed price
    ListItem {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,

        /// Fixed price
        #[arg(long)]
        price: u64,

        /// "native" or a hex token address
        #[arg(long, default_value = "native")]
        currency: String,
    },

    /// Buy a listed asset
    Buy {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,

        /// Attached native value
        #[arg(long, default_value = "0")]
        value: u64,
    },

    /// Cancel a listing (seller only)
    CancelListing {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Put an asset under auction
    ListAuction {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,

        /// Starting price
        #[arg(long)]
        starting_price: u64,

        /// Minimum bid step
        #[arg(long)]
        min_step: u64,

        /// "native" or a hex token address
        #[arg(long, default_value = "native")]
        currency: String,
    },

    /// Bid on a live auction
    Bid {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,

        /// Bid amount
        #[arg(long)]
        amount: u64,

        /// Attached native value
        #[arg(long, default_value = "0")]
        value: u64,
    },

    /// Settle an elapsed auction
    Finish {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Cancel a live auction (seller only)
    CancelAuction {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Grant a role (admin only)
    GrantRole {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Role name, e.g. MINTER
        #[arg(long)]
        role: String,

        /// Account to grant the role to (hex)
        #[arg(long)]
        account: String,
    },

    /// Approve the market vault to pull tokens
    Approve {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Token address (hex)
        #[arg(long)]
        token: String,

        /// Allowance amount
        #[arg(long)]
        amount: u64,
    },

    /// Credit native funds to an account
    FundNative {
        /// Account address (hex)
        #[arg(long)]
        address: String,

        /// Amount
        #[arg(long)]
        amount: u64,
    },

    /// Credit token funds to an account
    MintToken {
        /// Token address (hex)
        #[arg(long)]
        token: String,

        /// Account address (hex)
        #[arg(long)]
        address: String,

        /// Amount
        #[arg(long)]
        amount: u64,
    },

    /// Get the listing for an asset
    GetListing {
        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Get the auction for an asset
    GetAuction {
        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Get the current auction price for an asset
    CurrentPrice {
        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// Get the owner of an asset
    OwnerOf {
        /// Asset ID
        #[arg(long)]
        asset_id: u64,
    },

    /// List all active listings
    Listings,

    /// List all active auctions
    Auctions,

    /// Get an account balance (native, or token if --token is set)
    Balance {
        /// Account address (hex)
        #[arg(long)]
        address: String,

        /// Token address (hex); native balance when absent
        #[arg(long)]
        token: Option<String>,
    },

    /// Show the market event log
    Events {
        /// Log offset
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Maximum entries
        #[arg(long, default_value = "100")]
        limit: u64,
    },

    /// Advance chain time (for testing)
    AdvanceBlock,

    /// Set chain timestamp (for testing)
    SetTimestamp {
        /// Unix timestamp to set
        #[arg(long)]
        timestamp: u64,
    },
}

fn print_auction(auction: &market_client::rpc::AuctionRpc) {
    println!("Auction for asset {}:", auction.asset_id);
    println!("  Seller: {}", auction.seller);
    println!("  Currency: {}", auction.currency);
    println!("  Current bid: {}", auction.current_bid);
    println!("  Min step: {}", auction.min_step);
    println!("  Bids: {}", auction.bid_count);
    match &auction.highest_bidder {
        Some(bidder) => println!("  Highest bidder: {}", bidder),
        None => println!("  Highest bidder: none"),
    }
    println!("  Window: {} .. {}", auction.start_time, auction.end_time);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let rpc = MarketRpc::connect(&cli.rpc)?;

    match cli.command {
        Commands::Init {
            admin,
            minter,
            auction_duration,
        } => {
            rpc.init(json!({
                "admin": admin,
                "minters": minter,
                "auction_duration": auction_duration,
            }))
            .await?;
            println!("Chain initialized");
        }

        Commands::CreateItem { sender, uri } => {
            let asset_id = rpc.create_item(&sender, &uri).await?;
            info!("Created asset {}", asset_id);
            println!("Asset ID: {}", asset_id);
        }

        Commands::ListItem {
            sender,
            asset_id,
            price,
            currency,
        } => {
            rpc.list_item(&sender, asset_id, price, &currency).await?;
            println!("Asset {} listed at {} ({})", asset_id, price, currency);
        }

        Commands::Buy {
            sender,
            asset_id,
            value,
        } => {
            rpc.buy_item(&sender, asset_id, value).await?;
            println!("Asset {} bought", asset_id);
        }

        Commands::CancelListing { sender, asset_id } => {
            rpc.cancel_listing(&sender, asset_id).await?;
            println!("Listing for asset {} cancelled", asset_id);
        }

        Commands::ListAuction {
            sender,
            asset_id,
            starting_price,
            min_step,
            currency,
        } => {
            rpc.list_item_on_auction(&sender, asset_id, starting_price, min_step, &currency)
                .await?;
            println!(
                "Asset {} on auction: start {} step {} ({})",
                asset_id, starting_price, min_step, currency
            );
        }

        Commands::Bid {
            sender,
            asset_id,
            amount,
            value,
        } => {
            rpc.make_bid(&sender, asset_id, amount, value).await?;
            println!("Bid of {} placed on asset {}", amount, asset_id);
        }

        Commands::Finish { sender, asset_id } => {
            rpc.finish_auction(&sender, asset_id).await?;
            println!("Auction for asset {} finished", asset_id);
        }

        Commands::CancelAuction { sender, asset_id } => {
            rpc.cancel_auction(&sender, asset_id).await?;
            println!("Auction for asset {} cancelled", asset_id);
        }

        Commands::GrantRole {
            sender,
            role,
            account,
        } => {
            rpc.grant_role(&sender, &role, &account).await?;
            println!("Role {} granted to {}", role, account);
        }

        Commands::Approve {
            sender,
            token,
            amount,
        } => {
            rpc.approve(&sender, &token, amount).await?;
            println!("Vault approved for {} of token {}", amount, token);
        }

        Commands::FundNative { address, amount } => {
            rpc.fund_native(&address, amount).await?;
            println!("Funded {} with {}", address, amount);
        }

        Commands::MintToken {
            token,
            address,
            amount,
        } => {
            rpc.mint_token(&token, &address, amount).await?;
            println!("Minted {} of token {} to {}", amount, token, address);
        }

        Commands::GetListing { asset_id } => match rpc.get_listing(asset_id).await? {
            Some(listing) => {
                println!("Listing for asset {}:", listing.asset_id);
                println!("  Seller: {}", listing.seller);
                println!("  Currency: {}", listing.currency);
                println!("  Price: {}", listing.price);
            }
            None => println!("Asset {} is not listed", asset_id),
        },

        Commands::GetAuction { asset_id } => match rpc.get_auction(asset_id).await? {
            Some(auction) => print_auction(&auction),
            None => println!("Asset {} is not on auction", asset_id),
        },

        Commands::CurrentPrice { asset_id } => match rpc.current_auction_price(asset_id).await? {
            Some(price) => println!("Current price: {}", price),
            None => println!("Asset {} is not on auction", asset_id),
        },

        Commands::OwnerOf { asset_id } => match rpc.owner_of(asset_id).await? {
            Some(owner) => println!("Owner: {}", owner),
            None => println!("Asset {} not found", asset_id),
        },

        Commands::Listings => {
            let listings = rpc.list_listings().await?;
            if listings.is_empty() {
                println!("No active listings");
            } else {
                println!("Listings:");
                for listing in listings {
                    println!(
                        "  [{}] {} for {} ({})",
                        listing.asset_id, listing.seller, listing.price, listing.currency
                    );
                }
            }
        }

        Commands::Auctions => {
            let auctions = rpc.list_auctions().await?;
            if auctions.is_empty() {
                println!("No active auctions");
            } else {
                println!("Auctions:");
                for auction in auctions {
                    println!(
                        "  [{}] {} at {} ({} bids, ends {})",
                        auction.asset_id,
                        auction.seller,
                        auction.current_bid,
                        auction.bid_count,
                        auction.end_time
                    );
                }
            }
        }

        Commands::Balance { address, token } => {
            let balance = match token {
                Some(token) => rpc.token_balance(&token, &address).await?,
                None => rpc.native_balance(&address).await?,
            };
            println!("Balance: {}", balance);
        }

        Commands::Events { offset, limit } => {
            let events = rpc.events(offset, limit).await?;
            if events.is_empty() {
                println!("No events");
            } else {
                for (i, event) in events.iter().enumerate() {
                    print!("[{}] {} asset={} actor={}", offset + i as u64, event.kind, event.asset_id, event.actor);
                    if let Some(amount) = event.amount {
                        print!(" amount={}", amount);
                    }
                    if let Some(ts) = event.timestamp {
                        print!(" at={}", ts);
                    }
                    println!();
                }
            }
        }

        Commands::AdvanceBlock => {
            let info = rpc.advance_block().await?;
            println!(
                "Block advanced: height={}, timestamp={}",
                info.height, info.timestamp
            );
        }

        Commands::SetTimestamp { timestamp } => {
            rpc.set_timestamp(timestamp).await?;
            println!("Timestamp set to {}", timestamp);
        }
    }

    Ok(())
}
