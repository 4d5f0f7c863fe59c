//! # Battle Curve SDK
//!
//! A standalone SDK for pricing trades against token-launch bonding curves on Solana.
//! The curve is a constant product `x * y = k` over a virtual SOL reserve `x` and a
//! virtual token reserve `y`. All invariant math runs on integer base units with
//! arbitrary precision and floors every division, so a quote never exceeds what the
//! launch program settles.
//!
//! The SDK provides two usage flows:
//!
//! 1. **Pure calculator (`CurveCalculator`)**: Human-unit quotes from a reserve and `k`, no network
//! 2. **Chain reader (`BattleCurveSDK`)**: Loads launch accounts over RPC and quotes in base units
//!
//! The SDK is read-only: it never builds, signs or sends transactions.
//!
//! ## Internal State Management
//!
//! The SDK includes internal chain state tracking functions:
//! - **`load_launch`**: Loads launch data for internal state tracking
//! - **`update_accounts`**: Updates internal state with latest chain data
//! - **`get_buyer_record`**: Exception helper that bypasses internal cache and fetches a buyer record directly from the chain
//!
//! ## 🚀 Quick Start
//!
//! ### Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! battle-curve-sdk = "0.1.0"
//! ```
//!
//! ### Calculator
//!
//! ```rust
//! use battle_curve_sdk::CurveCalculator;
//!
//! let calculator = CurveCalculator::default();
//!
//! // 1 SOL into a curve holding 30 SOL of virtual reserve
//! let tokens = calculator.quote_tokens_for_sol(1.0, 30.0, "32190005730000000000000000");
//! assert_eq!(tokens, 34_612_909.387097);
//!
//! let sol = calculator.quote_sol_for_tokens(tokens, 30.0, "32190005730000000000000000");
//! assert!(sol <= 1.0);
//!
//! // no quote available
//! assert_eq!(calculator.quote_tokens_for_sol(-1.0, 30.0, "32190005730000000000000000"), 0.0);
//! ```
//!
//! ## ⚠️ Important: Zero Quotes
//!
//! **`quote_tokens_for_sol` and `quote_sol_for_tokens` never fail.** Invalid input, a
//! malformed `k` or an empty reserve logs a warning and returns `0.0`, which callers
//! treat as "no quote available". Use `try_quote_tokens_for_sol` / `try_quote_sol_for_tokens`
//! to get the `CurveError` instead.
//!
//! Amounts below one base unit (1 lamport, `10^-6` tokens) truncate to zero.
//!
//! ## 📖 Usage Patterns
//!
//! ### Quoting against a live launch
//!
//! ```rust,no_run
//! use battle_curve_sdk::{BattleCurveSDK, CurveConfig};
//! use solana_sdk::{commitment_config::CommitmentLevel, pubkey::Pubkey};
//!
//! # async fn run(mint: Pubkey) -> anyhow::Result<()> {
//! let mut sdk = BattleCurveSDK::new(
//!     "https://api.devnet.solana.com",
//!     CommitmentLevel::Confirmed,
//!     CurveConfig::default(),
//! )?;
//!
//! // 0.1 SOL buy, fee included
//! let quote = sdk.quote_buy(&mint, 100_000_000).await?;
//! println!("Tokens out: {}, fee: {}", quote.out_amount, quote.fee_amount);
//!
//! // Sell everything back (advisory, the launch program has no sell instruction)
//! let quote = sdk.quote_sell(&mint, quote.out_amount).await?;
//! println!("SOL out: {}", quote.out_amount);
//!
//! // Human-unit preview against the cached launch
//! let tokens = sdk.preview_tokens_for_sol(0.5);
//! # Ok(())
//! # }
//! ```
//!
//! Quotes are rejected once the launch deadline has passed.
//!
//! ### Buyer records
//!
//! ```rust,no_run
//! # use battle_curve_sdk::BattleCurveSDK;
//! # use solana_sdk::{commitment_config::CommitmentLevel, pubkey::Pubkey};
//! # async fn run(sdk: &mut BattleCurveSDK, mint: Pubkey, buyer: Pubkey) -> anyhow::Result<()> {
//! sdk.load_launch(&mint).await?;
//! let record = sdk.get_buyer_record(&buyer, CommitmentLevel::Confirmed).await?;
//! println!("Spent {} lamports", record.sol_spent);
//! # Ok(())
//! # }
//! ```
//!
//! ### Decoding accounts directly
//!
//! ```rust
//! use battle_curve_sdk::{LaunchLayout, TokenLaunch, decode_token_launch, encode_token_launch};
//!
//! # fn main() -> anyhow::Result<()> {
//! # let data = encode_token_launch(
//! #     &TokenLaunch { target_sol: 1_000_000_000, sol_raised: 250_000_000, ..TokenLaunch::default() },
//! #     LaunchLayout::V2,
//! # )?;
//! let launch = decode_token_launch(&data)?;
//! assert_eq!(launch.progress_bps(), 2_500);
//! # Ok(())
//! # }
//! ```
//!
//! Both launch account layouts are supported; the version is picked from the account size.
//!
//! ## ⚙️ Configuration
//!
//! `CurveConfig` carries decimals, the platform fee, per-transaction limits and supplies.
//! It can be loaded from JSON, missing fields keep their defaults:
//!
//! ```rust
//! use battle_curve_sdk::CurveConfig;
//!
//! let config = CurveConfig::from_json_str(r#"{ "platform_fee_bps": 100 }"#).unwrap();
//! assert_eq!(config.platform_fee_bps, 100);
//! ```
//!
//! ## 🔍 Logging
//!
//! The SDK logs through the `log` facade. Install any logger to see retry warnings,
//! zero-quote diagnostics and debug output of quotes.

mod amm; // Private module - users should use re-exported types
mod config;
mod constants;
mod curve;
mod launch;
mod pda;
mod sdk;
mod state;
mod utils;

pub use sdk::BattleCurveSDK;

pub use amm::{Amm, AccountData, AccountMap, KeyedAccount, Quote, QuoteParams, TradeSide};
pub use config::{CurveConfig, TierParams};
pub use constants::{LAUNCH_PROGRAM_ID, SOL_DECIMALS, TOKEN_DECIMALS};
pub use curve::{
    CurveCalculator, CurveError, CurveStep, buy_base_units, parse_constant_k, sell_base_units,
};
pub use launch::{LaunchAmm, get_platform_fee};
pub use pda::{buyer_record_address, launch_address};
pub use state::{
    BuyerRecord, LaunchLayout, LaunchStatus, TokenLaunch, decode_buyer_record,
    decode_token_launch, encode_token_launch,
};
pub use utils::account_discriminator;
