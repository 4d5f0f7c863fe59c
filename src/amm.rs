use anyhow::Result;
use solana_sdk::pubkey::Pubkey;

/// Core AMM trait for bonding-curve launches
pub trait Amm: Send + Sync {
    /// Deserialize the AMM from a keyed account
    fn load_launch(launch: &KeyedAccount) -> Result<Self>
    where
        Self: Sized;

    /// Get the program ID of the AMM
    fn program_id(&self) -> Pubkey;

    /// Get the key/address of the AMM
    fn key(&self) -> Pubkey;

    /// Get accounts that need to be updated
    fn get_accounts_to_update(&self) -> Vec<Pubkey>;

    /// Update the AMM state from account data
    fn update(&mut self, account_map: &AccountMap) -> Result<()>;

    /// Get a quote for a trade
    fn quote(&self, quote_params: &QuoteParams) -> Result<Quote>;

    /// Check if the AMM is accepting trades
    fn is_active(&self) -> bool;
}

/// Account map for storing account data
pub type AccountMap = std::collections::HashMap<Pubkey, AccountData>;

/// Account data structure
#[derive(Clone, Debug)]
pub struct AccountData {
    pub data: Vec<u8>,
    pub owner: Pubkey,
}

/// Keyed account for AMM operations
#[derive(Debug, Clone)]
pub struct KeyedAccount {
    pub key: Pubkey,
    pub account: AccountData,
}

/// Trade direction against the curve
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum TradeSide {
    /// SOL in (lamports), tokens out
    Buy,
    /// Tokens in (base units), SOL out.
    ///
    /// Advisory preview only: the launch program has no sell instruction, so
    /// the fee and liquidity rules follow the battle program's `sell_token`.
    Sell,
}

/// Quote parameters for trade operations
#[derive(Debug, Clone)]
pub struct QuoteParams {
    pub amount: u64,
    pub side: TradeSide,
    pub unix_timestamp: i64, // cluster time, checked against the launch deadline
}

/// Quote result
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub in_amount: u64,
    pub out_amount: u64,
    pub fee_amount: u64, // lamports
    pub fee_pct: rust_decimal::Decimal,
}

