//! Account layouts of the launch program.
//!
//! The program has shipped two `TokenLaunch` layouts. Both are described by an
//! explicit Borsh schema below; the version is chosen from the allocated
//! account size and normalized into [`TokenLaunch`].

use std::fmt;

use anchor_lang::prelude::borsh;
use anchor_lang::{AnchorDeserialize, AnchorSerialize};
use anyhow::{Context, Result, bail};
use solana_sdk::pubkey::Pubkey;

use crate::constants::{MAX_BPS, TOKEN_LAUNCH_V1_LEN, TOKEN_LAUNCH_V2_LEN};
use crate::utils::{account_discriminator, strip_discriminator};

pub const TOKEN_LAUNCH_ACCOUNT: &str = "TokenLaunch";
pub const BUYER_RECORD_ACCOUNT: &str = "BuyerRecord";

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LaunchStatus {
    #[default]
    Active,
    ReadyToGraduate,
    GraduationInProgress,
    Graduated,
    Failed,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchLayout {
    /// Original layout, carries `holders_thawed`
    V1,
    V2,
}

impl LaunchLayout {
    pub fn from_account_len(len: usize) -> Self {
        match len {
            TOKEN_LAUNCH_V1_LEN => LaunchLayout::V1,
            TOKEN_LAUNCH_V2_LEN => LaunchLayout::V2,
            _ => {
                log::warn!(
                    "Unexpected token launch account size {}, decoding as {}",
                    len,
                    LaunchLayout::V1
                );
                LaunchLayout::V1
            }
        }
    }

    pub fn account_len(&self) -> usize {
        match self {
            LaunchLayout::V1 => TOKEN_LAUNCH_V1_LEN,
            LaunchLayout::V2 => TOKEN_LAUNCH_V2_LEN,
        }
    }
}

impl fmt::Display for LaunchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchLayout::V1 => write!(f, "v1"),
            LaunchLayout::V2 => write!(f, "v2"),
        }
    }
}

/// Normalized token launch state, independent of the on-chain layout version
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenLaunch {
    pub creator: Pubkey,
    pub mint: Pubkey,
    pub tier: u8,
    pub virtual_sol_init: u64, // lamports
    pub constant_k: u128,
    pub target_sol: u64, // lamports
    pub deadline: i64,
    pub sol_raised: u64, // lamports, net of platform fees
    pub status: LaunchStatus,
    pub created_at: i64,
    pub graduated_at: Option<i64>,
    pub meteora_pool: Option<Pubkey>,
    pub total_buyers: u32,
    pub total_tokens_sold: u64,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub bump: u8,
}

impl TokenLaunch {
    /// Effective SOL reserve of the curve: virtual init plus raised
    pub fn current_virtual_sol(&self) -> Result<u64> {
        self.virtual_sol_init
            .checked_add(self.sol_raised)
            .context("Virtual SOL reserve overflow")
    }

    pub fn is_tradable(&self) -> bool {
        matches!(
            self.status,
            LaunchStatus::Active | LaunchStatus::ReadyToGraduate
        )
    }

    pub fn is_expired(&self, unix_timestamp: i64) -> bool {
        unix_timestamp >= self.deadline
    }

    /// Raised SOL relative to target, in basis points (may exceed 10_000)
    pub fn progress_bps(&self) -> u64 {
        if self.target_sol == 0 {
            return 0;
        }
        ((self.sol_raised as u128) * (MAX_BPS as u128) / (self.target_sol as u128)) as u64
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
struct TokenLaunchV1 {
    creator: Pubkey,
    mint: Pubkey,
    tier: u8,
    virtual_sol_init: u64,
    constant_k: u128,
    target_sol: u64,
    deadline: i64,
    sol_raised: u64,
    status: LaunchStatus,
    created_at: i64,
    graduated_at: Option<i64>,
    meteora_pool: Option<Pubkey>,
    total_buyers: u32,
    total_tokens_sold: u64,
    holders_thawed: u32, // dropped in v2
    name: String,
    symbol: String,
    uri: String,
    bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
struct TokenLaunchV2 {
    creator: Pubkey,
    mint: Pubkey,
    tier: u8,
    virtual_sol_init: u64,
    constant_k: u128,
    target_sol: u64,
    deadline: i64,
    sol_raised: u64,
    status: LaunchStatus,
    created_at: i64,
    graduated_at: Option<i64>,
    meteora_pool: Option<Pubkey>,
    total_buyers: u32,
    total_tokens_sold: u64,
    name: String,
    symbol: String,
    uri: String,
    bump: u8,
}

impl From<TokenLaunchV1> for TokenLaunch {
    fn from(v1: TokenLaunchV1) -> Self {
        TokenLaunch {
            creator: v1.creator,
            mint: v1.mint,
            tier: v1.tier,
            virtual_sol_init: v1.virtual_sol_init,
            constant_k: v1.constant_k,
            target_sol: v1.target_sol,
            deadline: v1.deadline,
            sol_raised: v1.sol_raised,
            status: v1.status,
            created_at: v1.created_at,
            graduated_at: v1.graduated_at,
            meteora_pool: v1.meteora_pool,
            total_buyers: v1.total_buyers,
            total_tokens_sold: v1.total_tokens_sold,
            name: v1.name.trim().to_string(),
            symbol: v1.symbol.trim().to_string(),
            uri: v1.uri.trim().to_string(),
            bump: v1.bump,
        }
    }
}

impl From<TokenLaunchV2> for TokenLaunch {
    fn from(v2: TokenLaunchV2) -> Self {
        TokenLaunch {
            creator: v2.creator,
            mint: v2.mint,
            tier: v2.tier,
            virtual_sol_init: v2.virtual_sol_init,
            constant_k: v2.constant_k,
            target_sol: v2.target_sol,
            deadline: v2.deadline,
            sol_raised: v2.sol_raised,
            status: v2.status,
            created_at: v2.created_at,
            graduated_at: v2.graduated_at,
            meteora_pool: v2.meteora_pool,
            total_buyers: v2.total_buyers,
            total_tokens_sold: v2.total_tokens_sold,
            name: v2.name.trim().to_string(),
            symbol: v2.symbol.trim().to_string(),
            uri: v2.uri.trim().to_string(),
            bump: v2.bump,
        }
    }
}

impl From<&TokenLaunch> for TokenLaunchV2 {
    fn from(launch: &TokenLaunch) -> Self {
        TokenLaunchV2 {
            creator: launch.creator,
            mint: launch.mint,
            tier: launch.tier,
            virtual_sol_init: launch.virtual_sol_init,
            constant_k: launch.constant_k,
            target_sol: launch.target_sol,
            deadline: launch.deadline,
            sol_raised: launch.sol_raised,
            status: launch.status,
            created_at: launch.created_at,
            graduated_at: launch.graduated_at,
            meteora_pool: launch.meteora_pool,
            total_buyers: launch.total_buyers,
            total_tokens_sold: launch.total_tokens_sold,
            name: launch.name.clone(),
            symbol: launch.symbol.clone(),
            uri: launch.uri.clone(),
            bump: launch.bump,
        }
    }
}

impl From<&TokenLaunch> for TokenLaunchV1 {
    fn from(launch: &TokenLaunch) -> Self {
        let v2 = TokenLaunchV2::from(launch);
        TokenLaunchV1 {
            creator: v2.creator,
            mint: v2.mint,
            tier: v2.tier,
            virtual_sol_init: v2.virtual_sol_init,
            constant_k: v2.constant_k,
            target_sol: v2.target_sol,
            deadline: v2.deadline,
            sol_raised: v2.sol_raised,
            status: v2.status,
            created_at: v2.created_at,
            graduated_at: v2.graduated_at,
            meteora_pool: v2.meteora_pool,
            total_buyers: v2.total_buyers,
            total_tokens_sold: v2.total_tokens_sold,
            holders_thawed: 0,
            name: v2.name,
            symbol: v2.symbol,
            uri: v2.uri,
            bump: v2.bump,
        }
    }
}

/// Decode raw `TokenLaunch` account data (discriminator included)
pub fn decode_token_launch(data: &[u8]) -> Result<TokenLaunch> {
    let layout = LaunchLayout::from_account_len(data.len());
    let mut body = strip_discriminator(data, TOKEN_LAUNCH_ACCOUNT)?;

    let launch: TokenLaunch = match layout {
        LaunchLayout::V1 => TokenLaunchV1::deserialize(&mut body)
            .context("Failed to decode v1 token launch")?
            .into(),
        LaunchLayout::V2 => TokenLaunchV2::deserialize(&mut body)
            .context("Failed to decode v2 token launch")?
            .into(),
    };

    log::debug!(
        "Decoded {} token launch {} ({}) for mint {}",
        layout,
        launch.name,
        launch.symbol,
        launch.mint
    );

    Ok(launch)
}

/// Encode a launch into account data of the given layout, zero padded to the account size
pub fn encode_token_launch(launch: &TokenLaunch, layout: LaunchLayout) -> Result<Vec<u8>> {
    let mut data = account_discriminator(TOKEN_LAUNCH_ACCOUNT).to_vec();
    match layout {
        LaunchLayout::V1 => TokenLaunchV1::from(launch).serialize(&mut data)?,
        LaunchLayout::V2 => TokenLaunchV2::from(launch).serialize(&mut data)?,
    }

    if data.len() > layout.account_len() {
        bail!(
            "Token launch does not fit the {} layout: {} > {} bytes",
            layout,
            data.len(),
            layout.account_len()
        );
    }
    data.resize(layout.account_len(), 0);

    Ok(data)
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuyerRecord {
    pub launch: Pubkey,
    pub buyer: Pubkey,
    pub sol_spent: u64,
    pub tokens_received: u64,
    pub refund_claimed: bool,
    pub first_buy_timestamp: i64,
    pub last_buy_timestamp: i64,
    pub bump: u8,
}

pub fn decode_buyer_record(data: &[u8]) -> Result<BuyerRecord> {
    let mut body = strip_discriminator(data, BUYER_RECORD_ACCOUNT)?;
    BuyerRecord::deserialize(&mut body).context("Failed to decode buyer record")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_launch() -> TokenLaunch {
        TokenLaunch {
            creator: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            tier: 1,
            virtual_sol_init: 353_000_000,
            constant_k: 378_769_000_000_000_000_000_000,
            target_sol: 1_000_000_000,
            deadline: 1_700_000_180,
            sol_raised: 250_000_000,
            status: LaunchStatus::Active,
            created_at: 1_700_000_000,
            graduated_at: None,
            meteora_pool: None,
            total_buyers: 3,
            total_tokens_sold: 42_000_000,
            name: "Stonk".to_string(),
            symbol: "STK".to_string(),
            uri: "https://example.com/stk.json".to_string(),
            bump: 254,
        }
    }

    #[test]
    fn test_layout_from_account_len() {
        assert_eq!(LaunchLayout::from_account_len(443), LaunchLayout::V1);
        assert_eq!(LaunchLayout::from_account_len(439), LaunchLayout::V2);
        assert_eq!(LaunchLayout::from_account_len(500), LaunchLayout::V1);
    }

    #[test]
    fn test_decode_both_layouts() {
        let launch = sample_launch();

        for layout in [LaunchLayout::V1, LaunchLayout::V2] {
            let data = encode_token_launch(&launch, layout).unwrap();
            assert_eq!(data.len(), layout.account_len());
            assert_eq!(decode_token_launch(&data).unwrap(), launch);
        }
    }

    #[test]
    fn test_v1_holders_thawed_shifts_strings() {
        let launch = sample_launch();
        let v1 = encode_token_launch(&launch, LaunchLayout::V1).unwrap();

        // v1 bytes read with the v2 schema misplace the name length
        let mut body = &v1[8..];
        let misread = TokenLaunchV2::deserialize(&mut body);
        assert!(misread.map(|v2| v2.name != launch.name).unwrap_or(true));
    }

    #[test]
    fn test_decode_rejects_wrong_discriminator() {
        let mut data = encode_token_launch(&sample_launch(), LaunchLayout::V2).unwrap();
        data[0] ^= 0xff;
        assert!(decode_token_launch(&data).is_err());
    }

    #[test]
    fn test_decode_optional_fields() {
        let mut launch = sample_launch();
        launch.status = LaunchStatus::Graduated;
        launch.graduated_at = Some(1_700_000_100);
        launch.meteora_pool = Some(Pubkey::new_unique());

        let data = encode_token_launch(&launch, LaunchLayout::V2).unwrap();
        let decoded = decode_token_launch(&data).unwrap();
        assert_eq!(decoded.graduated_at, Some(1_700_000_100));
        assert_eq!(decoded.meteora_pool, launch.meteora_pool);
        assert!(!decoded.is_tradable());
    }

    #[test]
    fn test_encode_rejects_oversized_metadata() {
        let mut launch = sample_launch();
        launch.uri = "x".repeat(400);
        assert!(encode_token_launch(&launch, LaunchLayout::V2).is_err());
    }

    #[test]
    fn test_launch_helpers() {
        let launch = sample_launch();
        assert_eq!(launch.current_virtual_sol().unwrap(), 603_000_000);
        assert_eq!(launch.progress_bps(), 2_500);
        assert!(launch.is_tradable());
        assert!(!launch.is_expired(1_700_000_179));
        assert!(launch.is_expired(1_700_000_180));

        let overflow = TokenLaunch {
            virtual_sol_init: u64::MAX,
            sol_raised: 1,
            ..TokenLaunch::default()
        };
        assert!(overflow.current_virtual_sol().is_err());
        assert_eq!(overflow.progress_bps(), 0);
    }

    #[test]
    fn test_decode_buyer_record() {
        let record = BuyerRecord {
            launch: Pubkey::new_unique(),
            buyer: Pubkey::new_unique(),
            sol_spent: 1_000_000_000,
            tokens_received: 788_852_213_053_264,
            refund_claimed: false,
            first_buy_timestamp: 1_700_000_010,
            last_buy_timestamp: 1_700_000_010,
            bump: 255,
        };
        let mut data = account_discriminator(BUYER_RECORD_ACCOUNT).to_vec();
        record.serialize(&mut data).unwrap();

        assert_eq!(decode_buyer_record(&data).unwrap(), record);
        assert!(decode_token_launch(&data).is_err());
    }
}
