use anyhow::{Context, Result, bail};
use num_bigint::BigUint;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
};
use std::collections::HashMap;
use tokio::time::{Duration, sleep};

use crate::{
    amm::{AccountData, Amm, KeyedAccount, Quote, QuoteParams, TradeSide},
    config::CurveConfig,
    constants::LAUNCH_PROGRAM_ID,
    curve::CurveCalculator,
    launch::LaunchAmm,
    pda::{buyer_record_address, launch_address},
    state::{BuyerRecord, TokenLaunch, decode_buyer_record},
    utils::lamports_to_sol,
};

const LOAD_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Read-only client for bonding-curve launches.
///
/// Keeps one launch cached at a time. Quoting a different mint reloads the
/// cache first.
pub struct BattleCurveSDK {
    rpc_client: RpcClient,
    launch_amm: LaunchAmm,
    calculator: CurveCalculator,
}

impl BattleCurveSDK {
    /// Create a new SDK instance
    pub fn new(
        rpc_endpoint: &str,
        commitment_level: CommitmentLevel,
        config: CurveConfig,
    ) -> Result<Self> {
        config.validate()?;

        let commitment_config = CommitmentConfig {
            commitment: commitment_level,
        };

        Ok(Self {
            rpc_client: RpcClient::new_with_commitment(rpc_endpoint.to_string(), commitment_config),
            launch_amm: LaunchAmm {
                key: Pubkey::default(),
                launch: TokenLaunch::default(),
                config: config.clone(),
            },
            calculator: CurveCalculator::new(config),
        })
    }

    /// Currently loaded launch state
    pub fn launch(&self) -> &TokenLaunch {
        &self.launch_amm.launch
    }

    /// Address of the currently loaded launch, `Pubkey::default()` before the first load
    pub fn launch_key(&self) -> Pubkey {
        self.launch_amm.key()
    }

    pub fn config(&self) -> &CurveConfig {
        self.calculator.config()
    }

    /// Fetch the launch of `mint` and make it the cached launch
    ///
    /// # Returns
    /// The launch account address
    pub async fn load_launch(&mut self, mint: &Pubkey) -> Result<Pubkey> {
        let (launch_key, _) = launch_address(mint);
        let account = self.get_account_with_retry(&launch_key).await?;

        if account.owner != LAUNCH_PROGRAM_ID {
            bail!(
                "Launch {} is owned by {}, expected {}",
                launch_key,
                account.owner,
                LAUNCH_PROGRAM_ID
            );
        }

        let launch_amm = LaunchAmm::load_launch(&KeyedAccount {
            key: launch_key,
            account: AccountData {
                data: account.data,
                owner: account.owner,
            },
        })?;
        self.launch_amm = launch_amm.with_config(self.calculator.config().clone());

        log::debug!(
            "Loaded launch {} for mint {}: {} SOL raised, status {:?}",
            launch_key,
            mint,
            lamports_to_sol(self.launch_amm.launch.sol_raised),
            self.launch_amm.launch.status
        );

        Ok(launch_key)
    }

    /// Refresh the cached launch with the latest chain data
    pub async fn update_accounts(&mut self) -> Result<()> {
        if self.launch_amm.key() == Pubkey::default() {
            bail!("No launch loaded");
        }

        let accounts_to_update = self.launch_amm.get_accounts_to_update();
        let mut account_map = HashMap::new();
        for account_key in accounts_to_update {
            let account = self.rpc_client.get_account(&account_key).await?;
            account_map.insert(
                account_key,
                AccountData {
                    data: account.data,
                    owner: account.owner,
                },
            );
        }
        self.launch_amm.update(&account_map)?;

        Ok(())
    }

    /// Quote a buy of `mint` tokens
    ///
    /// # Arguments
    /// * `mint` - The token mint of the launch
    /// * `sol_amount` - Lamports to spend, fee included
    ///
    /// # Returns
    /// A `Quote` with the token base units received and the platform fee
    pub async fn quote_buy(&mut self, mint: &Pubkey, sol_amount: u64) -> Result<Quote> {
        self.refresh_launch(mint).await?;
        let unix_timestamp = self.cluster_time().await?;

        self.launch_amm.quote(&QuoteParams {
            amount: sol_amount,
            side: TradeSide::Buy,
            unix_timestamp,
        })
    }

    /// Quote a sell of `mint` tokens
    ///
    /// # Arguments
    /// * `mint` - The token mint of the launch
    /// * `token_amount` - Token base units to sell
    ///
    /// # Returns
    /// A `Quote` with the lamports received after the platform fee
    pub async fn quote_sell(&mut self, mint: &Pubkey, token_amount: u64) -> Result<Quote> {
        self.refresh_launch(mint).await?;
        let unix_timestamp = self.cluster_time().await?;

        self.launch_amm.quote(&QuoteParams {
            amount: token_amount,
            side: TradeSide::Sell,
            unix_timestamp,
        })
    }

    /// Tokens for `sol_amount` SOL against the cached launch, `0.0` when no quote is available
    pub fn preview_tokens_for_sol(&self, sol_amount: f64) -> f64 {
        self.cached_curve()
            .and_then(|(virtual_sol, constant_k)| {
                Ok(self
                    .calculator
                    .try_quote_tokens_at_reserve(sol_amount, &virtual_sol, &constant_k)?)
            })
            .unwrap_or_else(|e| {
                log::warn!("Error calculating tokens: {}", e);
                0.0
            })
    }

    /// SOL for `token_amount` tokens against the cached launch, `0.0` when no quote is available
    pub fn preview_sol_for_tokens(&self, token_amount: f64) -> f64 {
        self.cached_curve()
            .and_then(|(virtual_sol, constant_k)| {
                Ok(self
                    .calculator
                    .try_quote_sol_at_reserve(token_amount, &virtual_sol, &constant_k)?)
            })
            .unwrap_or_else(|e| {
                log::warn!("Error calculating SOL: {}", e);
                0.0
            })
    }

    /// Fetch a buyer record of the cached launch, bypassing the cache
    pub async fn get_buyer_record(
        &self,
        buyer: &Pubkey,
        commitment_level: CommitmentLevel,
    ) -> Result<BuyerRecord> {
        if self.launch_amm.key() == Pubkey::default() {
            bail!("No launch loaded");
        }

        let (record_key, _) = buyer_record_address(&self.launch_amm.key(), buyer);

        let record_data = self
            .rpc_client
            .get_account_with_commitment(
                &record_key,
                CommitmentConfig {
                    commitment: commitment_level,
                },
            )
            .await?
            .value
            .context("Buyer record not found")?;

        decode_buyer_record(&record_data.data)
    }

    async fn refresh_launch(&mut self, mint: &Pubkey) -> Result<()> {
        if self.launch_amm.key() != launch_address(mint).0 {
            // freshly loaded, no update needed
            self.load_launch(mint).await?;
            return Ok(());
        }

        self.update_accounts().await
    }

    async fn get_account_with_retry(&self, key: &Pubkey) -> Result<Account> {
        let mut attempt = 1;
        loop {
            match self.rpc_client.get_account(key).await {
                Ok(account) => return Ok(account),
                Err(e) if attempt < LOAD_ATTEMPTS => {
                    log::warn!(
                        "Attempt {} failed to get account {}: {}. Retrying...",
                        attempt,
                        key,
                        e
                    );
                    attempt += 1;
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to get account {} after {} attempts", key, attempt)
                    });
                }
            }
        }
    }

    /// Exact virtual SOL reserve (lamports) and `k` of the cached launch
    fn cached_curve(&self) -> Result<(BigUint, BigUint)> {
        if self.launch_amm.key() == Pubkey::default() {
            bail!("No launch loaded");
        }

        let lamports = self.launch_amm.launch.current_virtual_sol()?;

        Ok((
            BigUint::from(lamports),
            BigUint::from(self.launch_amm.launch.constant_k),
        ))
    }

    /// Unix time of the latest slot, checked against the launch deadline
    async fn cluster_time(&self) -> Result<i64> {
        let slot = self.rpc_client.get_slot().await?;
        self.rpc_client
            .get_block_time(slot)
            .await
            .with_context(|| format!("Failed to get block time of slot {}", slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TierParams, state::LaunchStatus};

    fn sdk_with_tier_1_launch() -> BattleCurveSDK {
        let mut sdk = BattleCurveSDK::new(
            "http://127.0.0.1:8899",
            CommitmentLevel::Confirmed,
            CurveConfig::default(),
        )
        .unwrap();
        let params = TierParams::for_tier(1).unwrap();
        sdk.launch_amm.key = launch_address(&Pubkey::new_unique()).0;
        sdk.launch_amm.launch = TokenLaunch {
            tier: 1,
            virtual_sol_init: params.virtual_sol_init,
            constant_k: params.constant_k,
            target_sol: params.target_sol,
            status: LaunchStatus::Active,
            ..TokenLaunch::default()
        };
        sdk
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CurveConfig {
            platform_fee_bps: 10_001,
            ..CurveConfig::default()
        };
        assert!(
            BattleCurveSDK::new("http://127.0.0.1:8899", CommitmentLevel::Confirmed, config)
                .is_err()
        );
    }

    #[test]
    fn test_preview_without_launch_is_zero() {
        let sdk = BattleCurveSDK::new(
            "http://127.0.0.1:8899",
            CommitmentLevel::Confirmed,
            CurveConfig::default(),
        )
        .unwrap();
        assert_eq!(sdk.launch_key(), Pubkey::default());
        assert_eq!(sdk.preview_tokens_for_sol(1.0), 0.0);
        assert_eq!(sdk.preview_sol_for_tokens(1.0), 0.0);
    }

    #[test]
    fn test_preview_against_cached_launch() {
        let sdk = sdk_with_tier_1_launch();

        // 0.353 SOL reserve, k = 378769e21: y = 1_073_000_000_000_000,
        // new_y = k / 1_353_000_000 = 279_947_524_020_694
        let tokens = sdk.preview_tokens_for_sol(1.0);
        assert!((tokens - 793_052_475.979306).abs() < 1e-3);

        let sol = sdk.preview_sol_for_tokens(tokens);
        assert!(sol > 0.0 && sol <= 1.0);

        assert_eq!(sdk.preview_tokens_for_sol(-1.0), 0.0);
    }

    #[test]
    fn test_preview_uses_exact_reserve() {
        let mut sdk = sdk_with_tier_1_launch();
        // 65.180633292 SOL does not survive a round trip through f64
        sdk.launch_amm.launch.sol_raised = 65_180_633_292 - 353_000_000;

        assert_eq!(sdk.preview_tokens_for_sol(1.0), 87_806.149537);
    }

    #[tokio::test]
    async fn test_get_buyer_record_requires_launch() {
        let sdk = BattleCurveSDK::new(
            "http://127.0.0.1:8899",
            CommitmentLevel::Confirmed,
            CurveConfig::default(),
        )
        .unwrap();
        let err = sdk
            .get_buyer_record(&Pubkey::new_unique(), CommitmentLevel::Confirmed)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No launch loaded"));
    }
}
