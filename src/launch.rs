use anyhow::{Context, Result, bail};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use crate::{
    amm::*,
    config::{CurveConfig, TierParams},
    constants::{LAUNCH_PROGRAM_ID, MAX_BPS},
    curve::{buy_base_units, sell_base_units},
    state::{TokenLaunch, decode_token_launch},
};

#[derive(Clone)]
pub struct LaunchAmm {
    pub key: Pubkey,
    pub launch: TokenLaunch,
    pub config: CurveConfig,
}

impl Amm for LaunchAmm {
    fn load_launch(launch: &KeyedAccount) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(LaunchAmm {
            key: launch.key,
            launch: decode_token_launch(&launch.account.data)?,
            config: CurveConfig::default(),
        })
    }

    fn program_id(&self) -> Pubkey {
        LAUNCH_PROGRAM_ID
    }

    fn key(&self) -> Pubkey {
        self.key
    }

    fn get_accounts_to_update(&self) -> Vec<Pubkey> {
        vec![self.key]
    }

    fn update(&mut self, account_map: &AccountMap) -> Result<()> {
        let account = account_map
            .get(&self.key)
            .context("Token launch account not found")?;

        if account.owner != self.program_id() {
            bail!(
                "Token launch {} is owned by {}, expected {}",
                self.key,
                account.owner,
                self.program_id()
            );
        }

        self.launch = decode_token_launch(&account.data)?;

        match TierParams::for_tier(self.launch.tier) {
            Ok(params) if params.constant_k != self.launch.constant_k => log::warn!(
                "Launch {} constant k {} differs from tier {} preset {}",
                self.key,
                self.launch.constant_k,
                params.tier,
                params.constant_k
            ),
            Ok(_) => {}
            Err(e) => log::warn!("Launch {}: {}", self.key, e),
        }

        Ok(())
    }

    fn quote(&self, quote_params: &QuoteParams) -> Result<Quote> {
        if !self.is_active() {
            bail!(
                "Launch is not accepting trades, status {:?}",
                self.launch.status
            );
        }
        if self.launch.is_expired(quote_params.unix_timestamp) {
            bail!(
                "Launch deadline {} has passed at {}",
                self.launch.deadline,
                quote_params.unix_timestamp
            );
        }

        let x = BigUint::from(self.launch.current_virtual_sol()?);
        let k = BigUint::from(self.launch.constant_k);

        let quote = match quote_params.side {
            TradeSide::Buy => self.quote_buy(quote_params.amount, &x, &k)?,
            TradeSide::Sell => self.quote_sell(quote_params.amount, &x, &k)?,
        };

        log::debug!(
            "{:?} quote on {}: {} in, {} out, {} fee",
            quote_params.side,
            self.key,
            quote.in_amount,
            quote.out_amount,
            quote.fee_amount
        );

        Ok(quote)
    }

    fn is_active(&self) -> bool {
        self.launch.is_tradable()
    }
}

impl LaunchAmm {
    pub fn with_config(mut self, config: CurveConfig) -> Self {
        self.config = config;
        self
    }

    /// Platform fee as a percentage
    pub fn fee_pct(&self) -> Decimal {
        Decimal::new(self.config.platform_fee_bps as i64, 2)
    }

    /// Market cap in micro-USD for a SOL price in micro-USD
    pub fn market_cap_usd(&self, sol_price_usd: u64) -> Result<u64> {
        let virtual_sol = self.launch.current_virtual_sol()? as u128;
        let virtual_tokens = self
            .launch
            .constant_k
            .checked_div(virtual_sol)
            .context("Virtual SOL reserve is zero")?;
        if virtual_tokens == 0 {
            bail!("Virtual token reserve is zero");
        }

        let market_cap = virtual_sol
            .checked_mul(sol_price_usd as u128)
            .and_then(|v| v.checked_mul(self.config.real_supply as u128))
            .context("Market cap overflow")?
            / virtual_tokens
            / 10u128.pow(self.config.sol_decimals);

        u64::try_from(market_cap).context("Market cap overflows u64")
    }

    fn quote_buy(&self, amount: u64, x: &BigUint, k: &BigUint) -> Result<Quote> {
        if amount < self.config.min_sol_per_tx {
            bail!(
                "Amount too small: {} < {} lamports",
                amount,
                self.config.min_sol_per_tx
            );
        }
        if amount > self.config.max_sol_per_tx {
            bail!(
                "Amount too large: {} > {} lamports",
                amount,
                self.config.max_sol_per_tx
            );
        }

        let fee_amount = get_platform_fee(amount, self.config.platform_fee_bps)?;
        let sol_to_curve = amount
            .checked_sub(fee_amount)
            .context("Fee exceeds amount")?;

        let step = buy_base_units(x, &BigUint::from(sol_to_curve), k)?;
        let out_amount = step
            .amount_out
            .to_u64()
            .context("Token output overflows u64")?;

        if out_amount == 0 {
            bail!("Output is zero");
        }

        let total_sold = self
            .launch
            .total_tokens_sold
            .checked_add(out_amount)
            .context("Tokens sold overflow")?;
        if total_sold > self.config.curve_tokens {
            bail!(
                "Exceeds curve supply: {} > {}",
                total_sold,
                self.config.curve_tokens
            );
        }

        Ok(Quote {
            in_amount: amount,
            out_amount,
            fee_amount,
            fee_pct: self.fee_pct(),
        })
    }

    /// Advisory: no sell instruction exists on the launch program
    fn quote_sell(&self, amount: u64, x: &BigUint, k: &BigUint) -> Result<Quote> {
        if amount == 0 {
            bail!("Amount too small: 0 tokens");
        }

        let step = sell_base_units(x, &BigUint::from(amount), k)?;
        let gross = step
            .amount_out
            .to_u64()
            .context("SOL output overflows u64")?;

        if gross > self.launch.sol_raised {
            bail!(
                "Insufficient liquidity: {} > {} lamports raised",
                gross,
                self.launch.sol_raised
            );
        }

        let fee_amount = get_platform_fee(gross, self.config.platform_fee_bps)?;
        let out_amount = gross
            .checked_sub(fee_amount)
            .context("Fee exceeds amount")?;

        if out_amount == 0 {
            bail!("Output is zero");
        }

        Ok(Quote {
            in_amount: amount,
            out_amount,
            fee_amount,
            fee_pct: self.fee_pct(),
        })
    }
}

/// Floor of `amount * fee_bps / 10_000`
pub fn get_platform_fee(amount: u64, fee_bps: u64) -> Result<u64> {
    let fee = (amount as u128)
        .checked_mul(fee_bps as u128)
        .context("Fee overflow")?
        / MAX_BPS as u128;
    u64::try_from(fee).context("Fee overflows u64")
}
