//! Lending protocol implementation

use lendcore_core::{AccountId, BlockHeight};
use lendcore_ledger::{Position, PositionLedger, Stats};
use lendcore_oracle::{normalize_symbol, PriceOracle};
use lendcore_risk::{self as risk, liquidation, LiquidationQuote};

use crate::config::{check_penalty, check_ratios, ProtocolConfig};
use crate::error::ProtocolError;
use crate::event::{EventRecord, Parameter, ProtocolEvent};

/// Collateralized lending protocol
///
/// Owns the ledger and the oracle. State-changing calls take `&mut self`,
/// which makes each check-then-write atomic in a single-threaded host.
/// A host that shares one instance across threads must put it behind a
/// `Mutex` (or equivalent) so operations stay serialized.
///
/// Committed events accumulate until the host drains them with
/// [`LendingProtocol::take_events`]; long-running hosts must drain regularly.
#[derive(Debug, Clone)]
pub struct LendingProtocol {
    config: ProtocolConfig,
    ledger: PositionLedger,
    oracle: PriceOracle,
    block: BlockHeight,
    events: Vec<EventRecord>,
}

impl LendingProtocol {
    /// Create a protocol at block 0
    pub fn new(config: ProtocolConfig) -> Result<Self, ProtocolError> {
        Self::at_block(config, BlockHeight::GENESIS)
    }

    /// Create a protocol whose oracle feed is stamped at `block`
    pub fn at_block(config: ProtocolConfig, block: BlockHeight) -> Result<Self, ProtocolError> {
        config.validate()?;
        let oracle = PriceOracle::new(config.oracle.clone(), block)?;

        tracing::info!(
            symbol = oracle.symbol(),
            min_collateral_ratio = config.min_collateral_ratio,
            liquidation_threshold = config.liquidation_threshold,
            max_loan_amount = config.max_loan_amount,
            block = %block,
            "Lending protocol initialized"
        );

        Ok(Self {
            config,
            ledger: PositionLedger::new(),
            oracle,
            block,
            events: Vec::new(),
        })
    }

    // === Host clock ===

    pub fn block_height(&self) -> BlockHeight {
        self.block
    }

    pub fn set_block_height(&mut self, block: BlockHeight) {
        self.block = block;
    }

    pub fn advance_blocks(&mut self, blocks: u64) -> BlockHeight {
        self.block = self.block.advance(blocks);
        self.block
    }

    // === Position operations ===

    /// Add collateral to the caller's position
    pub fn deposit(&mut self, caller: &AccountId, amount: u64) -> Result<Position, ProtocolError> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(ProtocolError::invalid_amount("deposit must be > 0"));
        }

        let position = self.ledger.get(caller);
        let collateral = position
            .collateral
            .checked_add(amount)
            .ok_or_else(|| ProtocolError::invalid_amount("collateral would overflow"))?;

        let next = position.with_collateral(collateral, self.block);
        self.ledger.commit(caller, next)?;

        tracing::info!(account = %caller, amount, collateral, "Deposit");
        self.emit(ProtocolEvent::Deposit {
            account: caller.clone(),
            amount,
            collateral,
        });
        Ok(next)
    }

    /// Borrow against the caller's collateral.
    ///
    /// The post-borrow position must hold `min_collateral_ratio` at the
    /// price read for this call.
    pub fn borrow(&mut self, caller: &AccountId, amount: u64) -> Result<Position, ProtocolError> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(ProtocolError::invalid_amount("borrow must be > 0"));
        }
        if amount > self.config.max_loan_amount {
            return Err(ProtocolError::LoanLimitExceeded {
                requested: amount,
                limit: self.config.max_loan_amount,
            });
        }

        let price = self.read_price()?;
        let position = self.ledger.get(caller);
        let debt = position
            .debt
            .checked_add(amount)
            .ok_or_else(|| ProtocolError::invalid_amount("debt would overflow"))?;

        let ratio = self.config.min_collateral_ratio;
        if !risk::is_solvent(position.collateral, debt, price, ratio) {
            let available = risk::collateral_value(position.collateral, price);
            let required = risk::required_collateral(debt, ratio);
            tracing::warn!(
                account = %caller,
                amount,
                price,
                available,
                required,
                headroom = risk::max_borrowable(position.collateral, position.debt, price, ratio),
                "Borrow rejected: insufficient collateral"
            );
            return Err(ProtocolError::InsufficientCollateral {
                account: caller.clone(),
                available,
                required,
            });
        }

        let next = position.with_debt(debt, self.block);
        self.ledger.commit(caller, next)?;

        tracing::info!(account = %caller, amount, debt, price, "Borrow");
        self.emit(ProtocolEvent::Borrow {
            account: caller.clone(),
            amount,
            debt,
            price,
        });
        Ok(next)
    }

    /// Repay the caller's debt. Over-payment is clamped to the outstanding
    /// debt; returns the amount actually repaid.
    pub fn repay(&mut self, caller: &AccountId, amount: u64) -> Result<u64, ProtocolError> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(ProtocolError::invalid_amount("repay must be > 0"));
        }

        let position = self.ledger.get(caller);
        if position.debt == 0 {
            return Err(ProtocolError::PositionNotFound {
                account: caller.clone(),
            });
        }

        let repaid = amount.min(position.debt);
        let debt = position.debt - repaid;
        self.ledger.commit(caller, position.with_debt(debt, self.block))?;

        tracing::info!(account = %caller, requested = amount, repaid, debt, "Repay");
        self.emit(ProtocolEvent::Repay {
            account: caller.clone(),
            amount: repaid,
            debt,
        });
        Ok(repaid)
    }

    /// Withdraw collateral. With open debt, the remaining position must
    /// hold `min_collateral_ratio` at the price read for this call.
    pub fn withdraw(&mut self, caller: &AccountId, amount: u64) -> Result<Position, ProtocolError> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(ProtocolError::invalid_amount("withdraw must be > 0"));
        }

        let position = self.ledger.get(caller);
        if amount > position.collateral {
            return Err(ProtocolError::InsufficientCollateral {
                account: caller.clone(),
                available: position.collateral,
                required: amount,
            });
        }
        let collateral = position.collateral - amount;

        if position.debt > 0 {
            let price = self.read_price()?;
            let ratio = self.config.min_collateral_ratio;
            if !risk::is_solvent(collateral, position.debt, price, ratio) {
                let available = risk::collateral_value(collateral, price);
                let required = risk::required_collateral(position.debt, ratio);
                tracing::warn!(
                    account = %caller,
                    amount,
                    price,
                    available,
                    required,
                    "Withdraw rejected: insufficient collateral"
                );
                return Err(ProtocolError::InsufficientCollateral {
                    account: caller.clone(),
                    available,
                    required,
                });
            }
        }

        let next = position.with_collateral(collateral, self.block);
        self.ledger.commit(caller, next)?;

        tracing::info!(account = %caller, amount, collateral, "Withdraw");
        self.emit(ProtocolEvent::Withdraw {
            account: caller.clone(),
            amount,
            collateral,
        });
        Ok(next)
    }

    /// Liquidate an under-collateralized position in full.
    ///
    /// The penalty is reported in the quote; no value is moved.
    pub fn liquidate(
        &mut self,
        liquidator: &AccountId,
        account: &AccountId,
    ) -> Result<LiquidationQuote, ProtocolError> {
        self.ensure_not_paused()?;

        let position = self.ledger.get(account);
        if position.debt == 0 {
            return Err(ProtocolError::PositionNotFound {
                account: account.clone(),
            });
        }

        let price = self.read_price()?;
        let threshold = self.config.liquidation_threshold;
        let quote = liquidation::quote(
            position.collateral,
            position.debt,
            price,
            threshold,
            self.config.liquidation_penalty,
        )
        .ok_or_else(|| ProtocolError::NotLiquidatable {
            account: account.clone(),
            health_factor: risk::health_factor(position.collateral, position.debt, price, threshold),
        })?;

        self.ledger.close(account)?;

        tracing::warn!(
            account = %account,
            liquidator = %liquidator,
            price,
            collateral_seized = quote.collateral_seized,
            debt_cleared = quote.debt_cleared,
            penalty = quote.penalty,
            "Position liquidated"
        );
        self.emit(ProtocolEvent::Liquidation {
            account: account.clone(),
            liquidator: liquidator.clone(),
            price,
            quote,
        });
        Ok(quote)
    }

    /// Flip the pause switch (owner only); returns the new state
    pub fn toggle_pause(&mut self, caller: &AccountId) -> Result<bool, ProtocolError> {
        self.ensure_owner(caller, "toggle pause")?;
        let paused = !self.ledger.is_paused();
        self.ledger.set_paused(paused);

        tracing::warn!(paused, by = %caller, "Pause toggled");
        self.emit(ProtocolEvent::PauseToggled {
            paused,
            by: caller.clone(),
        });
        Ok(paused)
    }

    // === Governance setters ===

    pub fn set_min_collateral_ratio(&mut self, caller: &AccountId, value: u64) -> Result<(), ProtocolError> {
        self.ensure_owner(caller, "set min collateral ratio")?;
        check_ratios(value, self.config.liquidation_threshold)?;
        self.config.min_collateral_ratio = value;
        self.parameter_changed(Parameter::MinCollateralRatio, value, caller);
        Ok(())
    }

    pub fn set_liquidation_threshold(&mut self, caller: &AccountId, value: u64) -> Result<(), ProtocolError> {
        self.ensure_owner(caller, "set liquidation threshold")?;
        check_ratios(self.config.min_collateral_ratio, value)?;
        self.config.liquidation_threshold = value;
        self.parameter_changed(Parameter::LiquidationThreshold, value, caller);
        Ok(())
    }

    pub fn set_max_loan_amount(&mut self, caller: &AccountId, value: u64) -> Result<(), ProtocolError> {
        self.ensure_owner(caller, "set max loan amount")?;
        if value == 0 {
            return Err(ProtocolError::invalid_amount("max_loan_amount must be > 0"));
        }
        self.config.max_loan_amount = value;
        self.parameter_changed(Parameter::MaxLoanAmount, value, caller);
        Ok(())
    }

    pub fn set_liquidation_penalty(&mut self, caller: &AccountId, value: u64) -> Result<(), ProtocolError> {
        self.ensure_owner(caller, "set liquidation penalty")?;
        check_penalty(value)?;
        self.config.liquidation_penalty = value;
        self.parameter_changed(Parameter::LiquidationPenalty, value, caller);
        Ok(())
    }

    // === Oracle administration ===

    /// Regular price update (updaters only, change-limited)
    pub fn update_price(&mut self, caller: &AccountId, price: u64) -> Result<u64, ProtocolError> {
        let price = self.oracle.update_price(price, caller, self.block)?;
        self.price_updated(price, false, caller);
        Ok(price)
    }

    /// Owner-only price overwrite that skips the change limit
    pub fn emergency_price_reset(&mut self, caller: &AccountId, price: u64) -> Result<u64, ProtocolError> {
        let price = self.oracle.emergency_price_reset(price, caller, self.block)?;
        self.price_updated(price, true, caller);
        Ok(price)
    }

    /// Owner-only registration of an additional feed
    pub fn register_price_feed(
        &mut self,
        caller: &AccountId,
        symbol: &str,
        price: u64,
    ) -> Result<(), ProtocolError> {
        self.oracle.register_feed(symbol, price, caller, self.block)?;
        let symbol = normalize_symbol(symbol);
        tracing::info!(symbol = %symbol, price, by = %caller, "Price feed registered");
        self.emit(ProtocolEvent::FeedRegistered {
            symbol,
            price,
            by: caller.clone(),
        });
        Ok(())
    }

    /// Regular update of a named feed (updaters only, change-limited)
    pub fn update_feed_price(
        &mut self,
        caller: &AccountId,
        symbol: &str,
        price: u64,
    ) -> Result<u64, ProtocolError> {
        let price = self.oracle.update_price_of(symbol, price, caller, self.block)?;
        self.feed_updated(normalize_symbol(symbol), price, false, caller);
        Ok(price)
    }

    pub fn add_price_updater(&mut self, caller: &AccountId, updater: AccountId) -> Result<(), ProtocolError> {
        Ok(self.oracle.add_updater(updater, caller)?)
    }

    pub fn remove_price_updater(&mut self, caller: &AccountId, updater: &AccountId) -> Result<(), ProtocolError> {
        Ok(self.oracle.remove_updater(updater, caller)?)
    }

    pub fn set_max_price_age(&mut self, caller: &AccountId, blocks: u64) -> Result<(), ProtocolError> {
        self.oracle.set_max_price_age(blocks, caller)?;
        self.parameter_changed(Parameter::MaxPriceAge, blocks, caller);
        Ok(())
    }

    pub fn set_price_change_limit(&mut self, caller: &AccountId, percent: u64) -> Result<(), ProtocolError> {
        self.oracle.set_price_change_limit(percent, caller)?;
        self.parameter_changed(Parameter::PriceChangeLimit, percent, caller);
        Ok(())
    }

    // === Reads ===

    pub fn get_collateral(&self, account: &AccountId) -> u64 {
        self.ledger.collateral(account)
    }

    pub fn get_debt(&self, account: &AccountId) -> u64 {
        self.ledger.debt(account)
    }

    pub fn get_position(&self, account: &AccountId) -> Position {
        self.ledger.get(account)
    }

    /// Health factor at the current price (100 = at the liquidation threshold)
    pub fn get_health_factor(&self, account: &AccountId) -> Option<u64> {
        let position = self.ledger.get(account);
        let price = self.oracle.get_price(self.block);
        risk::health_factor(
            position.collateral,
            position.debt,
            price,
            self.config.liquidation_threshold,
        )
    }

    pub fn is_paused(&self) -> bool {
        self.ledger.is_paused()
    }

    pub fn get_stats(&self) -> Stats {
        self.ledger.stats()
    }

    /// Positions liquidatable at the current price, with their health factor.
    ///
    /// Empty when there is no usable price, matching `liquidate`, which
    /// fails with `OracleFailure` in that case.
    pub fn liquidatable_positions(&self) -> Vec<(AccountId, Position, Option<u64>)> {
        let price = self.oracle.get_price(self.block);
        if price == 0 {
            return Vec::new();
        }
        let threshold = self.config.liquidation_threshold;

        self.ledger
            .positions()
            .filter(|(_, p)| risk::is_liquidatable(p.collateral, p.debt, price, threshold))
            .map(|(account, p)| {
                let hf = risk::health_factor(p.collateral, p.debt, price, threshold);
                (account.clone(), *p, hf)
            })
            .collect()
    }

    /// Price the protocol would use right now (may be the stale fallback)
    pub fn current_price(&self) -> u64 {
        self.oracle.get_price(self.block)
    }

    /// Price of any registered feed, with the same fallback
    pub fn price_of(&self, symbol: &str) -> Option<u64> {
        self.oracle.price_of(symbol, self.block)
    }

    pub fn is_price_stale(&self) -> bool {
        self.oracle.is_price_stale(self.block)
    }

    pub fn price_age(&self) -> u64 {
        self.oracle.price_age(self.block)
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Drain the event buffer
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // === Internal ===

    fn ensure_not_paused(&self) -> Result<(), ProtocolError> {
        if self.ledger.is_paused() {
            return Err(ProtocolError::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId, action: &'static str) -> Result<(), ProtocolError> {
        if *caller != self.config.owner {
            return Err(ProtocolError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    /// One price read per operation; 0 means no usable price
    fn read_price(&self) -> Result<u64, ProtocolError> {
        let price = self.oracle.get_price(self.block);
        if self.oracle.is_price_stale(self.block) {
            tracing::warn!(
                symbol = self.oracle.symbol(),
                age = self.oracle.price_age(self.block),
                fallback = price,
                "Stale price feed, using base price"
            );
        }
        if price == 0 {
            return Err(ProtocolError::OracleFailure {
                reason: format!("no usable price for {}", self.oracle.symbol()),
            });
        }
        Ok(price)
    }

    fn emit(&mut self, event: ProtocolEvent) {
        self.events.push(EventRecord {
            block: self.block,
            event,
        });
    }

    fn price_updated(&mut self, price: u64, emergency: bool, by: &AccountId) {
        let symbol = self.oracle.symbol().to_string();
        self.feed_updated(symbol, price, emergency, by);
    }

    fn feed_updated(&mut self, symbol: String, price: u64, emergency: bool, by: &AccountId) {
        tracing::info!(symbol = %symbol, price, emergency, by = %by, "Price updated");
        self.emit(ProtocolEvent::PriceUpdated {
            symbol,
            price,
            emergency,
            by: by.clone(),
        });
    }

    fn parameter_changed(&mut self, parameter: Parameter, value: u64, by: &AccountId) {
        tracing::info!(%parameter, value, by = %by, "Parameter changed");
        self.emit(ProtocolEvent::ParameterChanged {
            parameter,
            value,
            by: by.clone(),
        });
    }
}
