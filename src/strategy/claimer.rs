//! Per-account claim and sweep
//!
//! One poll of one account: read balance and player record, compute accrual,
//! claim when the fishing cycle is complete, and optionally forward the
//! reward balance to a main wallet.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::funding::CoinAggregator;
use super::reward::{FinishingInfo, RewardCalculator};
use crate::adapters::ChainClient;
use crate::config::AppConfig;
use crate::domain::{AccountState, ObjectId, ObjectRef, RewardSchedule, SuiAddress, SUI_COIN_TYPE};
use crate::error::{ClaimerError, Result};
use crate::persistence::Credential;
use crate::signing::Wallet;
use crate::transaction::{ProgrammableTransactionBuilder, TransactionData};

/// The system clock object has been shared since genesis.
const CLOCK_INITIAL_SHARED_VERSION: u64 = 1;

/// Upper bound on gas payment objects per transaction.
const MAX_GAS_COINS: usize = 255;

/// Typed view of the contract and sweep settings
#[derive(Debug, Clone)]
pub struct ClaimSettings {
    pub package: ObjectId,
    pub module: String,
    pub claim_function: String,
    pub state_object: ObjectId,
    pub clock_object: ObjectId,
    pub reward_coin_type: String,
    pub reward_decimals: u32,
    pub gas_budget: u64,
    /// `None` disables the sweep step.
    pub sweep: Option<SweepSettings>,
}

#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub main_wallet: SuiAddress,
    /// Whole tokens; a sweep runs when the balance is at least this much.
    pub min_balance: Decimal,
}

impl ClaimSettings {
    /// Resolve settings from config. `force_sweep` turns the sweep on
    /// regardless of `sweep.enabled`.
    pub fn from_config(config: &AppConfig, force_sweep: bool) -> Result<Self> {
        let game = &config.game;
        let sweep = if config.sweep.enabled || force_sweep {
            let main_wallet = config
                .sweep
                .main_wallet()
                .map_err(ClaimerError::Validation)?
                .ok_or_else(|| {
                    ClaimerError::Validation("sweep requires sweep.main_wallet".to_string())
                })?;
            Some(SweepSettings {
                main_wallet,
                min_balance: config.sweep.min_balance,
            })
        } else {
            None
        };

        Ok(Self {
            package: game.package().map_err(ClaimerError::Validation)?,
            module: game.module.clone(),
            claim_function: game.claim_function.clone(),
            state_object: game.state_object().map_err(ClaimerError::Validation)?,
            clock_object: game.clock_object().map_err(ClaimerError::Validation)?,
            reward_coin_type: game.reward_coin_type.clone(),
            reward_decimals: game.reward_decimals,
            gas_budget: game.gas_budget,
            sweep,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Cycle not complete yet
    NotReady,
    /// Claimable, but claiming was not requested
    Ready,
    Claimed { digest: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepStatus {
    BelowThreshold,
    Sent { digest: String, amount: Decimal },
    Failed { error: String },
}

/// Result of polling one account
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub index: usize,
    pub address: SuiAddress,
    /// Reward token balance in base units.
    pub balance_raw: u128,
    /// Reward token balance in whole tokens.
    pub balance: Decimal,
    /// `None` when the player has no on-chain record yet.
    pub account: Option<AccountState>,
    pub finishing: FinishingInfo,
    pub claim: ClaimStatus,
    pub sweep: Option<SweepStatus>,
}

/// Processes one stored account per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountPoller: Send + Sync {
    async fn poll_account(&self, index: usize, credential: &Credential) -> Result<AccountReport>;
}

/// Claims and sweeps through a [`ChainClient`]
pub struct ClaimService<C: ChainClient> {
    client: C,
    settings: ClaimSettings,
    schedule: Option<RewardSchedule>,
    claim_enabled: bool,
    state_version: OnceCell<u64>,
}

impl<C: ChainClient> ClaimService<C> {
    pub fn new(client: C, settings: ClaimSettings, schedule: Option<RewardSchedule>) -> Self {
        Self {
            client,
            settings,
            schedule,
            claim_enabled: true,
            state_version: OnceCell::new(),
        }
    }

    /// Report only: never submit claims or sweeps.
    pub fn read_only(mut self) -> Self {
        self.claim_enabled = false;
        self.settings.sweep = None;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &ClaimSettings {
        &self.settings
    }

    /// Poll one account at `now_ms`.
    ///
    /// Failures reading chain state propagate; a failed claim or sweep is
    /// reported in the returned [`AccountReport`] instead.
    pub async fn poll_at(
        &self,
        index: usize,
        credential: &Credential,
        now_ms: u64,
    ) -> Result<AccountReport> {
        let wallet = Wallet::from_mnemonic(&credential.phrase)?;
        let address = wallet.address();
        if address != credential.address {
            warn!(
                "Stored address {} does not match phrase-derived {}; using derived",
                credential.address, address
            );
        }

        let coin_type = &self.settings.reward_coin_type;
        let mut balance_raw = self.client.get_balance(&address, coin_type).await?;
        let account = self
            .client
            .get_account_state(&self.settings.state_object, &address)
            .await?;

        let finishing = RewardCalculator::compute(self.schedule.as_ref(), account.as_ref(), now_ms)?;
        debug!(
            "[{}] {} progress {}% unclaimed {}",
            index, address, finishing.progress, finishing.unclaimed_amount
        );

        let claim = if !finishing.is_claimable() {
            ClaimStatus::NotReady
        } else if !self.claim_enabled {
            ClaimStatus::Ready
        } else {
            match self.claim(&wallet).await {
                Ok(digest) => {
                    info!(
                        "[{}] Claimed {} for {} ({})",
                        index, finishing.unclaimed_amount, address, digest
                    );
                    ClaimStatus::Claimed { digest }
                }
                Err(e) => {
                    warn!("[{}] Claim failed for {}: {}", index, address, e);
                    ClaimStatus::Failed {
                        error: e.to_string(),
                    }
                }
            }
        };

        if matches!(claim, ClaimStatus::Claimed { .. }) {
            balance_raw = self.client.get_balance(&address, coin_type).await?;
        }
        let balance = to_tokens(balance_raw, self.settings.reward_decimals)?;

        let sweep = match &self.settings.sweep {
            Some(sweep) => Some(self.sweep(&wallet, sweep, balance_raw, balance).await),
            None => None,
        };

        Ok(AccountReport {
            index,
            address,
            balance_raw,
            balance,
            account,
            finishing,
            claim,
            sweep,
        })
    }

    /// Build, dry-run, sign and execute the claim call. Returns the digest.
    async fn claim(&self, wallet: &Wallet) -> Result<String> {
        let state_version = *self
            .state_version
            .get_or_try_init(|| {
                self.client
                    .get_initial_shared_version(&self.settings.state_object)
            })
            .await?;

        let mut ptb = ProgrammableTransactionBuilder::new();
        let state = ptb.shared_object(self.settings.state_object, state_version, true)?;
        let clock = ptb.shared_object(
            self.settings.clock_object,
            CLOCK_INITIAL_SHARED_VERSION,
            false,
        )?;
        ptb.move_call(
            self.settings.package,
            &self.settings.module,
            &self.settings.claim_function,
            vec![],
            vec![state, clock],
        )?;

        self.submit(wallet, ptb, "claim").await
    }

    async fn sweep(
        &self,
        wallet: &Wallet,
        sweep: &SweepSettings,
        balance_raw: u128,
        balance: Decimal,
    ) -> SweepStatus {
        if balance_raw == 0 || balance < sweep.min_balance {
            debug!(
                "Balance {} below sweep threshold {}",
                balance, sweep.min_balance
            );
            return SweepStatus::BelowThreshold;
        }

        match self.send_all(wallet, sweep.main_wallet, balance_raw).await {
            Ok(digest) => {
                info!(
                    "Sent {} from {} to main wallet {} ({})",
                    balance,
                    wallet.address(),
                    sweep.main_wallet,
                    digest
                );
                SweepStatus::Sent {
                    digest,
                    amount: balance,
                }
            }
            Err(e) => {
                warn!("Failed to send tokens from {}: {}", wallet.address(), e);
                SweepStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn send_all(&self, wallet: &Wallet, recipient: SuiAddress, amount: u128) -> Result<String> {
        let amount = u64::try_from(amount).map_err(|_| {
            ClaimerError::Validation(format!("balance {} exceeds a single transfer", amount))
        })?;

        let mut ptb = ProgrammableTransactionBuilder::new();
        let coin = CoinAggregator::new(&self.client)
            .select_funding(
                &wallet.address(),
                &self.settings.reward_coin_type,
                amount,
                &mut ptb,
            )
            .await?;
        let recipient = ptb.pure_address(recipient)?;
        ptb.transfer_objects(vec![coin], recipient)?;

        self.submit(wallet, ptb, "transfer").await
    }

    async fn submit(
        &self,
        wallet: &Wallet,
        ptb: ProgrammableTransactionBuilder,
        label: &str,
    ) -> Result<String> {
        let sender = wallet.address();
        let gas_payment = self.select_gas(&sender).await?;
        let gas_price = self.client.reference_gas_price().await?;

        let data = TransactionData::new_programmable(
            sender,
            gas_payment,
            ptb.finish(),
            self.settings.gas_budget,
            gas_price,
        );
        let signed = wallet.sign_transaction(&data)?;

        let dry_run = self.client.dry_run(&signed.tx_bytes).await?;
        if !dry_run.success {
            return Err(ClaimerError::Transaction(format!(
                "{} dry run failed: {}",
                label,
                dry_run.error.unwrap_or_default()
            )));
        }

        let outcome = self
            .client
            .execute(&signed.tx_bytes, &signed.signature)
            .await?;
        if !outcome.status.success {
            return Err(ClaimerError::Transaction(format!(
                "{} {} failed: {}",
                label,
                outcome.digest,
                outcome.status.error.unwrap_or_default()
            )));
        }
        Ok(outcome.digest)
    }

    /// Greedily pick SUI coins until the gas budget is covered.
    async fn select_gas(&self, owner: &SuiAddress) -> Result<Vec<ObjectRef>> {
        let budget = u128::from(self.settings.gas_budget);
        let mut total: u128 = 0;
        let mut payment = Vec::new();
        let mut cursor = None;

        loop {
            let page = self
                .client
                .list_coins(owner, SUI_COIN_TYPE, cursor)
                .await?;
            for coin in &page.data {
                if payment.len() == MAX_GAS_COINS {
                    break;
                }
                total += u128::from(coin.balance);
                payment.push(coin.object_ref());
                if total >= budget {
                    return Ok(payment);
                }
            }
            if !page.has_next_page || page.data.is_empty() || payment.len() == MAX_GAS_COINS {
                break;
            }
            cursor = page.next_cursor;
        }

        Err(ClaimerError::InsufficientFunds {
            coin_type: SUI_COIN_TYPE.to_string(),
            required: self.settings.gas_budget,
            available: total,
        })
    }
}

#[async_trait]
impl<C: ChainClient> AccountPoller for ClaimService<C> {
    async fn poll_account(&self, index: usize, credential: &Credential) -> Result<AccountReport> {
        self.poll_at(index, credential, now_ms()).await
    }
}

pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Base units to whole tokens.
pub fn to_tokens(raw: u128, decimals: u32) -> Result<Decimal> {
    i128::try_from(raw)
        .ok()
        .and_then(|raw| Decimal::try_from_i128_with_scale(raw, decimals).ok())
        .map(|d| d.normalize())
        .ok_or_else(|| ClaimerError::Validation(format!("balance {} out of range", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CoinSource, ExecutionStatus, TransactionOutcome};
    use crate::domain::{CoinObject, CoinPage, ObjectDigest};
    use crate::transaction::data::TransactionKind;
    use crate::transaction::{Argument, CallArg, Command, ObjectArg, ProgrammableTransaction};
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const OCEAN: &str =
        "0xa8816d3a6e3136e86bc2873b1f94a15cadc8af2703c075f2d546c2ae367f4df9::ocean::OCEAN";
    const NOW: u64 = 1_700_000_000_000;
    const HOUR_MS: u64 = 3_600_000;

    /// In-memory chain: queued balances, a player record, coins per type.
    #[derive(Default)]
    struct FakeChain {
        balances: Mutex<VecDeque<u128>>,
        account: Option<AccountState>,
        coins: HashMap<String, Vec<u64>>,
        dry_run_error: Option<String>,
        executed: Mutex<Vec<TransactionData>>,
        version_lookups: Mutex<usize>,
    }

    impl FakeChain {
        fn with_gas(mut self) -> Self {
            self.coins.insert(SUI_COIN_TYPE.to_string(), vec![4_000_000, 8_000_000]);
            self
        }

        fn executed(&self) -> Vec<TransactionData> {
            self.executed.lock().unwrap().clone()
        }
    }

    fn coin(seed: u8, index: usize, balance: u64) -> CoinObject {
        let mut id = [0u8; 32];
        id[0] = seed;
        id[31] = index as u8;
        CoinObject {
            coin_object_id: SuiAddress::new(id),
            version: 3,
            digest: ObjectDigest::new([seed; 32]),
            balance,
        }
    }

    #[async_trait]
    impl CoinSource for FakeChain {
        async fn list_coins(
            &self,
            _owner: &SuiAddress,
            coin_type: &str,
            _cursor: Option<String>,
        ) -> Result<CoinPage> {
            let seed = if coin_type == SUI_COIN_TYPE { 0x51 } else { 0x0c };
            let data = self
                .coins
                .get(coin_type)
                .map(|balances| {
                    balances
                        .iter()
                        .enumerate()
                        .map(|(i, b)| coin(seed, i, *b))
                        .collect()
                })
                .unwrap_or_default();
            Ok(CoinPage {
                data,
                next_cursor: None,
                has_next_page: false,
            })
        }
    }

    #[async_trait]
    impl ChainClient for FakeChain {
        async fn get_balance(&self, _owner: &SuiAddress, _coin_type: &str) -> Result<u128> {
            let mut balances = self.balances.lock().unwrap();
            let value = if balances.len() > 1 {
                balances.pop_front()
            } else {
                balances.front().copied()
            };
            Ok(value.unwrap_or(0))
        }

        async fn get_account_state(
            &self,
            _parent: &ObjectId,
            _owner: &SuiAddress,
        ) -> Result<Option<AccountState>> {
            Ok(self.account.clone())
        }

        async fn get_initial_shared_version(&self, _id: &ObjectId) -> Result<u64> {
            *self.version_lookups.lock().unwrap() += 1;
            Ok(42)
        }

        async fn reference_gas_price(&self) -> Result<u64> {
            Ok(750)
        }

        async fn dry_run(&self, _tx_bytes: &[u8]) -> Result<ExecutionStatus> {
            Ok(match &self.dry_run_error {
                Some(e) => ExecutionStatus::failure(e.clone()),
                None => ExecutionStatus::success(),
            })
        }

        async fn execute(&self, tx_bytes: &[u8], _signature: &str) -> Result<TransactionOutcome> {
            let data: TransactionData = bcs::from_bytes(tx_bytes)?;
            let mut executed = self.executed.lock().unwrap();
            executed.push(data);
            Ok(TransactionOutcome {
                digest: format!("digest-{}", executed.len()),
                status: ExecutionStatus::success(),
            })
        }
    }

    fn schedule() -> RewardSchedule {
        RewardSchedule::from_json(
            r#"{
                "initReward": 500000000,
                "boatLevel": [{"fishing_time": 20000}],
                "meshLevel": [{"speed": 10000}],
                "fishTypeLevel": [{"rate": 18000}],
                "specialBoost": []
            }"#,
        )
        .unwrap()
    }

    fn player(last_claim: u64) -> AccountState {
        AccountState {
            boat: 0,
            mesh: 0,
            seafood: 0,
            last_claim,
            special_boost: None,
            special_boost_start_time: None,
        }
    }

    fn settings(sweep: Option<SweepSettings>) -> ClaimSettings {
        let mut settings = ClaimSettings::from_config(&AppConfig::default(), false).unwrap();
        settings.sweep = sweep;
        settings
    }

    fn credential() -> Credential {
        Credential {
            address: Wallet::from_mnemonic(PHRASE).unwrap().address(),
            phrase: PHRASE.to_string(),
        }
    }

    fn kind(data: &TransactionData) -> &ProgrammableTransaction {
        let TransactionData::V1(v1) = data;
        let TransactionKind::ProgrammableTransaction(pt) = &v1.kind;
        pt
    }

    #[tokio::test]
    async fn test_not_ready_does_not_submit() {
        let chain = FakeChain {
            balances: Mutex::new(VecDeque::from([1_000_000_000])),
            account: Some(player(NOW - HOUR_MS)),
            ..Default::default()
        }
        .with_gas();
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(report.claim, ClaimStatus::NotReady);
        assert_eq!(report.finishing.progress, dec!(50));
        assert_eq!(report.balance, dec!(1));
        assert!(report.sweep.is_none());
        assert!(service.client().executed().is_empty());
    }

    #[tokio::test]
    async fn test_claims_when_cycle_complete() {
        let chain = FakeChain {
            balances: Mutex::new(VecDeque::from([1_000_000_000, 4_600_000_000])),
            account: Some(player(NOW - 3 * HOUR_MS)),
            ..Default::default()
        }
        .with_gas();
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        let report = service.poll_at(2, &credential(), NOW).await.unwrap();
        assert_eq!(
            report.claim,
            ClaimStatus::Claimed {
                digest: "digest-1".to_string()
            }
        );
        assert_eq!(report.index, 2);
        assert_eq!(report.balance, dec!(4.6));

        let executed = service.client().executed();
        assert_eq!(executed.len(), 1);
        let TransactionData::V1(v1) = &executed[0];
        assert_eq!(v1.sender, credential().address);
        assert_eq!(v1.gas_data.price, 750);
        assert_eq!(v1.gas_data.budget, 10_000_000);
        // 4M alone doesn't cover the budget, 4M + 8M does
        assert_eq!(v1.gas_data.payment.len(), 2);

        let pt = kind(&executed[0]);
        let settings = service.settings();
        assert_eq!(
            pt.inputs,
            vec![
                CallArg::Object(ObjectArg::SharedObject {
                    id: settings.state_object,
                    initial_shared_version: 42,
                    mutable: true,
                }),
                CallArg::Object(ObjectArg::SharedObject {
                    id: settings.clock_object,
                    initial_shared_version: CLOCK_INITIAL_SHARED_VERSION,
                    mutable: false,
                }),
            ]
        );
        match &pt.commands[..] {
            [Command::MoveCall(call)] => {
                assert_eq!(call.package, settings.package);
                assert_eq!(call.module, "game");
                assert_eq!(call.function, "claim");
                assert_eq!(call.arguments, vec![Argument::Input(0), Argument::Input(1)]);
            }
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_player_claims_initial_reward() {
        let chain = FakeChain::default().with_gas();
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert!(report.account.is_none());
        assert_eq!(report.finishing.unclaimed_amount.to_string(), "0.50000");
        assert!(matches!(report.claim, ClaimStatus::Claimed { .. }));
    }

    #[tokio::test]
    async fn test_shared_version_is_looked_up_once() {
        let chain = FakeChain::default().with_gas();
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        service.poll_at(0, &credential(), NOW).await.unwrap();
        service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(service.client().executed().len(), 2);
        assert_eq!(*service.client().version_lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_schedule_never_claims() {
        let chain = FakeChain {
            account: Some(player(0)),
            ..Default::default()
        }
        .with_gas();
        let service = ClaimService::new(chain, settings(None), None);

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(report.finishing, FinishingInfo::zero());
        assert_eq!(report.claim, ClaimStatus::NotReady);
    }

    #[tokio::test]
    async fn test_dry_run_failure_is_reported_not_raised() {
        let chain = FakeChain {
            account: Some(player(0)),
            dry_run_error: Some("MoveAbort(claim, 1)".to_string()),
            ..Default::default()
        }
        .with_gas();
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        match report.claim {
            ClaimStatus::Failed { error } => assert!(error.contains("MoveAbort")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(service.client().executed().is_empty());
    }

    #[tokio::test]
    async fn test_without_gas_coins_claim_fails() {
        let chain = FakeChain {
            account: Some(player(0)),
            ..Default::default()
        };
        let service = ClaimService::new(chain, settings(None), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert!(matches!(report.claim, ClaimStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_read_only_reports_ready() {
        let chain = FakeChain {
            account: Some(player(0)),
            ..Default::default()
        }
        .with_gas();
        let sweep = SweepSettings {
            main_wallet: "0xb0b".parse().unwrap(),
            min_balance: dec!(0),
        };
        let service =
            ClaimService::new(chain, settings(Some(sweep)), Some(schedule())).read_only();

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(report.claim, ClaimStatus::Ready);
        assert!(report.sweep.is_none());
        assert!(service.client().executed().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_transfers_whole_balance() {
        let main_wallet: SuiAddress = "0xb46033278e3f482e620d08c18bb7809e93b557da3ced6c863dc417c7ad5d8634"
            .parse()
            .unwrap();
        let mut chain = FakeChain {
            balances: Mutex::new(VecDeque::from([25_000_000_000])),
            account: Some(player(NOW)),
            ..Default::default()
        }
        .with_gas();
        chain
            .coins
            .insert(OCEAN.to_string(), vec![20_000_000_000, 5_000_000_000]);
        let sweep = SweepSettings {
            main_wallet,
            min_balance: dec!(20),
        };
        let service = ClaimService::new(chain, settings(Some(sweep)), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(report.claim, ClaimStatus::NotReady);
        assert_eq!(
            report.sweep,
            Some(SweepStatus::Sent {
                digest: "digest-1".to_string(),
                amount: dec!(25),
            })
        );

        let executed = service.client().executed();
        let pt = kind(&executed[0]);
        // both coins merged, no split since the total is exact
        assert_eq!(
            pt.commands,
            vec![
                Command::MergeCoins(Argument::Input(0), vec![Argument::Input(1)]),
                Command::TransferObjects(vec![Argument::Input(0)], Argument::Input(2)),
            ]
        );
        assert_eq!(pt.inputs[2], CallArg::Pure(main_wallet.as_bytes().to_vec()));
    }

    #[tokio::test]
    async fn test_sweep_below_threshold() {
        let chain = FakeChain {
            balances: Mutex::new(VecDeque::from([19_999_999_999])),
            account: Some(player(NOW)),
            ..Default::default()
        }
        .with_gas();
        let sweep = SweepSettings {
            main_wallet: "0xb0b".parse().unwrap(),
            min_balance: dec!(20),
        };
        let service = ClaimService::new(chain, settings(Some(sweep)), Some(schedule()));

        let report = service.poll_at(0, &credential(), NOW).await.unwrap();
        assert_eq!(report.sweep, Some(SweepStatus::BelowThreshold));
        assert!(service.client().executed().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_phrase_is_an_error() {
        let service = ClaimService::new(FakeChain::default(), settings(None), Some(schedule()));
        let credential = Credential {
            address: SuiAddress::ZERO,
            phrase: "definitely not a mnemonic".to_string(),
        };
        assert!(matches!(
            service.poll_at(0, &credential, NOW).await,
            Err(ClaimerError::Wallet(_))
        ));
    }

    #[test]
    fn test_to_tokens() {
        assert_eq!(to_tokens(1_500_000_000, 9).unwrap(), dec!(1.5));
        assert_eq!(to_tokens(0, 9).unwrap(), dec!(0));
        assert!(to_tokens(u128::MAX, 9).is_err());
    }

    #[test]
    fn test_settings_require_main_wallet_for_sweep() {
        let config = AppConfig::default();
        assert!(ClaimSettings::from_config(&config, false).unwrap().sweep.is_none());
        assert!(ClaimSettings::from_config(&config, true).is_err());
    }
}
