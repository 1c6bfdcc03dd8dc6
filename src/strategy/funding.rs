//! Coin selection for transaction inputs
//!
//! Produces a single coin argument worth exactly the required amount, merging
//! as many listed coins as needed and splitting off the remainder.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::adapters::CoinSource;
use crate::domain::{is_native_coin, CoinObject, ObjectId, SuiAddress};
use crate::error::{ClaimerError, Result};
use crate::transaction::{Argument, ProgrammableTransactionBuilder};

/// Maximum coins passed to one `MergeCoins` command.
pub const MERGE_BATCH_SIZE: usize = 500;

/// Most coins one transaction may take as inputs. Sui allows 2048 input
/// objects; the rest is left for the call's own arguments.
pub const MAX_COIN_INPUTS: usize = 2_000;

/// Selects and merges coins of one type to fund a transaction
pub struct CoinAggregator<'a, S: CoinSource + ?Sized> {
    source: &'a S,
    merge_batch_size: usize,
    max_coins: usize,
}

impl<'a, S: CoinSource + ?Sized> CoinAggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            merge_batch_size: MERGE_BATCH_SIZE,
            max_coins: MAX_COIN_INPUTS,
        }
    }

    /// Override the merge batch size (clamped to at least 1).
    pub fn with_merge_batch_size(mut self, size: usize) -> Self {
        self.merge_batch_size = size.max(1);
        self
    }

    /// Override the coin input cap (clamped to at least 1).
    pub fn with_max_coins(mut self, max: usize) -> Self {
        self.max_coins = max.max(1);
        self
    }

    /// Add commands to `ptb` yielding a coin of `coin_type` worth exactly `required`.
    ///
    /// The native coin is split straight off the gas coin. Other types are
    /// collected page by page until the running total covers `required`;
    /// coins past that point are never touched.
    pub async fn select_funding(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        required: u64,
        ptb: &mut ProgrammableTransactionBuilder,
    ) -> Result<Argument> {
        if required == 0 {
            return Err(ClaimerError::Validation(
                "required amount must be greater than zero".to_string(),
            ));
        }

        if is_native_coin(coin_type) {
            let amount = ptb.pure_u64(required)?;
            let gas = ptb.gas();
            return ptb.split_coins(gas, vec![amount]);
        }

        let (collected, total) = self.collect(owner, coin_type, required).await?;
        debug!(
            "Collected {} coin(s) of {} totalling {} for {}",
            collected.len(),
            coin_type,
            total,
            required
        );

        let refs = collected
            .iter()
            .map(|coin| ptb.object(coin.object_ref()))
            .collect::<Result<Vec<Argument>>>()?;
        let Some((&primary, rest)) = refs.split_first() else {
            return Err(insufficient(coin_type, required, total));
        };

        for batch in rest.chunks(self.merge_batch_size) {
            ptb.merge_coins(primary, batch.to_vec())?;
        }

        if total == u128::from(required) {
            return Ok(primary);
        }

        let amount = ptb.pure_u64(required)?;
        ptb.split_coins(primary, vec![amount])
    }

    /// Walk the listing until the running total covers `required`.
    ///
    /// A coin listed twice (objects changing between page calls) counts once.
    async fn collect(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        required: u64,
    ) -> Result<(Vec<CoinObject>, u128)> {
        let required_total = u128::from(required);
        let mut total: u128 = 0;
        let mut collected = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .source
                .list_coins(owner, coin_type, cursor.clone())
                .await?;
            if page.data.is_empty() {
                break;
            }

            for coin in page.data {
                if !seen.insert(coin.coin_object_id) {
                    debug!("Skipping coin {} listed twice", coin.coin_object_id);
                    continue;
                }
                total += u128::from(coin.balance);
                collected.push(coin);
                if total >= required_total {
                    return Ok((collected, total));
                }
                if collected.len() >= self.max_coins {
                    warn!(
                        "{} coins of {} only cover {} of {}",
                        collected.len(),
                        coin_type,
                        total,
                        required
                    );
                    return Err(ClaimerError::Validation(format!(
                        "more than {} coins of {} needed to cover {}; merge them first",
                        self.max_coins, coin_type, required
                    )));
                }
            }

            if !page.has_next_page {
                break;
            }
            cursor = page.next_cursor;
        }

        Err(insufficient(coin_type, required, total))
    }
}

fn insufficient(coin_type: &str, required: u64, available: u128) -> ClaimerError {
    ClaimerError::InsufficientFunds {
        coin_type: coin_type.to_string(),
        required,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoinPage, ObjectDigest, ObjectRef};
    use crate::transaction::{CallArg, Command, ObjectArg};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const OCEAN: &str =
        "0xa8816d3a6e3136e86bc2873b1f94a15cadc8af2703c075f2d546c2ae367f4df9::ocean::OCEAN";

    /// Serves fixed pages; the cursor is the index of the next page.
    struct PagedCoins {
        pages: Vec<Vec<u64>>,
        calls: AtomicUsize,
    }

    impl PagedCoins {
        fn new(pages: Vec<Vec<u64>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn coin_id(page: usize, index: usize) -> SuiAddress {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xc0;
        bytes[28..30].copy_from_slice(&(page as u16).to_be_bytes());
        bytes[30..32].copy_from_slice(&(index as u16).to_be_bytes());
        SuiAddress::new(bytes)
    }

    #[async_trait]
    impl CoinSource for PagedCoins {
        async fn list_coins(
            &self,
            _owner: &SuiAddress,
            _coin_type: &str,
            cursor: Option<String>,
        ) -> Result<CoinPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page_index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let Some(balances) = self.pages.get(page_index) else {
                return Ok(CoinPage::default());
            };
            let data = balances
                .iter()
                .enumerate()
                .map(|(i, balance)| CoinObject {
                    coin_object_id: coin_id(page_index, i),
                    version: 1,
                    digest: ObjectDigest::new([0u8; 32]),
                    balance: *balance,
                })
                .collect();
            let has_next_page = page_index + 1 < self.pages.len();
            Ok(CoinPage {
                data,
                next_cursor: has_next_page.then(|| (page_index + 1).to_string()),
                has_next_page,
            })
        }
    }

    fn owner() -> SuiAddress {
        "0x1234".parse().unwrap()
    }

    fn referenced_objects(ptb: &ProgrammableTransactionBuilder) -> Vec<SuiAddress> {
        ptb.inputs()
            .iter()
            .filter_map(|input| match input {
                CallArg::Object(ObjectArg::ImmOrOwnedObject(ObjectRef { object_id, .. })) => {
                    Some(*object_id)
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_merges_until_enough_then_splits_exact() {
        let source = PagedCoins::new(vec![vec![30, 50, 20]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap();

        // third coin (20) is never referenced
        assert_eq!(referenced_objects(&ptb), vec![coin_id(0, 0), coin_id(0, 1)]);
        assert_eq!(
            ptb.commands(),
            &[
                Command::MergeCoins(Argument::Input(0), vec![Argument::Input(1)]),
                Command::SplitCoins(Argument::Input(0), vec![Argument::Input(2)]),
            ]
        );
        assert_eq!(ptb.inputs()[2], CallArg::Pure(60u64.to_le_bytes().to_vec()));
        assert_eq!(funded, Argument::NestedResult(1, 0));
    }

    #[tokio::test]
    async fn test_exact_total_returns_primary_without_split() {
        let source = PagedCoins::new(vec![vec![30, 30, 99]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap();

        assert_eq!(funded, Argument::Input(0));
        assert_eq!(ptb.commands().len(), 1);
        assert!(matches!(ptb.commands()[0], Command::MergeCoins(..)));
    }

    #[tokio::test]
    async fn test_single_coin_split_has_no_merge() {
        let source = PagedCoins::new(vec![vec![100]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap();

        assert_eq!(funded, Argument::NestedResult(0, 0));
        assert_eq!(ptb.commands().len(), 1);
        assert!(matches!(ptb.commands()[0], Command::SplitCoins(..)));
    }

    #[tokio::test]
    async fn test_stops_paging_once_covered() {
        let source = PagedCoins::new(vec![vec![10, 10], vec![50, 5], vec![1000]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(
            referenced_objects(&ptb),
            vec![coin_id(0, 0), coin_id(0, 1), coin_id(1, 0)]
        );
    }

    #[tokio::test]
    async fn test_insufficient_across_all_pages() {
        let source = PagedCoins::new(vec![vec![10, 10], vec![15]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let err = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap_err();

        match err {
            ClaimerError::InsufficientFunds {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 60);
                assert_eq!(available, 35);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert_eq!(source.calls(), 2);
        assert!(ptb.commands().is_empty());
    }

    #[tokio::test]
    async fn test_no_coins_is_insufficient() {
        let source = PagedCoins::new(vec![]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let err = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 1, &mut ptb)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimerError::InsufficientFunds { available: 0, .. }));
    }

    #[tokio::test]
    async fn test_merge_batches_are_capped() {
        // 1201 coins of 1 across three pages
        let source = PagedCoins::new(vec![vec![1; 500], vec![1; 500], vec![1; 201]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 1201, &mut ptb)
            .await
            .unwrap();

        let merge_sizes: Vec<usize> = ptb
            .commands()
            .iter()
            .map(|command| match command {
                Command::MergeCoins(primary, coins) => {
                    assert_eq!(*primary, Argument::Input(0));
                    coins.len()
                }
                other => panic!("unexpected command {:?}", other),
            })
            .collect();
        assert_eq!(merge_sizes, vec![500, 500, 200]);
        assert!(merge_sizes.iter().all(|n| *n <= MERGE_BATCH_SIZE));
        assert_eq!(funded, Argument::Input(0));
    }

    /// Serves the same page on every call, as a listing that shifted between calls would.
    struct RepeatingCoins {
        balances: Vec<u64>,
        pages: usize,
    }

    #[async_trait]
    impl CoinSource for RepeatingCoins {
        async fn list_coins(
            &self,
            _owner: &SuiAddress,
            _coin_type: &str,
            cursor: Option<String>,
        ) -> Result<CoinPage> {
            let page_index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let has_next_page = page_index + 1 < self.pages;
            Ok(CoinPage {
                data: self
                    .balances
                    .iter()
                    .enumerate()
                    .map(|(i, balance)| CoinObject {
                        coin_object_id: coin_id(0, i),
                        version: 1,
                        digest: ObjectDigest::new([0u8; 32]),
                        balance: *balance,
                    })
                    .collect(),
                next_cursor: has_next_page.then(|| (page_index + 1).to_string()),
                has_next_page,
            })
        }
    }

    #[tokio::test]
    async fn test_repeated_coin_counts_once() {
        let source = RepeatingCoins {
            balances: vec![40, 10],
            pages: 3,
        };
        let mut ptb = ProgrammableTransactionBuilder::new();

        let err = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 60, &mut ptb)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimerError::InsufficientFunds { available: 50, .. }));

        let mut ptb = ProgrammableTransactionBuilder::new();
        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), OCEAN, 50, &mut ptb)
            .await
            .unwrap();
        assert_eq!(funded, Argument::Input(0));
        assert_eq!(
            ptb.commands(),
            &[Command::MergeCoins(Argument::Input(0), vec![Argument::Input(1)])]
        );
    }

    #[tokio::test]
    async fn test_coin_cap_stops_collection() {
        let source = PagedCoins::new(vec![vec![1; 4], vec![1; 4]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let err = CoinAggregator::new(&source)
            .with_max_coins(5)
            .select_funding(&owner(), OCEAN, 8, &mut ptb)
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimerError::Validation(_)));
        assert_eq!(source.calls(), 2);
        assert!(ptb.inputs().is_empty());

        // reaching the amount on the last allowed coin is fine
        let mut ptb = ProgrammableTransactionBuilder::new();
        CoinAggregator::new(&source)
            .with_max_coins(5)
            .select_funding(&owner(), OCEAN, 5, &mut ptb)
            .await
            .unwrap();
        assert_eq!(referenced_objects(&ptb).len(), 5);
    }

    #[tokio::test]
    async fn test_native_coin_splits_gas_without_listing() {
        let source = PagedCoins::new(vec![vec![1_000_000]]);
        let mut ptb = ProgrammableTransactionBuilder::new();

        let funded = CoinAggregator::new(&source)
            .select_funding(&owner(), "0x2::sui::SUI", 5_000, &mut ptb)
            .await
            .unwrap();

        assert_eq!(source.calls(), 0);
        assert_eq!(funded, Argument::NestedResult(0, 0));
        assert_eq!(
            ptb.commands(),
            &[Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)])]
        );
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let source = PagedCoins::new(vec![vec![10]]);
        let mut ptb = ProgrammableTransactionBuilder::new();
        let result = tokio_test::block_on(
            CoinAggregator::new(&source).select_funding(&owner(), OCEAN, 0, &mut ptb),
        );
        assert!(matches!(result, Err(ClaimerError::Validation(_))));
        assert_eq!(source.calls(), 0);
    }
}
