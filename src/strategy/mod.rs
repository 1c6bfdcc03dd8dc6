//! Claiming strategy
//!
//! - `reward` - accrual of the current fishing cycle (pure)
//! - `funding` - coin selection and merging for transaction inputs
//! - `claimer` - one poll of one account: claim and optional sweep
//! - `poller` - the long-running, cancellable polling task

pub mod claimer;
pub mod funding;
pub mod poller;
pub mod reward;

pub use claimer::{
    AccountPoller, AccountReport, ClaimService, ClaimSettings, ClaimStatus, SweepSettings,
    SweepStatus,
};
pub use funding::{CoinAggregator, MAX_COIN_INPUTS, MERGE_BATCH_SIZE};
pub use poller::{PollEvent, PollSummary, PollerSettings, PollingTask};
pub use reward::{FinishingInfo, RewardCalculator};
