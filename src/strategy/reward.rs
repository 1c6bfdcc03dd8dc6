//! Reward accrual for a fishing cycle
//!
//! Derives how much of the current cycle's reward a player has accrued, and how
//! far through the cycle they are, from the static schedule and the on-chain
//! player record. All arithmetic stays in `Decimal`; every fixed-point
//! multiplier is de-scaled right after it is applied.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::domain::{AccountState, BoostKind, RewardSchedule, SCALE};
use crate::error::{ClaimerError, Result};

/// Milliseconds per hour; boat `fishing_time` is in scaled hours.
const MS_PER_HOUR: u64 = 3_600_000;

/// Decimal places of the reward token (`initReward` is in base units).
const REWARD_DECIMALS: u32 = 9;

/// Fraction digits reported for `unclaimed_amount`.
pub const AMOUNT_DP: u32 = 5;

/// Snapshot of a player's progress through the current fishing cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishingInfo {
    /// Time until the cycle completes, in ms. Zero once claimable.
    pub time_to_claim_ms: u64,
    /// Accrued reward in whole tokens, always carrying exactly 5 fraction digits.
    pub unclaimed_amount: Decimal,
    /// Percentage of the cycle elapsed (unrounded).
    pub progress: Decimal,
}

impl FinishingInfo {
    /// Nothing claimable. Used when no schedule is available.
    pub fn zero() -> Self {
        Self {
            time_to_claim_ms: 0,
            unclaimed_amount: to_amount(Decimal::ZERO),
            progress: Decimal::ZERO,
        }
    }

    pub fn is_claimable(&self) -> bool {
        self.progress >= dec!(100)
    }
}

/// Round half-to-even at 5 places and pin the scale so `Display` always shows 5 digits.
fn to_amount(value: Decimal) -> Decimal {
    let mut amount = value.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointNearestEven);
    amount.rescale(AMOUNT_DP);
    amount
}

fn overflow() -> ClaimerError {
    ClaimerError::Schedule("reward overflow: schedule multipliers too large".to_string())
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(overflow)
}

fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b).ok_or_else(overflow)
}

/// Computes [`FinishingInfo`] for a player
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardCalculator;

impl RewardCalculator {
    /// Compute accrual at `now_ms`.
    ///
    /// - no schedule: the zero snapshot
    /// - schedule but no player record: the initial reward, immediately claimable
    /// - level or boost indices without a schedule entry: error
    pub fn compute(
        schedule: Option<&RewardSchedule>,
        account: Option<&AccountState>,
        now_ms: u64,
    ) -> Result<FinishingInfo> {
        let Some(schedule) = schedule else {
            return Ok(FinishingInfo::zero());
        };

        let Some(account) = account else {
            let init = Decimal::from_i128_with_scale(schedule.init_reward as i128, REWARD_DECIMALS);
            return Ok(FinishingInfo {
                time_to_claim_ms: 0,
                unclaimed_amount: to_amount(init),
                progress: dec!(100),
            });
        };

        let boat = schedule.boat(account.boat)?;
        let mesh = schedule.mesh(account.mesh)?;
        let fish_type = schedule.fish_type(account.seafood)?;

        let scale = Decimal::from(SCALE);
        let fishing_time = div(
            mul(Decimal::from(boat.fishing_time), Decimal::from(MS_PER_HOUR))?,
            scale,
        )?;
        if fishing_time.is_zero() {
            return Err(ClaimerError::Schedule(format!(
                "boat level {} has zero fishing_time",
                account.boat
            )));
        }

        let now = Decimal::from(now_ms);
        let deadline = Decimal::from(account.last_claim)
            .checked_add(fishing_time)
            .ok_or_else(overflow)?;
        // A last_claim in the future (clock skew) clamps to "cycle just started".
        let time_remaining = if deadline > now {
            (deadline - now).min(fishing_time)
        } else {
            Decimal::ZERO
        };
        let elapsed = fishing_time - time_remaining;

        let mut unclaimed = div(elapsed, fishing_time)?;
        for multiplier in [boat.fishing_time, mesh.speed, fish_type.rate] {
            unclaimed = div(mul(unclaimed, Decimal::from(multiplier))?, scale)?;
        }

        if let Some(index) = account.special_boost {
            let boost = schedule.boost(index)?;
            let window_start = match boost.kind {
                BoostKind::Global => Some(boost.start_time),
                BoostKind::PerAccount => account.special_boost_start_time,
            };
            if window_start.is_some_and(|start| boost.is_active(start, now_ms)) {
                unclaimed = div(mul(unclaimed, Decimal::from(boost.rate))?, scale)?;
            }
        }

        let progress = div(mul(elapsed, dec!(100))?, fishing_time)?;

        Ok(FinishingInfo {
            time_to_claim_ms: time_remaining.trunc().to_u64().unwrap_or(u64::MAX),
            unclaimed_amount: to_amount(unclaimed),
            progress,
        })
    }
}
