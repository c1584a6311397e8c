//! Commission on a written premium
//!
//! Rate-based commission plus the tier's per-policy flat bonus.

use serde::Serialize;

use crate::money::{round_currency, round_rate};
use crate::tiers::CommissionTier;

/// Commission owed for a premium at a given tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionBreakdown {
    /// premium × tier rate
    pub commission_amount: f64,
    /// flat bonus × policies
    pub flat_bonus_amount: f64,
    pub total_commission: f64,
    /// total / premium, or the tier rate for a zero premium
    pub effective_rate: f64,
}

/// Calculate the commission for `premium` across `policy_count` policies.
///
/// Negative or non-finite premiums are treated as zero.
pub fn calculate_commission(
    premium: f64,
    tier: &CommissionTier,
    policy_count: u32,
) -> CommissionBreakdown {
    let premium = if premium.is_finite() { premium.max(0.0) } else { 0.0 };

    let commission_amount = premium * tier.rate();
    let flat_bonus_amount = tier.flat_bonus * f64::from(policy_count);
    let total_commission = commission_amount + flat_bonus_amount;
    let effective_rate = if premium > 0.0 {
        total_commission / premium
    } else {
        tier.rate()
    };

    CommissionBreakdown {
        commission_amount: round_currency(commission_amount),
        flat_bonus_amount: round_currency(flat_bonus_amount),
        total_commission: round_currency(total_commission),
        effective_rate: round_rate(effective_rate),
    }
}
