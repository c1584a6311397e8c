//! Commission Tier Resolution
//!
//! Volume-banded commission tiers. A `TierTable` is built once from
//! configuration and is immutable afterwards; every lookup is a linear scan
//! over a handful of inclusive bands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::money::round_rate;
use crate::volume::sanitize_volume;

/// A contiguous volume band with its commission terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionTier {
    /// Display name (e.g., "Silver")
    pub name: String,
    /// Inclusive lower bound of monthly participants
    pub min_volume: u64,
    /// Inclusive upper bound; `None` for the top tier
    #[serde(default)]
    pub max_volume: Option<u64>,
    /// Commission rate as a whole-number percent (45.0 = 45%)
    pub percentage: f64,
    /// Amount earned per covered participant
    pub per_participant: f64,
    /// Flat bonus per policy sold in this tier
    #[serde(default)]
    pub flat_bonus: f64,
}

impl CommissionTier {
    /// Whether `volume` falls inside this band (inclusive on both ends)
    pub fn contains(&self, volume: u64) -> bool {
        volume >= self.min_volume && self.max_volume.map_or(true, |max| volume <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_volume.is_none()
    }

    /// Commission rate as a fraction (0.45 for 45%)
    pub fn rate(&self) -> f64 {
        self.percentage / 100.0
    }

    /// Band label such as "1000-2499" or "5000+"
    pub fn range_label(&self) -> String {
        match self.max_volume {
            Some(max) => format!("{}-{}", self.min_volume, max),
            None => format!("{}+", self.min_volume),
        }
    }
}

/// Ordered, validated set of commission tiers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: Vec<CommissionTier>,
}

impl TierTable {
    /// Build a table, enforcing that bands are sorted, contiguous and
    /// non-overlapping, that only the last tier is unbounded, and that
    /// neither the percentage nor the per-participant amount decreases
    /// with volume.
    pub fn new(tiers: Vec<CommissionTier>) -> Result<Self> {
        let invalid = |msg: String| -> Result<Self> { Err(Error::InvalidTierTable(msg)) };

        if tiers.is_empty() {
            return invalid("at least one tier is required".to_string());
        }

        for (i, tier) in tiers.iter().enumerate() {
            if tier.name.trim().is_empty() {
                return invalid(format!("tier {} has no name", i));
            }
            for (field, value) in [
                ("percentage", tier.percentage),
                ("per_participant", tier.per_participant),
                ("flat_bonus", tier.flat_bonus),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return invalid(format!("{}: {} must be a non-negative number", tier.name, field));
                }
            }
            if let Some(max) = tier.max_volume {
                if max < tier.min_volume {
                    return invalid(format!(
                        "{}: max_volume {} is below min_volume {}",
                        tier.name, max, tier.min_volume
                    ));
                }
            }

            if i == 0 {
                continue;
            }
            let prev = &tiers[i - 1];
            let Some(prev_max) = prev.max_volume else {
                return invalid(format!("unbounded tier {} must be last", prev.name));
            };
            let Some(expected_min) = prev_max.checked_add(1) else {
                return invalid(format!(
                    "{} follows {} which already reaches the maximum volume",
                    tier.name, prev.name
                ));
            };
            if tier.min_volume != expected_min {
                return invalid(format!(
                    "{} starts at {} but {} ends at {}",
                    tier.name, tier.min_volume, prev.name, prev_max
                ));
            }
            if tier.percentage < prev.percentage {
                return invalid(format!(
                    "{} pays {}% which is less than {} at {}%",
                    tier.name, tier.percentage, prev.name, prev.percentage
                ));
            }
            if tier.per_participant < prev.per_participant {
                return invalid(format!(
                    "{} pays {} per participant which is less than {}",
                    tier.name, tier.per_participant, prev.name
                ));
            }
        }

        if tiers.last().map_or(false, |t| !t.is_unbounded()) {
            return invalid("the last tier must be unbounded".to_string());
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[CommissionTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Lowest tier in the table
    pub fn entry_tier(&self) -> &CommissionTier {
        &self.tiers[0]
    }

    /// Unbounded top tier
    pub fn top_tier(&self) -> &CommissionTier {
        &self.tiers[self.tiers.len() - 1]
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CommissionTier> {
        self.tiers.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Index of the tier covering `volume`, and whether the volume sits
    /// below the first band (in which case the entry tier applies).
    fn position(&self, volume: u64) -> (usize, bool) {
        match self.tiers.iter().position(|t| t.contains(volume)) {
            Some(index) => (index, false),
            None => (0, true),
        }
    }

    /// Tier applicable to `volume`
    pub fn tier_for(&self, volume: u64) -> &CommissionTier {
        &self.tiers[self.position(volume).0]
    }

    /// Resolve the current tier, the next tier and the gap between them.
    pub fn resolve(&self, volume: u64) -> TierLookup<'_> {
        let (index, below_minimum) = self.position(volume);
        let lookup = self.lookup_at(index, volume, below_minimum);

        tracing::debug!(
            volume,
            tier = %lookup.current_tier.name,
            participants_to_next = lookup.participants_to_next,
            "Resolved commission tier"
        );
        lookup
    }

    /// Progress from an assigned tier rather than the volume band, as when
    /// a partner override is active. Falls back to `resolve` for a tier not
    /// in this table.
    pub fn resolve_from_tier(&self, tier: &CommissionTier, volume: u64) -> TierLookup<'_> {
        match self.tiers.iter().position(|t| t.name == tier.name) {
            Some(index) => self.lookup_at(index, volume, false),
            None => self.resolve(volume),
        }
    }

    fn lookup_at(&self, index: usize, volume: u64, below_minimum: bool) -> TierLookup<'_> {
        let current_tier = &self.tiers[index];
        let next_tier = self.tiers.get(index + 1);

        let (participants_to_next, percentage_increase) = match next_tier {
            Some(next) => (
                next.min_volume.saturating_sub(volume),
                round_rate(next.percentage - current_tier.percentage),
            ),
            None => (0, 0.0),
        };

        TierLookup {
            volume,
            current_tier,
            next_tier,
            participants_to_next,
            percentage_increase,
            below_minimum,
        }
    }

    /// Resolve from an unvalidated numeric input; malformed values clamp to 0.
    pub fn resolve_raw(&self, raw_volume: f64) -> TierLookup<'_> {
        self.resolve(sanitize_volume(raw_volume))
    }

    /// Resolve a partner's tier, honouring an active manual override.
    ///
    /// Overrides that have expired or name a tier missing from this table
    /// are ignored and the volume-based tier applies.
    pub fn resolve_for_partner<'a>(
        &'a self,
        volume: u64,
        tier_override: Option<&TierOverride>,
        now: DateTime<Utc>,
    ) -> ResolvedTier<'a> {
        if let Some(ov) = tier_override {
            if !ov.is_active(now) {
                tracing::debug!(partner_id = %ov.partner_id, "Tier override expired");
            } else if let Some(tier) = self.find_by_name(&ov.tier_name) {
                return ResolvedTier {
                    tier,
                    is_override: true,
                    override_reason: Some(
                        ov.reason
                            .clone()
                            .unwrap_or_else(|| "Manual tier assignment".to_string()),
                    ),
                };
            } else {
                tracing::warn!(
                    partner_id = %ov.partner_id,
                    tier = %ov.tier_name,
                    "Tier override names an unknown tier, falling back to volume"
                );
            }
        }

        ResolvedTier {
            tier: self.tier_for(volume),
            is_override: false,
            override_reason: None,
        }
    }
}

/// Result of a tier lookup for a given volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierLookup<'a> {
    /// Volume the lookup was made for (after clamping)
    pub volume: u64,
    pub current_tier: &'a CommissionTier,
    /// `None` iff the current tier is the unbounded top tier
    pub next_tier: Option<&'a CommissionTier>,
    /// Participants still needed to reach the next tier; 0 at the top
    pub participants_to_next: u64,
    /// Percentage points gained at the next tier; 0 at the top
    pub percentage_increase: f64,
    /// Volume is under the entry tier's floor
    pub below_minimum: bool,
}

impl TierLookup<'_> {
    /// Share of the next tier's threshold already reached, 0-100.
    /// Always 100 at the top tier.
    pub fn progress_to_next(&self) -> f64 {
        match self.next_tier {
            Some(next) if next.min_volume > 0 => {
                (self.volume as f64 / next.min_volume as f64 * 100.0).min(100.0)
            }
            _ => 100.0,
        }
    }

    pub fn is_top_tier(&self) -> bool {
        self.next_tier.is_none()
    }
}

/// Manually assigned tier for a partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierOverride {
    pub partner_id: String,
    /// Name of the tier to apply
    pub tier_name: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Open-ended when `None`
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TierOverride {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires >= now)
    }
}

/// Effective tier for a partner after override resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTier<'a> {
    pub tier: &'a CommissionTier,
    pub is_override: bool,
    pub override_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{partner_tiers, tier};
    use chrono::Duration;

    #[test]
    fn test_resolve_mid_band() {
        let table = partner_tiers();
        let lookup = table.resolve(750);
        assert_eq!(lookup.current_tier.name, "Bronze");
        assert_eq!(lookup.next_tier.map(|t| t.name.as_str()), Some("Silver"));
        assert_eq!(lookup.participants_to_next, 250);
        assert_eq!(lookup.percentage_increase, 5.0);
        assert!(!lookup.below_minimum);
    }

    #[test]
    fn test_resolve_top_tier() {
        let table = partner_tiers();
        for volume in [5000, 7500, 1_000_000, u64::MAX] {
            let lookup = table.resolve(volume);
            assert_eq!(lookup.current_tier.name, "Platinum");
            assert!(lookup.next_tier.is_none());
            assert_eq!(lookup.participants_to_next, 0);
            assert_eq!(lookup.percentage_increase, 0.0);
            assert_eq!(lookup.progress_to_next(), 100.0);
        }
    }

    #[test]
    fn test_boundary_exactness() {
        let table = partner_tiers();
        assert_eq!(table.resolve(999).current_tier.name, "Bronze");
        assert_eq!(table.resolve(1000).current_tier.name, "Silver");

        for (i, tier) in table.tiers().iter().enumerate() {
            if let Some(max) = tier.max_volume {
                assert_eq!(table.tier_for(max).name, tier.name);
                assert_eq!(table.tier_for(max + 1).name, table.tiers()[i + 1].name);
            }
        }
    }

    #[test]
    fn test_tier_coverage_and_monotonicity() {
        let table = partner_tiers();
        let mut last_percentage = 0.0;
        for volume in (table.entry_tier().min_volume..=12_000).step_by(7) {
            let lookup = table.resolve(volume);
            let current = lookup.current_tier;
            let matching = table.tiers().iter().filter(|t| t.contains(volume)).count();
            assert_eq!(matching, 1, "volume {} matched {} tiers", volume, matching);
            assert!(current.contains(volume));
            assert!(current.percentage >= last_percentage);
            last_percentage = current.percentage;
        }
    }

    #[test]
    fn test_below_minimum_uses_entry_tier() {
        let table = partner_tiers();
        let lookup = table.resolve(0);
        assert!(lookup.below_minimum);
        assert_eq!(lookup.current_tier.name, "Bronze");
        assert_eq!(lookup.next_tier.map(|t| t.name.as_str()), Some("Silver"));
        assert_eq!(lookup.participants_to_next, 1000);
    }

    #[test]
    fn test_resolve_raw_clamps() {
        let table = partner_tiers();
        assert_eq!(table.resolve_raw(-100.0).volume, 0);
        assert_eq!(table.resolve_raw(f64::NAN).volume, 0);
        assert_eq!(table.resolve_raw(2500.9).current_tier.name, "Gold");
    }

    #[test]
    fn test_progress_to_next() {
        let table = partner_tiers();
        assert_eq!(table.resolve(500).progress_to_next(), 50.0);
        assert_eq!(table.resolve(1250).progress_to_next(), 50.0);
    }

    #[test]
    fn test_table_rejects_gap() {
        let result = TierTable::new(vec![
            tier("A", 0, Some(99), 10.0, 1.0),
            tier("B", 101, None, 20.0, 2.0),
        ]);
        assert!(matches!(result, Err(Error::InvalidTierTable(_))));
    }

    #[test]
    fn test_table_rejects_overlap_and_order() {
        assert!(TierTable::new(vec![
            tier("A", 0, Some(100), 10.0, 1.0),
            tier("B", 100, None, 20.0, 2.0),
        ])
        .is_err());
        assert!(TierTable::new(vec![
            tier("B", 100, None, 20.0, 2.0),
            tier("A", 0, Some(99), 10.0, 1.0),
        ])
        .is_err());
    }

    #[test]
    fn test_table_requires_single_unbounded_last() {
        assert!(TierTable::new(vec![tier("A", 0, Some(99), 10.0, 1.0)]).is_err());
        assert!(TierTable::new(vec![
            tier("A", 0, None, 10.0, 1.0),
            tier("B", 100, None, 20.0, 2.0),
        ])
        .is_err());
        assert!(TierTable::new(vec![]).is_err());
    }

    #[test]
    fn test_table_rejects_tier_after_maximum_volume() {
        let result = TierTable::new(vec![
            tier("A", 0, Some(u64::MAX), 10.0, 1.0),
            tier("B", 0, None, 20.0, 2.0),
        ]);
        assert!(matches!(result, Err(Error::InvalidTierTable(_))));
    }

    #[test]
    fn test_table_rejects_decreasing_percentage() {
        let result = TierTable::new(vec![
            tier("A", 0, Some(99), 30.0, 1.0),
            tier("B", 100, None, 20.0, 2.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_override_applies_until_expiry() {
        let table = partner_tiers();
        let now = Utc::now();
        let ov = TierOverride {
            partner_id: "p_1".to_string(),
            tier_name: "gold".to_string(),
            reason: Some("Launch partner".to_string()),
            expires_at: Some(now + Duration::days(1)),
        };

        let resolved = table.resolve_for_partner(600, Some(&ov), now);
        assert!(resolved.is_override);
        assert_eq!(resolved.tier.name, "Gold");
        assert_eq!(resolved.override_reason.as_deref(), Some("Launch partner"));

        let later = now + Duration::days(2);
        let resolved = table.resolve_for_partner(600, Some(&ov), later);
        assert!(!resolved.is_override);
        assert_eq!(resolved.tier.name, "Bronze");
    }

    #[test]
    fn test_progress_from_override_tier() {
        let table = partner_tiers();
        let platinum = table.find_by_name("Platinum").unwrap();

        let lookup = table.resolve_from_tier(platinum, 600);
        assert_eq!(lookup.current_tier.name, "Platinum");
        assert!(lookup.is_top_tier());
        assert_eq!(lookup.participants_to_next, 0);

        let silver = table.find_by_name("Silver").unwrap();
        let lookup = table.resolve_from_tier(silver, 600);
        assert_eq!(lookup.next_tier.map(|t| t.name.as_str()), Some("Gold"));
        assert_eq!(lookup.participants_to_next, 1900);
        assert_eq!(lookup.percentage_increase, 5.0);
        assert!(!lookup.below_minimum);
    }

    #[test]
    fn test_override_unknown_tier_ignored() {
        let table = partner_tiers();
        let ov = TierOverride {
            partner_id: "p_2".to_string(),
            tier_name: "Diamond".to_string(),
            reason: None,
            expires_at: None,
        };
        let resolved = table.resolve_for_partner(3000, Some(&ov), Utc::now());
        assert!(!resolved.is_override);
        assert_eq!(resolved.tier.name, "Gold");
    }

    #[test]
    fn test_range_label() {
        let table = partner_tiers();
        assert_eq!(table.tiers()[1].range_label(), "1000-2499");
        assert_eq!(table.top_tier().range_label(), "5000+");
    }
}
