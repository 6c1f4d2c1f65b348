//! Weighted bucket policy for picking coding-problem ids.
//!
//! Problem ids are grouped into disjoint difficulty tiers. A policy is a list
//! of allowed partitions (tuples of tiers); one partition is chosen uniformly,
//! then one id is drawn uniformly from each tier in it.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;

/// A difficulty tier: a disjoint, inclusive range of problem ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub fn ids(self) -> RangeInclusive<u32> {
        match self {
            Tier::Easy => 1..=26,
            Tier::Medium => 27..=40,
            Tier::Hard => 41..=50,
        }
    }

    pub fn of(id: u32) -> Option<Tier> {
        [Tier::Easy, Tier::Medium, Tier::Hard]
            .into_iter()
            .find(|t| t.ids().contains(&id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPolicy {
    partitions: &'static [&'static [Tier]],
}

/// Pair policy for software-engineering technical rounds.
const PAIR_PARTITIONS: &[&[Tier]] = &[
    &[Tier::Medium, Tier::Easy],
    &[Tier::Medium, Tier::Hard],
    &[Tier::Easy, Tier::Easy],
    &[Tier::Easy, Tier::Hard],
];

/// Single-problem policy for data-science technical rounds.
const SINGLE_PARTITIONS: &[&[Tier]] = &[&[Tier::Medium], &[Tier::Easy]];

/// Interview type that always receives a problem pair, whatever the domain.
pub const PAIR_ROUND: &str = "TECHNICAL_1";

impl ProblemPolicy {
    /// Returns the policy for an interview, or `None` when no problems are assigned.
    pub fn for_interview(domain: &str, interview_type: &str) -> Option<Self> {
        if domain == "DS" && interview_type == "TECHNICAL" {
            return Some(Self {
                partitions: SINGLE_PARTITIONS,
            });
        }
        if interview_type == PAIR_ROUND {
            return Some(Self {
                partitions: PAIR_PARTITIONS,
            });
        }
        None
    }

    /// Picks a partition uniformly, then one id per tier.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        let Some(partition) = self.partitions.choose(rng) else {
            return Vec::new();
        };
        partition
            .iter()
            .map(|tier| rng.gen_range(tier.ids()))
            .collect()
    }
}
