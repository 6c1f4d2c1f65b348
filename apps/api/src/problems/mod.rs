//! Problem Selector: picks coding problems for technical rounds and resolves
//! them to full descriptions.
//!
//! Enrichment is best-effort: a missing catalog row, a failed fetch or a
//! non-success reply drops that problem with a warning. It never fails the
//! interview it belongs to.

pub mod bank;
pub mod policy;

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::InterviewCatalog;
use crate::models::problem::ProblemDetail;
use crate::problems::bank::ProblemBank;
use crate::problems::policy::{ProblemPolicy, Tier};

#[derive(Clone)]
pub struct ProblemSelector {
    catalog: Arc<dyn InterviewCatalog>,
    bank: Arc<dyn ProblemBank>,
}

impl ProblemSelector {
    pub fn new(catalog: Arc<dyn InterviewCatalog>, bank: Arc<dyn ProblemBank>) -> Self {
        Self { catalog, bank }
    }

    /// Problems for this interview, or `None` when the round has no problem
    /// policy or none of the drawn problems could be resolved.
    pub async fn select(&self, domain: &str, interview_type: &str) -> Option<Vec<ProblemDetail>> {
        let policy = ProblemPolicy::for_interview(domain, interview_type)?;
        // ThreadRng is !Send; draw before the first await.
        let ids = policy.draw(&mut rand::thread_rng());
        let tiers: Vec<Tier> = ids.iter().filter_map(|id| Tier::of(*id)).collect();
        info!("Selected problem ids {ids:?} {tiers:?} for {domain}/{interview_type}");

        let mut problems = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(detail) = self.resolve(id).await {
                problems.push(detail);
            }
        }

        if problems.is_empty() {
            warn!("No problem details resolved for {domain}/{interview_type}");
            None
        } else {
            Some(problems)
        }
    }

    async fn resolve(&self, id: u32) -> Option<ProblemDetail> {
        let slug = match self.catalog.problem_slug(id).await {
            Ok(Some(slug)) => slug,
            Ok(None) => {
                warn!("No problem row for id {id}");
                return None;
            }
            Err(e) => {
                warn!("Problem lookup for id {id} failed: {e}");
                return None;
            }
        };

        match self.bank.fetch(&slug).await {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                warn!("No details for problem '{slug}'");
                None
            }
            Err(e) => {
                warn!("Fetching problem '{slug}' failed: {e}");
                None
            }
        }
    }
}
