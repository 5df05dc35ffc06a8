//! Synthetic results.
//!
//! There is no real count of the votes: every option receives a number drawn
//! uniformly from the configured range. What this module guarantees is the
//! shape of the result (every declared option has an entry) and how it is
//! ranked and expressed as percentages.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Catalog;
use crate::config::*;

/// Draws a count for every option of every nomination.
pub fn compute<R: Rng + ?Sized>(catalog: &Catalog, rules: &TallyRules, rng: &mut R) -> TallyView {
    let nominations: Vec<NominationTally> = catalog
        .nominations()
        .iter()
        .map(|n| NominationTally {
            nomination_id: n.id.clone(),
            counts: n
                .options
                .iter()
                .map(|o| (o.clone(), rng.gen_range(rules.min_votes..=rules.max_votes)))
                .collect(),
        })
        .collect();
    TallyView { nominations }
}

/// The options of a nomination by decreasing count.
///
/// Options with the same count keep their declaration order.
pub fn rank(tally: &TallyView, nomination_id: &str) -> Option<Vec<(String, u64)>> {
    let mut ranked = tally.get(nomination_id)?.counts.clone();
    // sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Some(ranked)
}

/// `round(100 * count / total)`, rounding halves up. Zero when there is no
/// vote at all.
pub fn percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let count = count as u128;
    let total = total as u128;
    ((200 * count + total) / (2 * total)) as u32
}

/// Derives a seed from a free-form label, so that a session can be replayed.
///
/// The label goes through SHA-256 and the first 8 bytes of the digest are
/// used.
pub fn seed_from_label(label: &str) -> u64 {
    let digest = sha256::digest(label);
    u64::from_str_radix(&digest[..16], 16).unwrap_or(0)
}

/// Serves the tally of one session.
///
/// In `TallyMode::Stable`, the tally is drawn on the first request and the
/// same view is returned afterwards. In `TallyMode::Jitter`, every request
/// draws a new one.
pub struct ResultSynthesizer {
    rules: TallyRules,
    rng: StdRng,
    cached: Option<TallyView>,
}

impl ResultSynthesizer {
    pub fn new(rules: TallyRules) -> ResultSynthesizer {
        ResultSynthesizer {
            rules,
            rng: StdRng::from_entropy(),
            cached: None,
        }
    }

    pub fn with_seed(rules: TallyRules, seed: u64) -> ResultSynthesizer {
        info!("ResultSynthesizer: using seed {}", seed);
        ResultSynthesizer {
            rules,
            rng: StdRng::seed_from_u64(seed),
            cached: None,
        }
    }

    pub fn rules(&self) -> &TallyRules {
        &self.rules
    }

    pub fn view(&mut self, catalog: &Catalog) -> &TallyView {
        let refresh = match self.rules.mode {
            TallyMode::Stable => self.cached.is_none(),
            TallyMode::Jitter => true,
        };
        if refresh {
            debug!("ResultSynthesizer: drawing a new tally");
            self.cached = Some(compute(catalog, &self.rules, &mut self.rng));
        }
        self.cached.get_or_insert_with(TallyView::default)
    }
}
