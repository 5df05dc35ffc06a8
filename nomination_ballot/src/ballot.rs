//! The ballot state machine.
//!
//! These functions never mutate their input: each accepted intent returns a
//! new `BallotState` and each refused one returns the reason.

use log::debug;

use crate::catalog::Catalog;
use crate::config::*;

/// Records `option` as the choice for `nomination_id`, replacing any earlier
/// choice for the same nomination.
pub fn select_option(
    state: &BallotState,
    catalog: &Catalog,
    nomination_id: &str,
    option: &str,
) -> Result<BallotState, BallotError> {
    if state.submitted {
        return Err(BallotError::AlreadySubmitted);
    }
    match catalog.get(nomination_id) {
        Some(nomination) if nomination.has_option(option) => {}
        _ => {
            return Err(BallotError::InvalidSelection {
                nomination_id: nomination_id.to_string(),
                option: option.to_string(),
            });
        }
    }
    let mut next = state.clone();
    let previous = next
        .selections
        .insert(nomination_id.to_string(), option.to_string());
    debug!(
        "select_option: nomination {}: {:?} -> {:?}",
        nomination_id, previous, option
    );
    Ok(next)
}

/// The number of nominations of the catalog that have no valid choice yet.
pub fn missing_count(state: &BallotState, catalog: &Catalog) -> usize {
    catalog
        .nominations()
        .iter()
        .filter(|n| match state.selection(&n.id) {
            Some(option) => !n.has_option(option),
            None => true,
        })
        .count()
}

/// True if the selections hold exactly one valid choice per nomination and
/// nothing else.
pub fn is_complete(state: &BallotState, catalog: &Catalog) -> bool {
    state.selections.len() == catalog.len() && missing_count(state, catalog) == 0
}

/// Freezes a complete ballot.
///
/// Persisting the result is left to the caller (see `store::VoteStore`).
pub fn submit(state: &BallotState, catalog: &Catalog) -> Result<BallotState, BallotError> {
    if state.submitted {
        return Err(BallotError::AlreadySubmitted);
    }
    let missing = missing_count(state, catalog);
    if missing > 0 {
        return Err(BallotError::IncompleteBallot {
            missing_count: missing,
        });
    }
    // Entries outside of the catalog can only come from a caller that built
    // the state by hand.
    if let Some((nomination_id, option)) = state
        .selections
        .iter()
        .find(|(id, _)| catalog.get(id).is_none())
    {
        return Err(BallotError::InvalidSelection {
            nomination_id: nomination_id.clone(),
            option: option.clone(),
        });
    }
    Ok(BallotState {
        selections: state.selections.clone(),
        submitted: true,
    })
}
