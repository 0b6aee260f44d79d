//! Order matching: one validated code in, exactly one match result out.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::store::{OrderRecord, OrderStore, OrderStoreError};
use crate::validate::ValidatedCode;

/// Why a match result looks the way it does.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Exactly one record matched.
    Ok,
    /// No record is filed under the key.
    NotFound,
    /// Several records share the key; surfaced for manual resolution
    /// rather than picking one arbitrarily.
    Ambiguous,
}

/// Terminal value of one scan: the lookup verdict plus the record, if any.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchResult {
    pub reason: MatchReason,
    pub order: Option<OrderRecord>,
}

impl MatchResult {
    #[inline]
    pub fn found(&self) -> bool {
        self.reason == MatchReason::Ok
    }
}

/// Matcher configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Wall-clock budget for the store lookup. A lookup that comes back
    /// late is discarded so a slow store cannot stall the scan surface.
    pub lookup_budget: Option<Duration>,
}

/// Errors from order matching.
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Store(#[from] OrderStoreError),

    #[error("order lookup exceeded budget of {budget:?}")]
    LookupTimeout { budget: Duration },
}

/// Match a validated code against the order store.
///
/// Pure apart from the lookup itself; any mutation (marking an order as
/// scanned) belongs to the store owner.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(store, config), fields(key = %code.normalized))
)]
pub fn match_code(
    code: &ValidatedCode,
    store: &impl OrderStore,
    config: &MatchConfig,
) -> Result<MatchResult, MatchError> {
    let started = Instant::now();
    let records = store.find(&code.normalized)?;

    if let Some(budget) = config.lookup_budget {
        if started.elapsed() > budget {
            return Err(MatchError::LookupTimeout { budget });
        }
    }

    let result = match records.len() {
        0 => MatchResult {
            reason: MatchReason::NotFound,
            order: None,
        },
        1 => MatchResult {
            reason: MatchReason::Ok,
            order: records.into_iter().next(),
        },
        n => {
            log::warn!("key {:?} is filed {n} times in the order store", code.normalized);
            MatchResult {
                reason: MatchReason::Ambiguous,
                order: None,
            }
        }
    };
    Ok(result)
}
