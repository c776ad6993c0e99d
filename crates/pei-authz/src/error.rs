use std::time::Duration;

use crate::store::StoreError;

/// A store lookup that did not produce an answer.
///
/// Never turned into an allow: the evaluator reports it as an indeterminate
/// decision and the HTTP layer as `503` where no decision is involved.
#[derive(Debug, thiserror::Error)]
pub enum LookupFailure {
    #[error("{lookup} lookup failed: {source}")]
    Store {
        lookup: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{lookup} lookup timed out after {}ms", .after.as_millis())]
    Timeout {
        lookup: &'static str,
        after: Duration,
    },
}

impl LookupFailure {
    pub fn lookup(&self) -> &'static str {
        match self {
            LookupFailure::Store { lookup, .. } | LookupFailure::Timeout { lookup, .. } => lookup,
        }
    }
}

/// Runs a store call under `limit`, folding store errors and timeouts into
/// [`LookupFailure`].
pub(crate) async fn bounded<T, F>(
    lookup: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, LookupFailure>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    let result = match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(LookupFailure::Store { lookup, source }),
        Err(_) => Err(LookupFailure::Timeout {
            lookup,
            after: limit,
        }),
    };

    if let Err(e) = &result {
        tracing::warn!(error = %e, "Permission store lookup failed");
        pei_observability::track_lookup_failure(lookup);
    }
    result
}
