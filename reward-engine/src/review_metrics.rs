//! Folding per-pull-request review lookups into [`QualityMetrics`].
//!
//! Review counts are fetched lazily, one request per pull request, with at most `concurrency`
//! requests in flight. The fold only sums and counts, so the result does not depend on the
//! order in which lookups complete.

use futures::stream::{self, StreamExt, TryStreamExt};
use reward_core::QualityMetrics;
use snafu::ResultExt;

use crate::error::{ProviderError, ReviewsSnafu};
use crate::providers::ReviewCountSource;

/// A closed pull request, as far as quality metrics are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// Pull request number.
    pub number: u64,
    /// Whether it was merged.
    pub merged: bool,
}

#[derive(Default)]
struct Tally {
    total: u64,
    merged: u64,
    reviews: u64,
}

/// Fetches review counts for `pull_requests` and folds them into quality metrics.
///
/// Fails with the first lookup error; remaining lookups are dropped.
pub async fn fold_quality_metrics<S>(
    pull_requests: Vec<PullRequestSummary>,
    source: &S,
    concurrency: usize,
) -> Result<QualityMetrics, ProviderError>
where
    S: ReviewCountSource + ?Sized,
{
    let tally = stream::iter(pull_requests)
        .map(|pr| async move {
            let reviews = source
                .review_count(pr.number)
                .await
                .context(ReviewsSnafu { number: pr.number })?;
            Ok::<_, ProviderError>((pr, reviews))
        })
        .buffer_unordered(concurrency.max(1))
        .try_fold(Tally::default(), |mut tally, (pr, reviews)| async move {
            tally.total += 1;
            tally.merged += u64::from(pr.merged);
            tally.reviews += reviews;
            Ok(tally)
        })
        .await?;

    Ok(QualityMetrics::from_counts(
        tally.total,
        tally.merged,
        tally.reviews,
    ))
}
