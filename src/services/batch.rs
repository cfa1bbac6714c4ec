use std::time::Duration;

use tokio::time::sleep;

use crate::domain::{
    record::{Outcome, ResultRecord},
    reference::Reference,
};

use super::{Browser, Resolver};

/// Tally of a finished batch, logged once at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub access_denied: usize,
    pub rejected: usize,
    pub exhausted: usize,
}

impl BatchSummary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        records
            .iter()
            .fold(BatchSummary::default(), |mut summary, record| {
                match record.outcome {
                    Outcome::Found { .. } => summary.found += 1,
                    Outcome::AccessDenied => summary.access_denied += 1,
                    Outcome::Rejected { .. } => summary.rejected += 1,
                    Outcome::Exhausted => summary.exhausted += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.found + self.access_denied + self.rejected + self.exhausted
    }
}

/// Resolves every reference in order, one at a time, pausing `delay`
/// between consecutive lookups. Failures never stop the batch.
pub async fn run_batch<B: Browser + ?Sized>(
    browser: &mut B,
    resolver: &Resolver,
    references: &[Reference],
    delay: Duration,
) -> Vec<ResultRecord> {
    let mut records = Vec::with_capacity(references.len());

    for (i, reference) in references.iter().enumerate() {
        if i > 0 {
            sleep(delay).await;
        }
        log::info!(
            "Processing {} ({}/{})",
            reference,
            i + 1,
            references.len()
        );
        records.push(resolver.resolve(browser, reference).await);
    }

    let summary = BatchSummary::from_records(&records);
    log::info!(
        "Batch finished: {} found, {} access errors, {} validation errors, {} failed",
        summary.found,
        summary.access_denied,
        summary.rejected,
        summary.exhausted
    );

    records
}
