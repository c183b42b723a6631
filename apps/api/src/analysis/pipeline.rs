//! End-to-end analysis for one request.
//!
//! Flow: resolve_profile (fetch + sanitize for links) → cache_key → cache get →
//!       on miss: run_chain → assemble → cache put.
//!
//! The whole flow runs under one wall-clock budget. A cache hit returns before
//! any provider call. Nothing is written to the cache unless all four stages
//! succeeded and the request was not cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::chain::run_chain;
use crate::analysis::report::assemble;
use crate::analysis::PipelineError;
use crate::cache::{cache_key, CacheEntry, CacheStore};
use crate::intake::resolve_profile;
use crate::intake::scrape::ProfileFetcher;
use crate::llm_client::ModelClient;
use crate::models::report::FinalReport;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: FinalReport,
    pub cache_key: String,
    pub cache_hit: bool,
}

/// Borrowed view over the shared request dependencies. Cheap to build per request.
pub struct AnalysisPipeline<'a> {
    pub cache: &'a dyn CacheStore,
    pub fetcher: &'a ProfileFetcher,
    pub budget: Duration,
}

impl AnalysisPipeline<'_> {
    pub async fn analyze(
        &self,
        client: &dyn ModelClient,
        profile_text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, PipelineError> {
        match tokio::time::timeout(self.budget, self.run(client, profile_text, cancel)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("analysis exceeded {}s budget", self.budget.as_secs());
                Err(PipelineError::Timeout(self.budget))
            }
        }
    }

    async fn run(
        &self,
        client: &dyn ModelClient,
        profile_text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            resolved = resolve_profile(self.fetcher, profile_text) => resolved?,
        };

        let model_id = client.model_id();
        let key = cache_key(content.as_str(), model_id);

        match self.cache.get(&key).await {
            Ok(Some(entry)) => {
                info!(
                    cache_key = &key[..12],
                    backend = self.cache.backend(),
                    "cache hit, skipping agent chain"
                );
                return Ok(AnalysisOutcome {
                    report: entry.report,
                    cache_key: key,
                    cache_hit: true,
                });
            }
            Ok(None) => debug!(cache_key = &key[..12], "cache miss"),
            Err(e) => warn!("cache lookup failed, running chain: {e}"),
        }

        let chain = run_chain(client, &content, cancel).await?;
        let report = assemble(&chain);

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        if let Err(e) = self
            .cache
            .put(&key, &CacheEntry::new(report.clone(), model_id))
            .await
        {
            warn!("failed to store report in cache: {e}");
        }

        Ok(AnalysisOutcome {
            report,
            cache_key: key,
            cache_hit: false,
        })
    }
}
