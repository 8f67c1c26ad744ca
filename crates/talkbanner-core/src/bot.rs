//! Banner bot orchestrator
//!
//! Drives a run end to end:
//! - Samples the kill switch and resolves alias sets once per run
//! - Resolves each seed category's closure into discussion pages
//! - Runs one pipeline per page through the shared page pool
//! - Tallies terminal states into a run report
//!
//! Per page the stages are strictly ordered (eligibility, classification,
//! edit); across pages there is no ordering and a failure in one pipeline
//! never affects another.

use crate::api::SharedWiki;
use crate::classification::ClassificationExtractor;
use crate::closure::{dedupe, CategoryClosureResolver};
use crate::config::BotConfig;
use crate::edit::EditApplier;
use crate::eligibility::{EligibilityEngine, RunContext};
use crate::error::BotResult;
use crate::pool::{PagePool, PoolStats};
use crate::types::{
    CategoryReport, CategoryTitle, PageOutcome, PageTitle, RunReport, Stage, Verdict,
};
use futures::future::join_all;

/// The banner-adding agent
#[derive(Debug)]
pub struct BannerBot {
    /// Configuration
    config: BotConfig,
    /// Category closure resolver
    closure: CategoryClosureResolver,
    /// Eligibility checks
    eligibility: EligibilityEngine,
    /// Classification extractor
    classifier: ClassificationExtractor,
    /// Edit composer and writer
    editor: EditApplier,
    /// In-flight page limit
    pool: PagePool,
}

impl BannerBot {
    /// Create new bot over a wiki handle
    ///
    /// # Errors
    /// - `BotError::Config` if the configuration is invalid
    pub fn new(wiki: SharedWiki, config: BotConfig) -> BotResult<Self> {
        config.validate()?;

        Ok(Self {
            closure: CategoryClosureResolver::new(wiki.clone())
                .with_namespace(config.member_namespace),
            eligibility: EligibilityEngine::new(wiki.clone(), &config),
            classifier: ClassificationExtractor::new(wiki.clone(), config.classification_key.clone()),
            editor: EditApplier::new(wiki, &config),
            pool: PagePool::new(config.max_concurrent_pages),
            config,
        })
    }

    /// Process every seed category
    ///
    /// Categories run concurrently and share one page pool. If the kill
    /// switch is active at run start nothing is dispatched.
    ///
    /// # Errors
    /// Fails only when the per-run inputs cannot be resolved; category and
    /// page failures are recorded in the report instead.
    pub async fn run(&self) -> BotResult<RunReport> {
        let ctx = self.prepare().await?;
        if ctx.kill_switch_active {
            tracing::warn!("Kill switch active, not starting run");
            return Ok(RunReport::halted());
        }

        let categories = join_all(
            self.config
                .seed_categories
                .iter()
                .map(|category| self.run_category_with(&ctx, category)),
        )
        .await;

        let report = RunReport {
            halted: false,
            categories,
        };
        tracing::info!(
            edited = report.total_edited(),
            failed = report.total_failed(),
            "Run finished"
        );
        Ok(report)
    }

    /// Process a single category
    ///
    /// # Errors
    /// Fails when the per-run inputs cannot be resolved.
    pub async fn run_category(&self, category: &CategoryTitle) -> BotResult<CategoryReport> {
        let ctx = self.prepare().await?;
        if ctx.kill_switch_active {
            tracing::warn!(category = %category, "Kill switch active, skipping category");
            return Ok(CategoryReport::halted(category.clone()));
        }
        Ok(self.run_category_with(&ctx, category).await)
    }

    /// Stop dispatching pages
    ///
    /// Pipelines already holding a pool slot run to completion; pages still
    /// waiting for a slot fail at the dispatch stage.
    pub fn stop(&self) {
        tracing::warn!("Stopping, no further pages will be dispatched");
        self.pool.close();
    }

    /// Discussion pages for every page in a category's closure
    pub async fn talk_pages(&self, category: &CategoryTitle) -> BotResult<Vec<PageTitle>> {
        let pages = self.closure.resolve_closure(category).await?;
        let talk: Vec<PageTitle> = pages.iter().map(PageTitle::talk_page).collect();

        if self.config.dedupe_pages {
            Ok(dedupe(talk))
        } else {
            Ok(talk)
        }
    }

    /// Eligibility breakdown for one discussion page
    pub async fn check_page(&self, page: &PageTitle) -> BotResult<Verdict> {
        let ctx = self.prepare().await?;
        self.eligibility.evaluate(&ctx, page).await
    }

    /// Resolve the per-run inputs
    pub async fn prepare(&self) -> BotResult<RunContext> {
        self.eligibility.prepare().await
    }

    /// Run the pipeline for one discussion page
    pub async fn process_page(&self, ctx: &RunContext, page: &PageTitle) -> PageOutcome {
        let verdict = match self.eligibility.evaluate(ctx, page).await {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(page = %page, error = %error, "Eligibility check failed");
                return PageOutcome::Failed {
                    stage: Stage::Eligibility,
                    error,
                };
            }
        };

        if let Some(reason) = verdict.reason() {
            tracing::info!(page = %page, reason = %reason, "Skipping page");
            return PageOutcome::Ineligible(reason);
        }

        let classification = match self.classifier.extract_classification(page).await {
            Ok(classification) => classification,
            Err(error) => {
                tracing::warn!(page = %page, error = %error, "Classification failed");
                return PageOutcome::Failed {
                    stage: Stage::Classification,
                    error,
                };
            }
        };

        let edit = self.editor.plan(page, classification);

        if self.config.dry_run {
            tracing::info!(page = %page, text = %edit.text, summary = %edit.summary, "Dry run, not editing");
            return PageOutcome::DryRun(edit);
        }

        match self.editor.apply(&edit).await {
            Ok(()) => {
                tracing::info!(page = %page, rating = %edit.classification, "Added to page");
                PageOutcome::Edited(edit)
            }
            Err(error) => {
                tracing::error!(page = %page, error = %error, "Edit failed");
                PageOutcome::Failed {
                    stage: Stage::Edit,
                    error,
                }
            }
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Get page pool stats
    #[inline]
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    async fn run_category_with(&self, ctx: &RunContext, category: &CategoryTitle) -> CategoryReport {
        let mut report = CategoryReport::new(category.clone());

        let pages = match self.talk_pages(category).await {
            Ok(pages) => pages,
            Err(error) => {
                tracing::error!(category = %category, error = %error, "Could not resolve category");
                report.closure_error = Some(error.to_string());
                return report;
            }
        };
        report.pages = pages.len();

        let pipelines = pages.iter().map(|page| self.process_pooled(ctx, page));
        tracing::info!(category = %category, pages = report.pages, "finished queueing edits for category");

        for outcome in join_all(pipelines).await {
            report.record(&outcome);
        }
        report
    }

    async fn process_pooled(&self, ctx: &RunContext, page: &PageTitle) -> PageOutcome {
        match self.pool.acquire().await {
            Ok(_slot) => self.process_page(ctx, page).await,
            Err(error) => {
                tracing::debug!(page = %page, "Pool closed, page not dispatched");
                PageOutcome::Failed {
                    stage: Stage::Dispatch,
                    error: error.into(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockWikiApi;
    use crate::error::{BotError, WikiError};
    use crate::types::{ClassificationValue, IneligibleReason, PageInfo};
    use std::sync::Arc;

    fn base_wiki(kill_switch_length: u64) -> MockWikiApi {
        let mut wiki = MockWikiApi::new();
        wiki.expect_redirects_to().returning(|_| Ok(vec![]));
        wiki.expect_page_info().returning(move |t| {
            Ok(if t.as_str() == "User:ProgrammingBot/shutoff" && kill_switch_length > 0 {
                PageInfo::existing(kill_switch_length)
            } else {
                PageInfo::missing()
            })
        });
        wiki
    }

    #[test]
    fn invalid_config_rejected() {
        let config = BotConfig::default().with_max_concurrent_pages(0);
        let result = BannerBot::new(Arc::new(MockWikiApi::new()), config);
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[tokio::test]
    async fn kill_switch_halts_run_without_listing() {
        let mut wiki = base_wiki(5);
        wiki.expect_list_member_pages().never();
        wiki.expect_list_subcategories().never();
        wiki.expect_prepend_content().never();

        let bot = BannerBot::new(Arc::new(wiki), BotConfig::default()).unwrap();
        let report = bot.run().await.unwrap();

        assert!(report.halted);
        assert_eq!(report.total_edited(), 0);
    }

    #[tokio::test]
    async fn dry_run_never_writes() {
        let mut wiki = base_wiki(0);
        wiki.expect_templates_on().returning(|_| Ok(vec![]));
        wiki.expect_render_wikitext()
            .returning(|_| Ok("{{WikiProject Parks|class=C}}".to_string()));
        wiki.expect_prepend_content().never();

        let bot = BannerBot::new(Arc::new(wiki), BotConfig::default().with_dry_run(true)).unwrap();
        let ctx = bot.prepare().await.unwrap();
        let outcome = bot.process_page(&ctx, &"Talk:Old Fort".into()).await;

        match outcome {
            PageOutcome::DryRun(edit) => {
                assert_eq!(edit.classification, ClassificationValue::Rated("C".into()));
                assert_eq!(edit.text, "{{WikiProject Protected areas|class=C}}");
            }
            other => panic!("expected dry run, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ineligible_page_is_not_classified() {
        let mut wiki = base_wiki(0);
        wiki.expect_templates_on()
            .returning(|_| Ok(vec!["Template:Bots".into()]));
        wiki.expect_render_wikitext().never();
        wiki.expect_prepend_content().never();

        let bot = BannerBot::new(Arc::new(wiki), BotConfig::default()).unwrap();
        let ctx = bot.prepare().await.unwrap();
        let outcome = bot.process_page(&ctx, &"Talk:Old Fort".into()).await;

        assert!(matches!(outcome, PageOutcome::Ineligible(IneligibleReason::OptedOut)));
    }

    #[tokio::test]
    async fn classification_failure_stops_pipeline() {
        let mut wiki = base_wiki(0);
        wiki.expect_templates_on().returning(|_| Ok(vec![]));
        wiki.expect_render_wikitext()
            .returning(|_| Err(WikiError::Transport("timeout".into())));
        wiki.expect_prepend_content().never();

        let bot = BannerBot::new(Arc::new(wiki), BotConfig::default()).unwrap();
        let ctx = bot.prepare().await.unwrap();
        let outcome = bot.process_page(&ctx, &"Talk:Old Fort".into()).await;

        assert!(matches!(
            outcome,
            PageOutcome::Failed {
                stage: Stage::Classification,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn closure_failure_is_reported_per_category() {
        let mut wiki = base_wiki(0);
        wiki.expect_list_subcategories()
            .returning(|_| Err(WikiError::Transport("dns".into())));
        wiki.expect_list_member_pages().returning(|_, _| Ok(vec![]));

        let config = BotConfig::default()
            .with_seed_categories([CategoryTitle::new("Category:Parks in Brooklyn")]);
        let bot = BannerBot::new(Arc::new(wiki), config).unwrap();
        let report = bot.run().await.unwrap();

        assert!(!report.halted);
        assert!(report.has_closure_errors());
        assert_eq!(report.categories[0].pages, 0);
    }
}
