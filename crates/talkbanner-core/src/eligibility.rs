//! Eligibility decision engine
//!
//! A discussion page may be edited only when every check passes:
//! - the banner (or an alias) is not already transcluded
//! - the kill switch page is empty
//! - the page has not opted out via the exclusion template
//! - optionally, the subject page is not a redirect
//!
//! A check that cannot be evaluated fails the whole decision. Errors are
//! never turned into an "ineligible" verdict.

use crate::api::SharedWiki;
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::redirects::RedirectResolver;
use crate::templates::TemplateMembershipChecker;
use crate::types::{AliasSet, PageTitle, TemplateTitle, Verdict};

/// Per-run inputs shared read-only by every page pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Banner template and its redirects
    pub banner: AliasSet,
    /// Exclusion template and its redirects
    pub opt_out: AliasSet,
    /// Kill switch state, sampled once at run start
    pub kill_switch_active: bool,
}

/// Combines the independent checks into a verdict
#[derive(Clone)]
pub struct EligibilityEngine {
    wiki: SharedWiki,
    templates: TemplateMembershipChecker,
    redirects: RedirectResolver,
    banner_template: TemplateTitle,
    opt_out_template: TemplateTitle,
    kill_switch_page: PageTitle,
    exclude_redirects: bool,
}

impl std::fmt::Debug for EligibilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EligibilityEngine")
            .field("banner_template", &self.banner_template)
            .field("opt_out_template", &self.opt_out_template)
            .field("kill_switch_page", &self.kill_switch_page)
            .field("exclude_redirects", &self.exclude_redirects)
            .finish_non_exhaustive()
    }
}

impl EligibilityEngine {
    /// Create engine from configuration
    #[must_use]
    pub fn new(wiki: SharedWiki, config: &BotConfig) -> Self {
        Self {
            templates: TemplateMembershipChecker::new(wiki.clone()),
            redirects: RedirectResolver::new(wiki.clone()),
            wiki,
            banner_template: config.banner_template.clone(),
            opt_out_template: config.opt_out_template.clone(),
            kill_switch_page: config.kill_switch_page.clone(),
            exclude_redirects: config.exclude_redirects,
        }
    }

    /// Whether the kill switch page has any content
    pub async fn kill_switch_active(&self) -> BotResult<bool> {
        let info = self
            .wiki
            .page_info(&self.kill_switch_page)
            .await
            .map_err(|e| BotError::query("page_info", e))?;
        Ok(info.exists && info.length > 0)
    }

    /// Resolve alias sets and sample the kill switch
    pub async fn prepare(&self) -> BotResult<RunContext> {
        let (banner, opt_out, kill_switch_active) = tokio::try_join!(
            self.redirects.alias_set(&self.banner_template),
            self.redirects.alias_set(&self.opt_out_template),
            self.kill_switch_active(),
        )?;

        if kill_switch_active {
            tracing::warn!(page = %self.kill_switch_page, "Kill switch is active");
        }
        tracing::debug!(
            banner = %banner.canonical(),
            banner_aliases = banner.len(),
            opt_out = %opt_out.canonical(),
            opt_out_aliases = opt_out.len(),
            "Resolved alias sets"
        );

        Ok(RunContext {
            banner,
            opt_out,
            kill_switch_active,
        })
    }

    /// Evaluate every check for a discussion page
    pub async fn evaluate(&self, ctx: &RunContext, page: &PageTitle) -> BotResult<Verdict> {
        if ctx.kill_switch_active {
            return Ok(Verdict {
                kill_switch_active: true,
                ..Verdict::default()
            });
        }

        let (templates, redirect_target) =
            tokio::try_join!(self.templates.templates_on(page), self.redirect_check(page))?;

        Ok(Verdict {
            banner_present: ctx.banner.intersects(&templates),
            kill_switch_active: false,
            opted_out: ctx.opt_out.intersects(&templates),
            redirect_target,
        })
    }

    /// Single-page decision with freshly resolved run inputs
    pub async fn is_eligible(&self, page: &PageTitle) -> BotResult<bool> {
        let ctx = self.prepare().await?;
        Ok(self.evaluate(&ctx, page).await?.is_eligible())
    }

    async fn redirect_check(&self, page: &PageTitle) -> BotResult<Option<bool>> {
        if !self.exclude_redirects {
            return Ok(None);
        }
        let info = self
            .wiki
            .page_info(&page.subject_page())
            .await
            .map_err(|e| BotError::query("page_info", e))?;
        Ok(Some(info.is_redirect))
    }
}
