//! Redirect resolution and template alias sets

use crate::api::SharedWiki;
use crate::error::{BotError, BotResult};
use crate::types::{AliasSet, PageTitle, TemplateTitle};
use std::collections::HashSet;

/// Finds titles that redirect to a page
#[derive(Clone)]
pub struct RedirectResolver {
    wiki: SharedWiki,
}

impl std::fmt::Debug for RedirectResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectResolver").finish_non_exhaustive()
    }
}

impl RedirectResolver {
    /// Create new resolver
    #[inline]
    #[must_use]
    pub fn new(wiki: SharedWiki) -> Self {
        Self { wiki }
    }

    /// Titles redirecting directly to `title`.
    ///
    /// Empty when the page has no incoming redirects or does not exist.
    pub async fn resolve_redirects_to(&self, title: &PageTitle) -> BotResult<HashSet<PageTitle>> {
        match self.wiki.redirects_to(title).await {
            Ok(redirects) => Ok(redirects.into_iter().collect()),
            Err(e) if e.is_not_found() => Ok(HashSet::new()),
            Err(e) => Err(BotError::query("redirects_to", e)),
        }
    }

    /// Canonical template plus its one-level redirects
    pub async fn alias_set(&self, template: &TemplateTitle) -> BotResult<AliasSet> {
        let aliases = self.resolve_redirects_to(template).await?;
        tracing::debug!(template = %template, aliases = aliases.len(), "Resolved alias set");
        Ok(AliasSet::new(template.clone()).with_aliases(aliases))
    }
}
