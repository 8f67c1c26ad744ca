//! Template membership checks

use crate::api::SharedWiki;
use crate::error::{BotError, BotResult};
use crate::types::{AliasSet, PageTitle, TemplateTitle};
use std::collections::HashSet;

/// Answers which templates a page transcludes
#[derive(Clone)]
pub struct TemplateMembershipChecker {
    wiki: SharedWiki,
}

impl std::fmt::Debug for TemplateMembershipChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateMembershipChecker").finish_non_exhaustive()
    }
}

impl TemplateMembershipChecker {
    /// Create new checker
    #[inline]
    #[must_use]
    pub fn new(wiki: SharedWiki) -> Self {
        Self { wiki }
    }

    /// Templates transcluded on `page`.
    ///
    /// A page that does not exist transcludes nothing.
    pub async fn templates_on(&self, page: &PageTitle) -> BotResult<HashSet<TemplateTitle>> {
        match self.wiki.templates_on(page).await {
            Ok(templates) => Ok(templates.into_iter().collect()),
            Err(e) if e.is_not_found() => Ok(HashSet::new()),
            Err(e) => Err(BotError::query("templates_on", e)),
        }
    }

    /// Whether `page` transcludes any title in `aliases`
    pub async fn has_any_of(&self, page: &PageTitle, aliases: &AliasSet) -> BotResult<bool> {
        let templates = self.templates_on(page).await?;
        Ok(aliases.intersects(&templates))
    }
}
