//! Category closure resolution
//!
//! Collects the pages reachable from a root category: its direct members
//! plus the direct members of each direct subcategory. Descent stops at
//! one level; sub-subcategories are never listed.

use crate::api::SharedWiki;
use crate::error::{BotError, BotResult};
use crate::types::{CategoryTitle, PageTitle};
use futures::future::try_join_all;
use std::collections::HashSet;

/// Resolver for one-level category closures
#[derive(Clone)]
pub struct CategoryClosureResolver {
    wiki: SharedWiki,
    namespace: Option<i32>,
}

impl std::fmt::Debug for CategoryClosureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryClosureResolver")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl CategoryClosureResolver {
    /// Create new resolver
    #[inline]
    #[must_use]
    pub fn new(wiki: SharedWiki) -> Self {
        Self {
            wiki,
            namespace: None,
        }
    }

    /// Restrict member listings to a namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<i32>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Resolve the closure of `root`
    ///
    /// Pages shared by several subcategories appear once per subcategory.
    /// Any failed listing aborts the whole resolution; no partial result is
    /// returned.
    pub async fn resolve_closure(&self, root: &CategoryTitle) -> BotResult<Vec<PageTitle>> {
        let (mut pages, subcategories) =
            tokio::try_join!(self.members(root), self.subcategories(root))?;

        tracing::debug!(
            category = %root,
            direct = pages.len(),
            subcategories = subcategories.len(),
            "Listed category"
        );

        let nested = try_join_all(subcategories.iter().map(|sub| self.members(sub))).await?;
        pages.extend(nested.into_iter().flatten());

        Ok(pages)
    }

    async fn members(&self, category: &CategoryTitle) -> BotResult<Vec<PageTitle>> {
        self.wiki
            .list_member_pages(category, self.namespace)
            .await
            .map_err(|e| BotError::query("list_member_pages", e))
    }

    async fn subcategories(&self, category: &CategoryTitle) -> BotResult<Vec<CategoryTitle>> {
        self.wiki
            .list_subcategories(category)
            .await
            .map_err(|e| BotError::query("list_subcategories", e))
    }
}

/// Remove repeated titles, keeping first occurrences in order
#[must_use]
pub fn dedupe(pages: Vec<PageTitle>) -> Vec<PageTitle> {
    let mut seen = HashSet::with_capacity(pages.len());
    pages
        .into_iter()
        .filter(|page| seen.insert(page.clone()))
        .collect()
}
