//! Remote wiki capability
//!
//! The core never talks HTTP. Everything it needs from the content
//! repository goes through [`WikiApi`], handed in as a shared handle.

use crate::error::WikiError;
use crate::types::{CategoryTitle, PageInfo, PageTitle, TemplateTitle};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the pipeline needs from the remote wiki
///
/// Implementations must be safe to call concurrently; the pipeline issues
/// overlapping requests from many page pipelines through one handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// Direct subcategories of a category
    async fn list_subcategories(
        &self,
        category: &CategoryTitle,
    ) -> Result<Vec<CategoryTitle>, WikiError>;

    /// Direct member pages of a category, optionally limited to one namespace
    async fn list_member_pages(
        &self,
        category: &CategoryTitle,
        namespace: Option<i32>,
    ) -> Result<Vec<PageTitle>, WikiError>;

    /// Existence, redirect flag and length of a page
    async fn page_info(&self, title: &PageTitle) -> Result<PageInfo, WikiError>;

    /// Templates transcluded on a page; empty when the page has none
    async fn templates_on(&self, title: &PageTitle) -> Result<Vec<TemplateTitle>, WikiError>;

    /// Titles redirecting to a page; empty when there are none
    async fn redirects_to(&self, title: &PageTitle) -> Result<Vec<PageTitle>, WikiError>;

    /// Raw wikitext; `WikiError::NotFound` when the page does not exist
    async fn render_wikitext(&self, title: &PageTitle) -> Result<String, WikiError>;

    /// Prepend text to a page
    async fn prepend_content(
        &self,
        title: &PageTitle,
        text: &str,
        summary: &str,
    ) -> Result<(), WikiError>;
}

/// Shared handle to a wiki implementation
pub type SharedWiki = Arc<dyn WikiApi>;
