//! Testing utilities for talkbanner workspace
//!
//! An in-memory wiki implementing [`WikiApi`], plus fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use talkbanner_core::{
    BannerBot, BotConfig, CategoryTitle, PageInfo, PageTitle, TemplateTitle, WikiApi, WikiError,
};

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub wikitext: String,
    pub is_redirect: bool,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdit {
    pub page: String,
    pub text: String,
    pub summary: String,
}

#[derive(Debug, Default)]
struct State {
    subcategories: HashMap<String, Vec<String>>,
    members: HashMap<String, Vec<String>>,
    pages: HashMap<String, FakePage>,
    redirects: HashMap<String, Vec<String>>,
    failures: HashMap<(&'static str, String), WikiError>,
    calls: HashMap<&'static str, usize>,
    title_calls: HashMap<(&'static str, String), usize>,
    edits: Vec<RecordedEdit>,
}

/// In-memory wiki
#[derive(Debug, Default)]
pub struct FakeWiki {
    state: Mutex<State>,
}

impl FakeWiki {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add member pages to a category
    #[must_use]
    pub fn with_members(self, category: &str, pages: &[&str]) -> Self {
        self.state
            .lock()
            .members
            .entry(category.to_string())
            .or_default()
            .extend(pages.iter().map(|p| (*p).to_string()));
        self
    }

    /// Add a subcategory
    #[must_use]
    pub fn with_subcategory(self, parent: &str, child: &str) -> Self {
        self.state
            .lock()
            .subcategories
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
        self
    }

    /// Create a page with content
    #[must_use]
    pub fn with_page(self, title: &str, wikitext: &str) -> Self {
        self.state
            .lock()
            .pages
            .entry(title.to_string())
            .or_default()
            .wikitext = wikitext.to_string();
        self
    }

    /// Record templates transcluded on a page, creating it if needed
    #[must_use]
    pub fn with_templates(self, title: &str, templates: &[&str]) -> Self {
        self.state
            .lock()
            .pages
            .entry(title.to_string())
            .or_default()
            .templates
            .extend(templates.iter().map(|t| (*t).to_string()));
        self
    }

    /// Create `from` as a redirect to `to`
    #[must_use]
    pub fn with_redirect(self, from: &str, to: &str) -> Self {
        {
            let mut state = self.state.lock();
            let page = state.pages.entry(from.to_string()).or_default();
            page.is_redirect = true;
            page.wikitext = format!("#REDIRECT [[{to}]]");
            state
                .redirects
                .entry(to.to_string())
                .or_default()
                .push(from.to_string());
        }
        self
    }

    /// Make an operation on a title fail
    #[must_use]
    pub fn failing(self, operation: &'static str, title: &str, error: WikiError) -> Self {
        self.state
            .lock()
            .failures
            .insert((operation, title.to_string()), error);
        self
    }

    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Edits written so far, in completion order
    #[must_use]
    pub fn edits(&self) -> Vec<RecordedEdit> {
        self.state.lock().edits.clone()
    }

    /// Pages that received an edit, sorted
    #[must_use]
    pub fn edited_pages(&self) -> Vec<String> {
        let mut pages: Vec<_> = self.edits().into_iter().map(|e| e.page).collect();
        pages.sort();
        pages
    }

    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Calls of one operation for one title
    #[must_use]
    pub fn call_count_for(&self, operation: &'static str, title: &str) -> usize {
        self.state
            .lock()
            .title_calls
            .get(&(operation, title.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Current wikitext of a page
    #[must_use]
    pub fn wikitext(&self, title: &str) -> Option<String> {
        self.state.lock().pages.get(title).map(|p| p.wikitext.clone())
    }

    fn enter(&self, operation: &'static str, title: &str) -> Result<(), WikiError> {
        let mut state = self.state.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        *state
            .title_calls
            .entry((operation, title.to_string()))
            .or_insert(0) += 1;
        match state.failures.get(&(operation, title.to_string())) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WikiApi for FakeWiki {
    async fn list_subcategories(
        &self,
        category: &CategoryTitle,
    ) -> Result<Vec<CategoryTitle>, WikiError> {
        self.enter("list_subcategories", category.as_str())?;
        let state = self.state.lock();
        Ok(state
            .subcategories
            .get(category.as_str())
            .map(|subs| subs.iter().map(|s| CategoryTitle::new(s.as_str())).collect())
            .unwrap_or_default())
    }

    async fn list_member_pages(
        &self,
        category: &CategoryTitle,
        _namespace: Option<i32>,
    ) -> Result<Vec<PageTitle>, WikiError> {
        self.enter("list_member_pages", category.as_str())?;
        let state = self.state.lock();
        Ok(state
            .members
            .get(category.as_str())
            .map(|pages| pages.iter().map(|p| PageTitle::new(p.as_str())).collect())
            .unwrap_or_default())
    }

    async fn page_info(&self, title: &PageTitle) -> Result<PageInfo, WikiError> {
        self.enter("page_info", title.as_str())?;
        let state = self.state.lock();
        Ok(match state.pages.get(title.as_str()) {
            Some(page) => PageInfo {
                exists: true,
                is_redirect: page.is_redirect,
                length: page.wikitext.len() as u64,
            },
            None => PageInfo::missing(),
        })
    }

    async fn templates_on(&self, title: &PageTitle) -> Result<Vec<TemplateTitle>, WikiError> {
        self.enter("templates_on", title.as_str())?;
        let state = self.state.lock();
        Ok(state
            .pages
            .get(title.as_str())
            .map(|page| page.templates.iter().map(|t| PageTitle::new(t.as_str())).collect())
            .unwrap_or_default())
    }

    async fn redirects_to(&self, title: &PageTitle) -> Result<Vec<PageTitle>, WikiError> {
        self.enter("redirects_to", title.as_str())?;
        let state = self.state.lock();
        Ok(state
            .redirects
            .get(title.as_str())
            .map(|from| from.iter().map(|t| PageTitle::new(t.as_str())).collect())
            .unwrap_or_default())
    }

    async fn render_wikitext(&self, title: &PageTitle) -> Result<String, WikiError> {
        self.enter("render_wikitext", title.as_str())?;
        let state = self.state.lock();
        state
            .pages
            .get(title.as_str())
            .map(|page| page.wikitext.clone())
            .ok_or_else(|| WikiError::not_found(title.as_str()))
    }

    async fn prepend_content(
        &self,
        title: &PageTitle,
        text: &str,
        summary: &str,
    ) -> Result<(), WikiError> {
        self.enter("prepend_content", title.as_str())?;
        let mut state = self.state.lock();

        let page = state.pages.entry(title.as_str().to_string()).or_default();
        page.wikitext = format!("{text}{}", page.wikitext);
        if let Some(name) = leading_template(text) {
            page.templates.push(format!("Template:{name}"));
        }

        state.edits.push(RecordedEdit {
            page: title.as_str().to_string(),
            text: text.to_string(),
            summary: summary.to_string(),
        });
        Ok(())
    }
}

fn leading_template(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("{{")?;
    let end = inner.find(['|', '}'])?;
    Some(inner[..end].trim())
}

/// The Brooklyn parks graph:
///
/// ```text
/// Category:Parks in Brooklyn
/// ├── Central Park
/// └── Category:Defunct parks in Brooklyn
///     └── Old Fort
/// ```
#[must_use]
pub fn brooklyn_wiki() -> FakeWiki {
    FakeWiki::new()
        .with_members("Category:Parks in Brooklyn", &["Central Park"])
        .with_subcategory("Category:Parks in Brooklyn", "Category:Defunct parks in Brooklyn")
        .with_members("Category:Defunct parks in Brooklyn", &["Old Fort"])
        .with_page("Central Park", "'''Central Park''' is a park.")
        .with_page("Old Fort", "'''Old Fort''' was a park.")
}

/// Configuration limited to one seed category
#[must_use]
pub fn config_for(category: &str) -> BotConfig {
    BotConfig::default().with_seed_categories([CategoryTitle::new(category)])
}

pub fn setup_test_bot(wiki: Arc<FakeWiki>, config: BotConfig) -> BannerBot {
    BannerBot::new(wiki, config).unwrap()
}
