//! Core types for talkbanner
//!
//! Defines the transient, per-run entities of the pipeline:
//! - Category, page and template titles
//! - Alias sets for template identity
//! - Classification values and page metadata
//! - Per-page outcomes and the run report

use crate::error::BotError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Namespace prefix of discussion pages for main-namespace articles
pub const TALK_PREFIX: &str = "Talk:";

/// Namespace prefix of templates
pub const TEMPLATE_PREFIX: &str = "Template:";

/// Title of a category node (e.g. `Category:Parks in Brooklyn`)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTitle(String);

impl CategoryTitle {
    /// Create new category title
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Borrow the raw title
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryTitle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Title of a content page, discussion page or template
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTitle(String);

impl PageTitle {
    /// Create new page title
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Borrow the raw title
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this title lives in the discussion namespace
    #[inline]
    #[must_use]
    pub fn is_talk(&self) -> bool {
        self.0.starts_with(TALK_PREFIX)
    }

    /// Discussion page of a content page.
    ///
    /// Already-talk titles are returned unchanged.
    #[must_use]
    pub fn talk_page(&self) -> PageTitle {
        if self.is_talk() {
            self.clone()
        } else {
            PageTitle(format!("{TALK_PREFIX}{}", self.0))
        }
    }

    /// Content page a discussion page belongs to.
    ///
    /// Inverse of [`PageTitle::talk_page`]; non-talk titles are returned unchanged.
    #[must_use]
    pub fn subject_page(&self) -> PageTitle {
        match self.0.strip_prefix(TALK_PREFIX) {
            Some(subject) => PageTitle(subject.to_string()),
            None => self.clone(),
        }
    }

    /// Name used inside a transclusion, i.e. the title without `Template:`
    #[must_use]
    pub fn template_name(&self) -> &str {
        self.0.strip_prefix(TEMPLATE_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageTitle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Template titles are page titles in the template namespace
pub type TemplateTitle = PageTitle;

/// A canonical template together with every title redirecting to it.
///
/// One level deep: redirects to redirects are not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    canonical: TemplateTitle,
    titles: HashSet<TemplateTitle>,
}

impl AliasSet {
    /// Alias set containing only the canonical title
    #[must_use]
    pub fn new(canonical: TemplateTitle) -> Self {
        let mut titles = HashSet::new();
        titles.insert(canonical.clone());
        Self { canonical, titles }
    }

    /// Add redirecting titles
    #[must_use]
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = TemplateTitle>) -> Self {
        self.titles.extend(aliases);
        self
    }

    /// Canonical template title
    #[inline]
    #[must_use]
    pub fn canonical(&self) -> &TemplateTitle {
        &self.canonical
    }

    /// Whether the title is the canonical template or one of its redirects
    #[inline]
    #[must_use]
    pub fn contains(&self, title: &TemplateTitle) -> bool {
        self.titles.contains(title)
    }

    /// True when any of the given templates belongs to this set
    #[must_use]
    pub fn intersects(&self, templates: &HashSet<TemplateTitle>) -> bool {
        templates.iter().any(|t| self.titles.contains(t))
    }

    /// Number of titles, canonical included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Always false; the canonical title is always present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Metadata about a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page exists on the wiki
    pub exists: bool,
    /// Page is a redirect
    pub is_redirect: bool,
    /// Content length in bytes
    pub length: u64,
}

impl PageInfo {
    /// Info for a page that does not exist
    #[inline]
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Info for an existing page
    #[inline]
    #[must_use]
    pub fn existing(length: u64) -> Self {
        Self {
            exists: true,
            is_redirect: false,
            length,
        }
    }

    /// Mark as redirect
    #[inline]
    #[must_use]
    pub fn redirect(mut self) -> Self {
        self.is_redirect = true;
        self
    }
}

/// Assessment extracted from page markup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassificationValue {
    /// Free-text rating token, e.g. `B` or `Stub`
    Rated(String),
    /// Discussion page is missing and its subject is a redirect
    Redirect,
    /// No rating found
    Unknown,
}

impl ClassificationValue {
    /// Value to embed as banner parameter, if any
    #[must_use]
    pub fn as_param(&self) -> Option<&str> {
        match self {
            Self::Rated(value) => Some(value),
            Self::Redirect => Some("Redirect"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ClassificationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("unknown"))
    }
}

/// Why a page was judged ineligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IneligibleReason {
    /// The kill switch page is non-empty
    KillSwitch,
    /// Banner or one of its aliases already transcluded
    BannerPresent,
    /// Page opted out via the exclusion template
    OptedOut,
    /// Subject page is a redirect
    RedirectTarget,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::KillSwitch => "kill switch active",
            Self::BannerPresent => "banner already present",
            Self::OptedOut => "opted out",
            Self::RedirectTarget => "subject page is a redirect",
        };
        f.write_str(text)
    }
}

/// Result of every eligibility check for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    /// Banner already present
    pub banner_present: bool,
    /// Kill switch active for this run
    pub kill_switch_active: bool,
    /// Exclusion template present
    pub opted_out: bool,
    /// Subject is a redirect; `None` when the check is disabled
    pub redirect_target: Option<bool>,
}

impl Verdict {
    /// Conjunction of all checks
    #[inline]
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.reason().is_none()
    }

    /// First failing check, if any
    #[must_use]
    pub fn reason(&self) -> Option<IneligibleReason> {
        if self.kill_switch_active {
            Some(IneligibleReason::KillSwitch)
        } else if self.banner_present {
            Some(IneligibleReason::BannerPresent)
        } else if self.opted_out {
            Some(IneligibleReason::OptedOut)
        } else if self.redirect_target == Some(true) {
            Some(IneligibleReason::RedirectTarget)
        } else {
            None
        }
    }
}

/// A composed banner edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    /// Discussion page to edit
    pub page: PageTitle,
    /// Text to prepend
    pub text: String,
    /// Edit summary
    pub summary: String,
    /// Classification embedded in the banner
    pub classification: ClassificationValue,
}

/// Pipeline stage a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Waiting for a page pool slot
    Dispatch,
    /// Eligibility checks
    Eligibility,
    /// Classification extraction
    Classification,
    /// Edit write
    Edit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Dispatch => "dispatch",
            Self::Eligibility => "eligibility",
            Self::Classification => "classification",
            Self::Edit => "edit",
        };
        f.write_str(text)
    }
}

/// Terminal state of one page pipeline
#[derive(Debug)]
pub enum PageOutcome {
    /// Checks evaluated false
    Ineligible(IneligibleReason),
    /// Banner written
    Edited(PlannedEdit),
    /// Banner composed but not written
    DryRun(PlannedEdit),
    /// Pipeline aborted
    Failed {
        /// Stage that failed
        stage: Stage,
        /// Underlying error
        error: BotError,
    },
}

/// Outcome tally for one seed category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport {
    /// Seed category
    pub category: CategoryTitle,
    /// Discussion pages dispatched
    pub pages: usize,
    /// Pages edited
    pub edited: usize,
    /// Pages that would have been edited in dry-run mode
    pub dry_run: usize,
    /// Pages judged ineligible
    pub ineligible: usize,
    /// Pages whose pipeline failed
    pub failed: usize,
    /// Closure resolution error, if the category could not be listed
    pub closure_error: Option<String>,
    /// Kill switch was active; the closure was never resolved
    pub halted: bool,
}

impl CategoryReport {
    /// Empty report for a category
    #[must_use]
    pub fn new(category: CategoryTitle) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    /// Report for a category skipped because of the kill switch
    #[must_use]
    pub fn halted(category: CategoryTitle) -> Self {
        Self {
            category,
            halted: true,
            ..Self::default()
        }
    }

    /// Count one page outcome
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Ineligible(_) => self.ineligible += 1,
            PageOutcome::Edited(_) => self.edited += 1,
            PageOutcome::DryRun(_) => self.dry_run += 1,
            PageOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Kill switch was active at run start; nothing dispatched
    pub halted: bool,
    /// Per-category tallies, in seed order
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    /// Report for a run stopped by the kill switch
    #[must_use]
    pub fn halted() -> Self {
        Self {
            halted: true,
            categories: Vec::new(),
        }
    }

    /// Total pages edited
    #[must_use]
    pub fn total_edited(&self) -> usize {
        self.categories.iter().map(|c| c.edited).sum()
    }

    /// Total failed pipelines
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.categories.iter().map(|c| c.failed).sum()
    }

    /// Whether any category could not be resolved
    #[must_use]
    pub fn has_closure_errors(&self) -> bool {
        self.categories.iter().any(|c| c.closure_error.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn talk_page_roundtrip() {
        let page = PageTitle::new("Central Park");
        let talk = page.talk_page();
        assert_eq!(talk.as_str(), "Talk:Central Park");
        assert!(talk.is_talk());
        assert_eq!(talk.subject_page(), page);
        assert_eq!(talk.talk_page(), talk);
    }

    #[test]
    fn template_name_strips_namespace() {
        let t = PageTitle::new("Template:WikiProject Protected areas");
        assert_eq!(t.template_name(), "WikiProject Protected areas");
        assert_eq!(PageTitle::new("Bots").template_name(), "Bots");
    }

    #[test]
    fn alias_set_membership() {
        let set = AliasSet::new("Template:Bots".into()).with_aliases(["Template:Nobots".into()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&"Template:Nobots".into()));

        let on_page: HashSet<TemplateTitle> = ["Template:Infobox park".into()].into_iter().collect();
        assert!(!set.intersects(&on_page));

        let on_page: HashSet<TemplateTitle> = ["Template:Bots".into()].into_iter().collect();
        assert!(set.intersects(&on_page));
    }

    #[test]
    fn verdict_conjunction() {
        assert!(Verdict::default().is_eligible());

        let v = Verdict {
            banner_present: true,
            opted_out: true,
            ..Verdict::default()
        };
        assert_eq!(v.reason(), Some(IneligibleReason::BannerPresent));

        let v = Verdict {
            redirect_target: Some(true),
            ..Verdict::default()
        };
        assert!(!v.is_eligible());

        let v = Verdict {
            redirect_target: Some(false),
            ..Verdict::default()
        };
        assert!(v.is_eligible());
    }

    #[test]
    fn classification_params() {
        assert_eq!(ClassificationValue::Rated("B".into()).as_param(), Some("B"));
        assert_eq!(ClassificationValue::Redirect.as_param(), Some("Redirect"));
        assert_eq!(ClassificationValue::Unknown.as_param(), None);
    }

    #[test]
    fn dispatch_failure_is_tallied() {
        let mut report = CategoryReport::new("Category:Parks in Brooklyn".into());
        report.record(&PageOutcome::Failed {
            stage: Stage::Dispatch,
            error: crate::error::PoolError::Closed.into(),
        });
        assert_eq!(report.failed, 1);
        assert!(!report.halted);
        assert_eq!(Stage::Dispatch.to_string(), "dispatch");
    }

    #[test]
    fn halted_category_report_is_empty() {
        let report = CategoryReport::halted("Category:Parks in Brooklyn".into());
        assert!(report.halted);
        assert_eq!(report.pages, 0);
        assert_eq!(report.closure_error, None);
    }
}
