//! Banner composition and edit application

use crate::api::SharedWiki;
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::types::{ClassificationValue, PageTitle, PlannedEdit, TemplateTitle};

/// Composes banner edits and writes them
#[derive(Clone)]
pub struct EditApplier {
    wiki: SharedWiki,
    banner: TemplateTitle,
    classification_key: String,
    summary_suffix: String,
}

impl std::fmt::Debug for EditApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditApplier")
            .field("banner", &self.banner)
            .field("classification_key", &self.classification_key)
            .finish_non_exhaustive()
    }
}

impl EditApplier {
    /// Create applier from configuration
    #[must_use]
    pub fn new(wiki: SharedWiki, config: &BotConfig) -> Self {
        Self {
            wiki,
            banner: config.banner_template.clone(),
            classification_key: config.classification_key.clone(),
            summary_suffix: config.summary_suffix.clone(),
        }
    }

    /// Banner markup, e.g. `{{WikiProject Protected areas|class=B}}`
    #[must_use]
    pub fn banner_text(&self, classification: &ClassificationValue) -> String {
        let name = self.banner.template_name();
        match classification.as_param() {
            Some(value) => format!("{{{{{name}|{}={value}}}}}", self.classification_key),
            None => format!("{{{{{name}}}}}"),
        }
    }

    /// Edit summary, e.g. `Added {{WikiProject Protected areas}}, rated as B-class (BOT)`
    #[must_use]
    pub fn summary(&self, classification: &ClassificationValue) -> String {
        let mut summary = format!("Added {{{{{}}}}}", self.banner.template_name());
        if let Some(value) = classification.as_param() {
            summary.push_str(&format!(", rated as {value}-class"));
        }
        if !self.summary_suffix.is_empty() {
            summary.push(' ');
            summary.push_str(&self.summary_suffix);
        }
        summary
    }

    /// Compose the edit for a page without writing it
    #[must_use]
    pub fn plan(&self, page: &PageTitle, classification: ClassificationValue) -> PlannedEdit {
        PlannedEdit {
            page: page.clone(),
            text: self.banner_text(&classification),
            summary: self.summary(&classification),
            classification,
        }
    }

    /// Write a composed edit; exactly one prepend, no read-back
    pub async fn apply(&self, edit: &PlannedEdit) -> BotResult<()> {
        self.wiki
            .prepend_content(&edit.page, &edit.text, &edit.summary)
            .await
            .map_err(|e| BotError::write(edit.page.clone(), e))
    }

    /// Compose and write the banner edit for a page
    pub async fn apply_edit(
        &self,
        page: &PageTitle,
        classification: ClassificationValue,
    ) -> BotResult<PlannedEdit> {
        let edit = self.plan(page, classification);
        self.apply(&edit).await?;
        Ok(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockWikiApi;
    use crate::error::WikiError;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn applier(wiki: MockWikiApi) -> EditApplier {
        EditApplier::new(Arc::new(wiki), &BotConfig::default())
    }

    #[test]
    fn banner_with_classification() {
        let applier = applier(MockWikiApi::new());
        let edit = applier.plan(&"Talk:Old Fort".into(), ClassificationValue::Rated("B".into()));

        assert_eq!(edit.text, "{{WikiProject Protected areas|class=B}}");
        assert_eq!(
            edit.summary,
            "Added {{WikiProject Protected areas}}, rated as B-class (BOT)"
        );
    }

    #[test]
    fn banner_without_classification() {
        let applier = applier(MockWikiApi::new());
        let edit = applier.plan(&"Talk:Old Fort".into(), ClassificationValue::Unknown);

        assert_eq!(edit.text, "{{WikiProject Protected areas}}");
        assert_eq!(edit.summary, "Added {{WikiProject Protected areas}} (BOT)");
    }

    #[test]
    fn banner_for_redirect() {
        let applier = applier(MockWikiApi::new());
        let edit = applier.plan(&"Talk:Old Fort".into(), ClassificationValue::Redirect);
        assert_eq!(edit.text, "{{WikiProject Protected areas|class=Redirect}}");
    }

    #[tokio::test]
    async fn apply_issues_single_prepend() {
        let mut wiki = MockWikiApi::new();
        wiki.expect_prepend_content()
            .withf(|page, text, summary| {
                page.as_str() == "Talk:Old Fort"
                    && text == "{{WikiProject Protected areas|class=Start}}"
                    && summary.ends_with("(BOT)")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let applier = applier(wiki);
        let edit = applier
            .apply_edit(&"Talk:Old Fort".into(), ClassificationValue::Rated("Start".into()))
            .await
            .unwrap();
        assert_eq!(edit.page.as_str(), "Talk:Old Fort");
    }

    #[tokio::test]
    async fn write_failure_is_write_error() {
        let mut wiki = MockWikiApi::new();
        wiki.expect_prepend_content()
            .returning(|_, _, _| Err(WikiError::api("protectedpage", "This page is protected")));

        let applier = applier(wiki);
        let err = applier
            .apply_edit(&"Talk:Old Fort".into(), ClassificationValue::Unknown)
            .await
            .unwrap_err();
        assert!(err.is_write());
    }
}
