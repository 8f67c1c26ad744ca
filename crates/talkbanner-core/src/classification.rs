//! Classification extraction
//!
//! Reads the assessment parameter (`|class=B`) already present in a
//! discussion page's markup, typically from another project's banner.

use crate::api::SharedWiki;
use crate::error::{BotError, BotResult};
use crate::types::{ClassificationValue, PageTitle};

const FIELD_SEPARATOR: char = '|';
const CLOSE_MARKER: &str = "}}";
const BRACES: [char; 2] = ['{', '}'];

/// Find the value of `|key=` in template markup.
///
/// The first occurrence wins. The value ends at the next `|` or `}}`,
/// whichever comes first, and is trimmed. Empty values count as absent, as
/// do values holding template or parameter markup (`{{{class|}}}`) since
/// those are not ratings.
#[must_use]
pub fn parse_classification(wikitext: &str, key: &str) -> Option<String> {
    let marker = format!("{FIELD_SEPARATOR}{key}=");
    let start = wikitext.find(&marker)? + marker.len();
    let rest = &wikitext[start..];

    let end = match (rest.find(FIELD_SEPARATOR), rest.find(CLOSE_MARKER)) {
        (Some(sep), Some(close)) => sep.min(close),
        (Some(sep), None) => sep,
        (None, Some(close)) => close,
        (None, None) => rest.len(),
    };

    let value = rest[..end].trim();
    if value.is_empty() || value.contains(BRACES) {
        return None;
    }
    Some(value.to_string())
}

/// Extracts the classification of a discussion page
#[derive(Clone)]
pub struct ClassificationExtractor {
    wiki: SharedWiki,
    key: String,
}

impl std::fmt::Debug for ClassificationExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationExtractor")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ClassificationExtractor {
    /// Create new extractor for a parameter key
    #[inline]
    #[must_use]
    pub fn new(wiki: SharedWiki, key: impl Into<String>) -> Self {
        Self {
            wiki,
            key: key.into(),
        }
    }

    /// Extract the classification of `page`
    ///
    /// A missing discussion page whose subject page is a redirect yields
    /// [`ClassificationValue::Redirect`]; any other missing page or missing
    /// key yields [`ClassificationValue::Unknown`].
    pub async fn extract_classification(&self, page: &PageTitle) -> BotResult<ClassificationValue> {
        match self.wiki.render_wikitext(page).await {
            Ok(wikitext) => Ok(parse_classification(&wikitext, &self.key)
                .map_or(ClassificationValue::Unknown, ClassificationValue::Rated)),
            Err(e) if e.is_not_found() => self.classify_missing(page).await,
            Err(e) => Err(BotError::query("render_wikitext", e)),
        }
    }

    async fn classify_missing(&self, page: &PageTitle) -> BotResult<ClassificationValue> {
        let subject = page.subject_page();
        let info = self
            .wiki
            .page_info(&subject)
            .await
            .map_err(|e| BotError::query("page_info", e))?;

        if info.is_redirect {
            tracing::debug!(page = %page, subject = %subject, "Discussion page missing, subject is a redirect");
            Ok(ClassificationValue::Redirect)
        } else {
            Ok(ClassificationValue::Unknown)
        }
    }
}
