//! Action API response bodies (`formatversion=2`)

use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level response envelope
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub(crate) error: Option<ApiErrorBody>,
    #[serde(default, rename = "continue")]
    pub(crate) continuation: Option<Map<String, Value>>,
    #[serde(default)]
    pub(crate) query: Option<Query>,
    #[serde(default)]
    pub(crate) parse: Option<Parse>,
    #[serde(default)]
    pub(crate) login: Option<Login>,
    #[serde(default)]
    pub(crate) edit: Option<Edit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) info: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Query {
    #[serde(default)]
    pub(crate) categorymembers: Vec<TitleEntry>,
    #[serde(default)]
    pub(crate) pages: Vec<PageEntry>,
    #[serde(default)]
    pub(crate) tokens: Option<Tokens>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleEntry {
    pub(crate) title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageEntry {
    #[allow(dead_code)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) missing: bool,
    #[serde(default)]
    pub(crate) invalid: bool,
    #[serde(default)]
    pub(crate) redirect: bool,
    #[serde(default)]
    pub(crate) length: u64,
    #[serde(default)]
    pub(crate) templates: Vec<TitleEntry>,
    #[serde(default)]
    pub(crate) redirects: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tokens {
    #[serde(default)]
    pub(crate) logintoken: Option<String>,
    #[serde(default)]
    pub(crate) csrftoken: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Parse {
    pub(crate) wikitext: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Login {
    pub(crate) result: String,
    #[serde(default)]
    pub(crate) reason: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edit {
    pub(crate) result: String,
}

impl ApiResponse {
    /// Continuation parameters as request pairs
    pub(crate) fn continue_params(&self) -> Option<Vec<(String, String)>> {
        self.continuation.as_ref().map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let value = v.as_str().map_or_else(|| v.to_string(), str::to_string);
                    (k.clone(), value)
                })
                .collect()
        })
    }

    /// First page of a `prop=` query
    pub(crate) fn first_page(&self) -> Option<&PageEntry> {
        self.query.as_ref().and_then(|q| q.pages.first())
    }
}
