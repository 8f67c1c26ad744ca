//! MediaWiki Action API client
//!
//! Implements [`WikiApi`] over HTTP:
//! - Every request asks for `format=json&formatversion=2`
//! - List and prop queries follow `continue` until exhausted
//! - Sessions are cookie based; the CSRF token is fetched once and cached
//! - API `error` objects become [`WikiError::Api`], `missingtitle` becomes
//!   [`WikiError::NotFound`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use talkbanner_core::{CategoryTitle, PageInfo, PageTitle, TemplateTitle, WikiApi, WikiError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::response::{ApiErrorBody, ApiResponse};

type Params = Vec<(String, String)>;

const FORMAT: [(&str, &str); 2] = [("format", "json"), ("formatversion", "2")];

fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn transport(error: reqwest::Error) -> WikiError {
    WikiError::Transport(error.to_string())
}

fn api_error(body: ApiErrorBody) -> WikiError {
    WikiError::api(body.code, body.info)
}

fn missing_title_as_not_found(error: WikiError, title: &PageTitle) -> WikiError {
    match error {
        WikiError::Api { ref code, .. } if code == "missingtitle" => {
            WikiError::not_found(title.as_str())
        }
        other => other,
    }
}

/// HTTP client for one wiki
#[derive(Debug)]
pub struct MediaWikiClient {
    http: Client,
    endpoint: String,
    csrf_token: Mutex<Option<String>>,
}

impl MediaWikiClient {
    /// Build a client with a fresh cookie jar
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, WikiError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            csrf_token: Mutex::new(None),
        })
    }

    /// Log in with a bot password
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Auth`] unless the wiki answers `Success`.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), WikiError> {
        let response = self
            .get(&params([("action", "query"), ("meta", "tokens"), ("type", "login")]))
            .await?;
        let token = response
            .query
            .and_then(|q| q.tokens)
            .and_then(|t| t.logintoken)
            .ok_or_else(|| WikiError::Decode("login token missing from response".into()))?;

        let response = self
            .post(&params([
                ("action", "login"),
                ("lgname", username),
                ("lgpassword", password),
                ("lgtoken", token.as_str()),
            ]))
            .await?;
        let login = response
            .login
            .ok_or_else(|| WikiError::Decode("login result missing from response".into()))?;

        if login.result != "Success" {
            let reason = login.reason.map_or_else(
                || login.result.clone(),
                |r| r.as_str().map_or_else(|| r.to_string(), str::to_string),
            );
            return Err(WikiError::Auth(reason));
        }

        // Tokens are bound to the session
        *self.csrf_token.lock().await = None;
        info!(username, endpoint = %self.endpoint, "logged in");
        Ok(())
    }

    async fn csrf_token(&self) -> Result<String, WikiError> {
        let mut cached = self.csrf_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let response = self
            .get(&params([("action", "query"), ("meta", "tokens")]))
            .await?;
        let token = response
            .query
            .and_then(|q| q.tokens)
            .and_then(|t| t.csrftoken)
            .ok_or_else(|| WikiError::Decode("csrf token missing from response".into()))?;

        *cached = Some(token.clone());
        Ok(token)
    }

    async fn get(&self, fields: &Params) -> Result<ApiResponse, WikiError> {
        self.send(self.http.get(&self.endpoint).query(FORMAT.as_slice()).query(fields))
            .await
    }

    async fn post(&self, fields: &Params) -> Result<ApiResponse, WikiError> {
        let mut form = fields.clone();
        form.extend(params(FORMAT));
        self.send(self.http.post(&self.endpoint).form(&form)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, WikiError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(WikiError::Transport(format!(
                "HTTP {} - {}",
                status.as_u16(),
                body
            )));
        }

        let mut decoded: ApiResponse =
            serde_json::from_str(&body).map_err(|e| WikiError::Decode(e.to_string()))?;
        match decoded.error.take() {
            Some(error) => Err(api_error(error)),
            None => Ok(decoded),
        }
    }

    /// Run a query, following continuation until the result set is complete
    async fn query_continued<T, F>(&self, base: Params, mut extract: F) -> Result<Vec<T>, WikiError>
    where
        T: Send,
        F: FnMut(&ApiResponse, &mut Vec<T>) + Send,
    {
        let mut out = Vec::new();
        let mut continuation: Params = Vec::new();

        loop {
            let mut request = base.clone();
            request.extend(continuation.iter().cloned());

            let response = self.get(&request).await?;
            extract(&response, &mut out);

            match response.continue_params() {
                Some(next) if next == continuation => {
                    return Err(WikiError::Decode("continuation did not advance".into()));
                }
                Some(next) => continuation = next,
                None => break,
            }
        }

        Ok(out)
    }

    async fn category_members(
        &self,
        category: &CategoryTitle,
        kind: &str,
        namespace: Option<i32>,
    ) -> Result<Vec<String>, WikiError> {
        let mut base = params([
            ("action", "query"),
            ("list", "categorymembers"),
            ("cmtitle", category.as_str()),
            ("cmtype", kind),
            ("cmlimit", "max"),
            ("cmprop", "title"),
        ]);
        if let Some(ns) = namespace {
            base.push(("cmnamespace".to_string(), ns.to_string()));
        }

        let titles = self
            .query_continued(base, |response, out| {
                if let Some(query) = &response.query {
                    out.extend(query.categorymembers.iter().map(|m| m.title.clone()));
                }
            })
            .await?;

        debug!(category = %category, kind, count = titles.len(), "listed category members");
        Ok(titles)
    }
}

#[async_trait]
impl WikiApi for MediaWikiClient {
    async fn list_subcategories(
        &self,
        category: &CategoryTitle,
    ) -> Result<Vec<CategoryTitle>, WikiError> {
        let titles = self.category_members(category, "subcat", None).await?;
        Ok(titles.into_iter().map(CategoryTitle::new).collect())
    }

    async fn list_member_pages(
        &self,
        category: &CategoryTitle,
        namespace: Option<i32>,
    ) -> Result<Vec<PageTitle>, WikiError> {
        let titles = self.category_members(category, "page", namespace).await?;
        Ok(titles.into_iter().map(PageTitle::new).collect())
    }

    async fn page_info(&self, title: &PageTitle) -> Result<PageInfo, WikiError> {
        let response = self
            .get(&params([
                ("action", "query"),
                ("prop", "info"),
                ("titles", title.as_str()),
            ]))
            .await?;

        let page = response
            .first_page()
            .ok_or_else(|| WikiError::Decode(format!("no page entry for {title}")))?;

        if page.invalid {
            return Err(WikiError::api("invalidtitle", format!("bad title {title}")));
        }
        if page.missing {
            return Ok(PageInfo::missing());
        }

        Ok(PageInfo {
            exists: true,
            is_redirect: page.redirect,
            length: page.length,
        })
    }

    async fn templates_on(&self, title: &PageTitle) -> Result<Vec<TemplateTitle>, WikiError> {
        let base = params([
            ("action", "query"),
            ("prop", "templates"),
            ("titles", title.as_str()),
            ("tllimit", "max"),
        ]);

        self.query_continued(base, |response, out| {
            if let Some(page) = response.first_page() {
                out.extend(page.templates.iter().map(|t| PageTitle::new(t.title.as_str())));
            }
        })
        .await
    }

    async fn redirects_to(&self, title: &PageTitle) -> Result<Vec<PageTitle>, WikiError> {
        let base = params([
            ("action", "query"),
            ("prop", "redirects"),
            ("titles", title.as_str()),
            ("rdprop", "title"),
            ("rdlimit", "max"),
        ]);

        self.query_continued(base, |response, out| {
            if let Some(page) = response.first_page() {
                out.extend(page.redirects.iter().map(|r| PageTitle::new(r.title.as_str())));
            }
        })
        .await
    }

    async fn render_wikitext(&self, title: &PageTitle) -> Result<String, WikiError> {
        let response = self
            .get(&params([
                ("action", "parse"),
                ("page", title.as_str()),
                ("prop", "wikitext"),
            ]))
            .await
            .map_err(|e| missing_title_as_not_found(e, title))?;

        response
            .parse
            .map(|p| p.wikitext)
            .ok_or_else(|| WikiError::Decode(format!("no wikitext for {title}")))
    }

    async fn prepend_content(
        &self,
        title: &PageTitle,
        text: &str,
        summary: &str,
    ) -> Result<(), WikiError> {
        let token = self.csrf_token().await?;

        let result = self
            .post(&params([
                ("action", "edit"),
                ("title", title.as_str()),
                ("prependtext", text),
                ("summary", summary),
                ("bot", "1"),
                ("token", token.as_str()),
            ]))
            .await;

        let response = match result {
            Ok(response) => response,
            Err(WikiError::Api { code, info }) if code == "badtoken" => {
                warn!(page = %title, "csrf token rejected, discarding cached token");
                *self.csrf_token.lock().await = None;
                return Err(WikiError::Api { code, info });
            }
            Err(e) => return Err(e),
        };

        match response.edit {
            Some(edit) if edit.result == "Success" => {
                debug!(page = %title, "edit saved");
                Ok(())
            }
            Some(edit) => Err(WikiError::api("editfailed", edit.result)),
            None => Err(WikiError::Decode(format!("no edit result for {title}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_title_maps_to_not_found() {
        let title = PageTitle::new("Talk:Nowhere");
        let error = missing_title_as_not_found(
            WikiError::api("missingtitle", "The page you specified doesn't exist."),
            &title,
        );
        assert_eq!(error, WikiError::not_found("Talk:Nowhere"));

        let other = missing_title_as_not_found(WikiError::api("ratelimited", "slow down"), &title);
        assert!(!other.is_not_found());
    }

    #[test]
    fn builds_param_pairs() {
        let pairs = params([("action", "query"), ("titles", "Talk:Central Park")]);
        assert_eq!(pairs[1], ("titles".to_string(), "Talk:Central Park".to_string()));
    }
}
