//! HTTP-backed page session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SessionConfig;
use crate::session::{PageSession, Visibility};
use crate::utils::http::{create_client, fetch_text};
use crate::utils::parse_selector;

/// Page session over a cookie-keeping HTTP client.
///
/// `navigate` only records the target; the request is made while waiting,
/// so the wait timeout bounds the whole page load.
pub struct HttpSession {
    client: Client,
    /// Top-level location, as a browser address bar would show it
    current_url: String,
    /// URL the current document was loaded from (differs inside a frame)
    document_url: String,
    pending: Option<String>,
    source: String,
}

impl HttpSession {
    /// Create a session with a client built from configuration.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Ok(Self::with_client(create_client(config)?))
    }

    /// Create a session around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            current_url: String::new(),
            document_url: String::new(),
            pending: None,
            source: String::new(),
        }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// URL the current document came from.
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Load a page right away, without a readiness timeout.
    ///
    /// Transport failures are returned; error statuses load like any page.
    pub async fn load(&mut self, url: &str) -> Result<()> {
        let (final_url, text) = fetch_text(&self.client, url).await?;
        self.pending = None;
        self.set_document(final_url.clone(), final_url, text);
        Ok(())
    }

    pub(crate) fn set_document(&mut self, current_url: String, document_url: String, source: String) {
        self.current_url = current_url;
        self.document_url = document_url;
        self.source = source;
    }

    /// Resolve the `src` of the named frame against the current document.
    fn frame_src(&self, name: &str) -> Result<Url> {
        let document = Html::parse_document(&self.source);
        let frames = parse_selector("frame, iframe")?;
        let src = document
            .select(&frames)
            .find(|frame| frame.value().attr("name") == Some(name))
            .and_then(|frame| frame.value().attr("src"))
            .ok_or_else(|| {
                AppError::session(&self.current_url, format!("frame '{name}' not found"))
            })?;

        let base = Url::parse(&self.document_url)?;
        Ok(base.join(src)?)
    }
}

/// Whether markup shows page content: a non-empty body or a frameset.
pub(crate) fn has_visible_body(source: &str) -> bool {
    let document = Html::parse_document(source);
    let Ok(containers) = parse_selector("body, frameset") else {
        return false;
    };
    document.select(&containers).any(|element| {
        element.value().name() == "frameset" || element.children().next().is_some()
    })
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        Url::parse(url)?;
        self.pending = Some(url.to_string());
        self.set_document(url.to_string(), url.to_string(), String::new());
        Ok(())
    }

    async fn wait_for_body(&mut self, timeout: Duration) -> Visibility {
        if let Some(url) = self.pending.take() {
            match tokio::time::timeout(timeout, fetch_text(&self.client, &url)).await {
                Ok(Ok((final_url, text))) => {
                    self.set_document(final_url.clone(), final_url, text);
                }
                Ok(Err(e)) => {
                    log::warn!("Failed to load {}: {}", url, e);
                    return Visibility::TimedOut;
                }
                Err(_) => {
                    log::debug!("No page from {} within {:?}", url, timeout);
                    return Visibility::TimedOut;
                }
            }
        }

        if has_visible_body(&self.source) {
            Visibility::Visible
        } else {
            Visibility::TimedOut
        }
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }

    async fn switch_to_frame(&mut self, name: &str) -> Result<()> {
        let src = self.frame_src(name)?;
        let (frame_url, text) = fetch_text(&self.client, src.as_str()).await?;
        log::debug!("Entered frame '{}' at {}", name, frame_url);

        let top = self.current_url.clone();
        self.set_document(top, frame_url, text);
        Ok(())
    }

    fn page_source(&self) -> &str {
        &self.source
    }
}
