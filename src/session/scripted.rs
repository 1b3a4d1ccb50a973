//! Scripted page session for unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::session::{PageSession, Visibility};

/// What one navigation produces.
pub(crate) enum Script {
    /// The page loads; an empty `url` keeps the navigated URL
    Page { url: &'static str, html: String },
    /// The page never shows a body
    Timeout,
}

impl Script {
    pub(crate) fn page(html: impl Into<String>) -> Self {
        Script::Page {
            url: "",
            html: html.into(),
        }
    }
}

/// Session replaying a fixed sequence of page loads.
pub(crate) struct ScriptedSession {
    script: VecDeque<Script>,
    pub(crate) frames: Vec<(&'static str, String)>,
    pub(crate) visited: Vec<String>,
    current_url: String,
    source: String,
    ready: bool,
}

impl ScriptedSession {
    pub(crate) fn new(script: Vec<Script>) -> Self {
        Self {
            script: script.into(),
            frames: Vec::new(),
            visited: Vec::new(),
            current_url: String::new(),
            source: String::new(),
            ready: false,
        }
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.visited.push(url.to_string());
        self.current_url = url.to_string();
        self.source.clear();
        self.ready = false;
        match self.script.pop_front() {
            Some(Script::Page { url, html }) => {
                if !url.is_empty() {
                    self.current_url = url.to_string();
                }
                self.source = html;
                self.ready = true;
            }
            Some(Script::Timeout) | None => {}
        }
        Ok(())
    }

    async fn wait_for_body(&mut self, _timeout: Duration) -> Visibility {
        if self.ready {
            Visibility::Visible
        } else {
            Visibility::TimedOut
        }
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }

    async fn switch_to_frame(&mut self, name: &str) -> Result<()> {
        let (_, html) = self
            .frames
            .iter()
            .find(|(frame, _)| *frame == name)
            .ok_or_else(|| AppError::session(&self.current_url, "no frame"))?;
        self.source = html.clone();
        Ok(())
    }

    fn page_source(&self) -> &str {
        &self.source
    }
}
