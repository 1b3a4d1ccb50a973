//! Page session abstraction.
//!
//! The retrieval engine drives pages through [`PageSession`]: navigate,
//! wait for the page to show a body, optionally enter a frame, then read
//! the page source. [`HttpSession`] implements it over a cookie-keeping
//! HTTP client; tests plug in scripted sessions.

mod http;
mod login;
#[cfg(test)]
pub(crate) mod scripted;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpSession;
pub use login::{Credentials, LoginForm, LoginOutcome};

/// Result of waiting for a page to become ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The page shows a body within the timeout
    Visible,
    /// The timeout expired first, or the page never loaded
    TimedOut,
}

/// A single browsing context, owned by one caller at a time.
#[async_trait]
pub trait PageSession: Send {
    /// Start loading `url`, replacing the current page.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until the current page shows a body, or `timeout` expires.
    async fn wait_for_body(&mut self, timeout: Duration) -> Visibility;

    /// Top-level location of the current page.
    fn current_url(&self) -> &str;

    /// Replace the current document with the content of the named frame.
    async fn switch_to_frame(&mut self, name: &str) -> Result<()>;

    /// Markup of the current document.
    fn page_source(&self) -> &str;
}
