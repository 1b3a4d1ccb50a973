//! Registry login handshake.

use std::fmt;

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::RegistryConfig;
use crate::session::{HttpSession, PageSession};
use crate::utils::http::read_page;
use crate::utils::parse_selector;

const USER_FIELD: &str = "Login";
const PASSWORD_FIELD: &str = "Senha";
const SUBMIT_VALUE: &str = "Avançar";

/// Registry account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// How the login step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were submitted and accepted
    LoggedIn,
    /// No login form was shown; the session was already authenticated
    AlreadyLoggedIn,
}

/// Login form found in a page, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub action: Url,
    pub use_get: bool,
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Find the form holding both credential inputs.
    ///
    /// Hidden and text inputs keep their values; of the submit buttons only
    /// the one labelled "Avançar" is sent, as if it had been clicked.
    pub fn find(document: &Html, base: &Url) -> Result<Option<Self>> {
        let forms = parse_selector("form")?;
        let inputs = parse_selector("input[name]")?;

        for form in document.select(&forms) {
            let named: Vec<ElementRef<'_>> = form.select(&inputs).collect();
            let has = |field: &str| named.iter().any(|i| i.value().attr("name") == Some(field));
            if !has(USER_FIELD) || !has(PASSWORD_FIELD) {
                continue;
            }

            let fields = named.iter().filter_map(|input| form_value(*input)).collect();
            let action = match form.value().attr("action").map(str::trim) {
                Some(action) if !action.is_empty() => base.join(action)?,
                _ => base.clone(),
            };
            let use_get = form
                .value()
                .attr("method")
                .is_some_and(|m| m.eq_ignore_ascii_case("get"));

            return Ok(Some(Self {
                action,
                use_get,
                fields,
            }));
        }
        Ok(None)
    }

    /// Set the credential fields, replacing whatever the page pre-filled.
    pub fn fill(&mut self, credentials: &Credentials) {
        for (name, value) in &mut self.fields {
            if name == USER_FIELD {
                value.clone_from(&credentials.username);
            } else if name == PASSWORD_FIELD {
                value.clone_from(&credentials.password);
            }
        }
    }
}

/// Name/value pair an input contributes to the submission, if any.
fn form_value(input: ElementRef<'_>) -> Option<(String, String)> {
    let element = input.value();
    let name = element.attr("name")?.to_string();
    let value = element.attr("value").unwrap_or_default().to_string();
    let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();

    match kind.as_str() {
        "submit" | "image" | "button" => (value == SUBMIT_VALUE).then_some((name, value)),
        "checkbox" | "radio" => element.attr("checked").map(|_| (name, value)),
        "reset" | "file" => None,
        _ => Some((name, value)),
    }
}

impl HttpSession {
    /// Authenticate against the registry.
    ///
    /// Loads the application root, enters the content frame and submits the
    /// login form. A page without the form means the session is already
    /// authenticated; a response that shows the form again means the
    /// credentials were refused.
    pub async fn login(
        &mut self,
        registry: &RegistryConfig,
        credentials: &Credentials,
    ) -> Result<LoginOutcome> {
        self.load(&registry.root_url).await?;
        if let Err(e) = self.switch_to_frame(&registry.frame_name).await {
            log::debug!("Login page without frame '{}': {}", registry.frame_name, e);
        }

        let Some(mut form) = self.current_login_form()? else {
            return Ok(LoginOutcome::AlreadyLoggedIn);
        };
        form.fill(credentials);

        let request = if form.use_get {
            self.client().get(form.action.clone()).query(&form.fields)
        } else {
            self.client().post(form.action.clone()).form(&form.fields)
        };
        let response = request.send().await?.error_for_status()?;
        let (final_url, text) = read_page(response).await?;

        let top = self.current_url().to_string();
        self.set_document(top, final_url, text);

        if self.current_login_form()?.is_some() {
            return Err(AppError::login(format!(
                "credentials for '{}' were not accepted",
                credentials.username
            )));
        }
        Ok(LoginOutcome::LoggedIn)
    }

    fn current_login_form(&self) -> Result<Option<LoginForm>> {
        let base = Url::parse(self.document_url())?;
        let document = Html::parse_document(self.page_source());
        LoginForm::find(&document, &base)
    }
}
