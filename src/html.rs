// MIT License - Copyright (c) 2026 Peter Wright
// Scraping of the portal's server-rendered pages

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{
    ARMING_STATE_ID, EVENT_VALIDATION, LOGIN_ERROR_PANEL_ID, LOGIN_PASSWORD_FIELD, VIEWSTATE,
    VIEWSTATE_GENERATOR,
};
use crate::devices::AlarmState;
use crate::error::{AlarmError, Result};

static VIEWSTATE_RE: LazyLock<Regex> = LazyLock::new(|| hidden_field_regex(VIEWSTATE));
static VIEWSTATE_GENERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| hidden_field_regex(VIEWSTATE_GENERATOR));
static EVENT_VALIDATION_RE: LazyLock<Regex> =
    LazyLock::new(|| hidden_field_regex(EVENT_VALIDATION));

static SESSION_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\(S[^/]+)/").expect("session key pattern"));

static ARMING_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?s)id="{}"[^>]*>(.*?)</span>"#,
        regex::escape(ARMING_STATE_ID)
    ))
    .expect("arming state pattern")
});

static ERROR_PANEL_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"id="{}"[^>]*>"#, regex::escape(LOGIN_ERROR_PANEL_ID)))
        .expect("error panel pattern")
});

static DIV_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)div\b[^>]*>").expect("div tag pattern"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

fn hidden_field_regex(name: &str) -> Regex {
    Regex::new(&format!(r#"name="{}".*?value="([^"]*)""#, regex::escape(name)))
        .expect("hidden field pattern")
}

/// ASP.NET hidden form state that must be echoed back with every POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTokens {
    pub view_state: String,
    pub view_state_generator: Option<String>,
    pub event_validation: Option<String>,
}

impl FormTokens {
    /// Extract the hidden fields from a page. `__VIEWSTATE` is mandatory; the
    /// portal omits the other two on some pages.
    pub fn extract(html: &str) -> Result<Self> {
        let view_state = capture(&VIEWSTATE_RE, html)
            .ok_or(AlarmError::SessionKeyNotFound { field: VIEWSTATE })?;
        Ok(Self {
            view_state,
            view_state_generator: capture(&VIEWSTATE_GENERATOR_RE, html),
            event_validation: capture(&EVENT_VALIDATION_RE, html),
        })
    }

    /// Form fields in the order the portal renders them.
    pub fn as_form(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![(VIEWSTATE, self.view_state.clone())];
        if let Some(ref generator) = self.view_state_generator {
            fields.push((VIEWSTATE_GENERATOR, generator.clone()));
        }
        if let Some(ref validation) = self.event_validation {
            fields.push((EVENT_VALIDATION, validation.clone()));
        }
        fields
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Inner HTML of the div whose start tag `open` matches, up to its balanced
/// close tag.
fn div_inner<'a>(html: &'a str, open: &Regex) -> Option<&'a str> {
    let start = open.find(html)?.end();
    let rest = &html[start..];
    let mut depth = 1usize;
    for tag in DIV_TAG_RE.captures_iter(rest) {
        let closing = tag.get(1).is_some_and(|c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[..tag.get(0)?.start()]);
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Text content of an HTML fragment with tags removed and whitespace collapsed.
fn text_content(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    WS_RE.replace_all(stripped.trim(), " ").into_owned()
}

/// Session key path segment (`(S(abc123))`) embedded in a portal URL.
pub fn extract_session_key(url: &str) -> Option<String> {
    capture(&SESSION_KEY_RE, url)
}

/// Whether the page is the credential form, meaning we are not logged in.
pub fn is_login_page(html: &str) -> bool {
    html.contains(LOGIN_PASSWORD_FIELD)
}

/// Message of the login error panel, if the page shows one.
pub fn extract_login_error(html: &str) -> Option<String> {
    div_inner(html, &ERROR_PANEL_OPEN_RE)
        .map(text_content)
        .filter(|msg| !msg.is_empty())
}

/// Raw arming label of the status page.
pub fn extract_arming_label(html: &str) -> Option<String> {
    capture(&ARMING_STATE_RE, html).map(|inner| text_content(&inner))
}

/// Outcome of posting the credential form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected { message: String },
}

/// Classify the page returned by the login POST.
pub fn classify_login_response(html: &str) -> LoginOutcome {
    if let Some(message) = extract_login_error(html) {
        return LoginOutcome::Rejected { message };
    }
    if is_login_page(html) {
        return LoginOutcome::Rejected {
            message: "portal returned the login form".to_string(),
        };
    }
    LoginOutcome::Accepted
}

/// Tagged result of inspecting a portal response for session validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck<T> {
    /// The response is what we asked for
    Valid(T),
    /// The portal sent us back to the login form
    Expired,
    /// Neither the expected content nor a login form
    Malformed(String),
}

impl<T> SessionCheck<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Expired => Err(AlarmError::SessionExpired),
            Self::Malformed(details) => Err(AlarmError::MalformedResponse { details }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SessionCheck<U> {
        match self {
            Self::Valid(value) => SessionCheck::Valid(f(value)),
            Self::Expired => SessionCheck::Expired,
            Self::Malformed(details) => SessionCheck::Malformed(details),
        }
    }
}

/// What the status page tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPage {
    pub state: AlarmState,
    /// Label as rendered, for logging unknown states
    pub label: String,
    /// Form state for replaying the arm/disarm buttons
    pub tokens: Option<FormTokens>,
}

/// Inspect a status page (or the page returned by an arm/disarm POST).
pub fn check_status_page(html: &str) -> SessionCheck<StatusPage> {
    if is_login_page(html) {
        return SessionCheck::Expired;
    }
    match extract_arming_label(html) {
        Some(label) => SessionCheck::Valid(StatusPage {
            state: AlarmState::from_label(&label),
            label,
            tokens: FormTokens::extract(html).ok(),
        }),
        None => SessionCheck::Malformed(format!("{ARMING_STATE_ID} not found on status page")),
    }
}
