// MIT License - Copyright (c) 2026 Peter Wright
// HTTP session with the portal: cookie jar, form tokens, credential login

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::constants::{
    AJAX_KEY_COOKIE, LOGIN_PAGE_PATH, LOGIN_PASSWORD_FIELD, LOGIN_POST_PATH, LOGIN_STATIC_FIELDS,
    LOGIN_USERNAME_FIELD,
};
use crate::error::{AlarmError, Result};
use crate::html::{classify_login_response, extract_session_key, FormTokens, LoginOutcome};

/// One browsing session with the portal.
///
/// Holds the cookie jar and whatever hidden form state the portal handed us
/// last. A fresh jar is created on every login so that a stale session never
/// leaks into the next one.
pub struct Session {
    config: ClientConfig,
    http: Client,
    jar: Arc<Jar>,
    tokens: Option<FormTokens>,
    session_key: Option<String>,
    logged_in: bool,
}

impl Session {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let http = build_http(&config, jar.clone())?;
        Ok(Self {
            config,
            http,
            jar,
            tokens: None,
            session_key: None,
            logged_in: false,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn tokens(&self) -> Option<&FormTokens> {
        self.tokens.as_ref()
    }

    /// Remember the form state of the most recently fetched page.
    pub fn set_tokens(&mut self, tokens: FormTokens) {
        self.tokens = Some(tokens);
    }

    pub fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    /// Drop the logged-in flag and all scraped state. Cookies are replaced on
    /// the next login.
    pub fn invalidate(&mut self) {
        debug!("Invalidating portal session");
        self.logged_in = false;
        self.tokens = None;
        self.session_key = None;
    }

    /// Start over with an empty cookie jar.
    fn reset(&mut self) -> Result<()> {
        self.invalidate();
        self.jar = Arc::new(Jar::default());
        self.http = build_http(&self.config, self.jar.clone())?;
        Ok(())
    }

    /// Log in with the configured credentials.
    ///
    /// Fetches the login page for its hidden form state, posts the credential
    /// form and inspects the result. On any failure the session is left
    /// logged out with no tokens retained.
    pub async fn login(&mut self) -> Result<()> {
        self.reset()?;
        debug!("Attempting to log into Alarm.com...");

        let (location, page) = self.get_page(&self.config.url(LOGIN_PAGE_PATH)).await?;
        debug!("Login page served from {}", location);

        let session_key = extract_session_key(&location);
        let tokens = FormTokens::extract(&page)?;
        debug!(
            "VIEWSTATEGENERATOR is {:?}, EVENTVALIDATION present: {}",
            tokens.view_state_generator,
            tokens.event_validation.is_some()
        );

        let mut form = tokens.as_form();
        form.extend(LOGIN_STATIC_FIELDS.iter().map(|(k, v)| (*k, v.to_string())));
        form.push((LOGIN_USERNAME_FIELD, self.config.username.clone()));
        form.push((LOGIN_PASSWORD_FIELD, self.config.password.clone()));

        info!("Attempting login to Alarm.com");
        let (landing, body) = self.post_form(&self.config.url(LOGIN_POST_PATH), &form).await?;
        debug!("Post login URL is {}", landing);

        match classify_login_response(&body) {
            LoginOutcome::Accepted => {
                self.session_key = extract_session_key(&landing).or(session_key);
                self.tokens = FormTokens::extract(&body).ok().or(Some(tokens));
                self.logged_in = true;
                info!("Successful login to Alarm.com");
                Ok(())
            }
            LoginOutcome::Rejected { message } => {
                warn!("Unable to login to Alarm.com: {}", message);
                self.invalidate();
                Err(AlarmError::BadCredentials { message })
            }
        }
    }

    /// URL of a portal page, with the session key segment inserted before
    /// the file name when the portal issued one.
    pub fn page_url(&self, path: &str) -> String {
        match (&self.session_key, path.rfind('/')) {
            (Some(key), Some(idx)) => {
                self.config.url(&format!("{}/{}{}", &path[..idx], key, &path[idx..]))
            }
            _ => self.config.url(path),
        }
    }

    /// GET a page. Returns the final URL (after redirects) and the body.
    pub async fn get_page(&self, url: &str) -> Result<(String, String)> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_http(e))?
            .error_for_status()
            .map_err(|e| self.map_http(e))?;
        let location = resp.url().to_string();
        let body = resp.text().await.map_err(|e| self.map_http(e))?;
        Ok((location, body))
    }

    /// POST a url-encoded form. Returns the final URL and the body.
    pub async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<(String, String)> {
        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_http(e))?
            .error_for_status()
            .map_err(|e| self.map_http(e))?;
        let location = resp.url().to_string();
        let body = resp.text().await.map_err(|e| self.map_http(e))?;
        Ok((location, body))
    }

    /// Anti-forgery key the web app copies from the `afg` cookie into the
    /// `ajaxrequestuniquekey` header.
    pub fn ajax_key(&self) -> Option<String> {
        let url = Url::parse(&self.config.base_url).ok()?;
        let header = self.jar.cookies(&url)?;
        let cookies = header.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == AJAX_KEY_COOKIE).then(|| value.to_string())
        })
    }

    /// Classify a transport error, folding reqwest timeouts into ours.
    pub fn map_http(&self, e: reqwest::Error) -> AlarmError {
        if e.is_timeout() {
            AlarmError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            AlarmError::Http(e)
        }
    }
}

fn build_http(config: &ClientConfig, jar: Arc<Jar>) -> Result<Client> {
    Ok(Client::builder()
        .cookie_provider(jar)
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .build()?)
}
