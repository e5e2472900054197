// MIT License - Copyright (c) 2026 Peter Wright
// Web forms backend: scrape the status page, replay its buttons

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::constants::STATUS_PAGE_PATH;
use crate::devices::{AlarmState, StatusSnapshot};
use crate::error::{AlarmError, Result};
use crate::html::{check_status_page, StatusPage};
use crate::protocol::Command;
use crate::session::Session;
use crate::transport::Portal;

/// Talks to the server-rendered status page.
///
/// Status comes from the arming label; commands are sent by posting the page's
/// own form back with the hidden state scraped a moment earlier and the
/// command's button field set.
pub struct WebFormsPortal {
    session: Session,
}

impl WebFormsPortal {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch and validate the status page, keeping its form state.
    async fn load_status_page(&mut self) -> Result<StatusPage> {
        let url = self.session.page_url(STATUS_PAGE_PATH);
        let (_, html) = self.session.get_page(&url).await?;
        let page = check_status_page(&html).into_result()?;
        self.remember_tokens(&page);
        Ok(page)
    }

    fn remember_tokens(&mut self, page: &StatusPage) {
        if let Some(ref tokens) = page.tokens {
            self.session.set_tokens(tokens.clone());
        }
    }
}

impl Portal for WebFormsPortal {
    async fn login(&mut self) -> Result<()> {
        self.session.login().await
    }

    fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    fn invalidate(&mut self) {
        self.session.invalidate();
    }

    async fn fetch_status(&mut self) -> Result<StatusSnapshot> {
        let page = self.load_status_page().await?;
        if !page.state.is_known() {
            warn!("Unrecognized arming label: {:?}", page.label);
        }
        debug!("Fetched current status from system: {}", page.label);
        Ok(StatusSnapshot::new(page.state, Vec::new()))
    }

    async fn submit(&mut self, command: Command) -> Result<AlarmState> {
        // Tokens are single-use in practice; always start from a fresh page.
        let page = self.load_status_page().await?;
        let tokens = page.tokens.ok_or_else(|| AlarmError::MalformedResponse {
            details: "status page carries no form state".to_string(),
        })?;

        let spec = command.spec();
        let mut form = tokens.as_form();
        form.push((spec.form_button, spec.form_value.to_string()));

        info!("Sending {} to Alarm.com", command);
        let url = self.session.page_url(STATUS_PAGE_PATH);
        let (_, html) = self.session.post_form(&url, &form).await?;

        let result = check_status_page(&html).into_result()?;
        self.remember_tokens(&result);
        debug!("Response from Alarm.com: {}", result.label);

        if result.state.is_known() {
            Ok(result.state)
        } else {
            // The portal shows a transitional label ("Arming...") while the
            // panel acknowledges; the accepted command determines the state.
            debug!("Transitional label {:?}, assuming {}", result.label, command.target_state());
            Ok(command.target_state())
        }
    }
}
