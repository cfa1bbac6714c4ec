use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;

use crate::{
    configuration::Settings,
    domain::{
        area::parse_built_area,
        record::{Field, Outcome, ResultRecord, VALIDATION_ERROR},
        reference::Reference,
    },
};

use super::{
    portal::{
        self, TabStrategy, BUILT_AREA_VALUE, CONSTRUCTION_YEAR_VALUE, COOKIE_ACCEPT,
        PRIMARY_USE_LABEL, PRIMARY_USE_VALUE, REFERENCE_INPUT, SUBMIT_BUTTON, TAB_STRATEGIES,
        VALIDATION_MESSAGE,
    },
    Browser, BrowserError,
};

/// Why a single attempt was abandoned. Every variant is retried.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("could not load the search page: {0}")]
    Navigate(#[source] BrowserError),
    #[error("no tab strategy reached the reference search ({tried} tried)")]
    TabUnreachable { tried: usize },
    #[error("reference field unavailable: {0}")]
    Field(#[source] BrowserError),
    #[error("could not populate the reference field: {0}")]
    Populate(#[source] BrowserError),
    #[error("could not submit the search: {0}")]
    Submit(#[source] BrowserError),
    #[error("result page did not render: {0}")]
    ResultPage(#[source] BrowserError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Population {
    Script,
    Typing,
}

const POPULATION_METHODS: [Population; 2] = [Population::Script, Population::Typing];

/// Looks up one reference on the portal, retrying whole attempts.
#[derive(Debug, Clone)]
pub struct Resolver {
    search_url: String,
    max_retries: u32,
    backoff: Duration,
    cookie_timeout: Duration,
    tab_timeout: Duration,
    element_timeout: Duration,
    settle: Duration,
    cookie_settle: Duration,
    tab_strategies: Vec<TabStrategy>,
}

impl Resolver {
    pub fn new(settings: &Settings) -> Self {
        Resolver {
            search_url: settings.portal.search_url.clone(),
            max_retries: settings.retry.max_retries,
            backoff: settings.retry.backoff(),
            cookie_timeout: settings.portal.cookie_timeout(),
            tab_timeout: settings.portal.tab_timeout(),
            element_timeout: settings.portal.element_timeout(),
            settle: settings.portal.settle(),
            cookie_settle: settings.portal.cookie_settle(),
            tab_strategies: TAB_STRATEGIES.to_vec(),
        }
    }

    /// Always returns a record: access and validation errors short-circuit
    /// the retry loop, and exhausting it yields [`Outcome::Exhausted`].
    pub async fn resolve<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        reference: &Reference,
    ) -> ResultRecord {
        for attempt in 1..=self.max_retries {
            log::info!(
                "[{}] Attempt {}/{}",
                reference,
                attempt,
                self.max_retries
            );

            match self.attempt(browser, reference).await {
                Ok(outcome) => return ResultRecord::new(reference.clone(), outcome),
                Err(e) => {
                    log::error!(
                        "[{}] Attempt {}/{} failed: {}",
                        reference,
                        attempt,
                        self.max_retries,
                        e
                    );
                    if attempt < self.max_retries {
                        log::info!("[{}] Retrying after {:?}", reference, self.backoff);
                        sleep(self.backoff).await;
                    }
                }
            }
        }

        ResultRecord::new(reference.clone(), Outcome::Exhausted)
    }

    async fn attempt<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        reference: &Reference,
    ) -> Result<Outcome, AttemptError> {
        browser
            .navigate(&self.search_url)
            .await
            .map_err(AttemptError::Navigate)?;
        log::info!("[{}] Search page loaded", reference);

        let page_source = browser
            .page_source()
            .await
            .map_err(AttemptError::Navigate)?;
        if portal::is_access_error(&page_source) {
            log::error!("[{}] Access denied or server error detected", reference);
            return Ok(Outcome::AccessDenied);
        }

        self.dismiss_cookies(browser, reference).await;
        self.activate_tab(browser, reference).await?;

        browser
            .wait_present(&REFERENCE_INPUT, self.element_timeout)
            .await
            .map_err(AttemptError::Field)?;
        browser
            .wait_clickable(&REFERENCE_INPUT, self.element_timeout)
            .await
            .map_err(AttemptError::Field)?;
        log::info!("[{}] Found reference input field", reference);

        self.populate(browser, reference).await?;

        if let Some(message) = self.validation_message(browser).await {
            log::error!("[{}] Portal rejected the reference: {}", reference, message);
            return Ok(Outcome::Rejected { message });
        }

        browser
            .wait_clickable(&SUBMIT_BUTTON, self.element_timeout)
            .await
            .map_err(AttemptError::Submit)?;
        browser
            .script_click(&SUBMIT_BUTTON)
            .await
            .map_err(AttemptError::Submit)?;
        log::info!("[{}] Submitted search", reference);

        browser
            .wait_present(&PRIMARY_USE_LABEL, self.element_timeout)
            .await
            .map_err(AttemptError::ResultPage)?;
        log::info!("[{}] Results page loaded", reference);

        Ok(self.extract(browser, reference).await)
    }

    async fn dismiss_cookies<B: Browser + ?Sized>(&self, browser: &mut B, reference: &Reference) {
        let accepted = match browser
            .wait_clickable(&COOKIE_ACCEPT, self.cookie_timeout)
            .await
        {
            Ok(()) => browser.click(&COOKIE_ACCEPT).await,
            Err(e) => Err(e),
        };

        match accepted {
            Ok(()) => {
                log::info!("[{}] Accepted cookie popup", reference);
                sleep(self.cookie_settle).await;
            }
            Err(e) => log::info!("[{}] No cookie popup accepted: {}", reference, e),
        }
    }

    async fn activate_tab<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        reference: &Reference,
    ) -> Result<(), AttemptError> {
        for strategy in &self.tab_strategies {
            let clicked = match browser
                .wait_clickable(&strategy.locator, self.tab_timeout)
                .await
            {
                Ok(()) => browser.click(&strategy.locator).await,
                Err(e) => Err(e),
            };

            match clicked {
                Ok(()) => {
                    log::info!(
                        "[{}] Reference tab activated by {}",
                        reference,
                        strategy.name
                    );
                    return Ok(());
                }
                Err(e) => log::warn!(
                    "[{}] Tab strategy '{}' failed: {}",
                    reference,
                    strategy.name,
                    e
                ),
            }
        }

        Err(AttemptError::TabUnreachable {
            tried: self.tab_strategies.len(),
        })
    }

    /// Applies every population method; the attempt only fails when none took.
    async fn populate<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        reference: &Reference,
    ) -> Result<(), AttemptError> {
        let mut last_error = None;
        let mut applied = 0;

        for method in POPULATION_METHODS {
            let result = match method {
                Population::Script => {
                    browser
                        .set_value(&REFERENCE_INPUT, reference.as_str())
                        .await
                }
                Population::Typing => {
                    browser
                        .clear_and_type(&REFERENCE_INPUT, reference.as_str())
                        .await
                }
            };

            match result {
                Ok(()) => applied += 1,
                Err(e) => {
                    log::warn!("[{}] {:?} population failed: {}", reference, method, e);
                    last_error = Some(e);
                }
            }
        }

        if let (0, Some(e)) = (applied, last_error) {
            return Err(AttemptError::Populate(e));
        }

        sleep(self.settle).await;

        match browser.read_value(&REFERENCE_INPUT).await {
            Ok(value) => log::info!(
                "[{}] Verified entered reference: {}",
                reference,
                value.unwrap_or_default()
            ),
            Err(e) => log::warn!("[{}] Could not read back reference field: {}", reference, e),
        }

        Ok(())
    }

    async fn validation_message<B: Browser + ?Sized>(&self, browser: &mut B) -> Option<String> {
        match browser.is_displayed(&VALIDATION_MESSAGE).await {
            Ok(true) => {}
            _ => return None,
        }

        let message = browser
            .read_text(&VALIDATION_MESSAGE)
            .await
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        match message.is_empty() {
            true => Some(VALIDATION_ERROR.to_string()),
            false => Some(message),
        }
    }

    async fn extract<B: Browser + ?Sized>(&self, browser: &mut B, reference: &Reference) -> Outcome {
        let primary_use = match browser.read_text(&PRIMARY_USE_VALUE).await {
            Ok(text) => Field::from_text(&text),
            Err(e) => {
                log::warn!("[{}] Uso principal not found: {}", reference, e);
                Field::NotFound
            }
        };

        let built_area = match browser.read_inner_html(&BUILT_AREA_VALUE).await {
            Ok(markup) => {
                let text = browser
                    .read_text(&BUILT_AREA_VALUE)
                    .await
                    .unwrap_or_default();
                Field::from(parse_built_area(&markup, &text))
            }
            Err(e) => {
                log::warn!("[{}] Superficie construida not found: {}", reference, e);
                Field::NotFound
            }
        };

        let construction_year = match browser.read_text(&CONSTRUCTION_YEAR_VALUE).await {
            Ok(text) => Field::from_text(&text),
            Err(e) => {
                log::warn!("[{}] Año construcción not found: {}", reference, e);
                Field::NotFound
            }
        };

        Outcome::Found {
            primary_use,
            built_area,
            construction_year,
        }
    }
}
