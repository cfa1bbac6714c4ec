use std::{fmt, time::Duration};

use async_trait::async_trait;
use thirtyfour::{error::WebDriverError, By};
use thiserror::Error;

/// How an element of the portal page is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(&'static str),
    XPath(&'static str),
    Css(&'static str),
    PartialLinkText(&'static str),
}

impl Locator {
    pub fn by(&self) -> By {
        match *self {
            Locator::Id(id) => By::Id(id),
            Locator::XPath(xpath) => By::XPath(xpath),
            Locator::Css(css) => By::Css(css),
            Locator::PartialLinkText(text) => By::PartialLinkText(text),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::PartialLinkText(text) => write!(f, "partial link text={}", text),
        }
    }
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("timed out after {timeout:?} waiting for {locator}")]
    Timeout { locator: Locator, timeout: Duration },
    #[error("element not found: {0}")]
    NotFound(Locator),
    #[error("browser session already released")]
    Released,
    #[error("webdriver error: {0}")]
    Driver(#[from] WebDriverError),
}

impl BrowserError {
    /// Maps a failed lookup or wait. Only a missing element or an expired
    /// wait becomes `missing`; anything else (dead session, lost connection)
    /// stays a driver error.
    pub fn from_lookup(error: WebDriverError, missing: BrowserError) -> Self {
        match error {
            WebDriverError::NoSuchElement(..) | WebDriverError::Timeout(..) => missing,
            other => BrowserError::Driver(other),
        }
    }
}

/// The browser automation surface the resolver drives.
///
/// Every call acts on the one shared session; navigation state left behind
/// by a previous call must not be relied upon.
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn page_source(&mut self) -> Result<String, BrowserError>;

    async fn wait_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn wait_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// Clicks through a script dispatch, bypassing overlays that would
    /// intercept a native click.
    async fn script_click(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// Assigns the element's `value` property from a script.
    async fn set_value(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    async fn clear_and_type(&mut self, locator: &Locator, text: &str)
        -> Result<(), BrowserError>;

    async fn read_value(&mut self, locator: &Locator) -> Result<Option<String>, BrowserError>;

    async fn read_text(&mut self, locator: &Locator) -> Result<String, BrowserError>;

    async fn read_inner_html(&mut self, locator: &Locator) -> Result<String, BrowserError>;

    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, BrowserError>;

    /// Terminates the browser process. Only the first call has an effect.
    async fn release(&mut self) -> Result<(), BrowserError>;

    /// Last-resort release used when a session guard is dropped unreleased.
    fn release_on_drop(&mut self) {}
}
