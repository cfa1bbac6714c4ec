//! Scripted stand-in for [`Droid`](super::Droid) used by the tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;

use super::{
    portal::{
        BUILT_AREA_VALUE, CONSTRUCTION_YEAR_VALUE, PRIMARY_USE_VALUE, VALIDATION_MESSAGE,
    },
    Browser, BrowserError, Locator,
};

/// Answers like a search page that leads to a result page, unless told
/// otherwise. Every call is recorded.
pub struct MockDroid {
    page_source: String,
    navigate_failures: usize,
    missing: HashSet<Locator>,
    texts: HashMap<Locator, String>,
    markup: HashMap<Locator, String>,
    displayed: HashSet<Locator>,
    value: Option<String>,
    set_value_fails: bool,
    typing_fails: bool,
    pub calls: Vec<String>,
    releases: Arc<AtomicUsize>,
}

impl MockDroid {
    pub fn portal() -> Self {
        MockDroid {
            page_source: "<html><a href='#refcat2'>Referencia catastral</a></html>".to_string(),
            navigate_failures: 0,
            missing: HashSet::new(),
            texts: HashMap::from([
                (PRIMARY_USE_VALUE, "Residencial".to_string()),
                (BUILT_AREA_VALUE, "123.45 m2".to_string()),
                (CONSTRUCTION_YEAR_VALUE, "1975".to_string()),
            ]),
            markup: HashMap::from([(BUILT_AREA_VALUE, "123.45 m<sup>2</sup>".to_string())]),
            displayed: HashSet::new(),
            value: None,
            set_value_fails: false,
            typing_fails: false,
            calls: vec![],
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_page_source(mut self, page_source: &str) -> Self {
        self.page_source = page_source.to_string();
        self
    }

    /// The first `count` navigations fail.
    pub fn failing_navigations(mut self, count: usize) -> Self {
        self.navigate_failures = count;
        self
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.insert(locator);
        self.texts.remove(&locator);
        self.markup.remove(&locator);
        self
    }

    pub fn with_text(mut self, locator: Locator, text: &str) -> Self {
        self.texts.insert(locator, text.to_string());
        self
    }

    pub fn with_markup(mut self, locator: Locator, markup: &str) -> Self {
        self.markup.insert(locator, markup.to_string());
        self
    }

    pub fn showing_validation_error(mut self, message: &str) -> Self {
        self.displayed.insert(VALIDATION_MESSAGE);
        self.with_text(VALIDATION_MESSAGE, message)
    }

    /// Script assignment of the field value fails.
    pub fn failing_set_value(mut self) -> Self {
        self.set_value_fails = true;
        self
    }

    /// Clearing and typing into the field fails.
    pub fn failing_typing(mut self) -> Self {
        self.typing_fails = true;
        self
    }

    pub fn releases(&self) -> Arc<AtomicUsize> {
        self.releases.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&mut self, call: String) {
        self.calls.push(call);
    }

    fn check(&self, locator: &Locator) -> Result<(), BrowserError> {
        match self.missing.contains(locator) {
            true => Err(BrowserError::NotFound(*locator)),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl Browser for MockDroid {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.record("navigate".to_string());
        if self.navigate_failures > 0 {
            self.navigate_failures -= 1;
            return Err(BrowserError::NotFound(Locator::Css("body")));
        }
        log::debug!("mock navigate to {}", url);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.page_source.clone())
    }

    async fn wait_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.record(format!("wait_present {}", locator));
        self.check(locator).map_err(|_| BrowserError::Timeout {
            locator: *locator,
            timeout,
        })
    }

    async fn wait_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.record(format!("wait_clickable {}", locator));
        self.check(locator).map_err(|_| BrowserError::Timeout {
            locator: *locator,
            timeout,
        })
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.record(format!("click {}", locator));
        self.check(locator)
    }

    async fn script_click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.record(format!("script_click {}", locator));
        self.check(locator)
    }

    async fn set_value(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.record(format!("set_value {}", locator));
        self.check(locator)?;
        if self.set_value_fails {
            return Err(BrowserError::NotFound(*locator));
        }
        self.value = Some(value.to_string());
        Ok(())
    }

    async fn clear_and_type(
        &mut self,
        locator: &Locator,
        text: &str,
    ) -> Result<(), BrowserError> {
        self.record(format!("clear_and_type {}", locator));
        self.check(locator)?;
        if self.typing_fails {
            return Err(BrowserError::NotFound(*locator));
        }
        self.value = Some(text.to_string());
        Ok(())
    }

    async fn read_value(&mut self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        self.check(locator)?;
        Ok(self.value.clone())
    }

    async fn read_text(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        self.texts
            .get(locator)
            .cloned()
            .ok_or(BrowserError::NotFound(*locator))
    }

    async fn read_inner_html(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        self.markup
            .get(locator)
            .cloned()
            .ok_or(BrowserError::NotFound(*locator))
    }

    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, BrowserError> {
        match self.displayed.contains(locator) {
            true => Ok(true),
            false => Err(BrowserError::NotFound(*locator)),
        }
    }

    async fn release(&mut self) -> Result<(), BrowserError> {
        self.record("release".to_string());
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release_on_drop(&mut self) {
        self.record("release_on_drop".to_string());
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
