use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::{prelude::*, ChromiumLikeCapabilities};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::configuration::BrowserSettings;

use super::{Browser, BrowserError, Locator};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Chrome driven over WebDriver, shared by every lookup of the run.
pub struct Droid {
    driver: Option<WebDriver>,
}

impl Droid {
    pub async fn connect(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in settings.chrome_args() {
            caps.add_arg(&arg)?;
        }

        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps).await?;
        log::info!("Started browser session on {}", settings.webdriver_url);

        Ok(Droid {
            driver: Some(driver),
        })
    }

    fn driver(&self) -> Result<&WebDriver, BrowserError> {
        self.driver.as_ref().ok_or(BrowserError::Released)
    }

    async fn find(&self, locator: &Locator) -> Result<WebElement, BrowserError> {
        self.driver()?.find(locator.by()).await.map_err(|e| {
            log::debug!("Lookup of {} failed: {}", locator, e);
            BrowserError::from_lookup(e, BrowserError::NotFound(*locator))
        })
    }

    async fn run_script(
        &self,
        script: &str,
        locator: &Locator,
        extra: Option<serde_json::Value>,
    ) -> Result<(), BrowserError> {
        let element = self.find(locator).await?;
        let mut args = vec![element.to_json()?];
        args.extend(extra);
        self.driver()?.execute(script, args).await?;
        Ok(())
    }
}

#[async_trait]
impl Browser for Droid {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.driver()?.goto(url).await?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.driver()?.source().await?)
    }

    async fn wait_present(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.driver()?
            .query(locator.by())
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| {
                log::debug!("Wait for {} failed: {}", locator, e);
                BrowserError::from_lookup(
                    e,
                    BrowserError::Timeout {
                        locator: *locator,
                        timeout,
                    },
                )
            })?;
        Ok(())
    }

    async fn wait_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.driver()?
            .query(locator.by())
            .and_clickable()
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| {
                log::debug!("Wait for clickable {} failed: {}", locator, e);
                BrowserError::from_lookup(
                    e,
                    BrowserError::Timeout {
                        locator: *locator,
                        timeout,
                    },
                )
            })?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.find(locator).await?.click().await?;
        Ok(())
    }

    async fn script_click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.run_script("arguments[0].click();", locator, None).await
    }

    async fn set_value(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        self.run_script(
            "arguments[0].value = arguments[1];",
            locator,
            Some(json!(value)),
        )
        .await
    }

    async fn clear_and_type(
        &mut self,
        locator: &Locator,
        text: &str,
    ) -> Result<(), BrowserError> {
        let element = self.find(locator).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn read_value(&mut self, locator: &Locator) -> Result<Option<String>, BrowserError> {
        Ok(self.find(locator).await?.prop("value").await?)
    }

    async fn read_text(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        Ok(self.find(locator).await?.text().await?)
    }

    async fn read_inner_html(&mut self, locator: &Locator) -> Result<String, BrowserError> {
        Ok(self.find(locator).await?.inner_html().await?)
    }

    async fn is_displayed(&mut self, locator: &Locator) -> Result<bool, BrowserError> {
        Ok(self.find(locator).await?.is_displayed().await?)
    }

    async fn release(&mut self) -> Result<(), BrowserError> {
        let driver = self.driver.take().ok_or(BrowserError::Released)?;
        driver.quit().await?;
        log::info!("Browser session closed");
        Ok(())
    }

    fn release_on_drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        log::warn!("Browser session dropped without release, quitting WebDriver");

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                if let Err(e) = tokio::task::block_in_place(|| handle.block_on(driver.quit())) {
                    log::error!("Failed to quit WebDriver session: {:?}", e);
                }
            }
            _ => log::error!("No multi-threaded runtime left to quit the WebDriver session"),
        }
    }
}
