use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, File};
use serde::Deserialize;
use url::Url;

use crate::services::portal::SEARCH_URL;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub portal: PortalSettings,
    pub files: FileSettings,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    pub search_url: String,
    pub cookie_timeout_secs: u64,
    pub element_timeout_secs: u64,
    pub tab_timeout_secs: u64,
    pub settle_millis: u64,
    pub cookie_settle_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub backoff_secs: u64,
    pub inter_reference_delay_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            window_size: "1920,1080".to_string(),
        }
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        PortalSettings {
            search_url: SEARCH_URL.to_string(),
            cookie_timeout_secs: 10,
            element_timeout_secs: 30,
            tab_timeout_secs: 5,
            settle_millis: 1000,
            cookie_settle_millis: 2000,
        }
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        FileSettings {
            input: PathBuf::from("cadastral_references.csv"),
            output: PathBuf::from("cadastre_results.csv"),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_retries: 3,
            backoff_secs: 5,
            inter_reference_delay_secs: 2,
        }
    }
}

impl BrowserSettings {
    /// Startup flags for the Chrome process.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-extensions",
            "--ignore-certificate-errors",
            "--disable-web-security",
            "--blink-settings=imagesEnabled=false",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        args.push(format!("--window-size={}", self.window_size));
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args
    }
}

impl PortalSettings {
    pub fn cookie_timeout(&self) -> Duration {
        Duration::from_secs(self.cookie_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn tab_timeout(&self) -> Duration {
        Duration::from_secs(self.tab_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn cookie_settle(&self) -> Duration {
        Duration::from_millis(self.cookie_settle_millis)
    }
}

impl RetrySettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn inter_reference_delay(&self) -> Duration {
        Duration::from_secs(self.inter_reference_delay_secs)
    }
}

impl Settings {
    fn validate(self) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("browser.webdriver_url", &self.browser.webdriver_url),
            ("portal.search_url", &self.portal.search_url),
        ] {
            if let Err(e) = Url::parse(value) {
                return Err(ConfigError::Message(format!(
                    "{} is not a valid url ({}): {}",
                    key, value, e
                )));
            }
        }
        if self.retry.max_retries == 0 {
            return Err(ConfigError::Message(
                "retry.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Reads `configuration.{yaml,toml,json}` from the working directory when present.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("configuration").required(false))
        .build()?;

    settings.try_deserialize::<Settings>()?.validate()
}

pub fn get_configuration_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::from(path))
        .build()?;

    settings.try_deserialize::<Settings>()?.validate()
}
