use anyhow::Context;

use crate::{
    configuration::Settings,
    dal::{load_references, write_results},
    services::{run_batch, BatchSummary, Browser, Resolver},
};

/// Owns the browser session for the whole run.
///
/// [`SessionGuard::release`] is the normal exit. If the guard is dropped
/// without it (a panic unwinding through the run), the browser is released
/// from `Drop` instead.
pub struct SessionGuard<B: Browser> {
    browser: B,
    released: bool,
}

impl<B: Browser> SessionGuard<B> {
    pub fn new(browser: B) -> Self {
        SessionGuard {
            browser,
            released: false,
        }
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.browser.release().await {
            log::error!("Failed to release browser session: {}", e);
        }
    }
}

impl<B: Browser> Drop for SessionGuard<B> {
    fn drop(&mut self) {
        if !self.released {
            self.browser.release_on_drop();
        }
    }
}

/// Loads the references, resolves them all and stores the results.
///
/// The browser is released on every path. A missing input file is the only
/// error returned; failing to write the output is logged and tolerated.
pub async fn run<B: Browser>(browser: B, settings: &Settings) -> anyhow::Result<BatchSummary> {
    let mut session = SessionGuard::new(browser);
    let result = process(session.browser_mut(), settings).await;
    session.release().await;
    result
}

async fn process<B: Browser>(browser: &mut B, settings: &Settings) -> anyhow::Result<BatchSummary> {
    let references = load_references(&settings.files.input)
        .inspect_err(|e| log::error!("{}", e))
        .context("Failed to load cadastral references")?;
    log::info!(
        "Loaded {} references from {}",
        references.len(),
        settings.files.input.display()
    );

    let resolver = Resolver::new(settings);
    let records = run_batch(
        browser,
        &resolver,
        &references,
        settings.retry.inter_reference_delay(),
    )
    .await;

    match write_results(&settings.files.output, &records) {
        Ok(mode) => log::info!(
            "Scraping complete. {} rows {:?} to {}",
            records.len(),
            mode,
            settings.files.output.display()
        ),
        Err(e) => log::error!("Failed to save results: {}", e),
    }

    Ok(BatchSummary::from_records(&records))
}
