use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use pulsewire_common::Config;
use sentiment_client::SentimentClient;
use translate_client::TranslateClient;
use webdriver_client::WebDriverClient;

use crate::session::ScrapeSession;

const DRIVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const DRIVER_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A running browser driver process. Killed on `stop()` or on drop.
pub struct DriverProcess {
    child: Mutex<Option<Child>>,
    endpoint: String,
}

impl DriverProcess {
    /// Spawn the driver binary and wait for its /status endpoint to report
    /// ready. The binary path is validated up front — a bad path fails
    /// startup with a clear message instead of a dead session later.
    pub async fn spawn(path: &str, port: u16) -> Result<Self> {
        if !Path::new(path).is_file() {
            bail!("GECKODRIVER_PATH '{path}' does not exist or is not a file");
        }

        let child = Command::new(path)
            .args(["--port", &port.to_string()])
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start browser driver at '{path}'"))?;

        let endpoint = format!("http://127.0.0.1:{port}");
        let probe = WebDriverClient::new(&endpoint);

        let deadline = tokio::time::Instant::now() + DRIVER_STARTUP_TIMEOUT;
        loop {
            if matches!(probe.status().await, Ok(true)) {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("Browser driver at {endpoint} did not become ready within 10s");
            }
            tokio::time::sleep(DRIVER_POLL_INTERVAL).await;
        }

        info!(endpoint, "Browser driver ready");
        Ok(Self {
            child: Mutex::new(Some(child)),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kill the driver process. Idempotent.
    pub async fn stop(&self) {
        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill browser driver");
            } else {
                info!("Browser driver stopped");
            }
        }
    }
}

/// Construct the process-wide scrape session: driver process, browser
/// session, translation and classification clients. Any failure here is
/// fatal — no retry, surfaced to the caller as a startup error.
pub async fn build_session(config: &Config) -> Result<(Arc<ScrapeSession>, DriverProcess)> {
    let driver = DriverProcess::spawn(&config.geckodriver_path, config.webdriver_port).await?;

    let client = WebDriverClient::new(driver.endpoint());
    let browser = client
        .new_session(true)
        .await
        .context("Failed to create browser session")?;

    let translator = TranslateClient::new(&config.translate_url);
    let classifier = SentimentClient::new(
        &config.sentiment_url,
        &config.sentiment_model,
        config.sentiment_api_token.as_deref(),
    );

    info!(model = %config.sentiment_model, "Scrape session initialized");

    let session = Arc::new(ScrapeSession::new(
        Arc::new(browser),
        &config.search_base_url,
        Arc::new(translator),
        Arc::new(classifier),
        config.enrich_workers,
        config.on_classify_error,
        config.page_budget,
    ));

    Ok((session, driver))
}
