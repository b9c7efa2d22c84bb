use std::time::Duration;

use anyhow::{bail, Context, Result};

// ---------------------------------------------------------------------------
// Lap-detail page retrieval
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Requested first so the server sets the session cookie that the
    /// manual lap selection relies on.
    pub prime_url: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            prime_url: None,
        }
    }
}

/// GET a lap-detail page and return its text.
pub fn fetch_markup(url: &str, options: &FetchOptions) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .cookie_store(true)
        .build()
        .context("building HTTP client")?;

    if let Some(prime) = &options.prime_url {
        let response = client
            .get(prime)
            .send()
            .with_context(|| format!("requesting session from {prime}"))?;
        log::debug!("session request {prime} → {}", response.status());
    }

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("{url} answered {status}");
    }
    let text = response
        .text()
        .with_context(|| format!("reading body of {url}"))?;
    log::info!("fetched {url} ({} bytes)", text.len());
    Ok(text)
}
