use anyhow::{bail, Context, Result};
use reqwest::Client;

pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    let text = response.text().await.with_context(|| format!("read body of {url}"))?;
    Ok(text)
}
