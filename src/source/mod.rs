use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use reqwest::Client;
use tokio::io::AsyncReadExt;
use url::Url;

mod fetch;
pub mod extractor;

/// Where the text to reduce comes from. Neither flag means stdin.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Local text or HTML file
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,
    /// Page to fetch; HTML is reduced to readable text
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Url(Url),
    Stdin,
}

impl Source {
    pub fn from_args(args: &SourceArgs) -> Result<Self> {
        match (&args.file, &args.url) {
            (Some(_), Some(_)) => bail!("--file and --url are mutually exclusive"),
            (Some(path), None) => Ok(Source::File(path.clone())),
            (None, Some(raw)) => {
                let url = Url::parse(raw).with_context(|| format!("invalid url {raw:?}"))?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!("unsupported url scheme {:?}", url.scheme());
                }
                Ok(Source::Url(url))
            }
            (None, None) => Ok(Source::Stdin),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::File(p) => p.display().to_string(),
            Source::Url(u) => u.to_string(),
            Source::Stdin => "-".to_string(),
        }
    }

    /// Load the source as plain text. HTML pages and `.html` files go through the extractor.
    pub async fn load(&self) -> Result<String> {
        match self {
            Source::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("read {}", path.display()))?;
                if is_html_path(path) { extract_readable("", &raw) } else { Ok(raw) }
            }
            Source::Url(url) => {
                let client = Client::new();
                let html = fetch::fetch_page(&client, url.as_str()).await?;
                extract_readable(url.host_str().unwrap_or_default(), &html)
            }
            Source::Stdin => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("read stdin")?;
                Ok(buf)
            }
        }
    }
}

fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn extract_readable(host: &str, html: &str) -> Result<String> {
    match extractor::extract(host, html) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("no readable text found in page"),
    }
}
