use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::PreviewArgs;
use crate::extract::extract_metadata_with_budget;
use crate::formats::SummaryBudget;

const USER_AGENT: &str = concat!("og-preview/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// A fetched response body with the headers extraction needs.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after redirects.
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub truncated: bool,
}

pub async fn run(args: PreviewArgs) -> anyhow::Result<()> {
    let budget = SummaryBudget::new(args.min_size, args.max_size)?;
    let url = Url::parse(&args.url).with_context(|| format!("parse url: {}", args.url))?;
    let client = build_client(Duration::from_secs(args.timeout_secs))?;

    let fetched = fetch_document(&client, &url, args.max_bytes).await?;
    if fetched.truncated {
        tracing::info!(url = %fetched.url, max_bytes = args.max_bytes, "response body truncated");
    }

    let og = extract_metadata_with_budget(
        &fetched.body,
        &fetched.url,
        fetched.content_type.as_deref(),
        None,
        budget,
    );

    let json = serde_json::to_string_pretty(&og).context("serialize preview metadata")?;
    println!("{json}");
    Ok(())
}

pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .context("build preview http client")
}

/// Downloads `url`, keeping at most `limit` bytes of the body.
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &Url,
    limit: usize,
) -> anyhow::Result<FetchedDocument> {
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("url scheme must be http/https: {url}");
    }

    let resp = client
        .get(url.clone())
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned {status}");
    }

    let final_url = resp.url().clone();
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    tracing::debug!(url = %final_url, ?content_type, "fetched document headers");

    let (body, truncated) = read_body_limited(resp, limit).await?;
    Ok(FetchedDocument {
        url: final_url,
        content_type,
        body,
        truncated,
    })
}

async fn read_body_limited(
    mut resp: reqwest::Response,
    limit: usize,
) -> anyhow::Result<(Vec<u8>, bool)> {
    let mut out: Vec<u8> = Vec::new();
    let mut truncated = false;

    while let Some(chunk) = resp.chunk().await.context("read response chunk")? {
        if out.len() + chunk.len() > limit {
            let remaining = limit.saturating_sub(out.len());
            out.extend_from_slice(&chunk[..remaining]);
            truncated = true;
            break;
        }
        out.extend_from_slice(&chunk);
    }

    Ok((out, truncated))
}
