//! Client for the text-parsing service that pulls a location and a date
//! range out of free text ("weather in Rome tomorrow").

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;

/// What the parser extracted. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub location: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ParsedQuery {
    /// Degraded result: the raw text as location, no dates.
    pub fn fallback(text: &str) -> Self {
        Self {
            location: Some(text.to_string()),
            date_from: None,
            date_to: None,
        }
    }
}

/// Outcome of a parse call. `Fallback` means the service could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ParsedQuery),
    Fallback { query: ParsedQuery, reason: String },
}

impl ParseOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    pub fn into_query(self) -> ParsedQuery {
        match self {
            ParseOutcome::Parsed(query) | ParseOutcome::Fallback { query, .. } => query,
        }
    }
}

#[async_trait]
pub trait QueryParser: Send + Sync {
    /// Never fails; transport problems surface as `ParseOutcome::Fallback`.
    async fn parse(&self, text: &str) -> ParseOutcome;
}

pub struct NlpClient {
    client: Client,
    parse_url: String,
}

impl NlpClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            parse_url: format!("{}/parse", config.nlp_service_url.trim_end_matches('/')),
        }
    }

    async fn request(&self, text: &str) -> anyhow::Result<ParsedQuery> {
        let response = self
            .client
            .post(&self.parse_url)
            .json(&json!({ "query": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl QueryParser for NlpClient {
    async fn parse(&self, text: &str) -> ParseOutcome {
        match self.request(text).await {
            Ok(query) => ParseOutcome::Parsed(query),
            Err(e) => {
                tracing::warn!("NLP service error, using raw text as location: {}", e);
                ParseOutcome::Fallback {
                    query: ParsedQuery::fallback(text),
                    reason: e.to_string(),
                }
            }
        }
    }
}
