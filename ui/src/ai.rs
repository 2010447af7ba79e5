use anyhow::Result;
use serde::{Deserialize, Serialize};

/// What the assistant is told about the current map, mirrored from the
/// proxy's request contract.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapContext {
    pub show_routes: bool,
    pub show_bottlenecks: bool,
    pub show_low_income: bool,
    /// Comma-joined enabled route-type codes
    pub active_route_types: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SuggestedRoute {
    pub name: String,
    pub summary: String,
    /// [lat, lng], unlike layer records
    pub start: [f64; 2],
    pub end: [f64; 2],
}

#[derive(Clone, Debug, PartialEq)]
pub enum SuggestionOutcome {
    Parsed(Vec<SuggestedRoute>),
    /// The model ignored the JSON instructions; show its text as-is
    Raw(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhotoMatch {
    pub similarity_score: f64,
    pub matched_image: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the AI proxy. Nothing here retries; a failed call surfaces as
/// inline text and the user just asks again.
pub struct AiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl AiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn chat(&self, message: &str, context: &MapContext) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/ai-chat", self.base_url))
            .json(&serde_json::json!({
                "message": message,
                "mapContext": context,
            }))
            .send()?;
        let status = response.status();
        let body: ChatResponse = response.json()?;
        if let Some(error) = body.error {
            bail!("{error}");
        }
        match body.response {
            Some(text) if status.is_success() => Ok(text),
            _ => bail!("assistant returned {status} without a response"),
        }
    }

    pub fn suggest_routes(&self, context: &MapContext) -> Result<SuggestionOutcome> {
        let response = self
            .client
            .post(format!("{}/api/suggest-routes", self.base_url))
            .json(&serde_json::json!({ "mapContext": context }))
            .send()?;
        let status = response.status();
        let body: SuggestResponse = response.json()?;
        if let Some(error) = body.error {
            bail!("{error}");
        }
        match body.suggestions {
            Some(text) if status.is_success() => Ok(parse_suggestions(&text)),
            _ => bail!("suggestion endpoint returned {status} without suggestions"),
        }
    }

    pub fn match_photo(&self, path: &str) -> Result<PhotoMatch> {
        let form = reqwest::blocking::multipart::Form::new().file("photo", path)?;
        let response = self
            .client
            .post(format!("{}/api/match_photo", self.base_url))
            .multipart(form)
            .send()?;
        if !response.status().is_success() {
            bail!("photo match returned {}", response.status());
        }
        Ok(response.json()?)
    }
}

/// The model is asked for raw JSON but routinely wraps it in a markdown code
/// fence anyway; strip that before parsing, and tolerate anything that still
/// isn't JSON by falling back to the raw text.
pub fn parse_suggestions(text: &str) -> SuggestionOutcome {
    match serde_json::from_str(strip_code_fences(text)) {
        Ok(routes) => SuggestionOutcome::Parsed(routes),
        Err(_) => SuggestionOutcome::Raw(text.to_string()),
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
