pub mod fallback;

use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::warn;

use trove_types::api::ChatTurn;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Never let a slow upstream hold a request open; past this we degrade to
/// the canned replies.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many trailing history turns to forward for context.
const HISTORY_WINDOW: usize = 6;

const MARKETPLACE_CONTEXT: &str = "\
You are the Trove assistant, a helpful customer service assistant for the Trove \
second-hand marketplace.

ABOUT TROVE:
Trove is a marketplace for buying and selling quality second-hand items.

KEY FEATURES:
- Users register with email and password and manage a profile dashboard.
- Sellers create listings with title, description, category, price, and images; \
categories are Electronics, Clothing, Furniture, Books, Sports, Home & Garden, Toys, Other.
- Buyers browse and search the catalog, filter by category, add items to a cart, \
and check out; purchase history is tracked.
- Buyers can make price offers on listings, save items to a wishlist, message \
sellers, and review products they have bought.

USER GUIDELINES:
- Be friendly, helpful, and encouraging about second-hand shopping.
- Provide clear step-by-step instructions.
- Help users navigate the site and answer questions about features.

If users report technical issues, suggest refreshing the page or contacting support.";

const SYSTEM_INSTRUCTION: &str = "You are the Trove assistant. Be helpful and friendly. \
Keep responses concise but informative.";

/// Help chatbot backed by a hosted language model. Failures of any kind
/// (missing key, timeout, HTTP error, empty completion) degrade to the
/// static reply table in [`fallback`] and are invisible to the end user.
pub struct Assistant {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

impl Assistant {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set; assistant will use fallback responses");
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("GEMINI_API_KEY").ok())
    }

    /// Answer a user message, with optional prior turns for context. This
    /// never errors: any upstream problem falls back to the keyword table.
    pub async fn get_response(&self, message: &str, history: &[ChatTurn]) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return fallback::keyword_reply(message).to_string();
        };

        match self.call_model(api_key, message, history).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Assistant upstream call failed: {}", e);
                fallback::keyword_reply(message).to_string()
            }
        }
    }

    pub fn quick_help(&self, topic: &str) -> &'static str {
        fallback::quick_help(topic)
    }

    async fn call_model(
        &self,
        api_key: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let mut contents = vec![Content {
            role: Some("user"),
            parts: vec![Part { text: MARKETPLACE_CONTEXT.to_string() }],
        }];

        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &history[start..] {
            contents.push(Content {
                role: Some(if turn.role == "assistant" { "model" } else { "user" }),
                parts: vec![Part { text: turn.content.clone() }],
            });
        }

        contents.push(Content {
            role: Some("user"),
            parts: vec![Part { text: message.to_string() }],
        });

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION.to_string() }],
            },
            contents,
            generation_config: GenerationConfig { max_output_tokens: 500, temperature: 0.7 },
        };

        let response = self
            .client
            .post(format!("{GEMINI_ENDPOINT}?key={api_key}"))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("empty completion"))?;

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_degrades_to_fallback() {
        let assistant = Assistant::new(None);
        let reply = assistant.get_response("how do I sell something?", &[]).await;
        assert_eq!(reply, fallback::quick_help("sell"));
    }

    #[tokio::test]
    async fn history_does_not_affect_fallback() {
        let assistant = Assistant::new(None);
        let history = vec![ChatTurn { role: "user".into(), content: "hi".into() }];
        let reply = assistant.get_response("where is my cart?", &history).await;
        assert_eq!(reply, fallback::quick_help("cart"));
    }
}
