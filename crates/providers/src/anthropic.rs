//! Anthropic Messages API client: one multimodal request per file.

use crate::{read_json, send, CodeGenerator, GenerateRequest, ProviderError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const COMPONENT_DIRECTIVE: &str =
    "Based on the content above, generate a Next.js + React + TypeScript component.";

#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    cfg: Arc<AnthropicConfig>,
}

impl AnthropicClient {
    pub fn new(cfg: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

fn build_content(req: &GenerateRequest<'_>) -> Vec<ContentBlock> {
    let prompt = format!(
        "{}\n\nFile name: {}\n\n{}",
        req.instruction, req.file_name, COMPONENT_DIRECTIVE
    );
    let mut content = vec![ContentBlock::Text { text: prompt }];
    match req.image_media_type {
        Some(media_type) => content.push(ContentBlock::Image {
            source: ImageSource {
                kind: "base64",
                media_type: media_type.to_string(),
                data: BASE64.encode(req.content),
            },
        }),
        // Plain-text files travel as a second text block, never mislabeled
        // as an image payload.
        None => content.push(ContentBlock::Text {
            text: String::from_utf8_lossy(req.content).into_owned(),
        }),
    }
    content
}

#[async_trait::async_trait]
impl CodeGenerator for AnthropicClient {
    async fn generate(&self, req: GenerateRequest<'_>) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &self.cfg.model,
            max_tokens: self.cfg.max_tokens,
            messages: vec![Message {
                role: "user",
                content: build_content(&req),
            }],
        };

        let resp = send(
            self.client
                .post(format!("{}/v1/messages", self.cfg.base_url))
                .header("x-api-key", &self.cfg.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
        )
        .await?;
        let parsed: MessagesResponse = read_json(resp).await?;

        // Only text-typed blocks contribute to the generated source.
        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_requests_carry_a_base64_image_block() {
        let content = build_content(&GenerateRequest {
            file_name: "hero.png",
            instruction: "Match the mockup exactly.",
            content: &[0x89, 0x50, 0x4E, 0x47],
            image_media_type: Some("image/png"),
        });

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert!(json[0]["text"].as_str().unwrap().contains("hero.png"));
        assert_eq!(json[1]["type"], "image");
        assert_eq!(json[1]["source"]["type"], "base64");
        assert_eq!(json[1]["source"]["media_type"], "image/png");
        assert_eq!(json[1]["source"]["data"], BASE64.encode([0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn text_requests_deliver_the_file_body_as_text() {
        let content = build_content(&GenerateRequest {
            file_name: "copy.txt",
            instruction: "Use this copy.",
            content: b"Welcome to the launch page.",
            image_media_type: None,
        });

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json[1]["type"], "text");
        assert_eq!(json[1]["text"], "Welcome to the launch page.");
    }
}
