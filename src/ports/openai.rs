use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Extractor, PortError};
use crate::profile::RawExtraction;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Schema instruction sent with every description.
const SYSTEM_PROMPT: &str = r#"Extract information about a runner from the user's text.
Return ONLY a JSON object, no explanation, with exactly these keys:
{
  "age": <integer age in years, or null>,
  "sex": <"m" for a man (mężczyzna), "k" for a woman (kobieta), or null>,
  "time": <5 km race time as "MM:SS" if a time is given, or null>,
  "pace": <pace per km as "M:SS" if a pace is given, or null>
}
Copy the values as stated. Do not convert a pace into a time or the other way
round, and do not guess values that are not in the text."#;

/// Chat model abstraction so the extractor can be tested without a network.
pub trait ChatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, PortError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PortError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatClient for OpenAiChatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, PortError> {
        let api_key = self.api_key.as_deref().ok_or(PortError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| PortError::from_reqwest(e, &self.base_url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| PortError::from_reqwest(e, &self.base_url, self.timeout_secs))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PortError::MalformedResponse("reply has no content".to_string()))
    }
}

/// Extraction port backed by a chat model.
pub struct LlmExtractor<C: ChatClient> {
    client: C,
}

impl<C: ChatClient> LlmExtractor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: ChatClient> Extractor for LlmExtractor<C> {
    fn extract(&self, text: &str) -> Result<RawExtraction, PortError> {
        let reply = self.client.complete(SYSTEM_PROMPT, text)?;
        debug!(%reply, "extraction reply");
        parse_reply(&reply)
    }
}

/// Decode the model's reply. Shape and value types are checked here; whether
/// the values make sense is left for the validator.
pub fn parse_reply(reply: &str) -> Result<RawExtraction, PortError> {
    let json = strip_code_fence(reply);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| PortError::MalformedResponse(format!("reply is not JSON: {e}")))?;

    if !value.is_object() {
        return Err(PortError::MalformedResponse(
            "reply is not a JSON object".to_string(),
        ));
    }
    RawExtraction::from_json(&value).map_err(|e| PortError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MockChatClient {
        reply: Result<String, PortError>,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl MockChatClient {
        fn new(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatClient for MockChatClient {
        fn complete(&self, system: &str, user: &str) -> Result<String, PortError> {
            self.seen
                .borrow_mut()
                .push((system.to_string(), user.to_string()));
            self.reply.clone()
        }
    }

    #[test]
    fn test_extractor_sends_schema_and_text() {
        let extractor = LlmExtractor::new(MockChatClient::new(
            r#"{"age": 35, "sex": "k", "time": "22:30", "pace": null}"#,
        ));
        let raw = extractor
            .extract("Mam 35 lat, kobieta, czas na 5km 22:30")
            .unwrap();
        assert_eq!(raw.age, Some(35));
        assert_eq!(raw.time.as_deref(), Some("22:30"));

        let seen = extractor.client.seen.borrow();
        assert_eq!(seen[0].0, SYSTEM_PROMPT);
        assert_eq!(seen[0].1, "Mam 35 lat, kobieta, czas na 5km 22:30");
    }

    #[test]
    fn test_extractor_passes_port_errors_through() {
        let client = MockChatClient {
            reply: Err(PortError::Timeout { secs: 30 }),
            seen: RefCell::new(Vec::new()),
        };
        let extractor = LlmExtractor::new(client);
        assert_eq!(
            extractor.extract("anything").unwrap_err(),
            PortError::Timeout { secs: 30 }
        );
    }

    #[test]
    fn test_parse_reply_accepts_code_fence() {
        let raw = parse_reply("```json\n{\"age\": 18, \"sex\": \"m\", \"pace\": \"3:00/km\"}\n```")
            .unwrap();
        assert_eq!(raw.age, Some(18));
        assert_eq!(raw.pace.as_deref(), Some("3:00/km"));
    }

    #[test]
    fn test_parse_reply_rejects_non_objects() {
        assert!(matches!(
            parse_reply("I think you are 35"),
            Err(PortError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_reply("[35, \"k\"]"),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_reply_keeps_out_of_range_values() {
        let raw = parse_reply(r#"{"age": 10, "sex": "x", "time": "1:15"}"#).unwrap();
        assert_eq!(raw.age, Some(10));
        assert_eq!(raw.sex.as_deref(), Some("x"));
    }

    #[test]
    fn test_missing_api_key_fails_before_network() {
        let client = OpenAiChatClient::new("http://127.0.0.1:9/", DEFAULT_MODEL, None, 1).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9");
        assert_eq!(
            client.complete("s", "u").unwrap_err(),
            PortError::MissingApiKey
        );

        let blank = OpenAiChatClient::new(DEFAULT_BASE_URL, DEFAULT_MODEL, Some("  ".into()), 1)
            .unwrap();
        assert_eq!(blank.complete("s", "u").unwrap_err(), PortError::MissingApiKey);
    }

    #[test]
    fn test_parse_reply_rejects_wrongly_typed_fields() {
        for reply in [
            r#"{"age": [35], "sex": "k"}"#,
            r#"{"age": 35, "sex": ["k"]}"#,
            r#"{"age": 35, "time": {"m": 22}}"#,
            r#"{"age": 30.5}"#,
            r#"{"pace": true}"#,
        ] {
            assert!(
                matches!(parse_reply(reply), Err(PortError::MalformedResponse(_))),
                "{reply}"
            );
        }
    }

    #[test]
    fn test_chat_client_times_out_on_silent_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let client = OpenAiChatClient::new(&base, DEFAULT_MODEL, Some("key".into()), 1).unwrap();

        assert_eq!(
            client.complete("s", "u").unwrap_err(),
            PortError::Timeout { secs: 1 }
        );
        drop(listener);
    }
}
