//! Model hub integration.
//!
//! Fetches a model's expanded config from the hub API, pulls the chat
//! template out of `processor_config`/`tokenizer_config`, and reduces the
//! sibling fields to string defaults for the context object.
//!
//! The network call runs on a worker thread and reports back to the main
//! loop with an `AppEvent::FetchDone`; requests are neither deduplicated
//! nor cancelled, responses apply in arrival order.

use std::sync::mpsc::Sender;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::events::AppEvent;

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "jinjapad";

#[derive(Debug, Error)]
pub enum HubError {
    #[error("model id is empty")]
    EmptyModelId,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to fetch model config: {0}")]
    Status(StatusCode),
    #[error("model config is not valid JSON: {0}")]
    Body(#[from] serde_json::Error),
    #[error("no chat template found in model config")]
    MissingTemplate,
}

/// Chat template plus the string defaults reduced from its sibling
/// config fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTemplate {
    pub chat_template: String,
    pub defaults: Vec<(String, String)>,
}

pub fn model_config_url(endpoint: &str, model_id: &str) -> String {
    format!(
        "{}/api/models/{}?expand=config",
        endpoint.trim_end_matches('/'),
        model_id
    )
}

fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
}

/// Issue the hub request and extract the chat template. Blocking; runs on
/// the fetch worker thread.
pub fn fetch_chat_template(endpoint: &str, model_id: &str) -> Result<FetchedTemplate, HubError> {
    let model_id = model_id.trim();
    if model_id.is_empty() {
        return Err(HubError::EmptyModelId);
    }

    let client = build_client()?;
    let response = client.get(model_config_url(endpoint, model_id)).send()?;
    if !response.status().is_success() {
        return Err(HubError::Status(response.status()));
    }

    let body: Value = serde_json::from_str(&response.text()?)?;
    extract_chat_template(&body)
}

/// Spawn a worker thread for one fetch. The result lands in the event
/// loop as a `FetchDone`.
pub fn spawn_fetch(endpoint: String, model_id: String, event_tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        tracing::info!(model_id = %model_id, "fetching model config");
        let result = fetch_chat_template(&endpoint, &model_id);
        if let Err(err) = &result {
            tracing::warn!(model_id = %model_id, error = %err, "fetch failed");
        }
        let _ = event_tx.send(AppEvent::FetchDone { model_id, result });
    });
}

/// Pull the chat template out of an `?expand=config` response body.
/// `processor_config` wins over `tokenizer_config` whenever it is present
/// as an object, even an empty one.
pub fn extract_chat_template(body: &Value) -> Result<FetchedTemplate, HubError> {
    let config = body.get("config");
    let section = config
        .and_then(|c| c.get("processor_config"))
        .filter(|v| v.is_object())
        .or_else(|| {
            config
                .and_then(|c| c.get("tokenizer_config"))
                .filter(|v| v.is_object())
        });
    let Some(section) = section.and_then(Value::as_object) else {
        return Err(HubError::MissingTemplate);
    };

    let chat_template = section
        .get("chat_template")
        .and_then(Value::as_str)
        .ok_or(HubError::MissingTemplate)?
        .to_string();

    Ok(FetchedTemplate {
        chat_template,
        defaults: reduce_defaults(section),
    })
}

/// Reduce the sibling fields of a config section to string defaults:
/// strings stay, added-token objects collapse to their content string,
/// everything else is dropped.
fn reduce_defaults(section: &Map<String, Value>) -> Vec<(String, String)> {
    section
        .iter()
        .filter(|(key, _)| key.as_str() != "chat_template")
        .filter_map(|(key, value)| default_value(value).map(|text| (key.clone(), text)))
        .collect()
}

fn default_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            let added_token = map.get("__type").and_then(Value::as_str) == Some("AddedToken");
            if added_token {
                map.get("content").and_then(Value::as_str).map(str::to_string)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Shallow-merge fetched defaults into the current context text; fetched
/// values win on collision. Fails only if the current text is not JSON.
pub fn merge_context(
    context_text: &str,
    defaults: &[(String, String)],
) -> Result<String, serde_json::Error> {
    let current: Value = serde_json::from_str(context_text)?;
    let mut map = match current {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in defaults {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    serde_json::to_string_pretty(&Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::{extract_chat_template, merge_context, model_config_url, HubError};
    use serde_json::{json, Value};

    #[test]
    fn url_includes_expand_config() {
        assert_eq!(
            model_config_url("https://huggingface.co", "org/model"),
            "https://huggingface.co/api/models/org/model?expand=config"
        );
        assert_eq!(
            model_config_url("https://hub.example/", "m"),
            "https://hub.example/api/models/m?expand=config"
        );
    }

    #[test]
    fn extract_prefers_processor_config() {
        let body = json!({
            "config": {
                "processor_config": {"chat_template": "from processor"},
                "tokenizer_config": {"chat_template": "from tokenizer"}
            }
        });
        let fetched = extract_chat_template(&body).expect("template");
        assert_eq!(fetched.chat_template, "from processor");
    }

    #[test]
    fn extract_falls_back_to_tokenizer_config() {
        let body = json!({
            "config": {
                "tokenizer_config": {"chat_template": "from tokenizer"}
            }
        });
        let fetched = extract_chat_template(&body).expect("template");
        assert_eq!(fetched.chat_template, "from tokenizer");
    }

    #[test]
    fn empty_processor_config_still_wins() {
        // Mirrors the `processor_config || tokenizer_config` destructuring:
        // an empty object is present, so the tokenizer section is ignored.
        let body = json!({
            "config": {
                "processor_config": {},
                "tokenizer_config": {"chat_template": "from tokenizer"}
            }
        });
        let err = extract_chat_template(&body).expect_err("missing");
        assert!(matches!(err, HubError::MissingTemplate));
    }

    #[test]
    fn missing_template_in_both_sections_is_an_error() {
        let body = json!({"config": {"tokenizer_config": {"bos_token": "<s>"}}});
        assert!(matches!(
            extract_chat_template(&body).expect_err("missing"),
            HubError::MissingTemplate
        ));

        let body = json!({"config": {}});
        assert!(matches!(
            extract_chat_template(&body).expect_err("missing"),
            HubError::MissingTemplate
        ));

        let body = json!({});
        assert!(matches!(
            extract_chat_template(&body).expect_err("missing"),
            HubError::MissingTemplate
        ));
    }

    #[test]
    fn non_string_chat_template_counts_as_missing() {
        let body = json!({
            "config": {
                "tokenizer_config": {"chat_template": [{"name": "default"}]}
            }
        });
        assert!(matches!(
            extract_chat_template(&body).expect_err("missing"),
            HubError::MissingTemplate
        ));
    }

    #[test]
    fn defaults_keep_strings_and_reduce_added_tokens() {
        let body = json!({
            "config": {
                "tokenizer_config": {
                    "chat_template": "{{ greeting }}",
                    "greeting": "hi",
                    "bos_token": {"__type": "AddedToken", "content": "<s>", "lstrip": false},
                    "eos_token": {"__type": "Other", "content": "</s>"},
                    "model_max_length": 4096,
                    "clean_up_tokenization_spaces": false
                }
            }
        });
        let fetched = extract_chat_template(&body).expect("template");
        assert_eq!(fetched.chat_template, "{{ greeting }}");
        let mut defaults = fetched.defaults.clone();
        defaults.sort();
        assert_eq!(
            defaults,
            vec![
                ("bos_token".to_string(), "<s>".to_string()),
                ("greeting".to_string(), "hi".to_string()),
            ]
        );
    }

    #[test]
    fn merge_overwrites_collisions_and_keeps_existing_keys() {
        let merged = merge_context(
            r#"{"messages": [], "greeting": "old", "keep": 1}"#,
            &[("greeting".to_string(), "hi".to_string())],
        )
        .expect("merge");
        let value: Value = serde_json::from_str(&merged).expect("json");
        assert_eq!(value["greeting"], "hi");
        assert_eq!(value["keep"], 1);
        assert!(value["messages"].is_array());
    }

    #[test]
    fn merge_rejects_invalid_context() {
        assert!(merge_context("{broken", &[]).is_err());
    }

    #[test]
    fn merge_replaces_non_object_context() {
        let merged =
            merge_context("[1, 2]", &[("a".to_string(), "b".to_string())]).expect("merge");
        let value: Value = serde_json::from_str(&merged).expect("json");
        assert_eq!(value, json!({"a": "b"}));
    }
}
