//! Wire formats for the two endpoint families
//!
//! Requests are serialized from borrowed views of session state. Responses
//! are read as `serde_json::Value` and probed by explicit parsers so that a
//! payload of an unexpected shape becomes a [`ResponseShapeError`] carrying
//! the raw payload instead of a deserialization failure.

use super::error::ResponseShapeError;
use crate::protocol::{ChainedCompletion, ChainedRequest, ExchangeReference, Message};
use serde::Serialize;
use serde_json::Value;

/// Path of the chat-style endpoint relative to the endpoint base
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
/// Path of the chained-style endpoint relative to the endpoint base
pub const RESPONSES_PATH: &str = "responses";

/// `POST chat/completions` body
#[derive(Debug, Serialize)]
pub struct ChatCompletionsBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
}

/// `POST responses` body
#[derive(Debug, Serialize)]
pub struct ResponsesBody<'a> {
    pub model: &'a str,
    pub input: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<&'a str>,
}

impl<'a> ResponsesBody<'a> {
    pub fn from_request(model: &'a str, request: &'a ChainedRequest) -> Self {
        Self {
            model,
            input: &request.input,
            instructions: request.instructions.as_deref(),
            previous_response_id: request.previous_reference.as_ref().map(|r| r.as_str()),
        }
    }
}

/// Read `choices[0].message.content` from a chat-style response
pub fn parse_chat_answer(payload: &Value) -> Result<String, ResponseShapeError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ResponseShapeError::from_value("missing choices[0].message.content", payload)
        })
}

/// Read the answer and exchange id from a chained-style response
///
/// The answer is taken from `output_text` when it is a non-empty string,
/// otherwise from the first `output` item whose role is `assistant`
/// (its first content part's `text`).
pub fn parse_chained(payload: &Value) -> Result<ChainedCompletion, ResponseShapeError> {
    let answer = match output_text(payload) {
        Some(text) => text.to_string(),
        None => assistant_output_text(payload)?.to_string(),
    };

    let reference = payload
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ExchangeReference::new)
        .ok_or_else(|| ResponseShapeError::from_value("missing response id", payload))?;

    Ok(ChainedCompletion { answer, reference })
}

fn output_text(payload: &Value) -> Option<&str> {
    payload
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn assistant_output_text(payload: &Value) -> Result<&str, ResponseShapeError> {
    let output = payload
        .get("output")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ResponseShapeError::from_value("neither output_text nor an output array", payload)
        })?;

    let message = output
        .iter()
        .find(|item| item.get("role").and_then(Value::as_str) == Some("assistant"))
        .ok_or_else(|| ResponseShapeError::from_value("no assistant item in output", payload))?;

    message
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ResponseShapeError::from_value("assistant item has no content[0].text", payload)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_chat_body_shape() {
        let messages = vec![Message::system("Be brief"), Message::user("Hi")];
        let body = ChatCompletionsBody {
            model: "gpt-4o",
            messages: &messages,
            max_tokens: 150,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "Be brief"},
                    {"role": "user", "content": "Hi"}
                ],
                "max_tokens": 150
            })
        );
    }

    #[test]
    fn test_responses_body_omits_absent_fields() {
        let request = ChainedRequest::new("Hi");
        let body = serde_json::to_value(ResponsesBody::from_request("gpt-4o", &request)).unwrap();

        assert_eq!(body, json!({"model": "gpt-4o", "input": "Hi"}));
    }

    #[test]
    fn test_responses_body_with_all_fields() {
        let request = ChainedRequest::new("Next")
            .with_instructions("Be brief")
            .with_previous_reference(ExchangeReference::new("resp_abc"));
        let body = serde_json::to_value(ResponsesBody::from_request("gpt-4o", &request)).unwrap();

        assert_eq!(body["instructions"], "Be brief");
        assert_eq!(body["previous_response_id"], "resp_abc");
    }

    #[test]
    fn test_parse_chat_answer() {
        let payload = json!({"choices": [{"message": {"role": "assistant", "content": "Hello"}}]});
        assert_eq!(parse_chat_answer(&payload).unwrap(), "Hello");
    }

    #[test_case(json!({}) ; "no choices")]
    #[test_case(json!({"choices": []}) ; "empty choices")]
    #[test_case(json!({"choices": [{"message": {"content": null}}]}) ; "null content")]
    fn test_parse_chat_answer_shape_errors(payload: Value) {
        let err = parse_chat_answer(&payload).unwrap_err();
        assert_eq!(err.payload, serde_json::to_string_pretty(&payload).unwrap());
    }

    #[test]
    fn test_parse_chained_prefers_output_text() {
        let payload = json!({
            "id": "resp_1",
            "output_text": "From output_text",
            "output": [{"role": "assistant", "content": [{"text": "From output"}]}]
        });

        let completion = parse_chained(&payload).unwrap();
        assert_eq!(completion.answer, "From output_text");
        assert_eq!(completion.reference.as_str(), "resp_1");
    }

    #[test]
    fn test_parse_chained_falls_back_to_output_array() {
        let payload = json!({
            "id": "resp_2",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "Fallback answer", "annotations": []}
                ]}
            ]
        });

        let completion = parse_chained(&payload).unwrap();
        assert_eq!(completion.answer, "Fallback answer");
        assert_eq!(completion.reference.as_str(), "resp_2");
    }

    #[test]
    fn test_empty_output_text_uses_fallback() {
        let payload = json!({
            "id": "resp_3",
            "output_text": "",
            "output": [{"role": "assistant", "content": [{"text": "Fallback"}]}]
        });

        assert_eq!(parse_chained(&payload).unwrap().answer, "Fallback");
    }

    #[test_case(json!({"id": "resp_1"}), "neither output_text" ; "no answer fields")]
    #[test_case(
        json!({"id": "resp_1", "output": "text"}),
        "neither output_text" ;
        "output not an array"
    )]
    #[test_case(
        json!({"id": "resp_1", "output": [{"role": "user"}]}),
        "no assistant item" ;
        "no assistant item"
    )]
    #[test_case(
        json!({"id": "resp_1", "output": [{"role": "assistant", "content": []}]}),
        "no content[0].text" ;
        "assistant without content"
    )]
    #[test_case(json!({"output_text": "Answer"}), "missing response id" ; "no id")]
    fn test_parse_chained_shape_errors(payload: Value, reason: &str) {
        let err = parse_chained(&payload).unwrap_err();
        assert!(err.reason.contains(reason), "unexpected reason: {}", err.reason);
        assert_eq!(err.payload, serde_json::to_string_pretty(&payload).unwrap());
    }
}
