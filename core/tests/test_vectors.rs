//! Verify clients against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector describes the call input, the payload the client must send,
//! a simulated response, and either the expected parsed record or the
//! expected error. Comparing parsed JSON (not raw strings) avoids false
//! negatives from field-ordering differences.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use telegraph_core::{AccountParams, Client, Error, Payload, Result, Transport};

/// Replays one canned response per call and keeps the payloads it was sent.
#[derive(Default)]
struct ReplayTransport {
    sent: Mutex<Vec<(String, Payload)>>,
    replies: Mutex<VecDeque<Value>>,
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn request(&self, method: &str, payload: Payload) -> Result<Value> {
        self.sent.lock().unwrap().push((method.to_string(), payload));
        Ok(self.replies.lock().unwrap().pop_front().unwrap())
    }
}

/// One vector case, wired to a fresh client.
struct Case {
    name: String,
    input: Value,
    transport: Arc<ReplayTransport>,
    client: Client,
    raw: Value,
}

fn cases(raw: &str) -> Vec<Case> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|case| {
            let transport = Arc::new(ReplayTransport::default());
            transport
                .replies
                .lock()
                .unwrap()
                .push_back(case["simulated_response"].clone());
            Case {
                name: case["name"].as_str().unwrap().to_string(),
                input: case["input"].clone(),
                client: Client::with_transport(Some("token".to_string()), transport.clone()),
                transport,
                raw: case.clone(),
            }
        })
        .collect()
}

impl Case {
    /// Check the sent payload and the outcome against the vector.
    fn verify<T: Serialize>(&self, method: &str, outcome: Result<T>) {
        let name = &self.name;
        let sent = self.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1, "{name}: exactly one transport call");
        assert_eq!(sent[0].0, method, "{name}: method");
        assert_eq!(
            Value::Object(sent[0].1.clone()),
            self.raw["expected_payload"],
            "{name}: payload"
        );

        match (outcome, self.raw.get("expected_error")) {
            (Ok(record), None) => {
                let actual = serde_json::to_value(&record).unwrap();
                assert_eq!(actual, self.raw["expected_result"], "{name}: parsed result");
            }
            (Err(err), Some(expected)) => {
                let kind = match &err {
                    Error::Request(_) => "request",
                    Error::MalformedResponse { .. } => "malformed_response",
                    Error::MalformedContent(_) => "malformed_content",
                    other => panic!("{name}: unexpected error {other:?}"),
                };
                assert_eq!(kind, expected["kind"], "{name}: error kind");
                assert_eq!(err.to_string(), expected["message"], "{name}: error message");
            }
            (Ok(_), Some(_)) => panic!("{name}: expected an error"),
            (Err(err), None) => panic!("{name}: unexpected error {err}"),
        }
    }
}

fn str_field(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn u32_field(input: &Value, key: &str) -> Option<u32> {
    input.get(key).and_then(Value::as_u64).map(|v| v as u32)
}

// ---------------------------------------------------------------------------
// createAccount
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_account_test_vectors() {
    for case in cases(include_str!("../../test-vectors/create_account.json")) {
        let params = AccountParams {
            short_name: str_field(&case.input, "short_name").unwrap(),
            author_name: str_field(&case.input, "author_name"),
            author_url: str_field(&case.input, "author_url"),
        };
        let outcome = case.client.create_account(&params).await;

        // A successful call hands the new token to the client; a failed one
        // leaves the old token in place.
        let expected_token = case.raw["expected_result"]["access_token"]
            .as_str()
            .unwrap_or("token");
        assert_eq!(case.client.token().as_deref(), Some(expected_token), "{}: token", case.name);

        case.verify("createAccount", outcome);
    }
}

// ---------------------------------------------------------------------------
// getPage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_page_test_vectors() {
    for case in cases(include_str!("../../test-vectors/get_page.json")) {
        let path = str_field(&case.input, "path").unwrap();
        let return_content = case.input.get("return_content").and_then(Value::as_bool);
        let outcome = case.client.get_page_with(&path, return_content).await;
        case.verify("getPage", outcome);
    }
}

// ---------------------------------------------------------------------------
// getPageList
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_page_list_test_vectors() {
    for case in cases(include_str!("../../test-vectors/get_page_list.json")) {
        let outcome = case
            .client
            .get_page_list(u32_field(&case.input, "offset"), u32_field(&case.input, "limit"))
            .await;
        case.verify("getPageList", outcome);
    }
}
