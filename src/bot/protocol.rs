//! signal-cli JSON-RPC wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing JSON-RPC 2.0 request to signal-cli.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    jsonrpc: &'static str,
    /// Fresh UUID per request.
    pub id: String,
    /// signal-cli method, e.g. `send`.
    pub method: &'static str,
    /// Method parameters.
    pub params: Value,
}

impl JsonRpcRequest {
    /// Builds a request with a new random id.
    pub fn new(method: &'static str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        }
    }
}

/// Incoming line from signal-cli: a `receive` notification or a response.
#[derive(Debug, Deserialize)]
pub struct Incoming {
    #[serde(default)]
    params: Option<ReceiveParams>,
}

#[derive(Debug, Deserialize)]
struct ReceiveParams {
    #[serde(default)]
    envelope: Option<Envelope>,
}

/// A received Signal envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender-side timestamp, used to quote the message.
    #[serde(default)]
    pub timestamp: Option<u64>,
    /// Sender number or UUID.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    data_message: Option<DataMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    group_info: Option<GroupInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupInfo {
    group_id: String,
}

impl Incoming {
    /// The envelope, if this line is a message notification.
    pub fn into_envelope(self) -> Option<Envelope> {
        self.params?.envelope
    }
}

impl Envelope {
    /// Text body of the data message.
    pub fn message(&self) -> Option<&str> {
        self.data_message.as_ref()?.message.as_deref()
    }

    /// Group the message was posted to, if any.
    pub fn group_id(&self) -> Option<&str> {
        Some(self.data_message.as_ref()?.group_info.as_ref()?.group_id.as_str())
    }
}

/// Extracts the prompt from a `/pic <prompt>` command.
///
/// The command may start any line of the message; the prompt is the rest of
/// that line.
pub fn pic_prompt(message: &str) -> Option<&str> {
    message.lines().find_map(|line| line.strip_prefix("/pic "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_MESSAGE: &str = r#"{
        "jsonrpc": "2.0",
        "method": "receive",
        "params": {
            "envelope": {
                "source": "+15550001111",
                "timestamp": 1700000000000,
                "dataMessage": {
                    "message": "/pic a cat",
                    "groupInfo": { "groupId": "grp==", "type": "DELIVER" }
                }
            },
            "account": "+15550002222"
        }
    }"#;

    #[test]
    fn test_parse_group_message() {
        let incoming: Incoming = serde_json::from_str(GROUP_MESSAGE).unwrap();
        let envelope = incoming.into_envelope().unwrap();
        assert_eq!(envelope.timestamp, Some(1_700_000_000_000));
        assert_eq!(envelope.source.as_deref(), Some("+15550001111"));
        assert_eq!(envelope.message(), Some("/pic a cat"));
        assert_eq!(envelope.group_id(), Some("grp=="));
    }

    #[test]
    fn test_parse_response_line_has_no_envelope() {
        let incoming: Incoming =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":{"timestamp":1},"id":"abc"}"#)
                .unwrap();
        assert!(incoming.into_envelope().is_none());
    }

    #[test]
    fn test_pic_prompt() {
        assert_eq!(pic_prompt("/pic a red fox"), Some("a red fox"));
        assert_eq!(pic_prompt("hello\n/pic second line\nthird"), Some("second line"));
        assert_eq!(pic_prompt("/pic "), Some(""));
        assert_eq!(pic_prompt("/pic"), None);
        assert_eq!(pic_prompt("say /pic a dog"), None);
        assert_eq!(pic_prompt("/picture"), None);
    }

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest::new("sendTyping", serde_json::json!({ "groupId": "g" }));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "sendTyping");
        assert_eq!(json["params"]["groupId"], "g");
        assert!(uuid::Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    }
}
