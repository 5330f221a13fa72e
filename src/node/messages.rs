//! Node protocol messages
//!
//! Every message is a JSON envelope `{src, dest, body}` on a single line.
//! The body is keyed by its `type` field; `msg_id` and `in_reply_to`
//! correlate requests and replies. Everything else in the body is
//! type-specific and kept as a loose JSON map until a handler decodes it
//! into one of the typed request structs below.
use std::collections::HashMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value as Json};

use super::{NodeName, Value};
use crate::error::{MurmurError, Result};
use crate::malformed_request;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub src: NodeName,
    pub dest: NodeName,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<u64>,
    #[serde(flatten)]
    pub fields: Map<String, Json>,
}

impl Message {
    pub fn new(src: NodeName, dest: NodeName, body: Body) -> Self {
        Self { src, dest, body }
    }

    /// Address `reply` back to whoever sent `request`
    pub fn reply_to(request: &Message, reply: Reply) -> Self {
        Self {
            src: request.dest.clone(),
            dest: request.src.clone(),
            body: reply.into_body(request.body.msg_id),
        }
    }
}

impl Body {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            msg_id: None,
            in_reply_to: None,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Gossip reuses the client-facing `broadcast` request
    pub fn broadcast(value: Value) -> Self {
        Self::new("broadcast").with_field("message", value)
    }

    /// Acknowledgements and errors are never answered
    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some() || self.kind.ends_with("_ok") || self.kind == "error"
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InitRequest {
    pub node_id: NodeName,
    pub node_ids: Vec<NodeName>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    #[serde(deserialize_with = "deserialize_value")]
    pub message: Value,
}

/// Accept any JSON number with an integral value that fits a `Value`,
/// so `5` and `5.0` are the same broadcast
fn deserialize_value<'de, D>(deserializer: D) -> std::result::Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }
    match number.as_f64() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as Value),
        _ => Err(D::Error::custom(format!("{} is not an integer value", number))),
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TopologyRequest {
    pub topology: HashMap<NodeName, Vec<NodeName>>,
}

/// Requests this node knows how to answer
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Init(InitRequest),
    Echo(Map<String, Json>),
    Generate,
    Broadcast(BroadcastRequest),
    Read,
    Topology(TopologyRequest),
}

impl Request {
    pub fn decode(body: &Body) -> Result<Self> {
        match body.kind.as_str() {
            "init" => Ok(Request::Init(decode_fields(body)?)),
            "echo" => Ok(Request::Echo(body.fields.clone())),
            "generate" => Ok(Request::Generate),
            "broadcast" => Ok(Request::Broadcast(decode_fields(body)?)),
            "read" => Ok(Request::Read),
            "topology" => Ok(Request::Topology(decode_fields(body)?)),
            other => Err(MurmurError::NotSupported(other.to_string())),
        }
    }
}

fn decode_fields<T: DeserializeOwned>(body: &Body) -> Result<T> {
    serde_json::from_value(Json::Object(body.fields.clone()))
        .map_err(|e| malformed_request!("invalid {} body: {}", body.kind, e))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    InitOk,
    EchoOk { payload: Map<String, Json> },
    GenerateOk { id: String },
    BroadcastOk,
    ReadOk { messages: Vec<Value> },
    TopologyOk,
    Error { code: u32, text: String },
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::InitOk => "init_ok",
            Reply::EchoOk { .. } => "echo_ok",
            Reply::GenerateOk { .. } => "generate_ok",
            Reply::BroadcastOk => "broadcast_ok",
            Reply::ReadOk { .. } => "read_ok",
            Reply::TopologyOk => "topology_ok",
            Reply::Error { .. } => "error",
        }
    }

    // msg_id is left for the transport to assign
    pub fn into_body(self, in_reply_to: Option<u64>) -> Body {
        let mut body = Body::new(self.kind());
        body.in_reply_to = in_reply_to;
        match self {
            Reply::EchoOk { payload } => body.fields = payload,
            Reply::GenerateOk { id } => {
                body.fields.insert("id".to_string(), Json::String(id));
            }
            Reply::ReadOk { messages } => {
                body.fields.insert("messages".to_string(), Json::from(messages));
            }
            Reply::Error { code, text } => {
                body.fields.insert("code".to_string(), Json::from(code));
                body.fields.insert("text".to_string(), Json::String(text));
            }
            Reply::InitOk | Reply::BroadcastOk | Reply::TopologyOk => {}
        }
        body
    }
}

impl From<&MurmurError> for Reply {
    fn from(err: &MurmurError) -> Self {
        Reply::Error {
            code: err.code(),
            text: err.to_string(),
        }
    }
}
