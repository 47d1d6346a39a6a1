use serde_json::{Map, Value};
use zeromq::ZmqMessage;

use crate::error::BusError;

/// A JSON object payload tagged with the topic it rides on.
///
/// On the wire this is a two-frame ZMQ message:
/// 1. Topic string (used by SUB sockets for prefix filtering)
/// 2. JSON-encoded body
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// Routing topic, e.g. "RT/read/flowmeter/PL0/D13".
    pub topic: String,

    /// Decoded JSON object body.
    pub body: Map<String, Value>,
}

impl BusMessage {
    /// Create a new message for the given topic.
    pub fn new(topic: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            topic: topic.into(),
            body,
        }
    }

    /// Encode as a two-frame ZMQ message: [topic, body].
    ///
    /// Returns the wire message and the encoded body size in bytes.
    pub fn to_zmq(&self) -> Result<(ZmqMessage, usize), BusError> {
        let body_bytes = serde_json::to_vec(&self.body)?;
        let size = body_bytes.len();

        let mut zmq_msg = ZmqMessage::from(self.topic.as_str());
        zmq_msg.push_back(body_bytes.into());
        Ok((zmq_msg, size))
    }

    /// Decode a ZMQ message received from a SUB socket.
    ///
    /// Expects the two-frame [topic, body] layout. Some peers collapse
    /// topic and body into a single frame with the topic as a prefix; that
    /// case is handled by splitting at the first `{`.
    pub fn from_zmq(zmq_msg: &ZmqMessage) -> Result<Self, BusError> {
        let frames: Vec<_> = zmq_msg.iter().collect();

        match frames.len() {
            0 => Err(BusError::Frame("empty ZMQ message".into())),
            1 => {
                let frame = frames[0].as_ref();
                let split = frame
                    .iter()
                    .position(|&b| b == b'{')
                    .ok_or_else(|| BusError::Frame("single frame with no JSON body".into()))?;
                let topic = String::from_utf8_lossy(&frame[..split]).into_owned();
                let body = decode_body(&frame[split..])?;
                Ok(Self { topic, body })
            }
            _ => {
                let topic = String::from_utf8_lossy(frames[0].as_ref()).into_owned();
                let body = decode_body(frames[1].as_ref())?;
                Ok(Self { topic, body })
            }
        }
    }
}

/// Decode a body frame into a JSON object, rejecting non-object roots.
fn decode_body(bytes: &[u8]) -> Result<Map<String, Value>, BusError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(BusError::Frame(format!(
            "message body is not a JSON object: {other}"
        ))),
    }
}
