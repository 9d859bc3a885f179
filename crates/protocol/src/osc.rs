//! Structured OSC records.
//!
//! These are the serializable forms handed to the transport collaborator:
//!
//! ```text
//! Message:  { "address": "/tuio/2Dcur", "args": ["set", 3, 0.5, ...] }
//! Bundle:   { "timeTag": 1767225600000, "packets": [Message, ...] }
//! ```
//!
//! The binary OSC rendering of the same records lives in [`crate::wire`].

use serde::{Deserialize, Serialize};

use crate::framer::BundleFramer;

/// A single typed OSC argument.
///
/// Serialized untagged: integers, floats, and strings map to the matching
/// JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OscArg {
    Int(i32),
    Float(f64),
    Str(String),
}

impl OscArg {
    /// OSC type tag character for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::Str(_) => 's',
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i32> for OscArg {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for OscArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OscArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OscArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// An OSC address with its argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// First argument when it is a string (the TUIO message kind).
    pub fn command(&self) -> Option<&str> {
        self.args.first().and_then(OscArg::as_str)
    }

    /// Type tag string, e.g. `",sifffff"`.
    pub fn type_tags(&self) -> String {
        std::iter::once(',')
            .chain(self.args.iter().map(OscArg::type_tag))
            .collect()
    }
}

/// A group of messages sharing one coarse timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscBundle {
    /// Wall-clock milliseconds at encode time. Informational only.
    #[serde(rename = "timeTag")]
    pub time_tag: i64,

    pub packets: Vec<OscMessage>,
}

/// Payload handed to the transport: a bare message or a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    /// The messages carried by this packet, in order.
    pub fn messages(&self) -> &[OscMessage] {
        match self {
            Self::Message(message) => std::slice::from_ref(message),
            Self::Bundle(bundle) => &bundle.packets,
        }
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Self::Bundle(_))
    }

    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Line shapes accepted by [`parse_packets`].
#[derive(Deserialize)]
#[serde(untagged)]
enum PacketLine {
    Packet(OscPacket),
    /// `{"bundle": true, "packets": [...]}`, or `packets` alone.
    Packets { packets: Vec<OscMessage> },
    List(Vec<OscMessage>),
}

impl From<PacketLine> for OscPacket {
    fn from(line: PacketLine) -> Self {
        match line {
            PacketLine::Packet(packet) => packet,
            // no time tag given: one message goes out bare, more are bundled
            PacketLine::Packets { packets: messages } | PacketLine::List(messages) => {
                BundleFramer.encode_at(messages, false, 0)
            }
        }
    }
}

/// Parse packets from JSONL content (one packet per line).
///
/// Besides the message and `{timeTag, packets}` records, a line may be a
/// `{"bundle": true, "packets": [...]}` object or a bare array of messages.
pub fn parse_packets(jsonl: &str) -> Result<Vec<OscPacket>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| serde_json::from_str::<PacketLine>(line).map(OscPacket::from))
        .collect()
}
