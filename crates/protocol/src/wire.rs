//! Binary OSC 1.0 rendering of [`OscPacket`] records.
//!
//! Layout rules:
//! - strings are NUL-terminated and zero-padded to a multiple of 4 bytes
//! - `i` is a big-endian int32, `f` a big-endian float32
//! - a bundle is `#bundle\0`, an 8-byte time tag, then each element as a
//!   big-endian u32 size followed by the encoded message
//!
//! Bundles always carry the "immediately" time tag; the millisecond
//! `timeTag` of the structured record is informational and is not mapped
//! onto NTP time.

use webtuio_common::error::{TuioError, TuioResult};

use crate::osc::{OscArg, OscBundle, OscMessage, OscPacket};

/// OSC time tag meaning "process immediately".
pub const IMMEDIATE_TIME_TAG: u64 = 1;

const BUNDLE_TAG: &str = "#bundle";

/// Encode a packet to its binary OSC representation.
pub fn encode_packet(packet: &OscPacket) -> TuioResult<Vec<u8>> {
    match packet {
        OscPacket::Message(message) => encode_message(message),
        OscPacket::Bundle(bundle) => encode_bundle(bundle),
    }
}

/// Encode a single message.
pub fn encode_message(message: &OscMessage) -> TuioResult<Vec<u8>> {
    if !message.address.starts_with('/') {
        return Err(TuioError::encode(format!(
            "OSC address must start with '/': {:?}",
            message.address
        )));
    }

    let mut out = Vec::with_capacity(32 + message.args.len() * 8);
    write_string(&mut out, &message.address)?;
    write_string(&mut out, &message.type_tags())?;

    for arg in &message.args {
        match arg {
            OscArg::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            OscArg::Float(v) => out.extend_from_slice(&(*v as f32).to_be_bytes()),
            OscArg::Str(s) => write_string(&mut out, s)?,
        }
    }
    Ok(out)
}

/// Encode a bundle with the immediate time tag.
pub fn encode_bundle(bundle: &OscBundle) -> TuioResult<Vec<u8>> {
    let mut out = Vec::new();
    write_string(&mut out, BUNDLE_TAG)?;
    out.extend_from_slice(&IMMEDIATE_TIME_TAG.to_be_bytes());

    for message in &bundle.packets {
        let element = encode_message(message)?;
        let size = u32::try_from(element.len())
            .map_err(|_| TuioError::encode("bundle element exceeds u32::MAX bytes"))?;
        out.extend_from_slice(&size.to_be_bytes());
        out.extend_from_slice(&element);
    }
    Ok(out)
}

fn write_string(out: &mut Vec<u8>, s: &str) -> TuioResult<()> {
    if s.contains('\0') {
        return Err(TuioError::encode(format!(
            "OSC strings cannot contain NUL: {s:?}"
        )));
    }
    out.extend_from_slice(s.as_bytes());
    let padded = (s.len() / 4 + 1) * 4;
    out.resize(out.len() + (padded - s.len()), 0);
    Ok(())
}

/// Lowercase hex rendering, used for dumps and diagnostics.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
