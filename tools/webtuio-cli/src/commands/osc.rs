//! Render frame JSON lines as binary OSC.

use std::io::Read;
use std::path::PathBuf;

use webtuio_protocol::osc::parse_packets;
use webtuio_protocol::wire::{encode_packet, to_hex};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?
    };

    let packets = parse_packets(&content)?;
    for packet in &packets {
        let bytes = encode_packet(packet)?;
        println!("{}", to_hex(&bytes));
    }

    tracing::debug!(packets = packets.len(), "Encoded packets");
    Ok(())
}
