//! C header generation for the tag firmware.
//!
//! The tag does not build packets at runtime; it replays one predefined
//! packet embedded as a byte array. [`PredefinedPacket::render`] emits that
//! header:
//!
//! ```text
//! #define PREDEF_PAYLOAD_LEN 28
//! #define PREDEF_PACKET_LEN 38
//!
//! static const uint8_t predefined_packet[PREDEF_PACKET_LEN] = {
//!     0xaa, 0xaa, ...
//! };
//! ```

use crate::codec::PayloadCodec;
use crate::error::Result;
use crate::packet;

const GUARD: &str = "PREDEFINED_PACKET_H";
const BYTES_PER_LINE: usize = 8;

/// A framed packet together with its protected payload length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredefinedPacket {
    /// Full packet: sync header, length, sequence, protected payload
    pub packet: Vec<u8>,

    /// Length of the protected payload alone
    pub payload_len: usize,
}

impl PredefinedPacket {
    /// Protect `payload` with `codec` and frame it.
    pub fn new(header: &[u8], sequence: u8, payload: &[u8], codec: &dyn PayloadCodec) -> Result<Self> {
        let protected = codec.encode(payload);
        let packet = packet::build(header, sequence, &protected)?;
        log::debug!(
            "framed {}-byte payload as {} protected bytes ({})",
            payload.len(),
            protected.len(),
            codec.name()
        );

        Ok(Self {
            packet,
            payload_len: protected.len(),
        })
    }

    /// Render the C header text.
    pub fn render(&self) -> String {
        render_header(&self.packet, self.payload_len)
    }
}

/// Render a C header embedding `packet`.
pub fn render_header(packet: &[u8], payload_len: usize) -> String {
    let rows: Vec<String> = packet
        .chunks(BYTES_PER_LINE)
        .map(|row| {
            row.iter()
                .map(|byte| format!("0x{byte:02x}"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    let mut body = rows.join(", \n    ");
    if !packet.is_empty() && packet.len() % BYTES_PER_LINE == 0 {
        // A full last row still gets its line break.
        body.push_str("\n    ");
    }

    format!(
        "#ifndef {GUARD}\n\
         #define {GUARD}\n\
         \n\
         #define PREDEF_PAYLOAD_LEN {payload_len}\n\
         #define PREDEF_PACKET_LEN {}\n\
         \n\
         static const uint8_t predefined_packet[PREDEF_PACKET_LEN] = {{\n    \
         {body}\n\
         }};\n\
         \n\
         #endif // {GUARD}\n",
        packet.len()
    )
}
