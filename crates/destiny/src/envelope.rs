//! Transport envelope prepended to every ball update.
//!
//! Format (little-endian):
//! - u8  more (1 when further balls follow in the stream)
//! - u32 sequence (strictly increasing per recipient, assigned by the caller)

/// Size of the envelope in bytes.
pub const ENVELOPE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub more: bool,
    pub sequence: u32,
}

impl Envelope {
    /// Envelope for an add-ball update. The continuation flag is always set.
    pub fn add_ball(sequence: u32) -> Self {
        Self {
            more: true,
            sequence,
        }
    }
}

/// Append the envelope to `out`.
pub fn write_envelope(out: &mut Vec<u8>, envelope: Envelope) {
    out.push(u8::from(envelope.more));
    out.extend_from_slice(&envelope.sequence.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_layout_is_five_bytes() {
        let mut buf = Vec::new();
        write_envelope(&mut buf, Envelope::add_ball(0x0102_0304));
        assert_eq!(buf.len(), ENVELOPE_LEN);
        assert_eq!(buf, vec![1, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn envelope_appends_to_existing_bytes() {
        let mut buf = vec![0xAA];
        write_envelope(
            &mut buf,
            Envelope {
                more: false,
                sequence: 7,
            },
        );
        assert_eq!(buf, vec![0xAA, 0, 7, 0, 0, 0]);
    }
}
