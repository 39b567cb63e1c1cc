//! Frame checksum and the fixed 10-byte header layout.
//!
//! Ground truth: `packet_t`/`frame_control_{0,1}_t` and `checksum` in
//! `wavingz.h`. Rust has no portable way to overlay a packed C struct onto
//! a byte slice, so `Header` is an accessor view rather than a `#[repr(C,
//! packed)]` cast — same fields, explicit bit extraction for `fc0`/`fc1`.

/// Size in bytes of the fixed frame header (up to and including
/// `command_class`, before the variable-length payload and checksum).
pub const HEADER_LEN: usize = 10;

/// XOR-reduce `bytes` against an initial `0xFF` accumulator.
///
/// `checksum([0xD2, 0xD6, 0x33, 0x22]) == 0x2E`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0xFFu8, |acc, &b| acc ^ b)
}

/// `true` iff `bytes` is at least `HEADER_LEN` long, its declared `length`
/// field does not exceed the buffer, and the trailing checksum byte matches.
pub fn is_valid(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN {
        return false;
    }
    let length = bytes[7] as usize;
    if bytes.len() < length || length == 0 {
        return false;
    }
    checksum(&bytes[..length - 1]) == bytes[length - 1]
}

/// Frame-control byte 0: `{header_type:4, speed:1, low_power:1,
/// ack_request:1, routed:1}`, low-nibble-first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameControl0 {
    pub header_type: u8,
    pub speed: bool,
    pub low_power: bool,
    pub ack_request: bool,
    pub routed: bool,
}

impl FrameControl0 {
    pub fn from_byte(fc0: u8) -> Self {
        FrameControl0 {
            header_type: fc0 & 0x0F,
            speed: fc0 & 0x10 != 0,
            low_power: fc0 & 0x20 != 0,
            ack_request: fc0 & 0x40 != 0,
            routed: fc0 & 0x80 != 0,
        }
    }
}

/// Frame-control byte 1: `{sequence_number:4, beaming_info:4}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameControl1 {
    pub sequence_number: u8,
    pub beaming_info: u8,
}

impl FrameControl1 {
    pub fn from_byte(fc1: u8) -> Self {
        FrameControl1 {
            sequence_number: fc1 & 0x0F,
            beaming_info: (fc1 >> 4) & 0x0F,
        }
    }
}

/// A read-only view over a decoded frame's fixed header.
///
/// Does not copy the payload; callers slice `bytes[HEADER_LEN..length - 1]`
/// for the application payload and `bytes[length - 1]` for the checksum.
#[derive(Clone, Copy, Debug)]
pub struct Header<'a> {
    bytes: &'a [u8],
}

impl<'a> Header<'a> {
    /// Wraps `bytes` as a header view. Returns `None` if shorter than
    /// `HEADER_LEN`.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            None
        } else {
            Some(Header { bytes })
        }
    }

    pub fn home_id(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    pub fn source_node_id(&self) -> u8 {
        self.bytes[4]
    }

    pub fn fc0(&self) -> FrameControl0 {
        FrameControl0::from_byte(self.bytes[5])
    }

    pub fn fc1(&self) -> FrameControl1 {
        FrameControl1::from_byte(self.bytes[6])
    }

    /// Total frame length, including the trailing checksum byte.
    pub fn length(&self) -> u8 {
        self.bytes[7]
    }

    pub fn dest_node_id(&self) -> u8 {
        self.bytes[8]
    }

    pub fn command_class(&self) -> u8 {
        self.bytes[9]
    }

    /// The application payload: bytes between the fixed header and the
    /// trailing checksum. Empty if the declared length does not extend
    /// past the header, or extends past the available buffer.
    pub fn payload(&self) -> &'a [u8] {
        let length = self.length() as usize;
        if length <= HEADER_LEN || self.bytes.len() < length {
            &[]
        } else {
            &self.bytes[HEADER_LEN..length - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_spec_example() {
        assert_eq!(checksum(&[0xD2, 0xD6, 0x33, 0x22]), 0x2E);
    }

    #[test]
    fn checksum_of_full_frame_including_its_own_checksum_is_0xff() {
        let payload = [0xD2u8, 0xD6, 0x33, 0x22];
        let fcs = checksum(&payload);
        let mut frame = payload.to_vec();
        frame.push(fcs);
        assert_eq!(checksum(&frame), 0xFF);
    }

    #[test]
    fn header_decodes_fixed_fields() {
        let mut bytes = vec![0u8; 12];
        bytes[0..4].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        bytes[4] = 7; // source_node_id
        bytes[5] = 0b1010_0011; // routed|ack_request|header_type=3
        bytes[6] = 0b0010_0001; // beaming_info=2, sequence_number=1
        bytes[7] = 12; // length
        bytes[8] = 9; // dest_node_id
        bytes[9] = 0x31; // command_class
        bytes[10] = 0xAB; // payload byte
        let fcs = checksum(&bytes[..11]);
        bytes[11] = fcs;

        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.home_id(), 0x1122_3344);
        assert_eq!(header.source_node_id(), 7);
        let fc0 = header.fc0();
        assert_eq!(fc0.header_type, 3);
        assert!(!fc0.speed);
        assert!(!fc0.low_power);
        assert!(fc0.ack_request);
        assert!(fc0.routed);
        let fc1 = header.fc1();
        assert_eq!(fc1.sequence_number, 1);
        assert_eq!(fc1.beaming_info, 2);
        assert_eq!(header.length(), 12);
        assert_eq!(header.dest_node_id(), 9);
        assert_eq!(header.command_class(), 0x31);
        assert_eq!(header.payload(), &[0xAB]);
        assert!(is_valid(&bytes));
    }

    #[test]
    fn is_valid_rejects_short_or_mismatched_checksum() {
        assert!(!is_valid(&[0u8; 9]));
        let mut bytes = vec![0u8; 12];
        bytes[7] = 12;
        bytes[11] = 0x00; // definitely not a matching checksum of all-zero header
        assert!(!is_valid(&bytes));
    }
}
