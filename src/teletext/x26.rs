//! X/26 enhancement packet construction (ETS 300 706 packet type 26)
//!
//! Builds the Level 1.5 enhancement stream that paints diacritics over the
//! plain G0 rows of a page. The encoder rewrites each display row to its
//! base-letter form and accumulates one column triplet per accented
//! character; the triplets are then chunked into 13-triplet packets with
//! Hamming 24/18 protection.

use std::collections::HashMap;

use crate::config::{CaronEncoding, G2Variant, TeletextConfig};
use crate::teletext::hamming::{ham24, ham8};

/// Triplet modes used by the enhancement stream.
pub mod mode {
    /// Selects the row that subsequent column triplets target.
    pub const SET_ACTIVE_POSITION: u8 = 0x04;
    /// Character from the G2 supplementary set.
    pub const G2_CHARACTER: u8 = 0x0F;
    /// G0 character with diacritical mark; add the mark index (1..15).
    pub const DIACRITIC_BASE: u8 = 0x10;
    /// Termination marker, doubling as packet filler with address 0x3F.
    pub const TERMINATION: u8 = 0x1F;
}

/// G2 column-4 diacritic indexes for the always-composed letter classes.
const ACUTE_INDEX: u8 = 2;
const RING_INDEX: u8 = 10;

/// Filler triplet address.
const FILLER_ADDRESS: u8 = 0x3F;

/// Triplets per X/26 packet.
const TRIPLETS_PER_PACKET: usize = 13;

/// Caron letters in canonical order, lower then upper case, with their G0
/// base letters.
const CARON_LOWER: [(char, u8); 8] = [
    ('č', b'c'),
    ('ď', b'd'),
    ('ě', b'e'),
    ('ň', b'n'),
    ('ř', b'r'),
    ('š', b's'),
    ('ť', b't'),
    ('ž', b'z'),
];
const CARON_UPPER: [(char, u8); 8] = [
    ('Č', b'C'),
    ('Ď', b'D'),
    ('Ě', b'E'),
    ('Ň', b'N'),
    ('Ř', b'R'),
    ('Š', b'S'),
    ('Ť', b'T'),
    ('Ž', b'Z'),
];

/// Acute-accented letters with their G0 base letters.
const ACUTE_LETTERS: [(char, u8); 12] = [
    ('á', b'a'),
    ('é', b'e'),
    ('í', b'i'),
    ('ó', b'o'),
    ('ú', b'u'),
    ('ý', b'y'),
    ('Á', b'A'),
    ('É', b'E'),
    ('Í', b'I'),
    ('Ó', b'O'),
    ('Ú', b'U'),
    ('Ý', b'Y'),
];

/// Precomposed G2 codes for the caron letters, per code-set variant, in the
/// order of `CARON_LOWER` / `CARON_UPPER`.
fn caron_g2_codes(variant: G2Variant) -> (&'static [u8; 8], &'static [u8; 8]) {
    match variant {
        G2Variant::Default => (
            &[0x62, 0x64, 0x65, 0x6E, 0x72, 0x73, 0x74, 0x7A],
            &[0x42, 0x44, 0x45, 0x4E, 0x52, 0x53, 0x54, 0x5A],
        ),
        G2Variant::Alt1 => (
            &[0x63, 0x64, 0x65, 0x6E, 0x72, 0x73, 0x74, 0x79],
            &[0x43, 0x44, 0x45, 0x4E, 0x52, 0x53, 0x54, 0x59],
        ),
        G2Variant::Alt2 => (
            &[0x68, 0x6A, 0x6B, 0x70, 0x78, 0x79, 0x7A, 0x7E],
            &[0x48, 0x4A, 0x4B, 0x50, 0x58, 0x59, 0x5A, 0x5E],
        ),
        G2Variant::Iso88592 => (
            &[0x68, 0x6F, 0x6C, 0x72, 0x78, 0x39, 0x3B, 0x2E],
            &[0x48, 0x4F, 0x4C, 0x52, 0x58, 0x28, 0x2B, 0x2C],
        ),
    }
}

/// One 18-bit enhancement triplet before Hamming protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triplet {
    pub address: u8,
    pub mode: u8,
    pub data: u8,
}

impl Triplet {
    pub fn new(address: u8, mode: u8, data: u8) -> Self {
        debug_assert!(address < 64, "triplet address exceeds 6 bits: {address:#x}");
        debug_assert!(mode < 32, "triplet mode exceeds 5 bits: {mode:#x}");
        debug_assert!(data < 128, "triplet data exceeds 7 bits: {data:#x}");
        Self { address, mode, data }
    }

    /// Pack into the 18-bit wire value: address | mode << 6 | data << 11.
    pub fn value(self) -> u32 {
        u32::from(self.address) | u32::from(self.mode) << 6 | u32::from(self.data) << 11
    }
}

/// How one accented letter is represented on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Composition {
    /// G0 base letter stays in the row cell; a diacritic triplet paints
    /// the mark over it.
    Composed { base: u8, diacritic: u8 },
    /// Precomposed G2 character; the row cell becomes a space.
    Precomposed { g2: u8 },
}

/// Maps the row address of `row_location` (1..=24) per ETS 300 706
/// §12.3.2: row 24 is address 40, rows 1..23 are 41..63.
pub fn row_address(row_location: u8) -> u8 {
    debug_assert!((1..=24).contains(&row_location), "row out of range: {row_location}");
    if row_location == 24 {
        40
    } else {
        40 + row_location
    }
}

/// Per-page enhancement encoder.
///
/// Owned by the page encoder for the scope of a single page build: rows are
/// fed through [`encode_row`](X26Encoder::encode_row) in display order and
/// the accumulated triplets are materialized once with
/// [`enhancement_packets`](X26Encoder::enhancement_packets).
pub struct X26Encoder {
    table: HashMap<char, Composition>,
    triplets: Vec<Triplet>,
}

impl X26Encoder {
    /// Build the encoder, constructing the composition table from the
    /// caron configuration. The table is immutable afterwards.
    pub fn new(config: &TeletextConfig) -> Self {
        let mut table = HashMap::new();

        for (ch, base) in ACUTE_LETTERS {
            table.insert(ch, Composition::Composed { base, diacritic: ACUTE_INDEX });
        }
        table.insert('ů', Composition::Composed { base: b'u', diacritic: RING_INDEX });
        table.insert('Ů', Composition::Composed { base: b'U', diacritic: RING_INDEX });

        match config.caron_encoding {
            CaronEncoding::Compose => {
                let diacritic = config.caron_diacritic_index;
                for (ch, base) in CARON_LOWER.iter().chain(&CARON_UPPER) {
                    table.insert(*ch, Composition::Composed { base: *base, diacritic });
                }
            }
            CaronEncoding::G2 => {
                let (lower, upper) = caron_g2_codes(config.g2_variant);
                for (i, (ch, _)) in CARON_LOWER.iter().enumerate() {
                    table.insert(*ch, Composition::Precomposed { g2: lower[i] });
                }
                for (i, (ch, _)) in CARON_UPPER.iter().enumerate() {
                    table.insert(*ch, Composition::Precomposed { g2: upper[i] });
                }
            }
        }

        Self {
            table,
            triplets: Vec::new(),
        }
    }

    /// Rewrite one display row to its base-letter form, recording an
    /// enhancement triplet per accented character.
    ///
    /// `row_location` is the teletext row (1..=24) the text will occupy.
    /// Triplet addresses are the 0-based column of the character within
    /// the given row string.
    pub fn encode_row(&mut self, row: &str, row_location: u8) -> String {
        let mut out = String::with_capacity(row.len());
        let mut position_set = false;

        for (col, ch) in row.chars().enumerate() {
            let Some(&composition) = self.table.get(&ch) else {
                out.push(ch);
                continue;
            };
            if !position_set {
                self.triplets.push(Triplet::new(
                    row_address(row_location),
                    mode::SET_ACTIVE_POSITION,
                    0,
                ));
                position_set = true;
            }
            match composition {
                Composition::Composed { base, diacritic } => {
                    out.push(base as char);
                    self.triplets
                        .push(Triplet::new(col as u8, mode::DIACRITIC_BASE + diacritic, base));
                }
                Composition::Precomposed { g2 } => {
                    out.push(' ');
                    self.triplets
                        .push(Triplet::new(col as u8, mode::G2_CHARACTER, g2));
                }
            }
        }
        out
    }

    /// Materialize the accumulated triplets into X/26 packet payloads.
    ///
    /// Each payload is 40 bytes: the Hamming 8/4 designation code followed
    /// by 13 Hamming 24/18 triplets, padded with termination-marker fillers.
    /// Every filler carries data 0x00 except the last, whose data bits are
    /// all set (the all-ones stuffing triplet).
    pub fn enhancement_packets(&self) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        for (designation, chunk) in self.triplets.chunks(TRIPLETS_PER_PACKET).enumerate() {
            let mut payload = Vec::with_capacity(1 + TRIPLETS_PER_PACKET * 3);
            payload.push(ham8(designation as u8));
            for triplet in chunk {
                payload.extend_from_slice(&ham24(triplet.value()));
            }
            let fillers = TRIPLETS_PER_PACKET - chunk.len();
            for i in 0..fillers {
                let data = if i + 1 == fillers { 0x7F } else { 0x00 };
                let filler = Triplet::new(FILLER_ADDRESS, mode::TERMINATION, data);
                payload.extend_from_slice(&ham24(filler.value()));
            }
            packets.push(payload);
        }
        packets
    }
}
