//! WST page encoder
//!
//! Assembles complete teletext packets for one subtitle page: the row-0
//! header, the framed display rows and, in X/26 mode, the enhancement
//! packets. Every packet is 45 bytes: a 5-byte prefix (clock run-in,
//! framing code, Hamming-protected magazine/packet address) followed by a
//! 40-byte payload.

use crate::config::{DiacriticsEncoding, TeletextConfig};
use crate::teletext::hamming::{ham8, odd_parity};
use crate::teletext::x26::X26Encoder;

/// Clock run-in and framing code opening every packet.
const RUN_IN: [u8; 3] = [0x55, 0x55, 0x27];

/// Packet number carrying the enhancement triplets.
const X26_PACKET: u8 = 26;

/// Header sub-code of the dummy page.
const DUMMY_SUB_CODE: u16 = 0x3F7E;

/// Double-height / start-box framing opening each display row.
const ROW_OPEN: char = '\x0B';
/// End-box framing closing each display row.
const ROW_CLOSE: char = '\x0A';

/// Encodes subtitle pages for one configured magazine and page number.
pub struct PageEncoder {
    config: TeletextConfig,
}

impl PageEncoder {
    pub fn new(config: TeletextConfig) -> Self {
        Self { config }
    }

    /// 5-byte packet prefix: run-in, framing code, then two Hamming 8/4
    /// nibbles carrying the 3-bit magazine (0 means magazine 8 on the
    /// wire) and the 5-bit packet number.
    fn packet_prefix(&self, packet: u8) -> [u8; 5] {
        let low = (self.config.magazine & 0x07) | ((packet & 0x01) << 3);
        let high = packet >> 1;
        [RUN_IN[0], RUN_IN[1], RUN_IN[2], ham8(low), ham8(high)]
    }

    /// Row-0 header packet: eight Hamming 8/4 page-control nibbles and 32
    /// bytes of space padding.
    fn header_packet(&self, page: u8, sub_code: u16, erase: bool) -> Vec<u8> {
        let mut packet = Vec::with_capacity(45);
        packet.extend_from_slice(&self.packet_prefix(0));

        let s2 = ((sub_code >> 4) & 0x07) as u8 | if erase { 0x08 } else { 0x00 };
        let nibbles = [
            page & 0x0F,                          // page units
            page >> 4,                            // page tens
            (sub_code & 0x0F) as u8,              // S1
            s2,                                   // S2 + erase (C4)
            ((sub_code >> 8) & 0x0F) as u8,       // S3
            ((sub_code >> 12) & 0x03) as u8 | 0x08, // S4 + subtitle (C6)
            0x03,                                 // suppress header (C7) + update (C8)
            0x00,                                 // parallel mode, English G0
        ];
        for nibble in nibbles {
            packet.push(ham8(nibble));
        }
        packet.extend(std::iter::repeat(0x20).take(32));
        packet
    }

    /// Display-row packet: framed text padded with spaces to the row width,
    /// every byte carrying odd parity.
    fn row_packet(&self, row_location: u8, text: &str) -> Vec<u8> {
        let width = self.config.row_width;
        let mut packet = Vec::with_capacity(5 + width);
        packet.extend_from_slice(&self.packet_prefix(row_location));

        let mut emitted = 0;
        for ch in text.chars().take(width) {
            packet.push(odd_parity(char_to_g0(ch)));
            emitted += 1;
        }
        while emitted < width {
            packet.push(0x20); // space is odd by inspection
            emitted += 1;
        }
        packet
    }

    /// Fixed placeholder page: a lone header with page 0xFF and the dummy
    /// sub-code, used upstream as a keepalive.
    pub fn encode_dummy_page(&self) -> Vec<Vec<u8>> {
        vec![self.header_packet(0xFF, DUMMY_SUB_CODE, false)]
    }

    /// Encode one subtitle page from display lines.
    ///
    /// Emits the erase-flagged header, then (in X/26 mode) the enhancement
    /// packets, then one display-row packet per line starting at the
    /// configured start row. The enhancement packets precede the rows so
    /// the decoder holds the diacritic data at row-paint time. An empty
    /// line slice yields the header alone, which clears the page.
    pub fn encode_subtitle(&self, lines: &[String]) -> Vec<Vec<u8>> {
        let mut packets = vec![self.header_packet(self.config.page, 0x0000, true)];

        let mut x26 = X26Encoder::new(&self.config);
        let mut rows = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let row_location = self.config.start_row + i as u8;
            let framed = format!("{ROW_OPEN}{ROW_OPEN}{line}{ROW_CLOSE}{ROW_CLOSE}");
            let display = match self.config.diacritics {
                DiacriticsEncoding::X26 => x26.encode_row(&framed, row_location),
                DiacriticsEncoding::Latin2 => framed.chars().map(fold_to_ascii).collect(),
            };
            rows.push((row_location, display));
        }

        if self.config.diacritics == DiacriticsEncoding::X26 {
            for payload in x26.enhancement_packets() {
                let mut packet = Vec::with_capacity(45);
                packet.extend_from_slice(&self.packet_prefix(X26_PACKET));
                packet.extend_from_slice(&payload);
                packets.push(packet);
            }
        }

        for (row_location, display) in rows {
            packets.push(self.row_packet(row_location, &display));
        }
        packets
    }
}

/// Map a scalar to its 7-bit G0 byte. Characters the X/26 pass left behind
/// (accents outside the Czech repertoire) fold to their base letter, and
/// anything unmappable becomes '?'.
fn char_to_g0(ch: char) -> u8 {
    let folded = fold_to_ascii(ch);
    if (folded as u32) < 0x80 {
        folded as u8
    } else {
        b'?'
    }
}

/// Strip the accent off a Latin letter, keeping ASCII and row-framing
/// control codes unchanged. Codepoints outside the repertoire become '?'.
fn fold_to_ascii(ch: char) -> char {
    if ch.is_ascii() {
        return ch;
    }
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ă' | 'ą' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ă' | 'Ą' => 'A',
        'č' | 'ç' | 'ć' => 'c',
        'Č' | 'Ç' | 'Ć' => 'C',
        'ď' | 'đ' => 'd',
        'Ď' | 'Đ' => 'D',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ě' | 'Ę' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ľ' | 'ĺ' | 'ł' => 'l',
        'Ľ' | 'Ĺ' | 'Ł' => 'L',
        'ň' | 'ñ' | 'ń' => 'n',
        'Ň' | 'Ñ' | 'Ń' => 'N',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ő' => 'O',
        'ř' | 'ŕ' => 'r',
        'Ř' | 'Ŕ' => 'R',
        'š' | 'ś' | 'ş' => 's',
        'Š' | 'Ś' | 'Ş' => 'S',
        'ť' | 'ţ' => 't',
        'Ť' | 'Ţ' => 'T',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ű' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ů' | 'Ű' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teletext::hamming::{unham24, unham8};

    fn encoder() -> PageEncoder {
        PageEncoder::new(TeletextConfig::default())
    }

    fn header_nibbles(packet: &[u8]) -> Vec<u8> {
        packet[5..13]
            .iter()
            .map(|&b| unham8(b).expect("valid hamming"))
            .collect()
    }

    #[test]
    fn test_packets_start_with_run_in() {
        for packet in encoder().encode_subtitle(&["Hi".into()]) {
            assert_eq!(&packet[..3], &[0x55, 0x55, 0x27]);
        }
    }

    #[test]
    fn test_packet_address_nibbles() {
        let mut config = TeletextConfig::default();
        config.magazine = 1;
        let enc = PageEncoder::new(config);
        let packets = enc.encode_subtitle(&["Hi".into()]);

        // Header is packet 0: low nibble = magazine, high nibble = 0
        assert_eq!(unham8(packets[0][3]), Some(0x01));
        assert_eq!(unham8(packets[0][4]), Some(0x00));

        // Row packet 19: low nibble = magazine | (19 & 1) << 3, high = 19 >> 1
        let row = packets.last().unwrap();
        assert_eq!(unham8(row[3]), Some(0x01 | 0x08));
        assert_eq!(unham8(row[4]), Some(19 >> 1));
    }

    #[test]
    fn test_empty_subtitle_is_header_only() {
        let packets = encoder().encode_subtitle(&[]);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].len(), 45);
    }

    #[test]
    fn test_header_control_nibbles() {
        let enc = PageEncoder::new(TeletextConfig {
            page: 0x34,
            ..TeletextConfig::default()
        });
        let packets = enc.encode_subtitle(&[]);
        let nibbles = header_nibbles(&packets[0]);

        assert_eq!(nibbles[0], 0x4); // page units
        assert_eq!(nibbles[1], 0x3); // page tens
        assert_eq!(nibbles[2], 0x0); // S1
        assert_eq!(nibbles[3], 0x8); // erase set, sub-code zero
        assert_eq!(nibbles[4], 0x0); // S3
        assert_eq!(nibbles[5], 0x8); // subtitle bit
        assert_eq!(nibbles[6], 0x3); // suppress header + update
        assert_eq!(nibbles[7], 0x0);
        assert!(packets[0][13..45].iter().all(|&b| b == 0x20));
    }

    #[test]
    fn test_dummy_page_constants() {
        let packets = encoder().encode_dummy_page();
        assert_eq!(packets.len(), 1);
        let nibbles = header_nibbles(&packets[0]);

        assert_eq!(nibbles[0], 0xF); // page 0xFF
        assert_eq!(nibbles[1], 0xF);
        // sub-code 0x3F7E: S1=0xE, S2=0x7 (erase clear), S3=0xF, S4=0x3|subtitle
        assert_eq!(nibbles[2], 0xE);
        assert_eq!(nibbles[3], 0x7);
        assert_eq!(nibbles[4], 0xF);
        assert_eq!(nibbles[5], 0x3 | 0x8);
    }

    #[test]
    fn test_row_payload_geometry_and_parity() {
        let packets = encoder().encode_subtitle(&["Hello".into()]);
        let row = packets.last().unwrap();
        assert_eq!(row.len(), 45);
        let payload = &row[5..];
        assert_eq!(payload.len(), 40);
        for &b in payload {
            assert_eq!(b.count_ones() % 2, 1, "byte {b:#04x} has even parity");
        }
    }

    #[test]
    fn test_row_framing() {
        let packets = encoder().encode_subtitle(&["Hi".into()]);
        let payload = &packets.last().unwrap()[5..];
        let bare: Vec<u8> = payload.iter().map(|&b| b & 0x7F).collect();
        assert_eq!(&bare[..2], &[0x0B, 0x0B]);
        assert_eq!(&bare[2..4], b"Hi");
        assert_eq!(&bare[4..6], &[0x0A, 0x0A]);
        assert!(bare[6..].iter().all(|&b| b == 0x20));
    }

    #[test]
    fn test_x26_packets_precede_rows() {
        let packets = encoder().encode_subtitle(&["čau".into()]);
        assert_eq!(packets.len(), 3); // header, one X/26, one row

        let x26 = &packets[1];
        assert_eq!(unham8(x26[3]), Some((26 & 1) << 3)); // magazine 0
        assert_eq!(unham8(x26[4]), Some(26 >> 1));

        // Row comes last and holds the folded text
        let bare: Vec<u8> = packets[2][5..].iter().map(|&b| b & 0x7F).collect();
        assert_eq!(&bare[2..5], b"cau");
    }

    #[test]
    fn test_x26_triplet_addresses_include_framing_offset() {
        let packets = encoder().encode_subtitle(&["čau".into()]);
        let payload = &packets[1][5..];
        let second = unham24([payload[4], payload[5], payload[6]]).unwrap();
        // First triplet sets the active position; the second targets the
        // 'č' cell, which sits after the two framing bytes.
        assert_eq!(second & 0x3F, 2);
        assert_eq!(second >> 11 & 0x7F, u32::from(b'c'));
    }

    #[test]
    fn test_latin2_mode_folds_in_place() {
        let enc = PageEncoder::new(TeletextConfig {
            diacritics: DiacriticsEncoding::Latin2,
            ..TeletextConfig::default()
        });
        let packets = enc.encode_subtitle(&["Příliš žluťoučký".into()]);
        assert_eq!(packets.len(), 2); // no X/26 packets
        let bare: Vec<u8> = packets[1][5..].iter().map(|&b| b & 0x7F).collect();
        assert_eq!(&bare[2..18], b"Prilis zlutoucky");
    }

    #[test]
    fn test_unmappable_codepoint_becomes_question_mark() {
        let packets = encoder().encode_subtitle(&["日本".into()]);
        let bare: Vec<u8> = packets.last().unwrap()[5..]
            .iter()
            .map(|&b| b & 0x7F)
            .collect();
        assert_eq!(&bare[2..4], b"??");
    }

    #[test]
    fn test_long_row_truncated_to_width() {
        let long = "x".repeat(60);
        let packets = encoder().encode_subtitle(&[long]);
        let row = packets.last().unwrap();
        assert_eq!(row.len(), 45);
    }

    #[test]
    fn test_spec_sentence_rows_and_triplets() {
        let packets =
            encoder().encode_subtitle(&["Loď čeří kýlem tůň obzvlášť v Grónské úžině.".into()]);
        let row = packets.last().unwrap();
        let bare: Vec<u8> = row[5..].iter().map(|&b| b & 0x7F).collect();
        assert_eq!(&bare[2..10], b"Lod ceri");

        // Every caron enhancement uses mode 0x1F (index 15) and carries the
        // base letter at the framed column.
        let mut caron_data = Vec::new();
        for packet in &packets[1..packets.len() - 1] {
            for chunk in packet[6..].chunks(3) {
                let v = unham24([chunk[0], chunk[1], chunk[2]]).unwrap();
                let mode = v >> 6 & 0x1F;
                if mode == 0x1F && (v & 0x3F) != 0x3F {
                    caron_data.push((v >> 11 & 0x7F) as u8);
                }
            }
        }
        // Carons in the sentence: ď č ř ň š ť ž ě, in order of appearance
        assert_eq!(
            caron_data,
            vec![b'd', b'c', b'r', b'n', b's', b't', b'z', b'e']
        );
    }
}
