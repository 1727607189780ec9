//! OP-47 / World System Teletext encoding
//!
//! The pipeline from display text to wire bytes: parity codecs (Hamming
//! 8/4, Hamming 24/18, odd parity), the X/26 Level 1.5 enhancement encoder
//! for diacritics, and the page encoder that assembles header, row and
//! enhancement packets.

pub mod hamming;
pub mod page;
pub mod x26;

pub use page::PageEncoder;
