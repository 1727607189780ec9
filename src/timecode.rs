//! External timecode ingestion
//!
//! Listens for OSC datagrams from the video mixer and keeps the latest
//! playback-time reading. Only messages whose address matches the
//! configured selector are considered; matching is a lenient suffix match
//! by default (the mixer reports per-layer addresses ending in `/time`)
//! or an exact comparison when `strict_address` is set.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::UdpSocket;

use crate::config::TimecodeConfig;
use crate::error::Result;
use crate::scheduler::TimeSource;

/// Latest timecode reading, shared between the listener and the scheduler
///
/// Latest-wins: updates between scheduler ticks simply overwrite.
#[derive(Clone, Default)]
pub struct SharedTimecode {
    inner: Arc<Mutex<Option<f64>>>,
}

impl SharedTimecode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, seconds: f64) {
        *self.inner.lock() = Some(seconds);
    }

    pub fn get(&self) -> Option<f64> {
        *self.inner.lock()
    }
}

impl TimeSource for SharedTimecode {
    fn current_time(&self) -> Option<f64> {
        self.get()
    }
}

/// Run the UDP listener until the socket fails
pub async fn run_listener(config: TimecodeConfig, shared: SharedTimecode) -> Result<()> {
    let socket = UdpSocket::bind(&config.bind).await?;
    tracing::info!("Timecode listener on {}", config.bind);

    let mut buf = [0u8; 1536];
    loop {
        let (len, _peer) = socket.recv_from(&mut buf).await?;
        for (address, seconds) in decode_datagram(&buf[..len]) {
            if address_matches(address, &config.address, config.strict_address) {
                tracing::trace!(address, seconds, "timecode update");
                shared.update(seconds);
            }
        }
    }
}

fn address_matches(address: &str, selector: &str, strict: bool) -> bool {
    if strict {
        address == selector
    } else {
        address.ends_with(selector)
    }
}

/// Decode an OSC datagram into (address, first float argument) readings,
/// walking into bundles. Malformed content decodes to nothing.
fn decode_datagram(datagram: &[u8]) -> Vec<(&str, f64)> {
    let mut readings = Vec::new();
    collect_messages(datagram, &mut readings);
    readings
}

fn collect_messages<'a>(packet: &'a [u8], out: &mut Vec<(&'a str, f64)>) {
    if packet.starts_with(b"#bundle\0") {
        // 8-byte identifier, 8-byte time tag, then size-prefixed elements
        let mut rest = match packet.get(16..) {
            Some(r) => r,
            None => return,
        };
        while rest.len() >= 4 {
            let size = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            let Some(element) = rest.get(4..4 + size) else {
                return;
            };
            collect_messages(element, out);
            rest = &rest[4 + size..];
        }
    } else if let Some(reading) = decode_message(packet) {
        out.push(reading);
    }
}

/// Decode a single OSC message: padded address, padded `,`-prefixed type
/// tags, big-endian arguments. Returns the first float-typed argument.
fn decode_message(packet: &[u8]) -> Option<(&str, f64)> {
    let (address, rest) = read_padded_str(packet)?;
    if !address.starts_with('/') {
        return None;
    }
    let (tags, mut args) = read_padded_str(rest)?;
    for tag in tags.strip_prefix(',')?.chars() {
        match tag {
            'f' => {
                let value = f32::from_be_bytes(args.get(..4)?.try_into().ok()?);
                return Some((address, f64::from(value)));
            }
            'd' => {
                let value = f64::from_be_bytes(args.get(..8)?.try_into().ok()?);
                return Some((address, value));
            }
            'i' => args = args.get(4..)?,
            'h' | 't' => args = args.get(8..)?,
            's' => args = read_padded_str(args)?.1,
            'T' | 'F' | 'N' => {}
            _ => return None,
        }
    }
    None
}

/// Read a NUL-terminated string padded to a 4-byte boundary
fn read_padded_str(data: &[u8]) -> Option<(&str, &[u8])> {
    let nul = data.iter().position(|&b| b == 0)?;
    let value = std::str::from_utf8(&data[..nul]).ok()?;
    let padded = (nul / 4 + 1) * 4;
    Some((value, data.get(padded..).unwrap_or(&[])))
}
