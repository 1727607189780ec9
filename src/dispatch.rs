//! Downstream dispatcher
//!
//! Owns the persistent TCP connection to the video mixer and formats the
//! OP-47 insertion commands. Titles and clears arrive through the
//! [`TitleSink`] seam from the scheduler; each becomes one CRLF-terminated
//! ASCII line:
//!
//! ```text
//! APPLY <channelLayer> OP47 <packet1_b64>[ <packet2_b64>...]\r\n
//! ```
//!
//! Commands queued while the link is down are dropped; the connection task
//! reconnects with a fixed back-off and the scheduler re-dispatches on its
//! next state change.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::config::{DownstreamConfig, TeletextConfig};
use crate::scheduler::TitleSink;
use crate::teletext::PageEncoder;

/// Handle that formats commands and queues them for the connection task
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Bytes>,
    channel_layer: String,
    encoder: PageEncoder,
}

impl Dispatcher {
    /// Spawn the connection task and return the command handle
    pub fn spawn(downstream: &DownstreamConfig, teletext: TeletextConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(downstream.clone(), rx));
        Self {
            tx,
            channel_layer: downstream.channel_layer.clone(),
            encoder: PageEncoder::new(teletext),
        }
    }

    /// Handle backed by a channel only, for tests that inspect commands
    #[cfg(test)]
    fn with_channel(
        downstream: &DownstreamConfig,
        teletext: TeletextConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            tx,
            channel_layer: downstream.channel_layer.clone(),
            encoder: PageEncoder::new(teletext),
        };
        (dispatcher, rx)
    }

    /// Format and queue one APPLY command carrying the given packets
    fn send_packets(&self, packets: &[Vec<u8>]) {
        let payloads: Vec<String> = packets.iter().map(|p| STANDARD.encode(p)).collect();
        let command = format!(
            "APPLY {} OP47 {}\r\n",
            self.channel_layer,
            payloads.join(" ")
        );
        // The receiver only disappears on shutdown
        let _ = self.tx.send(Bytes::from(command));
    }

    /// Queue the dummy-page keepalive
    pub fn send_dummy_page(&self) {
        self.send_packets(&self.encoder.encode_dummy_page());
    }
}

impl TitleSink for Dispatcher {
    fn show_title(&self, lines: &[String]) {
        self.send_packets(&self.encoder.encode_subtitle(lines));
    }

    /// A clear is an erase-flagged subtitle page with zero rows
    fn clear_title(&self) {
        self.send_packets(&self.encoder.encode_subtitle(&[]));
    }
}

/// Connection task: connect, forward queued commands, reconnect on failure
///
/// While disconnected, pending commands are drained and dropped so a stale
/// title is never applied after a long outage.
async fn run_connection(config: DownstreamConfig, mut rx: mpsc::UnboundedReceiver<Bytes>) {
    let target = format!("{}:{}", config.host, config.port);
    let backoff = std::time::Duration::from_secs(config.reconnect_secs);
    let mut stream: Option<TcpStream> = None;

    loop {
        if stream.is_none() {
            match TcpStream::connect(&target).await {
                Ok(s) => {
                    tracing::info!("Connected to video mixer at {}", target);
                    stream = Some(s);
                }
                Err(e) => {
                    tracing::warn!("Cannot reach video mixer at {}: {}", target, e);
                    while rx.try_recv().is_ok() {}
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            }
        }

        let Some(command) = rx.recv().await else {
            return; // all handles dropped
        };
        if let Some(s) = stream.as_mut() {
            if let Err(e) = s.write_all(&command).await {
                tracing::warn!("Downstream write failed, reconnecting: {}", e);
                stream = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiacriticsEncoding;

    fn configs() -> (DownstreamConfig, TeletextConfig) {
        (DownstreamConfig::default(), TeletextConfig::default())
    }

    #[tokio::test]
    async fn test_show_title_command_grammar() {
        let (downstream, teletext) = configs();
        let (dispatcher, mut rx) = Dispatcher::with_channel(&downstream, teletext);

        dispatcher.show_title(&["Hello".to_string()]);
        let command = String::from_utf8(rx.recv().await.unwrap().to_vec()).unwrap();

        assert!(command.starts_with("APPLY 1-10 OP47 "));
        assert!(command.ends_with("\r\n"));

        // Header + one row, each decoding to a 45-byte packet with run-in
        let payloads: Vec<&str> = command["APPLY 1-10 OP47 ".len()..]
            .trim_end()
            .split(' ')
            .collect();
        assert_eq!(payloads.len(), 2);
        for payload in payloads {
            let packet = STANDARD.decode(payload).unwrap();
            assert_eq!(packet.len(), 45);
            assert_eq!(&packet[..3], &[0x55, 0x55, 0x27]);
        }
    }

    #[tokio::test]
    async fn test_clear_title_is_header_only() {
        let (downstream, teletext) = configs();
        let (dispatcher, mut rx) = Dispatcher::with_channel(&downstream, teletext);

        dispatcher.clear_title();
        let command = String::from_utf8(rx.recv().await.unwrap().to_vec()).unwrap();
        let payloads: Vec<&str> = command["APPLY 1-10 OP47 ".len()..]
            .trim_end()
            .split(' ')
            .collect();
        assert_eq!(payloads.len(), 1);
        assert_eq!(STANDARD.decode(payloads[0]).unwrap().len(), 45);
    }

    #[tokio::test]
    async fn test_x26_page_carries_enhancement_packets() {
        let (downstream, mut teletext) = configs();
        teletext.diacritics = DiacriticsEncoding::X26;
        let (dispatcher, mut rx) = Dispatcher::with_channel(&downstream, teletext);

        dispatcher.show_title(&["Příliš".to_string()]);
        let command = String::from_utf8(rx.recv().await.unwrap().to_vec()).unwrap();
        // APPLY, layer, OP47, then header + one X/26 packet + one row
        assert_eq!(command.trim_end().split(' ').count(), 3 + 3);
    }

    #[tokio::test]
    async fn test_dummy_page_command() {
        let (downstream, teletext) = configs();
        let (dispatcher, mut rx) = Dispatcher::with_channel(&downstream, teletext);

        dispatcher.send_dummy_page();
        let command = String::from_utf8(rx.recv().await.unwrap().to_vec()).unwrap();
        assert!(command.starts_with("APPLY 1-10 OP47 "));
        assert_eq!(command.trim_end().split(' ').count(), 3 + 1);
    }
}
