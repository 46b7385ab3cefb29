//! Terminal chat channel
//!
//! Each input line is one message from the local conversant; replies are
//! written one per line.

use std::sync::Arc;

use async_trait::async_trait;
use rendezvous_core::{route_inbound, ChatSpool, ReplySink};
use rendezvous_domain::constants::NAMESPACE_TERMINAL;
use rendezvous_domain::{Conversant, RendezvousError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// [`ReplySink`] writing each reply as a line to `W`.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }
}

impl WriterSink<Vec<u8>> {
    /// Everything written so far.
    pub async fn contents(&self) -> Vec<u8> {
        self.writer.lock().await.clone()
    }
}

#[async_trait]
impl<W> ReplySink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(&self, _to: &Conversant, text: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let closed = |e: std::io::Error| RendezvousError::ChannelClosed(format!("terminal: {e}"));
        writer.write_all(text.as_bytes()).await.map_err(closed)?;
        writer.write_all(b"\n").await.map_err(closed)?;
        writer.flush().await.map_err(closed)
    }
}

pub struct TerminalChannel {
    spool: Arc<ChatSpool>,
    sink: Arc<dyn ReplySink>,
    conversant: Conversant,
}

impl TerminalChannel {
    pub fn new(spool: Arc<ChatSpool>, sink: Arc<dyn ReplySink>, user: &str) -> Self {
        Self { spool, sink, conversant: Conversant::new(NAMESPACE_TERMINAL, user) }
    }

    /// Feed lines from `reader` into the spool until end of input or
    /// `shutdown`.
    pub async fn run<R>(&self, reader: R, shutdown: CancellationToken) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(conversant = %self.conversant, "terminal channel ready");
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                () = shutdown.cancelled() => break,
                line = lines.next_line() => line.map_err(|e| {
                    RendezvousError::ChannelClosed(format!("terminal input: {e}"))
                })?,
            };
            let Some(line) = line else {
                debug!("terminal input closed");
                break;
            };

            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            route_inbound(&self.spool, &self.sink, self.conversant.clone(), text.to_string());
        }

        Ok(())
    }
}
