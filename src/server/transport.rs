//! Newline-delimited JSON transport.
//!
//! MCP's stdio transport frames every JSON-RPC message as a single line.
//! Logging must never go to stdout while this transport owns it.

use serde::Serialize;
use thiserror::Error;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};

/// Errors raised by the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Reads one message per line from `R`, writes one message per line to `W`.
pub struct LineTransport<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
}

/// The transport MCP clients launch us with.
pub type StdioTransport = LineTransport<Stdin, Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Next raw line, or `None` once the peer closes its end.
    pub async fn recv(&mut self) -> TransportResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    /// Serialize `message` onto a single line and flush it.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> TransportResult<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
