//! Stream transport: newline-delimited JSON-RPC.
//!
//! Messages are read line by line and handled concurrently; responses are
//! funneled through a single writer task so lines never interleave. Logging
//! goes to stderr (stdout is reserved for protocol messages).

use crate::transport::protocol::{error_response, McpRouter, PARSE_ERROR};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Bounded queue of encoded responses awaiting the writer.
const RESPONSE_QUEUE: usize = 64;

/// JSON-RPC over a byte stream (stdin/stdout in production).
#[derive(Debug)]
pub struct StdioTransport {
    router: Arc<McpRouter>,
    cancel: CancellationToken,
}

impl StdioTransport {
    pub fn new(router: McpRouter) -> Self {
        Self {
            router: Arc::new(router),
            cancel: CancellationToken::new(),
        }
    }

    /// Serve stdin/stdout until EOF or shutdown.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve an arbitrary stream pair until EOF or shutdown.
    ///
    /// In-flight calls are allowed to finish and write their responses
    /// before this returns.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<String>(RESPONSE_QUEUE);
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        tracing::info!("stdio transport started");
        let read_result = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("stdio transport shutting down");
                    break Ok(());
                }
                read = reader.read_until(b'\n', &mut buf) => match read {
                    Ok(0) => break Ok(()), // clean EOF
                    Ok(_) => self.dispatch_line(std::mem::take(&mut buf), &tx),
                    Err(e) => break Err(e),
                },
            }
        };

        // Writer exits once every in-flight call has released its sender.
        drop(tx);
        let write_result = writer_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        read_result?;
        write_result?;
        tracing::info!("stdio transport stopped");
        Ok(())
    }

    /// Decode one raw line and hand it to the router on its own task.
    ///
    /// A line that is not UTF-8 gets a parse error; the stream keeps going.
    fn dispatch_line(&self, bytes: Vec<u8>, tx: &mpsc::Sender<String>) {
        let tx = tx.clone();
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "discarding line that is not valid UTF-8");
                let response = error_response(
                    Value::Null,
                    PARSE_ERROR,
                    &format!("Parse error: {}", e.utf8_error()),
                );
                tokio::spawn(async move {
                    if tx.send(response.to_string()).await.is_err() {
                        tracing::warn!("response dropped: writer closed");
                    }
                });
                return;
            }
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            return;
        }

        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            if let Some(response) = router.handle_line(&line).await {
                if tx.send(response.to_string()).await.is_err() {
                    tracing::warn!("response dropped: writer closed");
                }
            }
        });
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
