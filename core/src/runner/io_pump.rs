use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::launcher::ProcessEvent;
use crate::error::RunnerError;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeStream {
    Stdout,
    Stderr,
}

impl PipeStream {
    fn label(self) -> &'static str {
        match self {
            PipeStream::Stdout => "stdout",
            PipeStream::Stderr => "stderr",
        }
    }

    fn event(self, chunk: Bytes) -> ProcessEvent {
        match self {
            PipeStream::Stdout => ProcessEvent::Stdout(chunk),
            PipeStream::Stderr => ProcessEvent::Stderr(chunk),
        }
    }
}

pub fn pump_stdout<R>(rd: R, tx: mpsc::Sender<ProcessEvent>) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, tx, PipeStream::Stdout)
}

pub fn pump_stderr<R>(rd: R, tx: mpsc::Sender<ProcessEvent>) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, tx, PipeStream::Stderr)
}

/// Forwards every read from `rd` as one chunk event until EOF.
///
/// Keeps reading after the receiver is gone so the child never blocks on a
/// full pipe.
fn pump<R>(
    mut rd: R,
    tx: mpsc::Sender<ProcessEvent>,
    stream: PipeStream,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        let mut receiver_alive = true;

        loop {
            let n = rd.read(&mut buf).await.map_err(|e| RunnerError::StreamIo {
                stream: stream.label(),
                source: e,
            })?;
            if n == 0 {
                break;
            }
            total += n as u64;

            if receiver_alive {
                let chunk = Bytes::copy_from_slice(&buf[..n]);
                if tx.send(stream.event(chunk)).await.is_err() {
                    tracing::debug!(stream = stream.label(), "event receiver dropped; draining");
                    receiver_alive = false;
                }
            }
        }

        Ok(total)
    })
}
