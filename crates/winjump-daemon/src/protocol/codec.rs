use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use winjump_core::daemon::Response;

use crate::errors::DaemonError;

/// Longest request line accepted. Anything past it is ignored.
pub const MAX_REQUEST_BYTES: u64 = 4096;

/// Read one request line. EOF before a newline yields what was read so far.
///
/// Invalid UTF-8 is replaced rather than rejected, so the line still gets
/// an in-band answer from the parser.
pub async fn read_request<R>(reader: R) -> Result<String, DaemonError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_BYTES));
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a response as one JSON line and flush.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), DaemonError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = serde_json::to_vec(response)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
