use crate::error::ServerResult;
use crate::http::{Body, Response};
use log::warn;
use std::io::Write;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Serialize the status line, content headers and the blank line ending the head.
///
/// `Content-Type` precedes `Content-Length`; a response without a body gets
/// neither.
pub fn serialize_head(response: &Response, writer: &mut Vec<u8>) -> ServerResult<()> {
    write!(
        writer,
        "HTTP/1.1 {} {}\r\n",
        response.status.code(),
        response.status.as_str()
    )?;

    if let Some(len) = response.content_length() {
        if let Some(content_type) = response.content_type {
            write!(writer, "Content-Type: {}\r\n", content_type)?;
        }
        write!(writer, "Content-Length: {}\r\n", len)?;
    }

    write!(writer, "\r\n")?;
    Ok(())
}

/// Write `response` to `stream`, streaming file bodies straight from disk.
///
/// Consumes the response so any file handle it owns is closed on return.
/// Returns the number of body bytes written.
pub async fn write_response<W>(stream: &mut W, response: Response) -> ServerResult<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut head = Vec::with_capacity(128);
    serialize_head(&response, &mut head)?;
    stream.write_all(&head).await?;

    let written = match response.body {
        Body::Empty => 0,
        Body::Bytes(bytes) => {
            stream.write_all(&bytes).await?;
            bytes.len() as u64
        }
        Body::File { file, len } => {
            let copied = tokio::io::copy(&mut file.take(len), stream).await?;
            if copied < len {
                warn!("File shrank while streaming: sent {} of {} bytes", copied, len);
            }
            copied
        }
    };

    stream.flush().await?;
    Ok(written)
}
