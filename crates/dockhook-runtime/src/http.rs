//! Minimal HTTP/1.1 support for the runtime socket.
//!
//! The runtime speaks plain HTTP over a Unix or TCP socket; general-purpose
//! HTTP clients cannot address Unix sockets, so the small subset the Engine
//! API needs is implemented here: request writing, response head parsing,
//! `Content-Length` bodies, and chunked transfer decoding (the framing the
//! event stream uses).

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, RuntimeError};

/// Parsed status line and the body-framing headers dockhook cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status: u16,
    pub chunked: bool,
    pub content_length: Option<usize>,
}

/// Writes a bodyless HTTP/1.1 request.
pub(crate) async fn write_request<W>(writer: &mut W, method: &str, path: &str, host: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {host}\r\nUser-Agent: dockhook\r\nAccept: application/json\r\n\r\n"
    );
    writer.write_all(request.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads the status line and headers, up to and including the blank line.
pub(crate) async fn read_head<R>(reader: &mut R) -> Result<ResponseHead>
where
    R: AsyncBufRead + Unpin,
{
    let status_line = read_line(reader).await?.ok_or_else(|| RuntimeError::Protocol {
        message: "connection closed before status line".to_owned(),
    })?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| RuntimeError::Protocol {
            message: format!("malformed status line: {status_line}"),
        })?;

    let mut chunked = false;
    let mut content_length = None;
    loop {
        let Some(line) = read_line(reader).await? else {
            return Err(RuntimeError::Protocol {
                message: "connection closed inside headers".to_owned(),
            });
        };
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.to_ascii_lowercase().contains("chunked");
        } else if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().ok();
        }
    }

    Ok(ResponseHead {
        status,
        chunked,
        content_length,
    })
}

/// Reads one complete response body according to the head's framing.
pub(crate) async fn read_body<R>(reader: &mut R, head: &ResponseHead) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    if head.chunked {
        let mut body = Vec::new();
        while let Some(chunk) = read_chunk(reader).await? {
            body.extend_from_slice(&chunk);
        }
        return Ok(body);
    }
    if let Some(length) = head.content_length {
        let mut body = vec![0_u8; length];
        reader.read_exact(&mut body).await?;
        return Ok(body);
    }
    let mut body = Vec::new();
    let _ = reader.read_to_end(&mut body).await?;
    Ok(body)
}

/// Reads one chunk of a chunked body; `None` marks the terminating chunk.
pub(crate) async fn read_chunk<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(size_line) = read_line(reader).await? else {
        // The runtime tears the stream down without a terminating chunk when
        // it shuts down; treat that the same as a clean end.
        return Ok(None);
    };
    let size_field = size_line.split(';').next().unwrap_or("").trim();
    let size = usize::from_str_radix(size_field, 16).map_err(|_| RuntimeError::Protocol {
        message: format!("malformed chunk size: {size_line}"),
    })?;

    if size == 0 {
        // Consume optional trailers up to the final blank line.
        while let Some(line) = read_line(reader).await? {
            if line.is_empty() {
                break;
            }
        }
        return Ok(None);
    }

    let mut chunk = vec![0_u8; size];
    reader.read_exact(&mut chunk).await?;
    let mut crlf = [0_u8; 2];
    reader.read_exact(&mut crlf).await?;
    Ok(Some(chunk))
}

/// Reads one CRLF-terminated line, without the terminator; `None` on EOF.
pub(crate) async fn read_line<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        let _ = line.pop();
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncWriteExt, BufReader};

    use super::*;

    async fn head_and_reader(
        response: &str,
    ) -> (ResponseHead, BufReader<tokio::io::DuplexStream>) {
        let (mut server, client) = tokio::io::duplex(64 * 1024);
        server
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        drop(server);
        let mut reader = BufReader::new(client);
        let head = read_head(&mut reader).await.expect("head should parse");
        (head, reader)
    }

    #[tokio::test]
    async fn parses_content_length_body() {
        let (head, mut reader) = head_and_reader(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 13\r\n\r\n{\"Id\":\"c1\"}\r\n",
        )
        .await;
        assert_eq!(head.status, 200);
        assert!(!head.chunked);
        assert_eq!(head.content_length, Some(13));

        let body = read_body(&mut reader, &head).await.expect("body should read");
        assert_eq!(body, b"{\"Id\":\"c1\"}\r\n");
    }

    #[tokio::test]
    async fn parses_chunked_body() {
        let (head, mut reader) = head_and_reader(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        )
        .await;
        assert!(head.chunked);

        let body = read_body(&mut reader, &head).await.expect("body should read");
        assert_eq!(body, b"hello world");
    }

    #[tokio::test]
    async fn chunked_stream_yields_individual_chunks() {
        let (head, mut reader) = head_and_reader(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nabcd\r\n2\r\nef\r\n0\r\n\r\n",
        )
        .await;
        assert!(head.chunked);

        let first = read_chunk(&mut reader).await.expect("chunk").expect("some");
        assert_eq!(first, b"abcd");
        let second = read_chunk(&mut reader).await.expect("chunk").expect("some");
        assert_eq!(second, b"ef");
        assert!(read_chunk(&mut reader).await.expect("chunk").is_none());
    }

    #[tokio::test]
    async fn truncated_stream_ends_cleanly() {
        let (head, mut reader) =
            head_and_reader("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n").await;
        assert!(head.chunked);
        assert!(read_chunk(&mut reader).await.expect("chunk").is_none());
    }

    #[tokio::test]
    async fn malformed_status_line_is_a_protocol_error() {
        let (mut server, client) = tokio::io::duplex(1024);
        server
            .write_all(b"TOTALLY NOT HTTP\r\n\r\n")
            .await
            .expect("write response");
        drop(server);
        let mut reader = BufReader::new(client);
        let err = read_head(&mut reader).await.expect_err("head should fail");
        assert!(matches!(err, RuntimeError::Protocol { .. }));
    }

    #[tokio::test]
    async fn request_line_is_well_formed() {
        let (mut client, server) = tokio::io::duplex(1024);
        write_request(&mut client, "GET", "/v1.21/events", "localhost")
            .await
            .expect("request should write");
        drop(client);

        let mut reader = BufReader::new(server);
        let line = read_line(&mut reader).await.expect("line").expect("some");
        assert_eq!(line, "GET /v1.21/events HTTP/1.1");
        let host = read_line(&mut reader).await.expect("line").expect("some");
        assert_eq!(host, "Host: localhost");
    }
}
