//! Final-hop body capture.
//!
//! Bodies are streamed chunk by chunk and decoded as they arrive, so response
//! headers are reported exactly as the server sent them (`content-encoding`
//! and `content-length` included). A playlist is always read in full. Media
//! is read only until the first bytes rule out a playlist, and any other body
//! stops once it is known to be large, since both are only ever summarized.

use std::io::Write;

use log::debug;

use crate::classify::{is_large_body, manifest_marker};
use crate::error_handling::BodyError;

/// Output buffer size for the brotli decoder.
const BROTLI_BUFFER_SIZE: usize = 4096;

/// What is known about the body before reading it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CaptureHints {
    /// URL or content-type already identify a manifest
    pub manifest: bool,
    /// URL or content-type identify a media payload
    pub media: bool,
    /// Declared `content-length`
    pub declared_length: Option<u64>,
}

/// Bytes read from the final hop, after content decoding.
#[derive(Debug, Default)]
pub(crate) struct CapturedBody {
    pub bytes: Vec<u8>,
    /// Reading stopped before the end of the body
    pub partial: bool,
}

/// Incremental decoder for the response's `content-encoding`.
///
/// Unknown codings pass through undecoded.
enum BodyDecoder {
    Identity(Vec<u8>),
    Gzip(flate2::write::GzDecoder<Vec<u8>>),
    Deflate(flate2::write::ZlibDecoder<Vec<u8>>),
    Brotli(Box<brotli::DecompressorWriter<Vec<u8>>>),
}

impl BodyDecoder {
    fn for_encoding(encoding: Option<&str>) -> Self {
        let encoding = encoding.map(|value| value.trim().to_ascii_lowercase());
        match encoding.as_deref() {
            Some("gzip" | "x-gzip") => Self::Gzip(flate2::write::GzDecoder::new(Vec::new())),
            Some("deflate") => Self::Deflate(flate2::write::ZlibDecoder::new(Vec::new())),
            Some("br") => Self::Brotli(Box::new(brotli::DecompressorWriter::new(
                Vec::new(),
                BROTLI_BUFFER_SIZE,
            ))),
            _ => Self::Identity(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity",
            Self::Gzip(_) => "gzip",
            Self::Deflate(_) => "deflate",
            Self::Brotli(_) => "br",
        }
    }

    fn push(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            Self::Identity(out) => {
                out.extend_from_slice(chunk);
                Ok(())
            }
            Self::Gzip(decoder) => decoder.write_all(chunk).and_then(|_| decoder.flush()),
            Self::Deflate(decoder) => decoder.write_all(chunk).and_then(|_| decoder.flush()),
            Self::Brotli(decoder) => decoder.write_all(chunk).and_then(|_| decoder.flush()),
        }
    }

    /// Bytes decoded so far.
    fn decoded(&self) -> &[u8] {
        match self {
            Self::Identity(out) => out,
            Self::Gzip(decoder) => decoder.get_ref(),
            Self::Deflate(decoder) => decoder.get_ref(),
            Self::Brotli(decoder) => decoder.get_ref(),
        }
    }

    /// Finishes a complete stream.
    fn finish(self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Identity(out) => Ok(out),
            Self::Gzip(decoder) => decoder.finish(),
            Self::Deflate(decoder) => decoder.finish(),
            Self::Brotli(decoder) => decoder.into_inner().map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated brotli stream")
            }),
        }
    }

    /// Decoded prefix of a stream that was abandoned early.
    fn into_partial(self) -> Vec<u8> {
        match self {
            Self::Identity(out) => out,
            Self::Gzip(decoder) => decoder.get_ref().clone(),
            Self::Deflate(decoder) => decoder.get_ref().clone(),
            Self::Brotli(decoder) => decoder.get_ref().clone(),
        }
    }
}

/// Reads and decodes the response body under the capture rules.
///
/// `content_encoding` is the raw `content-encoding` response header.
///
/// # Errors
///
/// Returns `BodyError::Transport` when a chunk cannot be read and
/// `BodyError::Decode` when the body does not match its declared coding.
pub(crate) async fn capture_body(
    response: &mut reqwest::Response,
    content_encoding: Option<&str>,
    hints: CaptureHints,
) -> Result<CapturedBody, BodyError> {
    let mut decoder = BodyDecoder::for_encoding(content_encoding);
    let encoding = decoder.name();
    let decode_error = |source| BodyError::Decode { encoding, source };

    while let Some(chunk) = response.chunk().await? {
        decoder.push(&chunk).map_err(decode_error)?;

        if should_stop(decoder.decoded(), hints) {
            debug!(
                "Stopped reading body after {} decoded bytes (media: {}, declared: {:?})",
                decoder.decoded().len(),
                hints.media,
                hints.declared_length
            );
            return Ok(CapturedBody {
                bytes: decoder.into_partial(),
                partial: true,
            });
        }
    }

    Ok(CapturedBody {
        bytes: decoder.finish().map_err(decode_error)?,
        partial: false,
    })
}

fn should_stop(bytes: &[u8], hints: CaptureHints) -> bool {
    if hints.manifest {
        return false;
    }
    let marker = manifest_marker(bytes);
    // Media that does not open with the playlist marker is only summarized
    if hints.media && marker == Some(false) {
        return true;
    }
    let large = is_large_body(hints.declared_length, bytes.len());
    // An undecided prefix (e.g. all whitespace) can only still be a manifest
    // while it is small.
    let not_manifest = match marker {
        Some(is_manifest) => !is_manifest,
        None => is_large_body(None, bytes.len()),
    };
    large && not_manifest
}
