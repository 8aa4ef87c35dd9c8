//! Content-type detection for uploaded files
//!
//! Sniffs the first 512 bytes against a table of well-known signatures
//! (the same families browsers sniff). Plain-text results are refined by the
//! file extension so stylesheets, scripts and SVG keep their real type.
//! Detection never fails: anything unrecognised is `application/octet-stream`.

use mime::Mime;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Number of leading bytes inspected
pub const SNIFF_LEN: usize = 512;

const FALLBACK: &str = "application/octet-stream";

enum Signature {
    /// Case-insensitive tag, matched after leading whitespace and followed by
    /// a space or `>`
    Html(&'static [u8]),
    /// Exact prefix
    Exact(&'static [u8]),
    /// Prefix compared through a mask
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
    },
}

const SIGNATURES: &[(Signature, &str)] = &[
    (Signature::Html(b"<!DOCTYPE HTML"), "text/html; charset=utf-8"),
    (Signature::Html(b"<HTML"), "text/html; charset=utf-8"),
    (Signature::Html(b"<HEAD"), "text/html; charset=utf-8"),
    (Signature::Html(b"<SCRIPT"), "text/html; charset=utf-8"),
    (Signature::Html(b"<IFRAME"), "text/html; charset=utf-8"),
    (Signature::Html(b"<H1"), "text/html; charset=utf-8"),
    (Signature::Html(b"<DIV"), "text/html; charset=utf-8"),
    (Signature::Html(b"<FONT"), "text/html; charset=utf-8"),
    (Signature::Html(b"<TABLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<A"), "text/html; charset=utf-8"),
    (Signature::Html(b"<STYLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<TITLE"), "text/html; charset=utf-8"),
    (Signature::Html(b"<B"), "text/html; charset=utf-8"),
    (Signature::Html(b"<BODY"), "text/html; charset=utf-8"),
    (Signature::Html(b"<BR"), "text/html; charset=utf-8"),
    (Signature::Html(b"<P"), "text/html; charset=utf-8"),
    (Signature::Html(b"<!--"), "text/html; charset=utf-8"),
    (Signature::Html(b"<?xml"), "text/xml; charset=utf-8"),
    (Signature::Exact(b"%PDF-"), "application/pdf"),
    (Signature::Exact(b"%!PS-Adobe-"), "application/postscript"),
    (Signature::Exact(b"\xFE\xFF"), "text/plain; charset=utf-16be"),
    (Signature::Exact(b"\xFF\xFE"), "text/plain; charset=utf-16le"),
    (Signature::Exact(b"\xEF\xBB\xBF"), "text/plain; charset=utf-8"),
    (Signature::Exact(b"\x00\x00\x01\x00"), "image/x-icon"),
    (Signature::Exact(b"\x00\x00\x02\x00"), "image/x-icon"),
    (Signature::Exact(b"BM"), "image/bmp"),
    (Signature::Exact(b"GIF87a"), "image/gif"),
    (Signature::Exact(b"GIF89a"), "image/gif"),
    (
        Signature::Masked {
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
            pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        },
        "image/webp",
    ),
    (Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A"), "image/png"),
    (Signature::Exact(b"\xFF\xD8\xFF"), "image/jpeg"),
    (Signature::Exact(b"wOFF"), "font/woff"),
    (Signature::Exact(b"wOF2"), "font/woff2"),
    (Signature::Exact(b"OTTO"), "font/otf"),
    (Signature::Exact(b"\x00\x01\x00\x00"), "font/ttf"),
    (Signature::Exact(b"ID3"), "audio/mpeg"),
    (Signature::Exact(b"OggS\x00"), "application/ogg"),
    (Signature::Exact(b"\x1A\x45\xDF\xA3"), "video/webm"),
    (
        Signature::Masked {
            mask: b"\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            pattern: b"\x00\x00\x00\x00ftyp",
        },
        "video/mp4",
    ),
    (Signature::Exact(b"\x1F\x8B\x08"), "application/x-gzip"),
    (Signature::Exact(b"PK\x03\x04"), "application/zip"),
    (Signature::Exact(b"Rar!\x1A\x07"), "application/x-rar-compressed"),
    (Signature::Exact(b"\x00asm"), "application/wasm"),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        match self {
            Signature::Html(tag) => {
                let data = trim_leading_ws(data);
                if data.len() < tag.len() + 1 {
                    return false;
                }
                let head_matches = data
                    .iter()
                    .zip(tag.iter())
                    .all(|(d, t)| d.eq_ignore_ascii_case(t));
                head_matches && matches!(data[tag.len()], b' ' | b'>')
            }
            Signature::Exact(prefix) => data.starts_with(prefix),
            Signature::Masked { mask, pattern } => {
                data.len() >= pattern.len()
                    && data
                        .iter()
                        .zip(mask.iter().zip(pattern.iter()))
                        .all(|(d, (m, p))| d & m == *p)
            }
        }
    }
}

fn trim_leading_ws(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn parse(content_type: &str) -> Mime {
    content_type
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Detect a content type from leading bytes
///
/// Only the first [`SNIFF_LEN`] bytes are considered. Empty input is
/// `application/octet-stream`.
pub fn sniff(data: &[u8]) -> Mime {
    let data = &data[..data.len().min(SNIFF_LEN)];
    if data.is_empty() {
        return parse(FALLBACK);
    }

    if let Some((_, content_type)) = SIGNATURES.iter().find(|(sig, _)| sig.matches(data)) {
        return parse(content_type);
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        parse(FALLBACK)
    } else {
        mime::TEXT_PLAIN_UTF_8
    }
}

/// Refine a textual sniff result with the file extension
///
/// Browsers refuse stylesheets and scripts served as `text/plain`, and SVG
/// sniffs as XML, so a text result defers to the extension when it names a
/// more specific text-like type.
pub fn refine(sniffed: Mime, path: &Path) -> Mime {
    let textual = sniffed.type_() == mime::TEXT
        && (sniffed.subtype() == mime::PLAIN || sniffed.subtype() == mime::XML);
    if !textual {
        return sniffed;
    }

    let Some(guess) = mime_guess::from_path(path).first() else {
        return sniffed;
    };

    let text_like = guess.type_() == mime::TEXT
        || guess.subtype() == mime::JAVASCRIPT
        || guess.subtype() == mime::JSON
        || guess.suffix() == Some(mime::XML)
        || guess.subtype() == mime::XML;
    if !text_like || guess.essence_str() == sniffed.essence_str() {
        return sniffed;
    }

    let utf8 = sniffed.get_param(mime::CHARSET) == Some(mime::UTF_8);
    if utf8 && guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
        parse(&format!("{}; charset=utf-8", guess.essence_str()))
    } else {
        guess
    }
}

/// Detect the content type of a file on disk
pub async fn detect_file(path: &Path) -> std::io::Result<Mime> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut head = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = file.read(&mut head[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    head.truncate(filled);

    Ok(refine(sniff(&head), path))
}
