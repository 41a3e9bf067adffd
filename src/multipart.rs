// Streaming multipart/form-data encoder.
//
// The body is laid out up front as a list of segments: framing bytes that
// are held in memory and file contents that are only referenced by path.
// Because every segment length is known before the first byte is sent, the
// exact `Content-Length` is available without buffering the files. The
// reader opens one file at a time, when its part is reached, and closes it
// as soon as the part is done.

use crate::error::{PinataError, Result};
use crate::types::{FileEntry, Metadata, UploadOptions, UploadTarget};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Cursor, Read, Take};
use std::path::{Component, PathBuf};
use tracing::debug;

const BOUNDARY_LEN: usize = 30;
const FILE_FIELD: &str = "file";
const OPTIONS_FIELD: &str = "pinataOptions";
const METADATA_FIELD: &str = "pinataMetadata";
const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// An encoded request body ready to hand to the transport.
pub struct EncodedBody {
    pub reader: MultipartReader,
    pub content_length: u64,
    pub content_type: String,
    pub boundary: String,
}

impl std::fmt::Debug for EncodedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedBody")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish()
    }
}

enum Segment {
    Bytes(Vec<u8>),
    File { path: PathBuf, len: u64 },
}

impl Segment {
    fn len(&self) -> u64 {
        match self {
            Segment::Bytes(b) => b.len() as u64,
            Segment::File { len, .. } => *len,
        }
    }
}

enum Active {
    Bytes(Cursor<Vec<u8>>),
    File { inner: Take<File>, path: PathBuf },
}

/// Lazy reader over the multipart segments.
pub struct MultipartReader {
    segments: VecDeque<Segment>,
    active: Option<Active>,
}

impl MultipartReader {
    fn next_segment(&mut self) -> io::Result<bool> {
        let Some(segment) = self.segments.pop_front() else {
            return Ok(false);
        };
        self.active = Some(match segment {
            Segment::Bytes(bytes) => Active::Bytes(Cursor::new(bytes)),
            Segment::File { path, len } => {
                let file = File::open(&path).map_err(|e| {
                    io::Error::new(e.kind(), format!("reopening {}: {}", path.display(), e))
                })?;
                Active::File {
                    inner: file.take(len),
                    path,
                }
            }
        });
        Ok(true)
    }
}

impl Read for MultipartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.active.is_none() && !self.next_segment()? {
                return Ok(0);
            }
            let n = match self.active.as_mut() {
                Some(Active::Bytes(cursor)) => cursor.read(buf)?,
                Some(Active::File { inner, .. }) => inner.read(buf)?,
                None => 0,
            };
            if n > 0 {
                return Ok(n);
            }
            // Declared lengths are already on the wire; a file that shrank
            // since encoding cannot be sent.
            if let Some(Active::File { inner, path }) = &self.active {
                if inner.limit() > 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} shrank by {} bytes during upload",
                            path.display(),
                            inner.limit()
                        ),
                    ));
                }
            }
            self.active = None;
        }
    }
}

/// Generate a fresh random boundary.
pub fn random_boundary() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect()
}

/// Encode `files` plus the options and metadata fields into a multipart body.
///
/// Each file is opened here to validate access and capture its length; the
/// handle is closed again before returning.
pub fn encode(
    target: &UploadTarget,
    files: &[FileEntry],
    metadata: &Metadata,
    options: &UploadOptions,
) -> Result<EncodedBody> {
    encode_with_boundary(target, files, metadata, options, random_boundary())
}

pub fn encode_with_boundary(
    target: &UploadTarget,
    files: &[FileEntry],
    metadata: &Metadata,
    options: &UploadOptions,
    boundary: String,
) -> Result<EncodedBody> {
    let mut builder = Builder::new(&boundary);

    for entry in files {
        let file = File::open(&entry.path).map_err(|source| PinataError::FileAccess {
            path: entry.path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| PinataError::FileAccess {
                path: entry.path.clone(),
                source,
            })?
            .len();
        drop(file);

        let filename = part_filename(target, entry);
        builder.file_part(&filename, entry.path.clone(), len);
    }

    let options_json = serde_json::to_string(options).map_err(PinataError::Encoding)?;
    builder.text_field(OPTIONS_FIELD, &options_json);
    let metadata_json = serde_json::to_string(metadata).map_err(PinataError::Encoding)?;
    builder.text_field(METADATA_FIELD, &metadata_json);

    let segments = builder.finish();
    let content_length = segments.iter().map(Segment::len).sum();
    debug!(parts = files.len() + 2, content_length, "encoded multipart body");

    Ok(EncodedBody {
        reader: MultipartReader {
            segments,
            active: None,
        },
        content_length,
        content_type: format!("multipart/form-data; boundary={}", boundary),
        boundary,
    })
}

/// Filename sent for a file part: the bare base name for a single file, or
/// `<root>/<relative path>` with `/` separators for a directory upload.
pub fn part_filename(target: &UploadTarget, entry: &FileEntry) -> String {
    if target.is_single_file {
        return entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    let rel = entry.path.strip_prefix(&target.path).unwrap_or(&entry.path);
    let mut name = target.base_name();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

struct Builder<'a> {
    boundary: &'a str,
    segments: VecDeque<Segment>,
    pending: Vec<u8>,
    first: bool,
}

impl<'a> Builder<'a> {
    fn new(boundary: &'a str) -> Self {
        Builder {
            boundary,
            segments: VecDeque::new(),
            pending: Vec::new(),
            first: true,
        }
    }

    fn open_part(&mut self, headers: &str) {
        if !self.first {
            self.pending.extend_from_slice(b"\r\n");
        }
        self.first = false;
        self.pending.extend_from_slice(b"--");
        self.pending.extend_from_slice(self.boundary.as_bytes());
        self.pending.extend_from_slice(b"\r\n");
        self.pending.extend_from_slice(headers.as_bytes());
        self.pending.extend_from_slice(b"\r\n");
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let bytes = std::mem::take(&mut self.pending);
            self.segments.push_back(Segment::Bytes(bytes));
        }
    }

    fn file_part(&mut self, filename: &str, path: PathBuf, len: u64) {
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n",
            FILE_FIELD,
            escape_quoted(filename),
            FILE_CONTENT_TYPE
        );
        self.open_part(&headers);
        self.flush();
        if len > 0 {
            self.segments.push_back(Segment::File { path, len });
        }
    }

    fn text_field(&mut self, name: &str, value: &str) {
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_quoted(name)
        );
        self.open_part(&headers);
        self.pending.extend_from_slice(value.as_bytes());
    }

    fn finish(mut self) -> VecDeque<Segment> {
        if !self.first {
            self.pending.extend_from_slice(b"\r\n");
        }
        self.pending.extend_from_slice(b"--");
        self.pending.extend_from_slice(self.boundary.as_bytes());
        self.pending.extend_from_slice(b"--\r\n");
        self.flush();
        self.segments
    }
}
