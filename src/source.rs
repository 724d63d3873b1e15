//! Byte sources keys can be loaded from. Every adapter reads its source to the end
//! before anything is decoded.

use crate::errors::KeyError;
use reqwest::Url;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

pub enum KeySource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Url(String),
    Reader(Box<dyn Read + Send>),
}

impl KeySource {
    /// Short label used in log lines; never includes key material.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            KeySource::Bytes(b) => format!("bytes({} B)", b.len()),
            KeySource::Path(p) => format!("path({})", p.display()),
            KeySource::Url(u) => format!("url({u})"),
            KeySource::Reader(_) => "reader".to_string(),
        }
    }

    /// Drain the source into memory.
    ///
    /// # Errors
    /// Returns `Io` if the source cannot be read completely.
    pub fn read_all(self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        match self {
            KeySource::Bytes(b) => Ok(Zeroizing::new(b)),
            KeySource::Path(p) => read_path(&p),
            KeySource::Url(u) => read_url(&u),
            KeySource::Reader(r) => read_stream(r),
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Vec<u8>> for KeySource {
    fn from(b: Vec<u8>) -> Self {
        KeySource::Bytes(b)
    }
}

impl From<&[u8]> for KeySource {
    fn from(b: &[u8]) -> Self {
        KeySource::Bytes(b.to_vec())
    }
}

impl From<PathBuf> for KeySource {
    fn from(p: PathBuf) -> Self {
        KeySource::Path(p)
    }
}

impl From<&Path> for KeySource {
    fn from(p: &Path) -> Self {
        KeySource::Path(p.to_path_buf())
    }
}

/// Read a whole file.
///
/// # Errors
/// Returns `Io` naming the path if the file cannot be read.
pub fn read_path(path: &Path) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| KeyError::Io(format!("{}: {e}", path.display())))
}

/// Read a stream until EOF.
///
/// # Errors
/// Returns `Io` if the stream fails before EOF.
pub fn read_stream<R: Read>(mut reader: R) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let mut buf = Zeroizing::new(Vec::new());
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Fetch a URL. `file://` reads the local file, `http(s)://` performs a blocking GET.
///
/// # Errors
/// Returns `Io` for unparsable URLs, unsupported schemes, transport failures and non-2xx responses.
pub fn read_url(url: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let parsed = Url::parse(url).map_err(|e| KeyError::Io(format!("invalid URL '{url}': {e}")))?;
    match parsed.scheme() {
        "file" => {
            let path = parsed
                .to_file_path()
                .map_err(|()| KeyError::Io(format!("URL '{url}' is not a local file path")))?;
            read_path(&path)
        }
        "http" | "https" => {
            let mut resp = reqwest::blocking::get(parsed)
                .and_then(|r| r.error_for_status())
                .map_err(|e| KeyError::Io(format!("fetch {url}: {e}")))?;
            // Stream straight into the wiped buffer; never materialize a `Bytes` body.
            let mut body = Zeroizing::new(Vec::new());
            resp.read_to_end(&mut body).map_err(|e| KeyError::Io(format!("fetch {url}: {e}")))?;
            Ok(body)
        }
        other => Err(KeyError::Io(format!("unsupported URL scheme '{other}'"))),
    }
}
