use std::collections::HashMap;
use std::fmt;

use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::error::Error;

pub const FILE_TYPE_HEADER: &str = "X-FileType";
pub const FILE_MTIME_HEADER: &str = "X-FileMTime";
pub const FILE_SIZE_HEADER: &str = "X-FileSize";

/// Kind of entry reported by the server in `X-FileType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    /// Any type string the client does not know about, kept verbatim.
    Other(String),
}

impl From<&str> for FileType {
    fn from(s: &str) -> Self {
        match s {
            "file" => FileType::File,
            "dir" | "directory" => FileType::Directory,
            other => FileType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::File => f.write_str("file"),
            FileType::Directory => f.write_str("dir"),
            FileType::Other(other) => f.write_str(other),
        }
    }
}

/// Metadata for a remote path, built from the `X-File*` headers of a
/// HEAD response.
#[derive(Debug, Clone, PartialEq)]
pub struct LockerStat {
    /// Path exactly as the caller passed it.
    pub path: String,
    /// Last path segment.
    pub basename: String,
    /// Modification time in seconds since the epoch.
    pub mtime: f64,
    /// Size in bytes.
    pub size: u64,
    pub file_type: FileType,
}

impl LockerStat {
    /// Build a stat result for `path` from response headers.
    ///
    /// Every `X-File*` header must be present; a missing one is an error,
    /// never a default.
    pub fn from_headers(path: &str, headers: &HeaderMap) -> Result<Self, Error> {
        let file_type = required_header(headers, FILE_TYPE_HEADER)?;
        let mtime = required_header(headers, FILE_MTIME_HEADER)?;
        let size = required_header(headers, FILE_SIZE_HEADER)?;

        Ok(Self {
            path: path.to_string(),
            basename: basename(path).to_string(),
            mtime: mtime.parse().map_err(|_| Error::InvalidHeader {
                name: FILE_MTIME_HEADER,
                value: mtime.to_string(),
            })?,
            size: size.parse().map_err(|_| Error::InvalidHeader {
                name: FILE_SIZE_HEADER,
                value: size.to_string(),
            })?,
            file_type: FileType::from(file_type),
        })
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

impl fmt::Display for LockerStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.path, self.file_type, self.size, self.mtime
        )
    }
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, Error> {
    let value = headers.get(name).ok_or(Error::MissingHeader { name })?;
    value.to_str().map_err(|_| Error::InvalidHeader {
        name,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    })
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// How `get_content` should decode a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentFormat {
    #[default]
    Text,
    Json,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Json(serde_json::Value),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Content::Json(value) => Some(value),
            Content::Text(_) => None,
        }
    }
}

/// A fully buffered HTTP response.
///
/// Returned by operations whose outcome the caller may want to inspect
/// (`put`, `post`, `rm`, the list commands, ...).
#[derive(Debug, Clone)]
pub struct LockerResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers, names lower-cased, values decoded lossily
    pub headers: HashMap<String, String>,

    /// Raw body text
    pub body_text: String,
}

impl LockerResponse {
    /// Read the whole body of `response` and keep it with its status and
    /// headers.
    pub fn from_reqwest(response: reqwest::blocking::Response) -> Result<Self, Error> {
        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let body_text = response.text()?;

        Ok(Self {
            status,
            status_text,
            headers,
            body_text,
        })
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Try to deserialize the body into a specific type
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body_text)
    }
}
