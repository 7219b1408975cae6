//! # locker-client
//!
//! Blocking HTTP client for the Locker file-storage service.
//!
//! Each [`LockerClient`] method is a single authenticated HTTP round trip
//! against a Locker server. File-like operations resolve under the server's
//! `app/` root:
//!
//! ```ignore
//! use locker_client::{LockerClient, LockerConfig, FLAGS_PATH};
//!
//! // Host and key fall back to LOCKER_HOST / LOCKER_KEY
//! let client = LockerClient::new(LockerConfig::resolve(None, None, false)?)?;
//!
//! // HEAD app/var/notes.txt
//! let st = client.stat("/var/notes.txt")?;
//!
//! // PUT, then GET, the raw content
//! client.put("/var/notes.txt", "remember the milk")?;
//! let notes = client.get_text("/var/notes.txt")?;
//!
//! // Command-tagged POSTs
//! client.mkdir("/var/archive")?;
//! client.list_append("/var/todo.json", serde_json::json!({"text": "milk"}), None)?;
//! let recent = client.get_flags(FLAGS_PATH, "login", 10)?;
//! ```
//!
//! Errors are surfaced, never retried. A non-2xx status becomes
//! [`Error::Status`]; the exceptions are [`LockerClient::rm`], which
//! returns the response as-is, and a 404 on
//! [`LockerClient::get_content`] / [`LockerClient::get_json`] when the
//! caller supplies a default.

pub mod command;
pub mod config;
pub mod error;
pub mod types;

mod client;

pub use client::{LockerClient, API_KEY_HEADER};
pub use command::{Command, EntryId, FLAGS_PATH};
pub use config::{LockerConfig, HOST_ENV, KEY_ENV};
pub use error::Error;
pub use types::{Content, ContentFormat, FileType, LockerResponse, LockerStat};
