//! Command-line parsing and execution.
//!
//! Commands:
//! - `info` - Show which server is configured
//! - `stat <path>` - Show type, size and mtime of a path
//! - `cat <path>` - Print the content of a path
//! - `get <path> <file>` - Download a path to a local file
//! - `put <path> <file>` - Upload a local file
//! - `mkdir <path>` - Create a directory
//! - `rm [-r] <path>` - Remove a file (or a directory with `-r`)
//! - `pubconf` - Print the server's public configuration
//! - `set-secret <secret>` - Set the roomspace secret
//! - `flags <flag> [-n N]` / `drop-flags <flag> <id>...` - Flag store
//! - `list-append <path> <json>` / `list-delete <path> <id>` - Stored lists

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use locker_client::{Error, LockerClient, LockerConfig, FLAGS_PATH};

/// locker-admin - manage files on a Locker server
#[derive(Parser, Debug)]
#[command(name = "locker-admin")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Locker host, with or without scheme (default: $LOCKER_HOST)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API key (default: $LOCKER_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Do not verify the server's TLS certificate
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn config(&self) -> Result<LockerConfig, Error> {
        LockerConfig::resolve(self.host.clone(), self.key.clone(), self.insecure)
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show the configured server
    Info,

    /// Show metadata of a remote path
    Stat { path: String },

    /// Print the content of a remote path
    Cat { path: String },

    /// Download a remote path to a local file
    Get { path: String, file: PathBuf },

    /// Upload a local file to a remote path
    Put { path: String, file: PathBuf },

    /// Create a remote directory
    Mkdir { path: String },

    /// Remove a remote path
    Rm {
        path: String,

        /// Remove a directory and its content
        #[arg(short, long)]
        recursive: bool,
    },

    /// Print the public server configuration
    Pubconf,

    /// Set the roomspace secret
    SetSecret { secret: String },

    /// Show the most recent occurrences of a flag
    Flags {
        flag: String,

        #[arg(short, default_value_t = 10)]
        n: usize,

        #[arg(long, default_value = FLAGS_PATH)]
        path: String,
    },

    /// Drop occurrences of a flag by id
    DropFlags {
        flag: String,

        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, default_value = FLAGS_PATH)]
        path: String,
    },

    /// Append a JSON entry to a stored list
    ListAppend {
        path: String,
        entry: String,

        /// JSON used as the list when it does not exist yet
        #[arg(long)]
        default: Option<String>,
    },

    /// Delete an entry from a stored list by its _id
    ListDelete { path: String, id: String },
}

/// Parse a command-line argument as JSON, falling back to a plain string.
fn parse_json_arg(arg: &str) -> JsonValue {
    serde_json::from_str(arg).unwrap_or_else(|_| JsonValue::String(arg.to_string()))
}

fn print_json(out: &mut dyn Write, value: &JsonValue) -> Result<(), Error> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Run one command against `client`, writing its output to `out`.
pub fn execute(command: &Command, client: &LockerClient, out: &mut dyn Write) -> Result<(), Error> {
    match command {
        Command::Info => {
            writeln!(out, "{}", client)?;
        }
        Command::Stat { path } => {
            writeln!(out, "{}", client.stat(path)?)?;
        }
        Command::Cat { path } => {
            client.download(path, out)?;
        }
        Command::Get { path, file } => {
            let mut file = File::create(file)?;
            let copied = client.download(path, &mut file)?;
            tracing::info!(path = path.as_str(), bytes = copied, "downloaded");
        }
        Command::Put { path, file } => {
            let file = File::open(file)?;
            client.put(path, file)?;
        }
        Command::Mkdir { path } => {
            client.mkdir(path)?;
        }
        Command::Rm { path, recursive } => {
            let response = client.rm(path, *recursive)?;
            if !response.is_success() {
                return Err(Error::Status {
                    status: response.status,
                    reason: response.status_text,
                    url: client.path_url(path)?.to_string(),
                    body: response.body_text,
                });
            }
        }
        Command::Pubconf => {
            print_json(out, &client.pubconf()?)?;
        }
        Command::SetSecret { secret } => {
            client.set_roomspace_secret(secret)?;
        }
        Command::Flags { flag, n, path } => {
            print_json(out, &client.get_flags(path, flag, *n)?)?;
        }
        Command::DropFlags { flag, ids, path } => {
            let droplist = ids.iter().map(|id| parse_json_arg(id)).collect();
            print_json(out, &client.drop_flags(path, flag, droplist)?)?;
        }
        Command::ListAppend {
            path,
            entry,
            default,
        } => {
            let entry: JsonValue = serde_json::from_str(entry)?;
            let default = default
                .as_deref()
                .map(|d| serde_json::from_str::<JsonValue>(d))
                .transpose()?;
            let response = client.list_append(path, entry, default)?;
            if !response.body_text.is_empty() {
                writeln!(out, "{}", response.body_text)?;
            }
        }
        Command::ListDelete { path, id } => {
            client.list_delete(path, id)?;
        }
    }

    Ok(())
}
