//! # locker-admin
//!
//! Command-line access to a Locker server through `locker-client`.
//!
//! ## Usage
//!
//! ```bash
//! export LOCKER_HOST=locker.example.com
//! export LOCKER_KEY=...
//!
//! locker-admin stat /var/notes.txt
//! locker-admin put /var/notes.txt ./notes.txt
//! locker-admin cat /var/notes.txt
//! locker-admin list-append /var/todo.json '{"text": "milk"}' --default '[]'
//! locker-admin flags login -n 10
//! locker-admin rm -r /var/old
//! ```

pub mod commands;

pub use commands::{execute, Args, Command};
