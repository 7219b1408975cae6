//! Command bodies understood by the Locker server.
//!
//! Some operations are POSTed to a path with a JSON body whose `cmd` field
//! selects what the server does with the resource there. Each command is a
//! variant of [`Command`] so a body can only be built with the fields its
//! command expects.

use serde::Serialize;
use serde_json::Value;

/// Default location of the flag store.
pub const FLAGS_PATH: &str = "/var/flags.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Create a directory at the target path.
    Mkdir,

    /// Append `e` to the list stored at the target path. `default` is the
    /// initial content the server uses when the list does not exist yet.
    ListAppend { e: Value, default: Option<Value> },

    /// Remove the list entry whose `_id` matches.
    ListDelete { e: EntryId },

    /// Fetch the `n` most recent occurrences of `flag`.
    GetFlags { flag: String, n: usize },

    /// Remove the listed occurrences of `flag`.
    DropFlags { flag: String, droplist: Vec<Value> },
}

/// Selects a list entry by its `_id` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryId {
    #[serde(rename = "_id")]
    pub id: String,
}

impl Command {
    pub fn list_delete(id: impl Into<String>) -> Self {
        Command::ListDelete {
            e: EntryId { id: id.into() },
        }
    }

    /// The `cmd` tag this command is sent with.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mkdir => "mkdir",
            Command::ListAppend { .. } => "list_append",
            Command::ListDelete { .. } => "list_delete",
            Command::GetFlags { .. } => "get_flags",
            Command::DropFlags { .. } => "drop_flags",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(command: &Command) -> Value {
        serde_json::to_value(command).unwrap()
    }

    #[test]
    fn mkdir_body() {
        assert_eq!(body(&Command::Mkdir), json!({"cmd": "mkdir"}));
    }

    #[test]
    fn list_delete_body() {
        assert_eq!(
            body(&Command::list_delete("abc123")),
            json!({"cmd": "list_delete", "e": {"_id": "abc123"}})
        );
    }

    #[test]
    fn list_append_sends_null_default() {
        let command = Command::ListAppend {
            e: json!({"text": "hello"}),
            default: None,
        };
        assert_eq!(
            body(&command),
            json!({"cmd": "list_append", "e": {"text": "hello"}, "default": null})
        );
    }

    #[test]
    fn flag_commands() {
        let get = Command::GetFlags {
            flag: "login".to_string(),
            n: 5,
        };
        assert_eq!(
            body(&get),
            json!({"cmd": "get_flags", "flag": "login", "n": 5})
        );

        let drop = Command::DropFlags {
            flag: "login".to_string(),
            droplist: vec![json!("a1"), json!("b2")],
        };
        assert_eq!(
            body(&drop),
            json!({"cmd": "drop_flags", "flag": "login", "droplist": ["a1", "b2"]})
        );
    }

    #[test]
    fn name_matches_tag() {
        let commands = [
            Command::Mkdir,
            Command::list_delete("x"),
            Command::ListAppend {
                e: Value::Null,
                default: Some(json!([])),
            },
            Command::GetFlags {
                flag: "f".to_string(),
                n: 1,
            },
            Command::DropFlags {
                flag: "f".to_string(),
                droplist: vec![],
            },
        ];

        for command in &commands {
            assert_eq!(body(command)["cmd"], command.name());
        }
    }
}
