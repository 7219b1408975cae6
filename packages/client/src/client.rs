use std::fmt;
use std::io::Write;

use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::HeaderValue;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::command::Command;
use crate::config::LockerConfig;
use crate::error::Error;
use crate::types::{Content, ContentFormat, LockerResponse, LockerStat};

pub const API_KEY_HEADER: &str = "X-API-KEY";

const APP_ROOT: &str = "app/";
const PUBCONF_PATH: &str = "pubconf";
const ROOMSPACE_SECRET_PATH: &str = "set_roomspace_secret";

/// Blocking client for a Locker server.
///
/// Every operation is one HTTP round trip:
/// - `stat(path)` performs a HEAD request and reads the `X-File*` headers
/// - `get(path)` / `get_content(path, ..)` perform a GET request
/// - `put(path, data)` performs a PUT request with a raw body
/// - `post(path, data)` and the command operations perform a POST request
///   with a JSON body
/// - `rm(path, recursive)` performs a DELETE request
///
/// Paths are resolved under the server's `app/` root; a single leading
/// `/` is ignored. Any non-2xx status becomes [`Error::Status`], except for
/// `rm`, which hands the response back for the caller to inspect.
///
/// # Example
///
/// ```ignore
/// use locker_client::{LockerClient, LockerConfig};
///
/// let client = LockerClient::new(LockerConfig::new("locker.example.com")?.with_key("secret"))?;
///
/// let st = client.stat("/var/notes.txt")?;
/// println!("{st}");
///
/// client.put("/var/notes.txt", "hello")?;
/// let text = client.get_text("/var/notes.txt")?;
/// ```
pub struct LockerClient {
    client: Client,
    config: LockerConfig,
    base_url: Url,
    app_url: Url,
}

impl LockerClient {
    /// Create a client for the given configuration.
    pub fn new(config: LockerConfig) -> Result<Self, Error> {
        let mut builder = Client::builder().user_agent(concat!(
            "locker-client/",
            env!("CARGO_PKG_VERSION")
        ));

        if config.is_insecure() {
            tracing::warn!(
                host = config.host(),
                "TLS certificate verification is disabled for this Locker client"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Self::with_client(builder.build()?, config)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(client: Client, config: LockerConfig) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        let app_url = base_url.join(APP_ROOT)?;

        Ok(Self {
            client,
            config,
            base_url,
            app_url,
        })
    }

    /// Create a client configured from `LOCKER_HOST` / `LOCKER_KEY`.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(LockerConfig::from_env()?)
    }

    pub fn config(&self) -> &LockerConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn app_url(&self) -> &Url {
        &self.app_url
    }

    /// Resolve a Locker path to its URL under the application root.
    pub fn path_url(&self, path: &str) -> Result<Url, Error> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        Ok(self.app_url.join(relative)?)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        authenticated: bool,
    ) -> Result<RequestBuilder, Error> {
        tracing::debug!(%method, %url, "locker request");

        let mut builder = self.client.request(method, url);
        if authenticated {
            if let Some(key) = self.config.key() {
                let mut value = HeaderValue::from_str(key)?;
                value.set_sensitive(true);
                builder = builder.header(API_KEY_HEADER, value);
            }
        }
        Ok(builder)
    }

    fn send_command(&self, path: &str, command: &Command) -> Result<Response, Error> {
        tracing::debug!(cmd = command.name(), path, "locker command");

        let url = self.path_url(path)?;
        let response = self.request(Method::POST, url, true)?.json(command).send()?;
        check_status(response)
    }

    /// Fetch metadata for `path` with a HEAD request.
    pub fn stat(&self, path: &str) -> Result<LockerStat, Error> {
        let url = self.path_url(path)?;
        let response = check_status(self.request(Method::HEAD, url, true)?.send()?)?;
        LockerStat::from_headers(path, response.headers())
    }

    /// GET `path` and hand back the live response.
    ///
    /// The body has not been read yet, so it can be consumed incrementally
    /// (the response implements [`std::io::Read`]). The connection is
    /// released when the response is dropped.
    pub fn get(&self, path: &str) -> Result<Response, Error> {
        let url = self.path_url(path)?;
        check_status(self.request(Method::GET, url, true)?.send()?)
    }

    /// Stream the content of `path` into `writer`, returning the number of
    /// bytes copied.
    pub fn download<W: Write + ?Sized>(&self, path: &str, writer: &mut W) -> Result<u64, Error> {
        let mut response = self.get(path)?;
        Ok(response.copy_to(writer)?)
    }

    /// GET `path`, or hand back `default` if the server answers 404 and
    /// one was given. Any other non-2xx status is an error.
    fn get_or_default<T>(&self, path: &str, default: Option<T>) -> Result<Fetched<T>, Error> {
        let url = self.path_url(path)?;
        let response = self.request(Method::GET, url, true)?.send()?;

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(default) = default {
                tracing::debug!(path, "not found, using default content");
                return Ok(Fetched::Default(default));
            }
        }

        Ok(Fetched::Found(check_status(response)?))
    }

    /// GET `path` and decode the body.
    ///
    /// If the server answers 404 and `default` is given, `default` is
    /// returned instead of an error. Any other non-2xx status is an error
    /// whether or not a default was given.
    pub fn get_content(
        &self,
        path: &str,
        format: ContentFormat,
        default: Option<Content>,
    ) -> Result<Content, Error> {
        let response = match self.get_or_default(path, default)? {
            Fetched::Found(response) => response,
            Fetched::Default(default) => return Ok(default),
        };

        match format {
            ContentFormat::Text => Ok(Content::Text(response.text()?)),
            ContentFormat::Json => Ok(Content::Json(response.json()?)),
        }
    }

    /// GET `path` as text.
    pub fn get_text(&self, path: &str) -> Result<String, Error> {
        Ok(self.get(path)?.text()?)
    }

    /// GET `path` and deserialize its JSON body, falling back to `default`
    /// on 404 when one is given.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        default: Option<T>,
    ) -> Result<T, Error> {
        match self.get_or_default(path, default)? {
            Fetched::Found(response) => Ok(response.json()?),
            Fetched::Default(default) => Ok(default),
        }
    }

    /// PUT `data` as the raw content of `path`.
    pub fn put(&self, path: &str, data: impl Into<Body>) -> Result<LockerResponse, Error> {
        let url = self.path_url(path)?;
        let response = self.request(Method::PUT, url, true)?.body(data).send()?;
        LockerResponse::from_reqwest(check_status(response)?)
    }

    /// POST `data` as JSON to `path`.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
    ) -> Result<LockerResponse, Error> {
        let url = self.path_url(path)?;
        let response = self.request(Method::POST, url, true)?.json(data).send()?;
        LockerResponse::from_reqwest(check_status(response)?)
    }

    pub fn mkdir(&self, path: &str) -> Result<LockerResponse, Error> {
        LockerResponse::from_reqwest(self.send_command(path, &Command::Mkdir)?)
    }

    /// DELETE `path`; with `recursive`, a directory and everything below it.
    ///
    /// Unlike every other operation this does not fail on a non-2xx status:
    /// the buffered response is returned and the caller must check it.
    /// Transport failures are still errors.
    pub fn rm(&self, path: &str, recursive: bool) -> Result<LockerResponse, Error> {
        let url = self.path_url(path)?;
        let mut builder = self.request(Method::DELETE, url, true)?;
        if recursive {
            builder = builder.header("recursive", "1").header("rmdir", "1");
        }

        let response = LockerResponse::from_reqwest(builder.send()?)?;
        if !response.is_success() {
            tracing::debug!(path, status = response.status, "rm failed");
        }
        Ok(response)
    }

    /// Fetch the server's public configuration. Sent without the API key.
    pub fn pubconf(&self) -> Result<Value, Error> {
        let url = self.base_url.join(PUBCONF_PATH)?;
        let response = check_status(self.request(Method::GET, url, false)?.send()?)?;
        Ok(response.json()?)
    }

    pub fn set_roomspace_secret(&self, secret: &str) -> Result<(), Error> {
        #[derive(Serialize)]
        struct SecretBody<'a> {
            secret: &'a str,
        }

        let url = self.base_url.join(ROOMSPACE_SECRET_PATH)?;
        let response = self
            .request(Method::POST, url, true)?
            .json(&SecretBody { secret })
            .send()?;
        check_status(response)?;
        Ok(())
    }

    /// Fetch the `n` most recent occurrences of `flag` from the flag store
    /// at `path` (usually [`crate::FLAGS_PATH`]).
    pub fn get_flags(&self, path: &str, flag: &str, n: usize) -> Result<Value, Error> {
        let command = Command::GetFlags {
            flag: flag.to_string(),
            n,
        };
        Ok(self.send_command(path, &command)?.json()?)
    }

    /// Remove the occurrences of `flag` listed in `droplist`.
    pub fn drop_flags(&self, path: &str, flag: &str, droplist: Vec<Value>) -> Result<Value, Error> {
        let command = Command::DropFlags {
            flag: flag.to_string(),
            droplist,
        };
        Ok(self.send_command(path, &command)?.json()?)
    }

    /// Append `entry` to the list stored at `path`, creating it from
    /// `default` if it does not exist.
    pub fn list_append(
        &self,
        path: &str,
        entry: Value,
        default: Option<Value>,
    ) -> Result<LockerResponse, Error> {
        let command = Command::ListAppend { e: entry, default };
        LockerResponse::from_reqwest(self.send_command(path, &command)?)
    }

    /// Remove the entry with the given `_id` from the list stored at `path`.
    pub fn list_delete(&self, path: &str, id: &str) -> Result<LockerResponse, Error> {
        LockerResponse::from_reqwest(self.send_command(path, &Command::list_delete(id))?)
    }
}

impl fmt::Display for LockerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Locker host:{} key:{}",
            self.config.host(),
            self.config.key().is_some()
        )
    }
}

enum Fetched<T> {
    Found(Response),
    Default(T),
}

/// Body text for an error report. A body that cannot be read is recorded
/// as such rather than passed off as empty.
fn error_body<E: fmt::Display>(read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "could not read error response body");
            format!("<unreadable body: {}>", e)
        }
    }
}

/// Turn a non-2xx response into [`Error::Status`], reading its body.
fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = error_body(response.text());
    tracing::debug!(status = status.as_u16(), %url, "locker request failed");

    Err(Error::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        url,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(host: &str) -> LockerClient {
        LockerClient::new(LockerConfig::new(host).unwrap()).unwrap()
    }

    #[test]
    fn test_app_url() {
        let client = client("locker.example.com");
        assert_eq!(client.base_url().as_str(), "https://locker.example.com/");
        assert_eq!(client.app_url().as_str(), "https://locker.example.com/app/");
    }

    #[test]
    fn test_plain_http_is_not_upgraded() {
        let client = client("http://localhost:8080");
        assert_eq!(client.app_url().as_str(), "http://localhost:8080/app/");
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        let client = client("locker.example.com");
        let with_slash = client.path_url("/foo/bar").unwrap();
        let without = client.path_url("foo/bar").unwrap();

        assert_eq!(with_slash, without);
        assert_eq!(with_slash.as_str(), "https://locker.example.com/app/foo/bar");
    }

    #[test]
    fn test_only_one_leading_slash_is_stripped() {
        let client = client("locker.example.com");
        // the second slash makes the path absolute, outside app/
        let url = client.path_url("//foo").unwrap();
        assert_eq!(url.as_str(), "https://locker.example.com/foo");
    }

    #[test]
    fn test_empty_path_is_app_root() {
        let client = client("locker.example.com");
        assert_eq!(
            client.path_url("").unwrap().as_str(),
            "https://locker.example.com/app/"
        );
        assert_eq!(
            client.path_url("/").unwrap().as_str(),
            "https://locker.example.com/app/"
        );
    }

    #[test]
    fn test_display_hides_key() {
        let keyed = LockerClient::new(
            LockerConfig::new("locker.example.com")
                .unwrap()
                .with_key("top-secret"),
        )
        .unwrap();

        assert_eq!(keyed.to_string(), "Locker host:locker.example.com key:true");
        assert_eq!(
            client("locker.example.com").to_string(),
            "Locker host:locker.example.com key:false"
        );
    }

    #[test]
    fn test_insecure_client_builds() {
        let config = LockerConfig::new("locker.example.com")
            .unwrap()
            .insecure(true);
        assert!(LockerClient::new(config).is_ok());
    }

    #[test]
    fn test_error_body_records_read_failure() {
        assert_eq!(error_body::<std::io::Error>(Ok("boom".to_string())), "boom");

        let failed = error_body::<std::io::Error>(Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed",
        )));
        assert_eq!(failed, "<unreadable body: connection closed>");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = LockerConfig::new("exa mple.com").unwrap();
        assert!(matches!(LockerClient::new(config), Err(Error::UrlParse(_))));
    }
}
