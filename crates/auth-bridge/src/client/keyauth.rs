//! Blocking KeyAuth API client.
//!
//! Mirrors the behaviour of the vendor SDK: a session is opened with `init`,
//! then `login` binds the user to this machine's HWID and `fetchOnline` lists
//! the users currently online. Any rejection is printed to the console
//! followed by termination. Transport and decoding problems are returned as
//! [`ClientFault`] values.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::hwid::HwidSource;
use super::{AuthClient, OnlineUsersClient};
use crate::config::AppCredentials;
use crate::console::Console;
use crate::error::ClientFault;
use crate::lenient::optional_string;
use crate::model::{AuthRequest, UserSnapshot};

const USER_AGENT: &str = concat!("auth-bridge/", env!("CARGO_PKG_VERSION"));
const INVALID_APPLICATION_BODY: &str = "KeyAuth_Invalid";
const INVALID_VERSION_MESSAGE: &str = "invalidver";

/// KeyAuth client performing real HTTP requests.
#[derive(Debug, Clone)]
pub struct KeyAuthClient {
    http: Client,
    credentials: AppCredentials,
    hwid: HwidSource,
}

impl KeyAuthClient {
    /// Builds a client for the configured application.
    ///
    /// # Errors
    ///
    /// Returns [`ClientFault::Build`] when the HTTP client cannot be built.
    pub fn new(credentials: &AppCredentials) -> Result<Self, ClientFault> {
        let http = Client::builder()
            .timeout(credentials.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ClientFault::Build {
                message: err.to_string(),
            })?;
        Ok(Self {
            http,
            hwid: HwidSource::from_override(credentials.hwid_override()),
            credentials: credentials.clone(),
        })
    }

    fn post(&self, form: &[(&str, &str)]) -> Result<String, ClientFault> {
        let response = self
            .http
            .post(self.credentials.api_url().clone())
            .form(form)
            .send()
            .map_err(map_transport_error)?;
        response.text().map_err(map_transport_error)
    }

    fn open_session(&self, console: &mut Console) -> Result<String, ClientFault> {
        let body = self.post(&[
            ("type", "init"),
            ("ver", self.credentials.version()),
            ("hash", ""),
            ("name", self.credentials.name()),
            ("ownerid", self.credentials.owner_id()),
        ])?;
        if body.trim() == INVALID_APPLICATION_BODY {
            console.write_line("The application doesn't exist");
            console.terminate(1);
        }
        let reply = decode_reply(&body)?;
        session_from_reply(console, reply)
    }
}

impl AuthClient for KeyAuthClient {
    fn login(
        &mut self,
        console: &mut Console,
        request: &AuthRequest,
    ) -> Result<UserSnapshot, ClientFault> {
        let session_id = self.open_session(console)?;
        debug!("keyauth session opened");
        let hwid = self.hwid.resolve()?;
        let body = self.post(&[
            ("type", "login"),
            ("username", request.username()),
            ("pass", request.password()),
            ("hwid", hwid.as_str()),
            ("sessionid", session_id.as_str()),
            ("name", self.credentials.name()),
            ("ownerid", self.credentials.owner_id()),
        ])?;
        let reply = decode_reply(&body)?;
        let snapshot = snapshot_from_reply(console, reply)?;
        info!(username = %snapshot.username, "keyauth login accepted");
        Ok(snapshot)
    }
}

impl OnlineUsersClient for KeyAuthClient {
    fn online_users(&mut self, console: &mut Console) -> Result<usize, ClientFault> {
        let session_id = self.open_session(console)?;
        let body = self.post(&[
            ("type", "fetchOnline"),
            ("sessionid", session_id.as_str()),
            ("name", self.credentials.name()),
            ("ownerid", self.credentials.owner_id()),
        ])?;
        let count = online_count_from_reply(decode_reply(&body)?);
        info!(count, "keyauth online users fetched");
        Ok(count)
    }
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    sessionid: Option<String>,
    #[serde(default)]
    download: Option<String>,
    #[serde(default)]
    info: Option<UserInfoDto>,
    #[serde(default)]
    users: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct UserInfoDto {
    username: String,
    #[serde(default, deserialize_with = "optional_string")]
    ip: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    hwid: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    createdate: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    lastlogin: Option<String>,
    #[serde(default)]
    subscriptions: Vec<SubscriptionDto>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionDto {
    subscription: String,
    #[serde(default, deserialize_with = "optional_string")]
    expiry: Option<String>,
}

impl UserInfoDto {
    fn into_snapshot(self) -> UserSnapshot {
        let (subscription, expires) = self
            .subscriptions
            .first()
            .map(|first| {
                (
                    first.subscription.clone(),
                    first.expiry.clone().unwrap_or_default(),
                )
            })
            .unwrap_or_default();
        UserSnapshot {
            username: self.username,
            hwid: self.hwid.unwrap_or_default(),
            ip: self.ip.unwrap_or_default(),
            subscription,
            subscriptions: self
                .subscriptions
                .into_iter()
                .map(|entry| entry.subscription)
                .collect(),
            expires,
            createdate: self.createdate.unwrap_or_default(),
            lastlogin: self.lastlogin.unwrap_or_default(),
        }
    }
}

fn decode_reply(body: &str) -> Result<ApiReply, ClientFault> {
    serde_json::from_str(body).map_err(|err| {
        warn!(error = %err, "undecodable keyauth reply");
        ClientFault::MalformedResponse {
            detail: err.to_string(),
        }
    })
}

fn session_from_reply(console: &mut Console, reply: ApiReply) -> Result<String, ClientFault> {
    if !reply.success {
        if reply.message == INVALID_VERSION_MESSAGE {
            let has_download = reply
                .download
                .as_deref()
                .is_some_and(|link| !link.trim().is_empty());
            if has_download {
                console.write_line("New Version Available");
            } else {
                console.write_line(
                    "Invalid Version, Contact owner to add download link to latest app version",
                );
            }
        } else {
            console.write_line(&reply.message);
        }
        console.terminate(1);
    }
    reply
        .sessionid
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ClientFault::MalformedResponse {
            detail: "init reply carried no session id".to_owned(),
        })
}

fn snapshot_from_reply(console: &mut Console, reply: ApiReply) -> Result<UserSnapshot, ClientFault> {
    if !reply.success {
        console.write_line(&reply.message);
        console.terminate(1);
    }
    let info = reply.info.ok_or_else(|| ClientFault::MalformedResponse {
        detail: "login reply carried no user info".to_owned(),
    })?;
    Ok(info.into_snapshot())
}

// KeyAuth answers "no users online" with an unsuccessful reply; both count as
// zero rather than as a failure.
fn online_count_from_reply(reply: ApiReply) -> usize {
    if reply.success {
        reply.users.map_or(0, |users| users.len())
    } else {
        debug!(message = %reply.message, "keyauth reported no online users");
        0
    }
}

fn map_transport_error(err: reqwest::Error) -> ClientFault {
    let message = err.to_string();
    if err.is_timeout() {
        ClientFault::Timeout { message }
    } else if err.is_connect() {
        ClientFault::Connect { message }
    } else {
        ClientFault::Transport { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::{Intercepted, intercept};

    use rstest::rstest;
    use serial_test::serial;

    const LOGIN_OK: &str = r#"{
        "success": true,
        "message": "Logged in!",
        "info": {
            "username": "alice",
            "subscriptions": [
                {"subscription": "premium", "key": null, "expiry": "1767225600", "timeleft": 100},
                {"subscription": "addon", "expiry": 1767225601}
            ],
            "ip": "203.0.113.7",
            "hwid": "4c4c4544004d",
            "createdate": "1700000000",
            "lastlogin": 1700000500
        }
    }"#;

    fn terminated_text<T: std::fmt::Debug>(outcome: Intercepted<T>) -> String {
        match outcome {
            Intercepted::Terminated(captured) => captured.text().to_owned(),
            Intercepted::Returned(value) => panic!("expected termination, got {value:?}"),
        }
    }

    #[test]
    fn login_reply_maps_to_snapshot() {
        let mut console = Console::capturing();
        let reply = decode_reply(LOGIN_OK).expect("reply should decode");

        let snapshot = snapshot_from_reply(&mut console, reply).expect("snapshot");

        assert_eq!(snapshot.username, "alice");
        assert_eq!(snapshot.subscription, "premium");
        assert_eq!(snapshot.subscriptions, vec!["premium", "addon"]);
        assert_eq!(snapshot.expires, "1767225600");
        assert_eq!(snapshot.ip, "203.0.113.7");
        assert_eq!(snapshot.hwid, "4c4c4544004d");
        assert_eq!(snapshot.createdate, "1700000000");
        assert_eq!(snapshot.lastlogin, "1700000500");
    }

    #[test]
    #[serial(panic_hook)]
    fn rejected_login_prints_message_and_terminates() {
        let mut console = Console::stdout();
        let reply =
            decode_reply(r#"{"success": false, "message": "Password does not match."}"#)
                .expect("reply should decode");

        let outcome = intercept(&mut console, |console| snapshot_from_reply(console, reply))
            .expect("scope should open");

        assert_eq!(terminated_text(outcome), "Password does not match.");
    }

    #[test]
    #[serial(panic_hook)]
    fn invalid_version_without_download_link_is_reported() {
        let mut console = Console::stdout();
        let reply = decode_reply(r#"{"success": false, "message": "invalidver", "download": ""}"#)
            .expect("reply should decode");

        let outcome = intercept(&mut console, |console| session_from_reply(console, reply))
            .expect("scope should open");

        assert!(terminated_text(outcome).starts_with("Invalid Version"));
    }

    #[test]
    fn init_reply_yields_session_id() {
        let mut console = Console::capturing();
        let reply = decode_reply(r#"{"success": true, "message": "Initialized", "sessionid": "abc123"}"#)
            .expect("reply should decode");

        let session = session_from_reply(&mut console, reply).expect("session");

        assert_eq!(session, "abc123");
    }

    #[test]
    fn successful_reply_without_info_is_malformed() {
        let mut console = Console::capturing();
        let reply = decode_reply(r#"{"success": true, "message": "ok"}"#).expect("decode");

        let err = snapshot_from_reply(&mut console, reply).expect_err("no info");

        assert!(matches!(err, ClientFault::MalformedResponse { .. }));
    }

    #[rstest]
    #[case(r#"{"success": true, "message": "ok", "users": [{"credential": "alice"}, {"credential": "bob"}]}"#, 2)]
    #[case(r#"{"success": true, "message": "ok", "users": []}"#, 0)]
    #[case(r#"{"success": false, "message": "No online users found!"}"#, 0)]
    fn online_reply_counts_users(#[case] body: &str, #[case] expected: usize) {
        let reply = decode_reply(body).expect("reply should decode");

        assert_eq!(online_count_from_reply(reply), expected);
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode_reply("<html>502</html>").expect_err("not json");

        assert!(matches!(err, ClientFault::MalformedResponse { .. }));
    }
}
