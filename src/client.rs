use async_recursion::async_recursion;
use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::{Client, Proxy, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::DelugeConfig;
use crate::dto::*;
use crate::error::{DelugeError, Result};
use crate::session::{CookieCheck, Session, SessionCookie, SessionSnapshot};

/// Client for the JSON-RPC API of a Deluge Web UI.
///
/// Every privileged call transparently logs in and connects the Web UI to a
/// daemon when needed. The session cookie and message counter live behind a
/// lock, so the client can be shared, but calls are expected to be issued
/// one at a time per session.
pub struct DelugeClient {
    client: Client,
    config: Arc<DelugeConfig>,
    rpc_url: Url,
    upload_url: Url,
    password: Mutex<String>,
    session: Mutex<Session>,
}

/// Joins a base url and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| DelugeError::InvalidUrl(format!("{joined}: {e}")))
}

impl DelugeClient {
    /// Create a new client with a fresh, unauthenticated session
    pub fn new(config: DelugeConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            rpc_url: join_url(&config.base_url, &config.path)?,
            upload_url: join_url(&config.base_url, "/upload")?,
            password: Mutex::new(config.password.clone()),
            session: Mutex::new(Session::new()),
            config: Arc::new(config),
        })
    }

    /// Create a client that resumes a previously exported session
    pub fn with_state(config: DelugeConfig, snapshot: SessionSnapshot) -> Result<Self> {
        let client = Self::new(config)?;
        client.import_state(snapshot);
        Ok(client)
    }

    pub fn config(&self) -> &DelugeConfig {
        &self.config
    }

    pub(crate) fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn password(&self) -> String {
        self.password
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Cookie` header value for the current session, if logged in
    pub(crate) fn cookie_header(&self) -> Option<String> {
        self.session().cookie().map(SessionCookie::header_value)
    }

    // ========================================================================
    // Session State
    // ========================================================================

    /// Forget the cookie and restart message ids at 0
    pub fn reset_session(&self) {
        self.session().reset();
    }

    pub fn export_state(&self) -> SessionSnapshot {
        self.session().export()
    }

    pub fn import_state(&self, snapshot: SessionSnapshot) {
        *self.session() = Session::import(snapshot);
    }

    /// Id the next request will carry, before wraparound is applied
    pub fn message_id(&self) -> u32 {
        self.session().message_id()
    }

    // ========================================================================
    // Request Pipeline
    // ========================================================================

    /// Sends one JSON-RPC call.
    ///
    /// With `needs_auth` the session is validated (logging in if necessary)
    /// first; with `needs_auth && auto_connect` the Web UI is also connected
    /// to a daemon. Calls are made exactly once, without retries.
    #[async_recursion]
    pub async fn request(
        &self,
        method: &str,
        params: &[Value],
        needs_auth: bool,
        auto_connect: bool,
    ) -> Result<RpcReply> {
        if needs_auth {
            self.validate_auth().await?;
        }

        if needs_auth && auto_connect && !self.connected().await? {
            self.connect(None, 0).await?;
        }

        let id = self.session().next_message_id();
        let request = RpcRequest {
            method: method.to_string(),
            params: params.to_vec(),
            id,
        };
        debug!("RPC request: method={} id={}", method, id);

        let mut builder = self.client.post(self.rpc_url.clone()).json(&request);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await?.error_for_status()?;
        let status = response.status();
        let headers = response.headers().clone();
        debug!("RPC response status: {} (id={})", status, id);

        let response_text = response.text().await?;
        let body = RpcResponse::from_body(serde_json::from_str(&response_text)?)?;

        Ok(RpcReply {
            status,
            headers,
            body,
        })
    }

    /// Privileged, auto-connecting call with the result decoded into `T`
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<T> {
        let reply = self.request(method, params, true, true).await?;
        Ok(serde_json::from_value(reply.into_result())?)
    }

    /// Privileged call that does not auto-connect, for the connection operations
    async fn call_unconnected<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<T> {
        let reply = self.request(method, params, true, false).await?;
        Ok(serde_json::from_value(reply.into_result())?)
    }

    // ========================================================================
    // Auth Orchestrator
    // ========================================================================

    /// Returns whether the current session can be used as is.
    ///
    /// Cookies with a known expiry are judged locally; a cookie without one
    /// is checked with the server. An unusable session is reset.
    pub async fn check_session(&self) -> Result<bool> {
        let check = self.session().check_cookie(Utc::now());
        match check {
            CookieCheck::Valid => Ok(true),
            CookieCheck::Missing | CookieCheck::Expiring => {
                self.reset_session();
                Ok(false)
            }
            CookieCheck::Unknown => {
                match self.request("auth.check_session", &[], false, false).await {
                    Ok(reply) if is_truthy(reply.result()) => Ok(true),
                    Ok(_) => {
                        self.reset_session();
                        Ok(false)
                    }
                    Err(e) => {
                        debug!("Session check failed: {}", e);
                        self.reset_session();
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Logs in with the configured password and stores the session cookie
    pub async fn login(&self) -> Result<bool> {
        self.reset_session();
        let reply = self
            .request("auth.login", &[Value::String(self.password())], false, false)
            .await?;

        let header = match reply.set_cookie() {
            Some(header) if is_truthy(reply.result()) => header,
            _ => {
                warn!("Login to {} rejected", self.config.base_url);
                return Err(DelugeError::Authentication("incorrect password".to_string()));
            }
        };

        let cookie = SessionCookie::parse(header, Utc::now())?;
        self.session().set_cookie(cookie);
        info!("Logged in to {}", self.config.base_url);
        Ok(true)
    }

    /// Ends the session on the server and locally
    pub async fn logout(&self) -> Result<bool> {
        let reply = self
            .request("auth.delete_session", &[], true, true)
            .await?;
        self.reset_session();
        Ok(is_truthy(reply.result()))
    }

    /// Changes the Web UI password; the new password is used for later logins
    pub async fn change_password(&self, new_password: &str) -> Result<bool> {
        let params = [
            Value::String(self.password()),
            Value::String(new_password.to_string()),
        ];
        let reply = self
            .request("auth.change_password", &params, true, true)
            .await?;

        let header = match reply.set_cookie() {
            Some(header) if is_truthy(reply.result()) => header,
            _ => {
                return Err(DelugeError::Authentication(
                    "Old password incorrect".to_string(),
                ))
            }
        };

        let cookie = SessionCookie::parse(header, Utc::now())?;
        *self.password.lock().unwrap_or_else(PoisonError::into_inner) = new_password.to_string();
        self.session().set_cookie(cookie);
        info!("Password changed");
        Ok(true)
    }

    /// Ensures a valid session, logging in when the current one is unusable
    pub async fn validate_auth(&self) -> Result<()> {
        if self.check_session().await? {
            return Ok(());
        }
        if self.login().await? {
            return Ok(());
        }
        Err(DelugeError::Authentication("invalid auth".to_string()))
    }

    // ========================================================================
    // Connection Operations
    // ========================================================================

    pub async fn get_hosts(&self) -> Result<Vec<Host>> {
        self.call_unconnected("web.get_hosts", &[]).await
    }

    pub async fn get_host_status(&self, host_id: &str) -> Result<HostStatus> {
        self.call_unconnected("web.get_host_status", &[Value::from(host_id)])
            .await
    }

    /// Connects the Web UI to a daemon and returns the methods it exposes.
    ///
    /// Without an explicit `host` the host at `index` of [`Self::get_hosts`]
    /// is used.
    pub async fn connect(&self, host: Option<&str>, index: usize) -> Result<Vec<String>> {
        let host_id = match host {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => self
                .get_hosts()
                .await?
                .into_iter()
                .nth(index)
                .map(|host| host.id)
                .ok_or_else(|| DelugeError::NotFound("No hosts found".to_string()))?,
        };

        info!("Connecting to daemon {}", host_id);
        let methods: Option<Vec<String>> = self
            .call_unconnected("web.connect", &[Value::String(host_id)])
            .await?;
        Ok(methods.unwrap_or_default())
    }

    pub async fn connected(&self) -> Result<bool> {
        let reply = self.request("web.connected", &[], true, false).await?;
        Ok(is_truthy(reply.result()))
    }

    /// Disconnects the Web UI from its daemon, for every user of that Web UI
    pub async fn disconnect(&self) -> Result<bool> {
        let result: DisconnectResult = self.call_unconnected("web.disconnect", &[]).await?;
        Ok(result.closed())
    }

    // ========================================================================
    // Daemon Operations
    // ========================================================================

    /// Daemon version, e.g. `2.0.3-2-201906121747-ubuntu18.04.1`
    pub async fn get_version(&self) -> Result<String> {
        self.call("daemon.get_version", &[]).await
    }

    pub async fn list_methods(&self, auth: bool) -> Result<Vec<String>> {
        let reply = self.request("system.listMethods", &[], auth, true).await?;
        Ok(serde_json::from_value(reply.into_result())?)
    }
}
