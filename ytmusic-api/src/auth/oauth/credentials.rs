use super::{AuthCode, BaseToken, CredentialExchanger, RefreshableToken};
use crate::client::USER_AGENT;
use crate::error::{Result, YtMusicError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT as USER_AGENT_HEADER;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const OAUTH_CODE_URL: &str = "https://www.youtube.com/o/oauth2/device/code";
pub const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const DEVICE_GRANT: &str = "http://oauth.net/grant_type/device/1.0";
const REFRESH_GRANT: &str = "refresh_token";

/// Client id/secret of a "TVs and Limited Input devices" OAuth client.
pub struct OAuthCredentials {
    http: Client,
    client_id: String,
    client_secret: String,
    code_url: String,
    token_url: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code_url: OAUTH_CODE_URL.to_owned(),
            token_url: OAUTH_TOKEN_URL.to_owned(),
        })
    }

    /// Point the device-code and token requests at other endpoints.
    pub fn with_endpoints(mut self, code_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.code_url = code_url.into();
        self.token_url = token_url.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn send_form<T: DeserializeOwned>(&self, url: &str, form: &[(&str, &str)]) -> Result<T> {
        let mut params = vec![("client_id", self.client_id.as_str())];
        params.extend_from_slice(form);

        let resp = self
            .http
            .post(url)
            .header(USER_AGENT_HEADER, format!("{USER_AGENT} Cobalt/Version"))
            .form(&params)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        if status == 401 {
            let error = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned));
            return Err(match error.as_deref() {
                Some("unauthorized_client") => YtMusicError::UnauthorizedOAuthClient(text),
                Some("invalid_client") => YtMusicError::BadOAuthClient(text),
                _ => YtMusicError::Server {
                    status,
                    message: format!("OAuth request error. url: {url}, content: {text}"),
                },
            });
        }
        if !(200..300).contains(&status) {
            return Err(YtMusicError::Server {
                status,
                message: format!("OAuth request error. url: {url}, content: {text}"),
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| YtMusicError::Parse(format!("unexpected OAuth response: {e}")))
    }
}

#[async_trait]
impl CredentialExchanger for OAuthCredentials {
    async fn get_code(&self) -> Result<AuthCode> {
        self.send_form(&self.code_url, &[("scope", OAUTH_SCOPE)]).await
    }

    async fn token_from_code(&self, device_code: &str) -> Result<RefreshableToken> {
        self.send_form(
            &self.token_url,
            &[
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", DEVICE_GRANT),
                ("code", device_code),
            ],
        )
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<BaseToken> {
        self.send_form(
            &self.token_url,
            &[
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", REFRESH_GRANT),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }
}
