/*
[INPUT]:  Stored user id, refresh token and api key
[OUTPUT]: Refresh response carrying a new auth token
[POS]:    Auth layer - token refresh exchange against the hosted API
[UPDATE]: When the refresh endpoint or its payload changes
*/

use reqwest::Method;

use crate::http::client::JSON_CONTENT_TYPE;
use crate::http::headers::security_headers;
use crate::http::{ApiClient, Result};
use crate::types::{RefreshRequest, RefreshResponse};

pub const REFRESH_ENDPOINT: &str = "/v1/user/auth/refresh";

impl ApiClient {
    /// Exchange a refresh token for a new access token
    ///
    /// POST /v1/user/auth/refresh
    /// Sent without the auth step, so it never triggers a refresh itself.
    /// Transport failures surface as `Err`; a rejected refresh comes back as
    /// `success: false`.
    pub async fn refresh_token(
        &self,
        user_id: &str,
        refresh_token: &str,
        api_key: &str,
    ) -> Result<RefreshResponse> {
        let body = serde_json::to_value(RefreshRequest {
            user_id: user_id.to_string(),
            refresh_token: refresh_token.to_string(),
            api_key: api_key.to_string(),
        })?;

        let value = self
            .send(
                REFRESH_ENDPOINT,
                Method::POST,
                Some(&body),
                security_headers(),
                Some(JSON_CONTENT_TYPE),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
