//! HTTP analytics client (native builds)

use reqwest::blocking::{Client, Response};
use serde_json::Value;

use super::{
    AiInsights, AnalyticsError, AnalyticsService, Recommendations, SessionReceipt, SessionRecord,
};

pub const DEFAULT_BASE_URL: &str = "https://api.snake-game-analytics.com";

pub struct HttpAnalytics {
    client: Client,
    base_url: String,
}

impl HttpAnalytics {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// JSON body of a successful response; error statuses carry `message`
    fn read(response: Response) -> Result<Value, AnalyticsError> {
        let status = response.status();
        let body: Value = response.json()?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(AnalyticsError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

impl Default for HttpAnalytics {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl AnalyticsService for HttpAnalytics {
    fn submit_session(&mut self, record: &SessionRecord) -> Result<SessionReceipt, AnalyticsError> {
        let response = self.client.post(self.url("game-sessions")).json(record).send()?;
        let body = Self::read(response)?;

        let session_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or(AnalyticsError::MissingSessionId)?
            .to_string();
        log::info!("Submitted session {}", session_id);

        Ok(SessionReceipt {
            success: true,
            session_id,
        })
    }

    fn fetch_insights(&self, session_id: &str) -> Result<AiInsights, AnalyticsError> {
        let url = self.url(&format!("ai-insights/{}", session_id));
        let body = Self::read(self.client.get(url).send()?)?;
        Ok(serde_json::from_value(body)?)
    }

    fn fetch_recommendations(&self) -> Result<Recommendations, AnalyticsError> {
        let url = self.url("personalized-recommendations");
        let body = Self::read(self.client.get(url).send()?)?;
        Ok(serde_json::from_value(body)?)
    }
}
