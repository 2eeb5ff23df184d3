//! REST client for the tracking backend.
//!
//! Every network call in the application goes through the [`Backend`] trait
//! so screens can be exercised against a mock server. The real client wraps
//! a single `ureq::Agent` pointed at one configurable base URL.
//!
//! The backend keys a few routes by display name rather than id
//! (`indicators-by-department-name/{name}`, value payloads carrying
//! `departmentName`). That quirk is absorbed here: screens work with ids and
//! full entities, and this layer formats whatever the wire wants.

use crate::model::{
    ActionItem, Department, DepartmentHistory, Indicator, IndicatorUpdate, LoginResponse,
    NewIndicator, NewUser, NewValue, PasswordChange, PasswordReset, ProfileUpdate, User,
    ValueUpdate, WasteReason,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::time::Duration;

/// Failure taxonomy at the HTTP boundary.
///
/// All three collapse to a one-line alert for the user; the distinction
/// matters for choosing the message and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Could not reach the backend (DNS, refused, timeout).
    Transport(String),
    /// Non-2xx response; message extracted from the body when present.
    Status { code: u16, message: String },
    /// HTTP 200 but the `{success: false, message}` envelope said no.
    Rejected(String),
}

impl ApiError {
    /// The message to surface to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(m) => m,
            Self::Status { message, .. } => message,
            Self::Rejected(m) => m,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(m) => write!(f, "Request failed: {}", m),
            Self::Status { code, message } => write!(f, "Server error {}: {}", code, message),
            Self::Rejected(m) => write!(f, "{}", m),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything the backend exposes, one method per endpoint.
///
/// Mutations return the server's message when it sends one; the calling
/// screen supplies a fallback.
pub trait Backend {
    fn set_token(&self, token: Option<String>);

    fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    fn create_user(&self, user: &NewUser) -> ApiResult<Option<String>>;
    fn all_users(&self) -> ApiResult<Vec<User>>;
    fn update_user_profile(&self, id: u64, update: &ProfileUpdate) -> ApiResult<Option<String>>;

    fn all_departments(&self) -> ApiResult<Vec<Department>>;
    fn all_department_names(&self) -> ApiResult<Vec<String>>;
    fn create_department(&self, name: &str) -> ApiResult<Option<String>>;
    fn rename_department(&self, id: u64, name: &str) -> ApiResult<Option<String>>;
    fn delete_department(&self, id: u64) -> ApiResult<Option<String>>;

    fn indicators_by_department(&self, department_id: u64) -> ApiResult<Vec<Indicator>>;
    fn indicators_by_department_name(&self, name: &str) -> ApiResult<Vec<Indicator>>;
    fn create_indicator(&self, indicator: &NewIndicator) -> ApiResult<Option<String>>;
    fn update_indicator(&self, id: u64, update: &IndicatorUpdate) -> ApiResult<Option<String>>;
    fn delete_indicator(&self, id: u64) -> ApiResult<Option<String>>;

    fn set_value(&self, value: &NewValue) -> ApiResult<Option<String>>;
    fn set_team_member_value(&self, user_id: &str, value: &NewValue) -> ApiResult<Option<String>>;
    fn update_value(&self, user_id: &str, update: &ValueUpdate) -> ApiResult<Option<String>>;

    fn weekly_history(&self) -> ApiResult<Vec<DepartmentHistory>>;

    fn request_password_reset(&self, email: &str) -> ApiResult<Option<String>>;
    fn reset_password(&self, reset: &PasswordReset) -> ApiResult<Option<String>>;
    fn update_password(&self, user_id: &str, change: &PasswordChange) -> ApiResult<Option<String>>;

    fn action_items(&self) -> ApiResult<Vec<ActionItem>>;
    fn update_action_item(&self, id: u64, description: &str) -> ApiResult<Option<String>>;
    fn delete_action_item(&self, id: u64) -> ApiResult<Option<String>>;

    fn waste_reasons(&self) -> ApiResult<Vec<WasteReason>>;
    fn update_waste_reason(&self, id: u64, reason: &str) -> ApiResult<Option<String>>;
    fn delete_waste_reason(&self, id: u64) -> ApiResult<Option<String>>;

    /// The one call with a client-side timeout.
    fn chat(&self, prompt: &str) -> ApiResult<String>;
}

/// Optional `{success, message}` wrapper some endpoints add on top of 200.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    chat_timeout: Duration,
    agent: ureq::Agent,
    token: RefCell<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, chat_timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_timeout: Duration::from_millis(chat_timeout_ms),
            agent: ureq::Agent::new(),
            token: RefCell::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let mut req = self.agent.request(method, &self.url(path));
        if let Some(token) = self.token.borrow().as_ref() {
            req = req.set("Authorization", &format!("Bearer {}", token));
        }
        req
    }

    /// Issue a request and map the three failure modes into [`ApiError`].
    fn send(&self, req: ureq::Request, body: Option<Value>) -> ApiResult<Value> {
        let resp = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };
        match resp {
            Ok(r) => r
                .into_json()
                .map_err(|e| ApiError::Transport(e.to_string())),
            Err(ureq::Error::Status(code, resp)) => {
                let raw = resp.into_string().unwrap_or_default();
                let message = serde_json::from_str::<Envelope>(&raw)
                    .ok()
                    .and_then(|env| env.message)
                    .unwrap_or(raw);
                Err(ApiError::Status { code, message })
            }
            Err(e) => Err(ApiError::Transport(e.to_string())),
        }
    }

    fn get(&self, path: &str) -> ApiResult<Value> {
        self.send(self.request("GET", path), None)
    }

    /// Mutation helper: POST/PUT/DELETE, then branch on the envelope when
    /// the endpoint uses one.
    fn mutate(&self, method: &str, path: &str, body: Value) -> ApiResult<Option<String>> {
        let value = self.send(self.request(method, path), Some(body))?;
        check_envelope(&value)
    }

    fn parse<T: serde::de::DeserializeOwned>(value: Value) -> ApiResult<T> {
        serde_json::from_value(value).map_err(|e| ApiError::Transport(e.to_string()))
    }
}

/// Branch on the optional `{success, message}` envelope. An explicit
/// `success: false` on a 200 is a rejection; anything else passes through
/// with whatever message the server included.
fn check_envelope(value: &Value) -> ApiResult<Option<String>> {
    let env: Envelope = serde_json::from_value(value.clone()).unwrap_or(Envelope {
        success: None,
        message: None,
    });
    match env.success {
        Some(false) => Err(ApiError::Rejected(
            env.message
                .unwrap_or_else(|| "The server rejected the request".to_string()),
        )),
        _ => Ok(env.message),
    }
}

impl Backend for ApiClient {
    fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let value = self.send(
            self.request("POST", "login"),
            Some(json!({ "email": email, "password": password })),
        )?;
        check_envelope(&value)?;
        Self::parse(value)
    }

    fn create_user(&self, user: &NewUser) -> ApiResult<Option<String>> {
        self.mutate(
            "POST",
            "create-user",
            serde_json::to_value(user).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn all_users(&self) -> ApiResult<Vec<User>> {
        Self::parse(self.get("all-users")?)
    }

    fn update_user_profile(&self, id: u64, update: &ProfileUpdate) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("update-user-profile/{}", id),
            serde_json::to_value(update).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn all_departments(&self) -> ApiResult<Vec<Department>> {
        Self::parse(self.get("all-departments")?)
    }

    fn all_department_names(&self) -> ApiResult<Vec<String>> {
        Self::parse(self.get("all-departments-names")?)
    }

    fn create_department(&self, name: &str) -> ApiResult<Option<String>> {
        self.mutate("POST", "create-department", json!({ "name": name }))
    }

    fn rename_department(&self, id: u64, name: &str) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("rename-department/{}", id),
            json!({ "name": name }),
        )
    }

    fn delete_department(&self, id: u64) -> ApiResult<Option<String>> {
        self.mutate("DELETE", &format!("delete-department/{}", id), json!({}))
    }

    fn indicators_by_department(&self, department_id: u64) -> ApiResult<Vec<Indicator>> {
        Self::parse(self.get(&format!("indicators-by-department?departmentId={}", department_id))?)
    }

    fn indicators_by_department_name(&self, name: &str) -> ApiResult<Vec<Indicator>> {
        Self::parse(self.get(&format!(
            "indicators-by-department-name/{}",
            urlencoding::encode(name)
        ))?)
    }

    fn create_indicator(&self, indicator: &NewIndicator) -> ApiResult<Option<String>> {
        self.mutate(
            "POST",
            "create-indicator",
            serde_json::to_value(indicator).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn update_indicator(&self, id: u64, update: &IndicatorUpdate) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("update-indicator/{}", id),
            serde_json::to_value(update).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn delete_indicator(&self, id: u64) -> ApiResult<Option<String>> {
        self.mutate("DELETE", &format!("delete-indicator/{}", id), json!({}))
    }

    fn set_value(&self, value: &NewValue) -> ApiResult<Option<String>> {
        self.mutate(
            "POST",
            "set-value",
            serde_json::to_value(value).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn set_team_member_value(&self, user_id: &str, value: &NewValue) -> ApiResult<Option<String>> {
        self.mutate(
            "POST",
            &format!("set-team-member-indicator-value/{}", user_id),
            serde_json::to_value(value).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn update_value(&self, user_id: &str, update: &ValueUpdate) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("update-indicator-value/{}", user_id),
            serde_json::to_value(update).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn weekly_history(&self) -> ApiResult<Vec<DepartmentHistory>> {
        Self::parse(self.get("weekly-history")?)
    }

    fn request_password_reset(&self, email: &str) -> ApiResult<Option<String>> {
        self.mutate("POST", "request-password-reset", json!({ "email": email }))
    }

    fn reset_password(&self, reset: &PasswordReset) -> ApiResult<Option<String>> {
        self.mutate(
            "POST",
            "reset-password",
            serde_json::to_value(reset).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn update_password(&self, user_id: &str, change: &PasswordChange) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("update-password/{}", user_id),
            serde_json::to_value(change).map_err(|e| ApiError::Transport(e.to_string()))?,
        )
    }

    fn action_items(&self) -> ApiResult<Vec<ActionItem>> {
        Self::parse(self.get("action-items")?)
    }

    fn update_action_item(&self, id: u64, description: &str) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("action-items/{}", id),
            json!({ "description": description }),
        )
    }

    fn delete_action_item(&self, id: u64) -> ApiResult<Option<String>> {
        self.mutate("DELETE", &format!("action-items/{}", id), json!({}))
    }

    fn waste_reasons(&self) -> ApiResult<Vec<WasteReason>> {
        Self::parse(self.get("waste-reasons")?)
    }

    fn update_waste_reason(&self, id: u64, reason: &str) -> ApiResult<Option<String>> {
        self.mutate(
            "PUT",
            &format!("waste-reasons/{}", id),
            json!({ "reason": reason }),
        )
    }

    fn delete_waste_reason(&self, id: u64) -> ApiResult<Option<String>> {
        self.mutate("DELETE", &format!("waste-reasons/{}", id), json!({}))
    }

    fn chat(&self, prompt: &str) -> ApiResult<String> {
        let value = self.send(
            self.request("POST", "chat").timeout(self.chat_timeout),
            Some(json!({ "prompt": prompt })),
        )?;
        let reply = value
            .get("reply")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Transport("malformed chat response".to_string()))?;
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_envelope_passes_plain_bodies() {
        assert_eq!(check_envelope(&json!({ "id": 1 })).unwrap(), None);
        assert_eq!(check_envelope(&json!([1, 2, 3])).unwrap(), None);
    }

    #[test]
    fn test_check_envelope_success_with_message() {
        let result = check_envelope(&json!({ "success": true, "message": "Saved" })).unwrap();
        assert_eq!(result, Some("Saved".to_string()));
    }

    #[test]
    fn test_check_envelope_rejection() {
        let err = check_envelope(&json!({ "success": false, "message": "Name taken" }))
            .unwrap_err();
        assert_eq!(err, ApiError::Rejected("Name taken".to_string()));
    }

    #[test]
    fn test_check_envelope_rejection_without_message() {
        let err = check_envelope(&json!({ "success": false })).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/", 1000);
        assert_eq!(client.url("/login"), "http://localhost:8080/login");
        assert_eq!(client.url("all-users"), "http://localhost:8080/all-users");
    }
}
