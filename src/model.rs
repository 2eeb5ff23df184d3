//! Data types exchanged with the tracking backend.
//!
//! The backend owns all of these entities; the client only renders them and
//! posts edits back. Field names follow the backend's camelCase JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User roles, a closed set. The backend sends the role as a free-form
/// string; anything outside this set is a protocol error, not a new role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    TeamMember,
    Viewer,
}

impl Role {
    /// Parse a role string case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "TEAM_MEMBER" => Some(Self::TeamMember),
            "VIEWER" => Some(Self::Viewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::TeamMember => "TEAM_MEMBER",
            Self::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub registration_number: Option<String>,
    /// Department display name; the backend keys users by name here, not id.
    #[serde(default)]
    pub department: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub registration_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: u64,
    pub name: String,
    pub target_per_week: f64,
    pub department_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIndicator {
    pub name: String,
    pub target_per_week: f64,
    pub department_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorUpdate {
    pub name: String,
    pub target_per_week: f64,
}

/// Payload for recording a new measurement. Write-only: the client never
/// reads these back individually, only through the weekly history view.
/// The value travels as a string; the backend parses and validates it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewValue {
    pub department_name: String,
    pub indicator_name: String,
    pub value: String,
}

/// Payload for amending a historical entry; unlike [`NewValue`] it carries
/// the date of the entry being amended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueUpdate {
    pub department_name: String,
    pub indicator_name: String,
    pub date: NaiveDate,
    pub value: String,
}

/// One day's recorded value inside a week.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayValue {
    pub day: String,
    pub value: f64,
}

/// A labeled week with its date range and per-day values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub daily: Vec<DayValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorHistory {
    pub indicator: String,
    pub target_per_week: f64,
    pub weeks: Vec<WeekRecord>,
}

/// Weekly history for one department, as computed and returned by the
/// backend. Display-only; the client never recomputes or validates it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentHistory {
    pub department: String,
    pub indicators: Vec<IndicatorHistory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub id: u64,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteReason {
    pub id: u64,
    pub reason: String,
    #[serde(default)]
    pub department: Option<String>,
}
