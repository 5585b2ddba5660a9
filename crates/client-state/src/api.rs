//! The backend request/response contract: JSON body semantics only,
//! independent of any particular transport.

use game_model::{GainEvent, GameState};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// HTTP verbs the contract uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Partial settings object; absent fields are left untouched by the
/// backend and echoed back as stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

/// Every operation the client can issue against the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    FetchState,
    PerformAction { action_id: String },
    SelectProfile { index: usize },
    NewProfile { name: String },
    RenameProfile { name: String },
    DeleteProfile,
    ResetProfile,
    FixProfile { index: usize },
    MigrateProfile,
    HardReset,
    GetSettings,
    SaveSettings(SettingsPatch),
}

impl ApiRequest {
    pub fn method(&self) -> Method {
        match self {
            ApiRequest::FetchState | ApiRequest::GetSettings => Method::Get,
            ApiRequest::RenameProfile { .. } => Method::Put,
            ApiRequest::DeleteProfile => Method::Delete,
            _ => Method::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::FetchState => "/api/game-state",
            ApiRequest::PerformAction { .. } => "/api/action",
            ApiRequest::SelectProfile { .. } => "/api/profile/select",
            ApiRequest::NewProfile { .. } => "/api/profile/new",
            ApiRequest::RenameProfile { .. } => "/api/profile/rename",
            ApiRequest::DeleteProfile => "/api/profile/delete",
            ApiRequest::ResetProfile => "/api/profile/reset",
            ApiRequest::FixProfile { .. } => "/api/profile/fix",
            ApiRequest::MigrateProfile => "/api/profile/migrate",
            ApiRequest::HardReset => "/api/hard-reset",
            ApiRequest::GetSettings | ApiRequest::SaveSettings(_) => "/api/settings",
        }
    }

    /// JSON body, where the operation carries one.
    pub fn body(&self) -> Option<Value> {
        match self {
            ApiRequest::PerformAction { action_id } => Some(json!({ "action_id": action_id })),
            ApiRequest::SelectProfile { index } => Some(json!({ "index": index })),
            ApiRequest::NewProfile { name } | ApiRequest::RenameProfile { name } => {
                Some(json!({ "name": name }))
            }
            ApiRequest::FixProfile { index } => Some(json!({ "index": index })),
            ApiRequest::SaveSettings(patch) => serde_json::to_value(patch).ok(),
            _ => None,
        }
    }

    /// Whether a successful response rewrites the game snapshot. The
    /// settings endpoints only echo settings and stay out of the
    /// snapshot path entirely.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            ApiRequest::FetchState | ApiRequest::GetSettings | ApiRequest::SaveSettings(_)
        )
    }

    /// Whether a successful response carries a full `GameState`.
    pub fn yields_state(&self) -> bool {
        !matches!(self, ApiRequest::GetSettings | ApiRequest::SaveSettings(_))
    }
}

/// Successful response to any state-yielding operation: the complete
/// snapshot, plus the transient reward for action responses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: GameState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_gain: Option<GainEvent>,
}

/// User-facing category for a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    NotPermitted,
    NameConflict,
    Unsupported,
    System,
}

impl ErrorCategory {
    /// Map an HTTP status to its category.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCategory::InvalidInput,
            403 => ErrorCategory::NotPermitted,
            409 => ErrorCategory::NameConflict,
            501 => ErrorCategory::Unsupported,
            _ => ErrorCategory::System,
        }
    }

    /// Title shown on the advisory notice.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "Invalid Input",
            ErrorCategory::NotPermitted => "Action Not Allowed",
            ErrorCategory::NameConflict => "Name Unavailable",
            ErrorCategory::Unsupported => "Feature Not Available",
            ErrorCategory::System => "System Error",
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// A failed request. Terminal for the triggering action: no retry and
/// no partial application to the store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-success HTTP status, with the backend's message when the
    /// body was parseable.
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Build the error for a non-success status from the raw body.
    /// An unparseable body falls back to a generic message.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("request failed with status: {status}"));
        ApiError::Status { status, message }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Transport(_) => ErrorCategory::System,
            ApiError::Status { status, .. } => ErrorCategory::from_status(*status),
        }
    }

    pub fn title(&self) -> &'static str {
        self.category().title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_table_is_reproduced() {
        let cases: Vec<(ApiRequest, Method, &str)> = vec![
            (ApiRequest::FetchState, Method::Get, "/api/game-state"),
            (
                ApiRequest::PerformAction {
                    action_id: "gather-wood-button".into(),
                },
                Method::Post,
                "/api/action",
            ),
            (
                ApiRequest::SelectProfile { index: 1 },
                Method::Post,
                "/api/profile/select",
            ),
            (
                ApiRequest::NewProfile { name: "X".into() },
                Method::Post,
                "/api/profile/new",
            ),
            (
                ApiRequest::RenameProfile { name: "Y".into() },
                Method::Put,
                "/api/profile/rename",
            ),
            (ApiRequest::DeleteProfile, Method::Delete, "/api/profile/delete"),
            (ApiRequest::ResetProfile, Method::Post, "/api/profile/reset"),
            (
                ApiRequest::FixProfile { index: 0 },
                Method::Post,
                "/api/profile/fix",
            ),
            (
                ApiRequest::MigrateProfile,
                Method::Post,
                "/api/profile/migrate",
            ),
            (ApiRequest::HardReset, Method::Post, "/api/hard-reset"),
            (ApiRequest::GetSettings, Method::Get, "/api/settings"),
            (
                ApiRequest::SaveSettings(SettingsPatch::default()),
                Method::Post,
                "/api/settings",
            ),
        ];
        for (req, method, path) in cases {
            assert_eq!(req.method(), method, "{req:?}");
            assert_eq!(req.path(), path, "{req:?}");
        }
    }

    #[test]
    fn bodies_carry_the_expected_fields() {
        let body = ApiRequest::PerformAction {
            action_id: "mine-stone-button".into(),
        }
        .body()
        .unwrap();
        assert_eq!(body["action_id"], "mine-stone-button");

        let body = ApiRequest::SelectProfile { index: 2 }.body().unwrap();
        assert_eq!(body["index"], 2);

        assert!(ApiRequest::DeleteProfile.body().is_none());
        assert!(ApiRequest::HardReset.body().is_none());
    }

    #[test]
    fn settings_requests_do_not_touch_the_snapshot() {
        assert!(!ApiRequest::GetSettings.is_mutating());
        assert!(!ApiRequest::SaveSettings(SettingsPatch::default()).is_mutating());
        assert!(!ApiRequest::GetSettings.yields_state());
        assert!(ApiRequest::FetchState.yields_state());
        assert!(!ApiRequest::FetchState.is_mutating());
        assert!(ApiRequest::DeleteProfile.is_mutating());
    }

    #[test]
    fn status_mapping_matches_the_contract() {
        assert_eq!(ErrorCategory::from_status(400), ErrorCategory::InvalidInput);
        assert_eq!(ErrorCategory::from_status(403), ErrorCategory::NotPermitted);
        assert_eq!(ErrorCategory::from_status(409), ErrorCategory::NameConflict);
        assert_eq!(ErrorCategory::from_status(501), ErrorCategory::Unsupported);
        assert_eq!(ErrorCategory::from_status(500), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::System);
        assert_eq!(ErrorCategory::NameConflict.title(), "Name Unavailable");
    }

    #[test]
    fn structured_error_body_is_preferred() {
        let err = ApiError::from_status(409, r#"{"error":"Profile name already exists"}"#);
        assert_eq!(
            err,
            ApiError::Status {
                status: 409,
                message: "Profile name already exists".to_string()
            }
        );
        assert_eq!(err.title(), "Name Unavailable");
    }

    #[test]
    fn unparseable_error_body_falls_back() {
        let err = ApiError::from_status(502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "request failed with status: 502");
        assert_eq!(err.title(), "System Error");
    }

    #[test]
    fn state_response_flattens_the_snapshot() {
        let raw = r#"{
            "profiles": [{"name": "Adventurer", "total_level": 2, "data": {}}],
            "selected_profile_index": 0,
            "recent_gain": {"skill": "Mining", "xp": 15, "item": "Stone", "quantity": 1}
        }"#;
        let resp: StateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.state.profiles[0].name, "Adventurer");
        let gain = resp.recent_gain.unwrap();
        assert_eq!(gain.positive_xp(), Some(("Mining", 15)));

        let raw = r#"{"profiles": [{"name": "A"}], "selected_profile_index": 0}"#;
        let resp: StateResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.recent_gain.is_none());
    }
}
