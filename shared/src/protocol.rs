use crate::{
    DetectionListing, DetectionRecord, DetectionStats, RegisteredUser, UserProfile, UserStats,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the API base URL. Resource ids that appear in the
/// path are marked `#[serde(skip)]` so they never leak into the body.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path (with query, if any).
    fn path(&self) -> String;
}

/// Collection endpoint for detections; multipart creation posts here.
pub const DETECTIONS_PATH: &str = "/detection/detections/";

// =========================================================
// Users
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl ApiRequest for TokenRequest {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/token/".to_string()
    }
}

/// Fetch the profile behind the current bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/me/".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

impl ApiRequest for RegisterRequest {
    type Response = RegisteredUser;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/".to_string()
    }
}

/// Editable profile fields; unset fields are left out of the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip)]
    pub id: u64,
    #[serde(flatten)]
    pub patch: ProfilePatch,
}

impl ApiRequest for UpdateUserRequest {
    // Raw JSON; the caller merges it onto the local profile
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Patch;
    fn path(&self) -> String {
        format!("/users/{}/", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    #[serde(skip)]
    pub id: u64,
    #[serde(flatten)]
    pub change: PasswordChange,
}

impl ApiRequest for ChangePasswordRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/users/{}/change_password/", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsRequest;

impl ApiRequest for UserStatsRequest {
    type Response = UserStats;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/stats/".to_string()
    }
}

// =========================================================
// Detections
// =========================================================

/// The caller's own detections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyDetectionsRequest;

impl ApiRequest for MyDetectionsRequest {
    type Response = DetectionListing;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("{}my_detections/", DETECTIONS_PATH)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionDetailRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DetectionDetailRequest {
    type Response = DetectionRecord;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("{}{}/", DETECTIONS_PATH, self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionResultRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DetectionResultRequest {
    type Response = DetectionRecord;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("{}{}/result/", DETECTIONS_PATH, self.id)
    }
}

/// Aggregate counters; `all` switches to the all-users scope (staff only server-side).
#[derive(Debug, Clone, Serialize)]
pub struct DetectionStatsRequest {
    #[serde(skip)]
    pub all: bool,
}

impl ApiRequest for DetectionStatsRequest {
    type Response = DetectionStats;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        if self.all {
            format!("{}get_stats/?all=true", DETECTIONS_PATH)
        } else {
            format!("{}get_stats/", DETECTIONS_PATH)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteDetectionRequest {
    #[serde(skip)]
    pub id: u64,
}

impl ApiRequest for DeleteDetectionRequest {
    type Response = (); // 204, empty body
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("{}{}/", DETECTIONS_PATH, self.id)
    }
}
