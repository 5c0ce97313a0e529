use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 用户与角色 (Users & Roles)
// =========================================================

/// 粗粒度权限标签，由用户资料推导，不单独存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// 当前登录用户的资料
///
/// 服务端返回的未知字段保存在 `extra` 中，合并与持久化时原样保留。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub fake_detections: u64,
    #[serde(default)]
    pub real_detections: u64,
    #[serde(default)]
    pub date_joined: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// 角色投影：有资料即为 `user`，`is_staff` 时追加 `admin`
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = vec![Role::User];
        if self.is_staff {
            roles.push(Role::Admin);
        }
        roles
    }

    /// 全名，姓名为空时退回用户名
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// 将服务端返回的字段覆盖到本地副本上（冲突时以服务端为准）
    ///
    /// `base` 为空时，结果完全由 `patch` 决定。
    pub fn merge(base: Option<&UserProfile>, patch: Value) -> Result<UserProfile, serde_json::Error> {
        let mut merged = match base {
            Some(profile) => match serde_json::to_value(profile)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };

        if let Value::Object(fields) = patch {
            for (key, value) in fields {
                merged.insert(key, value);
            }
        }

        serde_json::from_value(Value::Object(merged))
    }
}

/// 注册接口返回的新账号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// 用户总量统计（仅管理员可用）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
}

// =========================================================
// 检测记录 (Detection Records)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fake,
    Real,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: u64,
    #[serde(default)]
    pub user: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// 服务端保存后的图片 URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: DetectionStatus,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub result: Verdict,
    #[serde(default)]
    pub result_display: Option<String>,
    /// 0-1 之间的置信度
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub analysis_result: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DetectionRecord {
    pub fn is_completed(&self) -> bool {
        self.status == DetectionStatus::Completed
    }

    pub fn is_fake(&self) -> bool {
        self.result == Verdict::Fake
    }

    pub fn is_real(&self) -> bool {
        self.result == Verdict::Real
    }
}

/// 检测历史接口的两种返回形态：分页信封或裸列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectionListing {
    Paginated(DetectionPage),
    Bare(Vec<DetectionRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<DetectionRecord>,
}

impl DetectionListing {
    pub fn into_records(self) -> Vec<DetectionRecord> {
        match self {
            DetectionListing::Paginated(page) => page.results,
            DetectionListing::Bare(records) => records,
        }
    }
}

/// 检测统计快照，每次拉取整体覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub fake_count: u64,
    #[serde(default)]
    pub real_count: u64,
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub completed_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub fake_percentage: f64,
    #[serde(default)]
    pub real_percentage: f64,
    #[serde(default)]
    pub average_confidence: f64,
}

/// 待上传的新闻图片
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 新建检测的表单数据（以 multipart 提交）
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(is_staff: bool) -> UserProfile {
        serde_json::from_value(json!({
            "id": 7,
            "username": "alice",
            "email": "alice@example.com",
            "is_staff": is_staff,
            "theme": "dark"
        }))
        .unwrap()
    }

    #[test]
    fn test_roles_projection() {
        assert_eq!(profile(false).roles(), vec![Role::User]);
        assert_eq!(profile(true).roles(), vec![Role::User, Role::Admin]);
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let p = profile(false);
        assert_eq!(p.extra.get("theme"), Some(&json!("dark")));
        let back: UserProfile = serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_merge_server_wins() {
        let base = profile(false);
        let merged = UserProfile::merge(
            Some(&base),
            json!({ "email": "new@example.com", "bio": "hi" }),
        )
        .unwrap();

        assert_eq!(merged.email, "new@example.com");
        assert_eq!(merged.bio.as_deref(), Some("hi"));
        assert_eq!(merged.username, "alice");
        assert_eq!(merged.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut p = profile(false);
        assert_eq!(p.display_name(), "alice");
        p.first_name = "Alice".into();
        p.last_name = "Liddell".into();
        assert_eq!(p.display_name(), "Alice Liddell");
    }

    #[test]
    fn test_listing_accepts_both_shapes() {
        let record = json!({ "id": 1, "title": "t", "status": "completed", "result": "fake" });

        let paged: DetectionListing =
            serde_json::from_value(json!({ "count": 1, "next": null, "results": [record.clone()] }))
                .unwrap();
        let bare: DetectionListing = serde_json::from_value(json!([record])).unwrap();

        let paged = paged.into_records();
        let bare = bare.into_records();
        assert_eq!(paged, bare);
        assert!(paged[0].is_fake());
        assert!(paged[0].is_completed());
    }

    #[test]
    fn test_record_timestamps_with_offset() {
        let record: DetectionRecord = serde_json::from_value(json!({
            "id": 3,
            "title": "t",
            "created_at": "2024-05-01T12:34:56.123456+08:00",
            "confidence_score": 0.92
        }))
        .unwrap();

        assert!(record.created_at.is_some());
        assert_eq!(record.result, Verdict::Unknown);
        assert_eq!(record.status, DetectionStatus::Pending);
    }
}
