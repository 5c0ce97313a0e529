use crate::error::{ClientError, ClientResult};
use crate::multipart::MultipartForm;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use newscheck_shared::protocol::{
    ApiRequest, ChangePasswordRequest, CurrentUserRequest, DETECTIONS_PATH,
    DeleteDetectionRequest, DetectionDetailRequest, DetectionResultRequest, DetectionStatsRequest,
    MyDetectionsRequest, PasswordChange, ProfilePatch, RegisterRequest, TokenPair, TokenRequest,
    UpdateUserRequest, UserStatsRequest,
};
use newscheck_shared::{
    DetectionListing, DetectionRecord, DetectionStats, NewDetection, RegisteredUser, UserProfile,
    UserStats,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

// =========================================================
// 服务封装: Gateway
// =========================================================

/// 封装所有与后端 REST API 交互的细节
///
/// 这里接受任何实现了 HttpClient 的客户端，从而解耦了具体的 HTTP 实现。
/// 鉴权头由外层的 [`crate::interceptor::AuthInterceptor`] 统一附加。
pub struct Gateway<C: HttpClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> Gateway<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个声明式的 API 请求
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ClientResult<R::Response> {
        let url = self.url(&req.path());
        let mut http = HttpRequest::new(&url, R::METHOD);
        if R::METHOD.has_body() {
            http = http.with_json(req)?;
        }

        let resp = self.client.send(http).await?;
        decode(resp)
    }

    // --- 用户 ---

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenPair> {
        self.call(&TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        self.call(&CurrentUserRequest).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> ClientResult<RegisteredUser> {
        self.call(payload).await
    }

    pub async fn update_user(&self, id: u64, patch: &ProfilePatch) -> ClientResult<Value> {
        self.call(&UpdateUserRequest {
            id,
            patch: patch.clone(),
        })
        .await
    }

    pub async fn change_password(&self, id: u64, change: &PasswordChange) -> ClientResult<Value> {
        self.call(&ChangePasswordRequest {
            id,
            change: change.clone(),
        })
        .await
    }

    pub async fn user_stats(&self) -> ClientResult<UserStats> {
        self.call(&UserStatsRequest).await
    }

    // --- 检测 ---

    pub async fn my_detections(&self) -> ClientResult<DetectionListing> {
        self.call(&MyDetectionsRequest).await
    }

    pub async fn detection_detail(&self, id: &str) -> ClientResult<DetectionRecord> {
        self.call(&DetectionDetailRequest { id: id.to_string() })
            .await
    }

    /// 以 multipart 表单提交新检测（title, content, 可选 image）
    pub async fn create_detection(&self, detection: &NewDetection) -> ClientResult<DetectionRecord> {
        let mut form = MultipartForm::new()
            .text("title", &detection.title)
            .text("content", &detection.content);
        if let Some(image) = &detection.image {
            form = form.file("image", &image.file_name, &image.content_type, &image.bytes);
        }
        let (content_type, body) = form.finish();

        let req = HttpRequest::new(&self.url(DETECTIONS_PATH), HttpMethod::Post)
            .with_body(&content_type, body);
        let resp = self.client.send(req).await?;
        decode(resp)
    }

    pub async fn detection_result(&self, id: &str) -> ClientResult<DetectionRecord> {
        self.call(&DetectionResultRequest { id: id.to_string() })
            .await
    }

    pub async fn detection_stats(&self, all: bool) -> ClientResult<DetectionStats> {
        self.call(&DetectionStatsRequest { all }).await
    }

    pub async fn delete_detection(&self, id: u64) -> ClientResult<()> {
        self.call(&DeleteDetectionRequest { id }).await
    }
}

fn decode<T: DeserializeOwned>(resp: HttpResponse) -> ClientResult<T> {
    if !resp.is_success() {
        return Err(ClientError::from_status(resp.status, resp.body));
    }
    resp.json()
}
