//! 全局 store
//!
//! 组合会话模块与检测模块，持有带鉴权拦截的 API 网关。
//! 由应用入口显式构造，通过引用或上下文向下传递，不存在全局单例。

use crate::api::Gateway;
use crate::config::ClientConfig;
use crate::detection::DetectionModule;
use crate::error::ClientResult;
use crate::guard::AccessContext;
use crate::interceptor::AuthInterceptor;
use crate::request::HttpClient;
use crate::route::Navigator;
use crate::session::SessionModule;
use crate::storage::{CookieStore, KeyValueStore};
use newscheck_shared::protocol::{PasswordChange, ProfilePatch, RegisterRequest};
use newscheck_shared::{
    DetectionRecord, DetectionStats, NewDetection, RegisteredUser, Role, UserProfile, UserStats,
};
use serde_json::Value;
use std::rc::Rc;

pub type AuthedGateway<C> = Gateway<AuthInterceptor<C>>;

pub struct Store<C: HttpClient> {
    api: Rc<AuthedGateway<C>>,
    session: SessionModule,
    detection: DetectionModule,
    config: ClientConfig,
}

// 手动实现：C 本身不需要 Clone
impl<C: HttpClient> Clone for Store<C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: self.session.clone(),
            detection: self.detection.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: HttpClient + 'static> Store<C> {
    /// 恢复持久化会话，并把会话拆除与导航注入拦截器
    pub fn new(
        config: ClientConfig,
        client: C,
        cookies: Rc<dyn CookieStore>,
        storage: Rc<dyn KeyValueStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let session = SessionModule::restore(config.clone(), cookies, storage, navigator.clone());
        let interceptor = AuthInterceptor::new(client, Rc::new(session.clone()), navigator);
        let api = Rc::new(Gateway::new(interceptor, config.base_url.clone()));

        Self {
            api,
            session,
            detection: DetectionModule::new(),
            config,
        }
    }
}

impl<C: HttpClient> Store<C> {
    pub fn api(&self) -> &AuthedGateway<C> {
        &self.api
    }

    pub fn session(&self) -> &SessionModule {
        &self.session
    }

    pub fn detection(&self) -> &DetectionModule {
        &self.detection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================
    // Getters
    // =========================================================

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.session.roles()
    }

    pub fn is_admin(&self) -> bool {
        self.roles().contains(&Role::Admin)
    }

    pub fn access(&self) -> AccessContext {
        self.session.access()
    }

    pub fn detection_history(&self) -> Vec<DetectionRecord> {
        self.detection.history()
    }

    pub fn detection_stats(&self) -> DetectionStats {
        self.detection.stats()
    }

    pub fn current_detection(&self) -> Option<DetectionRecord> {
        self.detection.current()
    }

    // =========================================================
    // Session actions
    // =========================================================

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        self.session.login(&self.api, username, password).await
    }

    pub async fn get_user_info(&self) -> ClientResult<UserProfile> {
        self.session.get_user_info(&self.api).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> ClientResult<RegisteredUser> {
        self.session.register(&self.api, payload).await
    }

    pub async fn update_user_info(&self, patch: &ProfilePatch) -> ClientResult<UserProfile> {
        self.session.update_user_info(&self.api, patch).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ClientResult<Value> {
        self.session.change_password(&self.api, change).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// 用户总量统计（管理员）
    pub async fn user_stats(&self) -> ClientResult<UserStats> {
        self.api.user_stats().await
    }

    // =========================================================
    // Detection actions
    // =========================================================

    pub async fn get_detection_history(&self) -> ClientResult<Vec<DetectionRecord>> {
        self.detection.get_detection_history(&self.api).await
    }

    pub async fn get_detection_detail(&self, id: Option<&str>) -> ClientResult<DetectionRecord> {
        self.detection.get_detection_detail(&self.api, id).await
    }

    pub async fn create_detection(&self, detection: &NewDetection) -> ClientResult<DetectionRecord> {
        self.detection.create_detection(&self.api, detection).await
    }

    pub async fn get_detection_result(&self, id: &str) -> ClientResult<DetectionRecord> {
        self.detection.get_detection_result(&self.api, id).await
    }

    /// `all` 为 true 时查看全站数据（仅管理员），否则只看自己的
    pub async fn get_detection_stats(&self, all: bool) -> ClientResult<DetectionStats> {
        self.detection.get_detection_stats(&self.api, all).await
    }

    pub async fn delete_detection(&self, id: u64) -> ClientResult<()> {
        self.detection.delete_detection(&self.api, id).await
    }
}
