//! 会话 store 模块
//!
//! 管理 token 与用户资料：
//! - token 是"已登录"的唯一依据，持久化到 cookie（默认 7 天过期）
//! - 用户资料持久化到 localStorage（不过期，可能陈旧）
//! - 角色是用户资料的纯投影，从不单独保存
//!
//! 状态只能通过 [`SessionMutation`] 提交修改。

use crate::api::Gateway;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::guard::AccessContext;
use crate::interceptor::SessionAccess;
use crate::request::HttpClient;
use crate::route::{AppRoute, Navigator};
use crate::storage::{CookieStore, KeyValueStore};
use newscheck_shared::protocol::{PasswordChange, ProfilePatch, RegisterRequest};
use newscheck_shared::{RegisteredUser, Role, UserProfile};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// 会话状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionState {
    /// 空字符串 token 视为未登录
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn roles(&self) -> Vec<Role> {
        self.user.as_ref().map(UserProfile::roles).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.roles().contains(&Role::Admin)
    }

    pub fn access(&self) -> AccessContext {
        AccessContext {
            has_token: self.has_token(),
            roles: self.roles(),
        }
    }
}

/// 会话状态的全部修改入口
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMutation {
    SetToken(Option<String>),
    SetUser(Option<UserProfile>),
    /// 一次性清空 token 与资料，订阅者只收到一次通知
    Clear,
}

type Subscriber = Rc<dyn Fn(&SessionState)>;

struct SessionInner {
    state: RefCell<SessionState>,
    config: ClientConfig,
    cookies: Rc<dyn CookieStore>,
    storage: Rc<dyn KeyValueStore>,
    navigator: Rc<dyn Navigator>,
    subscribers: RefCell<Vec<Subscriber>>,
}

/// 会话模块句柄，克隆后共享同一份状态
#[derive(Clone)]
pub struct SessionModule {
    inner: Rc<SessionInner>,
}

impl SessionModule {
    /// 从持久化存储恢复会话
    ///
    /// localStorage 中的资料损坏时按空资料处理，不会失败。
    pub fn restore(
        config: ClientConfig,
        cookies: Rc<dyn CookieStore>,
        storage: Rc<dyn KeyValueStore>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let token = cookies
            .get(&config.token_cookie)
            .filter(|t| !t.is_empty());
        let user = storage
            .get(&config.user_storage_key)
            .and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("[Session] ignoring malformed stored profile: {}", e);
                    None
                }
            });

        Self {
            inner: Rc::new(SessionInner {
                state: RefCell::new(SessionState { token, user }),
                config,
                cookies,
                storage,
                navigator,
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    // --- 读取 ---

    /// 当前状态快照
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        let state = self.inner.state.borrow();
        state.has_token().then(|| state.token.clone()).flatten()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.inner.state.borrow().roles()
    }

    pub fn access(&self) -> AccessContext {
        self.inner.state.borrow().access()
    }

    /// 订阅每一次提交（提交完成后以新状态回调）
    pub fn subscribe(&self, subscriber: impl Fn(&SessionState) + 'static) {
        self.inner
            .subscribers
            .borrow_mut()
            .push(Rc::new(subscriber));
    }

    // --- 修改 ---

    pub fn commit(&self, mutation: SessionMutation) {
        {
            let mut state = self.inner.state.borrow_mut();
            match mutation {
                SessionMutation::SetToken(token) => state.token = token,
                SessionMutation::SetUser(user) => state.user = user,
                SessionMutation::Clear => *state = SessionState::default(),
            }
        }
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.state();
        // 先克隆列表，回调中允许再次订阅
        let subscribers: Vec<Subscriber> = self.inner.subscribers.borrow().clone();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }

    fn persist_user(&self, user: &UserProfile) -> ClientResult<()> {
        let raw = serde_json::to_string(user).map_err(|e| ClientError::Encode(e.to_string()))?;
        if !self.inner.storage.set(&self.inner.config.user_storage_key, &raw) {
            log::warn!("[Session] failed to persist user profile");
        }
        Ok(())
    }

    fn current_user_id(&self) -> ClientResult<u64> {
        self.inner
            .state
            .borrow()
            .user
            .as_ref()
            .map(|u| u.id)
            .ok_or_else(|| ClientError::invalid_input("no user profile loaded"))
    }

    // --- Actions ---

    /// 登录：保存 access token 到状态和 cookie
    pub async fn login<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        username: &str,
        password: &str,
    ) -> ClientResult<()> {
        log::info!("[Session] login as {}", username);
        let pair = api.login(username, password).await.inspect_err(|e| {
            log::warn!("[Session] login failed for {}: {}", username, e);
        })?;

        self.commit(SessionMutation::SetToken(Some(pair.access.clone())));
        let cfg = &self.inner.config;
        if !self
            .inner
            .cookies
            .set(&cfg.token_cookie, &pair.access, cfg.token_expiry_days)
        {
            log::warn!("[Session] failed to persist token cookie");
        }
        Ok(())
    }

    /// 拉取当前用户资料并推导角色
    pub async fn get_user_info<C: HttpClient>(&self, api: &Gateway<C>) -> ClientResult<UserProfile> {
        let user = api.current_user().await?;
        self.commit(SessionMutation::SetUser(Some(user.clone())));
        self.persist_user(&user)?;
        log::debug!(
            "[Session] profile loaded for {} (roles: {:?})",
            user.username,
            user.roles()
        );
        Ok(user)
    }

    /// 注册新账号，不影响当前会话
    pub async fn register<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        payload: &RegisterRequest,
    ) -> ClientResult<RegisteredUser> {
        api.register(payload).await
    }

    /// 部分更新当前用户，服务端返回的字段覆盖本地副本
    pub async fn update_user_info<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        patch: &ProfilePatch,
    ) -> ClientResult<UserProfile> {
        let id = self.current_user_id()?;
        let response = api.update_user(id, patch).await?;

        // 以响应到达时的本地资料为准进行合并
        let merged = UserProfile::merge(self.user().as_ref(), response)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.commit(SessionMutation::SetUser(Some(merged.clone())));
        self.persist_user(&merged)?;
        Ok(merged)
    }

    /// 修改密码，不改动本地状态
    pub async fn change_password<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        change: &PasswordChange,
    ) -> ClientResult<Value> {
        let id = self.current_user_id()?;
        api.change_password(id, change).await
    }

    /// 清空内存状态与持久化存储（不导航）
    pub fn clear(&self) {
        self.commit(SessionMutation::Clear);
        let cfg = &self.inner.config;
        self.inner.cookies.remove(&cfg.token_cookie);
        self.inner.storage.delete(&cfg.user_storage_key);
    }

    /// 登出：唯一的拆除路径，可重复调用
    pub fn logout(&self) {
        log::info!("[Session] logout");
        self.clear();
        self.inner.navigator.navigate(&AppRoute::Login.to_path());
    }
}

impl SessionAccess for SessionModule {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn teardown(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests;
