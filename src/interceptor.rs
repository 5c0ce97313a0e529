//! HTTP 拦截层
//!
//! 包装任意 [`HttpClient`]：
//! - 请求：会话中有 token 时附加 `Authorization: Bearer <token>`，没有则不加，绝不因此失败
//! - 响应：401 时同步拆除会话、跳转登录页，然后仍以 `Unauthorized` 拒绝原请求
//!
//! 会话与导航都以注入的方式提供，HTTP 层不直接依赖 store 或路由。

use crate::error::{ClientError, ClientResult};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::route::{AppRoute, Navigator};
use newscheck_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION};
use std::rc::Rc;

/// 拦截器对会话的最小依赖
pub trait SessionAccess {
    fn bearer_token(&self) -> Option<String>;
    /// 清空会话（不负责导航）
    fn teardown(&self);
}

pub struct AuthInterceptor<C: HttpClient> {
    inner: C,
    session: Rc<dyn SessionAccess>,
    navigator: Rc<dyn Navigator>,
}

impl<C: HttpClient> AuthInterceptor<C> {
    pub fn new(inner: C, session: Rc<dyn SessionAccess>, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            inner,
            session,
            navigator,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> HttpClient for AuthInterceptor<C> {
    async fn send(&self, mut req: HttpRequest) -> ClientResult<HttpResponse> {
        if let Some(token) = self.session.bearer_token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token));
        }

        let url = req.url.clone();
        let resp = self.inner.send(req).await?;

        if resp.status == 401 {
            log::warn!("[Http] 401 from {}, clearing session", url);
            self.session.teardown();
            self.navigator.navigate(&AppRoute::Login.to_path());
            return Err(ClientError::Unauthorized(resp.body));
        }

        Ok(resp)
    }
}
