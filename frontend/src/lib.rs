//! 虚假新闻检测系统前端
//!
//! 核心逻辑（store、守卫、API）都在 `newscheck` 中，这里只负责接入浏览器：
//! - `web::router`: 路由服务（History API + 守卫）
//! - `web::{http, cookie, storage}`: 核心库接口的浏览器实现
//! - `components`: UI 组件层

mod components {
    pub mod login;
    pub mod pages;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod console;
    mod cookie;
    mod http;
    pub mod router;
    mod storage;

    pub use cookie::BrowserCookies;
    pub use http::WebHttpClient;
    pub use storage::BrowserStorage;
}

use crate::components::login::LoginPage;
use crate::components::pages::{NotFoundPage, PlaceholderPage};
use leptos::prelude::*;
use newscheck::{AppRoute, ClientConfig, Store};
use std::rc::Rc;
use web::router::{DeferredNavigator, Router, RouterOutlet};
use web::{BrowserCookies, BrowserStorage, WebHttpClient};

/// 安装控制台日志，debug 构建输出更详细的守卫与请求日志
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    web::console::init(level);
}

pub type AppStore = Store<WebHttpClient>;

/// store 的上下文句柄
///
/// store 内部基于 `Rc`，这里用本地存储的 StoredValue 包一层以便放入 Context。
#[derive(Clone, Copy)]
pub struct StoreContext(StoredValue<AppStore, LocalStorage>);

impl StoreContext {
    pub fn get(&self) -> AppStore {
        self.0.get_value()
    }
}

/// 从 Context 获取 store
pub fn use_store() -> StoreContext {
    use_context::<StoreContext>().expect("StoreContext should be provided")
}

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
        other => view! { <PlaceholderPage route=other /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_build_env();
    log::info!("[App] API base: {}", config.base_url);

    // 1. 创建 store（从 cookie/localStorage 恢复会话）
    let navigator = DeferredNavigator::default();
    let store = Store::new(
        config.clone(),
        WebHttpClient,
        Rc::new(BrowserCookies),
        Rc::new(BrowserStorage),
        Rc::new(navigator.clone()),
    );

    // 2. 会话快照信号，每次提交后刷新，用于注入路由服务
    let access = RwSignal::new(store.access());
    store
        .session()
        .subscribe(move |state| access.set(state.access()));

    provide_context(StoreContext(StoredValue::new_local(store)));

    view! {
        <Router access=Signal::from(access) app_title=config.app_title navigator=navigator>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
