//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 每次导航（包括浏览器后退/前进）都走 "请求 -> 守卫 -> 重定向链 -> 加载" 的流程，
//! 判定逻辑本身在核心库的 `guard` 中。

use leptos::prelude::*;
use newscheck::guard::{self, ResolvedNavigation};
use newscheck::{AccessContext, AppRoute, Location, Navigator};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器地址（路径 + 查询串）
fn current_url() -> String {
    web_sys::window()
        .map(|w| w.location())
        .and_then(|l| Some(format!("{}{}", l.pathname().ok()?, l.search().unwrap_or_default())))
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

fn set_document_title(title: &str) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(title);
    }
}

/// 路由器服务
///
/// 通过 Signal 驱动界面更新；会话快照以信号形式注入，与 store 解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    location: RwSignal<Location>,
    /// 会话快照（注入的信号）
    access: Signal<AccessContext>,
    app_title: StoredValue<String>,
}

impl RouterService {
    fn new(access: Signal<AccessContext>, app_title: String) -> Self {
        let (current_route, set_route) = signal(AppRoute::Home);
        let router = Self {
            current_route,
            set_route,
            location: RwSignal::new(Location::default()),
            access,
            app_title: StoredValue::new(app_title),
        };

        // 首次加载同样要经过守卫
        router.apply(&current_url(), false);
        router
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 当前地址，页面从中读取查询参数（如登录页的 `redirect`）
    pub fn location(&self) -> Location {
        self.location.get_untracked()
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, url: &str) {
        self.apply(url, true);
    }

    /// 执行守卫并加载最终落点
    ///
    /// `use_push` 为 false 时使用 replaceState（首次加载、popstate、会话变化）
    fn apply(&self, url: &str, use_push: bool) -> ResolvedNavigation {
        let access = self.access.get_untracked();
        let nav = self
            .app_title
            .with_value(|title| guard::resolve(url, &access, title));

        if nav.redirects > 0 {
            log::info!("[Router] {} -> {}", url, nav.location);
        }

        let path = nav.location.full_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        set_document_title(&nav.title);
        self.location.set(nav.location.clone());
        self.set_route.set(nav.route.clone());
        nav
    }

    /// 浏览器后退/前进同样执行守卫
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            router.apply(&current_url(), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话变化时重新评估当前页面
    fn setup_session_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            // 只订阅 access 的变化
            let _ = router.access.get();
            let current = router.location.get_untracked().full_path();
            let nav = router.apply(&current, false);
            if nav.location.full_path() != current {
                log::debug!("[Router] session changed, moved to {}", nav.location);
            }
        });
    }
}

/// 交给 store 使用的导航器
///
/// store 在路由服务之前创建，路由服务就绪后再挂接；
/// 挂接之前的导航直接改写浏览器地址。
#[derive(Clone, Default)]
pub struct DeferredNavigator {
    router: Rc<RefCell<Option<RouterService>>>,
}

impl DeferredNavigator {
    fn attach(&self, router: RouterService) {
        *self.router.borrow_mut() = Some(router);
    }
}

impl Navigator for DeferredNavigator {
    fn navigate(&self, url: &str) {
        // 先拷出再调用，避免导航过程中重入借用
        let router = *self.router.borrow();
        match router {
            Some(router) => router.navigate(url),
            None => {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href(url);
                }
            }
        }
    }
}

fn provide_router(
    access: Signal<AccessContext>,
    app_title: String,
    navigator: DeferredNavigator,
) -> RouterService {
    let router = RouterService::new(access, app_title);

    router.init_popstate_listener();
    router.setup_session_redirect();
    navigator.attach(router);

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 会话快照信号
    access: Signal<AccessContext>,
    /// 文档标题后缀
    app_title: String,
    /// store 持有的导航器，在此挂接到路由服务
    navigator: DeferredNavigator,
    children: Children,
) -> impl IntoView {
    provide_router(access, app_title, navigator);

    children()
}

/// 路由出口组件
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而不是整页跳转
#[component]
pub fn Link(
    #[prop(into)] to: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to on:click=on_click>
            {children()}
        </a>
    }
}
