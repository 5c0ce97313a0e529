//! 全局前置守卫
//!
//! 每次导航都经过 "评估 -> 放行 | 重定向" 的判定，规则按顺序匹配，首条命中即生效：
//!
//! 1. 已登录访问首页 -> `/dashboard/index`
//! 2. 管理员区域：未登录 -> 登录页（带 `redirect`）；非管理员 -> `/404`；否则放行
//! 3. 无需登录的页面 -> 放行
//! 4. 未登录 -> 登录页（带 `redirect`）
//! 5. 其余 -> 放行
//!
//! 无论结果如何，都会给出本次导航的文档标题。

use crate::route::{AppRoute, Location};
use newscheck_shared::Role;

/// 重定向链的最大跳数
const MAX_REDIRECTS: usize = 8;

/// 守卫所需的会话快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessContext {
    pub has_token: bool,
    pub roles: Vec<Role>,
}

impl AccessContext {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// 单次评估的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Location),
}

/// 单次评估的结果：终态 + 文档标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub decision: GuardDecision,
    pub title: String,
}

/// 文档标题：`<页面标题> - <应用名>`，没有页面标题时只用应用名
pub fn document_title(route: &AppRoute, app_title: &str) -> String {
    match route.meta().title {
        Some(title) => format!("{} - {}", title, app_title),
        None => app_title.to_string(),
    }
}

fn login_redirect(target: &Location) -> GuardDecision {
    GuardDecision::Redirect(
        Location::from(AppRoute::Login).with_query("redirect", &target.full_path()),
    )
}

/// **核心方法：评估一次导航**
pub fn evaluate(target: &Location, access: &AccessContext, app_title: &str) -> GuardOutcome {
    let route = target.route();
    let meta = route.meta();
    let title = document_title(&route, app_title);

    let decision = if route == AppRoute::Home && access.has_token {
        GuardDecision::Redirect(AppRoute::Dashboard.into())
    } else if meta.requires_admin {
        if !access.has_token {
            login_redirect(target)
        } else if !access.is_admin() {
            // 不跳登录页，避免暴露受限区域的存在
            GuardDecision::Redirect(AppRoute::NotFound.into())
        } else {
            GuardDecision::Proceed
        }
    } else if meta.no_auth {
        GuardDecision::Proceed
    } else if !access.has_token {
        login_redirect(target)
    } else {
        GuardDecision::Proceed
    };

    GuardOutcome { decision, title }
}

/// 一次完整导航（含重定向链）的最终落点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNavigation {
    pub route: AppRoute,
    pub location: Location,
    pub title: String,
    /// 经过的重定向次数（含路由表自身的父级/未知路径重定向）
    pub redirects: usize,
}

/// 从请求的 URL 出发，反复执行守卫直到放行
///
/// 路由表层面的重定向（`/dashboard`、`/admin`、未知路径）先于守卫生效，
/// 与浏览器地址栏最终显示的规范路径一致。
pub fn resolve(url: &str, access: &AccessContext, app_title: &str) -> ResolvedNavigation {
    let mut location = Location::parse(url);
    let mut redirects = 0;

    loop {
        let route = location.route();
        let canonical = route.to_path();
        if canonical != location.path {
            // `/dashboard/` 之类仅差末尾斜杠的路径不算重定向
            if location.path.trim_end_matches('/') != canonical {
                redirects += 1;
            }
            location.path = canonical;
        }

        let outcome = evaluate(&location, access, app_title);
        match outcome.decision {
            GuardDecision::Proceed => {
                log::debug!("[Guard] proceed to {}", location);
                return ResolvedNavigation {
                    route,
                    location,
                    title: outcome.title,
                    redirects,
                };
            }
            GuardDecision::Redirect(next) => {
                log::debug!("[Guard] {} redirected to {}", location, next);
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    log::error!("[Guard] redirect loop detected at {}", location);
                    let route = AppRoute::NotFound;
                    return ResolvedNavigation {
                        title: document_title(&route, app_title),
                        location: route.clone().into(),
                        route,
                        redirects,
                    };
                }
                location = next;
            }
        }
    }
}
