//! 其余页面的占位视图
//!
//! 展示页面标题、侧边菜单与当前用户，提供登出入口；具体页面内容不在这里实现。

use crate::use_store;
use crate::web::router::Link;
use leptos::prelude::*;
use newscheck::AppRoute;

#[component]
pub fn PlaceholderPage(route: AppRoute) -> impl IntoView {
    let store = use_store();
    let title = route.meta().title.unwrap_or("首页");
    let user = store.get().user().map(|u| u.display_name());
    let is_anonymous = user.is_none() && store.get().token().is_none();
    let menu = if is_anonymous {
        Vec::new()
    } else {
        AppRoute::menu(store.get().is_admin())
    };

    let on_logout = move |_| store.get().logout();

    view! {
        <div class="min-h-screen bg-base-200 p-8">
            <div class="navbar bg-base-100 rounded-box shadow mb-6">
                <div class="flex-1">
                    <span class="text-xl font-bold">{title}</span>
                </div>
                <div class="flex-none gap-2">
                    {match user {
                        Some(name) => view! {
                            <span class="text-sm">{name}</span>
                            <button class="btn btn-ghost btn-sm" on:click=on_logout>"退出登录"</button>
                        }.into_any(),
                        None if is_anonymous => view! {
                            <Link to=AppRoute::Login.to_path()>"登录"</Link>
                        }.into_any(),
                        None => view! {
                            <button class="btn btn-ghost btn-sm" on:click=on_logout>"退出登录"</button>
                        }.into_any(),
                    }}
                </div>
            </div>
            <div class="flex gap-6">
                <ul class="menu bg-base-100 rounded-box w-56">
                    {menu
                        .into_iter()
                        .map(|item| {
                            let label = item.meta().title.unwrap_or_default();
                            view! { <li><Link to=item.to_path()>{label}</Link></li> }
                        })
                        .collect_view()}
                </ul>
                <p class="text-base-content/70">{route.to_string()}</p>
            </div>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"页面未找到"</p>
                <Link to=AppRoute::Home.to_path()>"返回首页"</Link>
            </div>
        </div>
    }
}
