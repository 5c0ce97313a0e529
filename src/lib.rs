//! 虚假新闻检测系统的客户端核心
//!
//! 与 UI 框架无关：会话与检测状态、带鉴权拦截的 API 网关、路由守卫。
//! 浏览器相关的实现（fetch、cookie、localStorage、history）由前端壳注入。

pub mod api;
pub mod config;
pub mod detection;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod multipart;
pub mod request;
pub mod route;
pub mod session;
pub mod storage;
pub mod store;

pub use api::Gateway;
pub use config::ClientConfig;
pub use detection::{DetectionModule, DetectionMutation, DetectionState};
pub use error::{ClientError, ClientResult};
pub use guard::{AccessContext, GuardDecision, GuardOutcome, ResolvedNavigation};
pub use interceptor::{AuthInterceptor, SessionAccess};
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use route::{AppRoute, Location, Navigator, RouteMeta};
pub use session::{SessionModule, SessionMutation, SessionState};
pub use storage::{CookieStore, KeyValueStore, MemoryStorage};
pub use store::{AuthedGateway, Store};

pub use newscheck_shared as shared;
