//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路由元信息以及带查询参数的位置。

use std::fmt::Display;

/// 导航服务接口
///
/// 浏览器端由路由服务实现（会经过守卫），测试中用记录型实现替代。
pub trait Navigator {
    fn navigate(&self, url: &str);
}

/// 路由元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    /// 页面标题
    pub title: Option<&'static str>,
    /// 无需登录即可访问
    pub no_auth: bool,
    /// 需要管理员角色（挂在 `/admin` 下的所有子路由）
    pub requires_admin: bool,
    /// 不出现在菜单中
    pub hide_in_menu: bool,
}

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页 (默认路由)
    #[default]
    Home,
    Login,
    Register,
    /// 仪表盘 `/dashboard/index`，`/dashboard` 重定向到这里
    Dashboard,
    DetectionCreate,
    DetectionHistory,
    DetectionDetail(String),
    Profile,
    /// 管理后台 `/admin/dashboard`，`/admin` 重定向到这里
    AdminDashboard,
    AdminUsers,
    AdminSettings,
    AdminDetectionList,
    AdminDetectionDetail(String),
    AdminDetectionStats,
    AdminLogs,
    /// 页面未找到，未知路径都重定向到这里
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 末尾的 `/` 会被忽略；父级路径解析为其默认子路由。
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] | ["dashboard", "index"] => Self::Dashboard,
            ["dashboard", "detection", "create"] => Self::DetectionCreate,
            ["dashboard", "detection", "history"] => Self::DetectionHistory,
            ["dashboard", "detection", "detail", id] => Self::DetectionDetail(id.to_string()),
            ["dashboard", "profile"] => Self::Profile,
            ["admin"] | ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "settings"] => Self::AdminSettings,
            ["admin", "detection", "list"] => Self::AdminDetectionList,
            ["admin", "detection", "detail", id] => Self::AdminDetectionDetail(id.to_string()),
            ["admin", "detection-stats"] => Self::AdminDetectionStats,
            ["admin", "logs"] => Self::AdminLogs,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的规范 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard/index".to_string(),
            Self::DetectionCreate => "/dashboard/detection/create".to_string(),
            Self::DetectionHistory => "/dashboard/detection/history".to_string(),
            Self::DetectionDetail(id) => format!("/dashboard/detection/detail/{}", id),
            Self::Profile => "/dashboard/profile".to_string(),
            Self::AdminDashboard => "/admin/dashboard".to_string(),
            Self::AdminUsers => "/admin/users".to_string(),
            Self::AdminSettings => "/admin/settings".to_string(),
            Self::AdminDetectionList => "/admin/detection/list".to_string(),
            Self::AdminDetectionDetail(id) => format!("/admin/detection/detail/{}", id),
            Self::AdminDetectionStats => "/admin/detection-stats".to_string(),
            Self::AdminLogs => "/admin/logs".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫数据：路由元信息**
    pub fn meta(&self) -> RouteMeta {
        let (title, no_auth, hide_in_menu) = match self {
            Self::Home => ("首页", true, false),
            Self::Login => ("登录", true, false),
            Self::Register => ("注册", true, false),
            Self::Dashboard => ("仪表盘", false, false),
            Self::DetectionCreate => ("新闻检测", false, false),
            Self::DetectionHistory => ("检测历史", false, false),
            Self::DetectionDetail(_) => ("检测详情", false, true),
            Self::Profile => ("个人中心", false, false),
            Self::AdminDashboard => ("控制面板", false, false),
            Self::AdminUsers => ("用户列表", false, false),
            Self::AdminSettings => ("系统设置", false, false),
            Self::AdminDetectionList => ("检测列表", false, false),
            Self::AdminDetectionDetail(_) => ("检测详情", false, true),
            Self::AdminDetectionStats => ("检测统计", false, false),
            Self::AdminLogs => ("系统日志", false, false),
            Self::NotFound => ("页面不存在", true, true),
        };

        RouteMeta {
            title: Some(title),
            no_auth,
            requires_admin: self.is_admin_area(),
            hide_in_menu,
        }
    }

    /// 侧边菜单项：去掉隐藏的与无需登录的页面，非管理员看不到管理区
    pub fn menu(is_admin: bool) -> Vec<AppRoute> {
        [
            Self::Dashboard,
            Self::DetectionCreate,
            Self::DetectionHistory,
            Self::Profile,
            Self::AdminDashboard,
            Self::AdminUsers,
            Self::AdminSettings,
            Self::AdminDetectionList,
            Self::AdminDetectionStats,
            Self::AdminLogs,
        ]
        .into_iter()
        .filter(|route| {
            let meta = route.meta();
            !meta.hide_in_menu && !meta.no_auth && (is_admin || !meta.requires_admin)
        })
        .collect()
    }

    fn is_admin_area(&self) -> bool {
        matches!(
            self,
            Self::AdminDashboard
                | Self::AdminUsers
                | Self::AdminSettings
                | Self::AdminDetectionList
                | Self::AdminDetectionDetail(_)
                | Self::AdminDetectionStats
                | Self::AdminLogs
        )
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// Location - 路径 + 查询参数
// =========================================================

/// 一次导航的目标位置
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// 解析 `/path?a=1&b=2` 形式的 URL（片段 `#...` 会被丢弃）
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = match url.split_once('?') {
            Some((p, q)) => (p, q),
            None => (url, ""),
        };

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 完整路径（含编码后的查询参数）
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }

    pub fn route(&self) -> AppRoute {
        AppRoute::from_path(&self.path)
    }
}

impl From<AppRoute> for Location {
    fn from(route: AppRoute) -> Self {
        Location::new(route.to_path())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

/// 查询参数编码，保留 RFC 3986 unreserved 字符
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                // from_str_radix 接受前导 `+`，这里要求两位都是十六进制数字
                let digits = &bytes[i + 1..i + 3];
                let hex = digits
                    .iter()
                    .all(u8::is_ascii_hexdigit)
                    .then(|| std::str::from_utf8(digits).ok())
                    .flatten();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// =========================================================
// 测试工具: RecordingNavigator
// =========================================================

#[cfg(test)]
#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visits.borrow_mut().push(url.to_string());
    }
}
