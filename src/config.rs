// =========================================================
// 运行时配置 (Runtime Configuration)
// =========================================================

/// 这些是默认值，构建时可通过环境变量 `NEWSCHECK_API_URL` 覆盖 API 地址
const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TOKEN_COOKIE: &str = "mm_dfd_token";
const DEFAULT_USER_STORAGE_KEY: &str = "mm_dfd_user";
const DEFAULT_TOKEN_EXPIRY_DAYS: u32 = 7;
const DEFAULT_APP_TITLE: &str = "虚假新闻检测系统";

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API 根地址（不带末尾 `/`）
    pub base_url: String,
    /// 保存 token 的 cookie 名
    pub token_cookie: String,
    /// 保存用户资料的 localStorage 键
    pub user_storage_key: String,
    /// token cookie 的有效天数
    pub token_expiry_days: u32,
    /// 文档标题后缀
    pub app_title: String,
}

impl ClientConfig {
    /// 读取构建时环境变量，读不到就用默认值
    pub fn from_build_env() -> Self {
        let base_url = option_env!("NEWSCHECK_API_URL")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_URL);

        Self {
            base_url: normalize_base_url(base_url),
            token_cookie: DEFAULT_TOKEN_COOKIE.to_string(),
            user_storage_key: DEFAULT_USER_STORAGE_KEY.to_string(),
            token_expiry_days: DEFAULT_TOKEN_EXPIRY_DAYS,
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    pub fn with_token_cookie(mut self, name: impl Into<String>) -> Self {
        self.token_cookie = name.into();
        self
    }

    pub fn with_user_storage_key(mut self, key: impl Into<String>) -> Self {
        self.user_storage_key = key.into();
        self
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
