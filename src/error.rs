use thiserror::Error;

// =========================================================
// 客户端错误类型
// =========================================================

/// 所有 store action 与 API 调用共用的错误类型
///
/// - `Network`: 传输层失败（请求未得到响应）
/// - `Unauthorized`: 401，由拦截器统一处理后仍向调用方抛出
/// - `InvalidInput`: 发请求之前的本地校验失败
/// - `Server`: 其余 4xx/5xx，原样交给调用方
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("认证失败: {0}")]
    Unauthorized(String),

    #[error("参数无效: {0}")]
    InvalidInput(String),

    #[error("服务端错误 {status}: {body}")]
    Server { status: u16, body: String },

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("请求构建失败: {0}")]
    Encode(String),
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 按响应状态码构造错误
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if status == 401 {
            Self::Unauthorized(body)
        } else {
            Self::Server { status, body }
        }
    }

    /// 对应的 HTTP 状态码（本地错误没有状态码）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::InvalidInput(_) => "INVALID_INPUT",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Encode(_) => "ENCODE_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(ClientError::from_status(401, "expired").is_unauthorized());

        let err = ClientError::from_status(503, "down");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.error_code(), "SERVER_ERROR");
        assert_eq!(err.to_string(), "服务端错误 503: down");
    }

    #[test]
    fn test_local_errors_have_no_status() {
        let err = ClientError::invalid_input("bad id");
        assert_eq!(err.status_code(), None);
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
