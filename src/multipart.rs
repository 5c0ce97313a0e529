//! multipart/form-data 编码
//!
//! 创建检测时需要同时上传文本字段与可选的图片，这里手工拼装请求体，
//! 以便同一份字节既能交给浏览器 fetch，也能在测试中直接检查。

use uuid::Uuid;

const CRLF: &[u8] = b"\r\n";

pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("----newscheck-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// 追加文本字段
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!("form-data; name=\"{}\"", escape(name)), None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF);
        self
    }

    /// 追加文件字段
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.open_part(
            &format!(
                "form-data; name=\"{}\"; filename=\"{}\"",
                escape(name),
                escape(file_name)
            ),
            Some(content_type),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(CRLF);
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// 写入结束分隔符，返回 (Content-Type, 请求体)
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = self.content_type();
        self.body
            .extend_from_slice(format!("--{}--", self.boundary).as_bytes());
        self.body.extend_from_slice(CRLF);
        (content_type, self.body)
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        self.body
            .extend_from_slice(format!("--{}", self.boundary).as_bytes());
        self.body.extend_from_slice(CRLF);
        self.body
            .extend_from_slice(format!("Content-Disposition: {}", disposition).as_bytes());
        self.body.extend_from_slice(CRLF);
        if let Some(ct) = content_type {
            self.body
                .extend_from_slice(format!("Content-Type: {}", ct).as_bytes());
            self.body.extend_from_slice(CRLF);
        }
        self.body.extend_from_slice(CRLF);
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
