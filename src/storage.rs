//! 持久化抽象
//!
//! 会话 token 存在 cookie 中（带过期时间），用户资料存在 localStorage 中（不过期）。
//! 浏览器实现在前端壳里，这里只定义接口与一个内存实现。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 键值存储（对应浏览器 localStorage）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

/// Cookie 存储
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str, expires_in_days: u32) -> bool;
    fn remove(&self, name: &str) -> bool;
}

/// 内存实现，克隆后共享同一份数据
///
/// 用于测试，也用于没有浏览器存储可用的环境。
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    cookies: Rc<RefCell<HashMap<String, (String, u32)>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// cookie 设置时的有效天数
    pub fn cookie_expiry(&self, name: &str) -> Option<u32> {
        self.cookies.borrow().get(name).map(|(_, days)| *days)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

impl CookieStore for MemoryStorage {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.borrow().get(name).map(|(v, _)| v.clone())
    }

    fn set(&self, name: &str, value: &str, expires_in_days: u32) -> bool {
        self.cookies
            .borrow_mut()
            .insert(name.to_string(), (value.to_string(), expires_in_days));
        true
    }

    fn remove(&self, name: &str) -> bool {
        self.cookies.borrow_mut().remove(name);
        true
    }
}
