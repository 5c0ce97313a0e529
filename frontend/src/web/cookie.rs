//! Cookie 封装模块
//!
//! 直接读写 `document.cookie`，实现核心库的 [`CookieStore`]。

use newscheck::CookieStore;
use wasm_bindgen::JsCast;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Clone, Copy, Default)]
pub struct BrowserCookies;

impl BrowserCookies {
    fn document() -> Option<web_sys::HtmlDocument> {
        web_sys::window()?.document()?.dyn_into().ok()
    }

    fn write(raw: &str) -> bool {
        Self::document()
            .and_then(|doc| doc.set_cookie(raw).ok())
            .is_some()
    }
}

impl CookieStore for BrowserCookies {
    fn get(&self, name: &str) -> Option<String> {
        let all = Self::document()?.cookie().ok()?;
        all.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| {
                js_sys::decode_uri_component(value)
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_else(|| value.to_string())
            })
        })
    }

    fn set(&self, name: &str, value: &str, expires_in_days: u32) -> bool {
        let expires = js_sys::Date::new_0();
        expires.set_time(expires.get_time() + f64::from(expires_in_days) * MS_PER_DAY);
        let encoded: String = js_sys::encode_uri_component(value).into();

        Self::write(&format!(
            "{}={}; expires={}; path=/",
            name,
            encoded,
            String::from(expires.to_utc_string())
        ))
    }

    fn remove(&self, name: &str) -> bool {
        Self::write(&format!(
            "{}=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/",
            name
        ))
    }
}
