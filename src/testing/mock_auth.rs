use crate::auth::AuthGate;
use std::sync::Mutex;

/// 直接设定登录态的 Mock，不解析 token
pub struct MockAuthGate {
    logged_in: Mutex<bool>,
    token: Mutex<Option<String>>,
}

impl MockAuthGate {
    pub fn logged_in(token: impl Into<String>) -> Self {
        Self {
            logged_in: Mutex::new(true),
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            logged_in: Mutex::new(false),
            token: Mutex::new(None),
        }
    }

    /// 声称已登录却拿不到 token，应按未登录处理
    pub fn without_token() -> Self {
        Self {
            logged_in: Mutex::new(true),
            token: Mutex::new(None),
        }
    }

    pub fn set_logged_in(&self, token: Option<String>) {
        *self.logged_in.lock().unwrap() = token.is_some();
        *self.token.lock().unwrap() = token;
    }
}

impl AuthGate for MockAuthGate {
    fn is_logged_in(&self) -> bool {
        *self.logged_in.lock().unwrap()
    }

    fn get_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}
