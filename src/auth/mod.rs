//! 登录态检查
//!
//! 引擎只把 [`AuthGate`] 当作能力检查来用：是否已登录、当前 bearer token。
//! token 缺失与未登录等价。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub trait AuthGate: Send + Sync {
    fn is_logged_in(&self) -> bool;

    /// 未登录时必须返回 `None`
    fn get_token(&self) -> Option<String>;
}

/// JWT payload 中唯一关心的字段
#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<u64>,
}

/// 持有一个可选 JWT 的登录态
///
/// 有 token 且 payload 中的 `exp` 晚于当前时间才算已登录；
/// payload 无法解码视为过期，没有 `exp` 视为永不过期。
#[derive(Default)]
pub struct SessionAuth {
    token: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn login(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
            info!("🔑 已登录");
        }
    }

    pub fn logout(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
            info!("已登出");
        }
    }

    fn current(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

impl AuthGate for SessionAuth {
    fn is_logged_in(&self) -> bool {
        self.current()
            .map(|token| !is_expired(&token, now_secs()))
            .unwrap_or(false)
    }

    fn get_token(&self) -> Option<String> {
        self.current().filter(|token| !is_expired(token, now_secs()))
    }
}

fn is_expired(token: &str, now: u64) -> bool {
    match decode_claims(token) {
        Some(Claims { exp: Some(exp) }) => exp <= now,
        Some(Claims { exp: None }) => false,
        None => {
            debug!("token payload 无法解码，按过期处理");
            true
        }
    }
}

fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_no_token_is_logged_out() {
        let auth = SessionAuth::new();
        assert!(!auth.is_logged_in());
        assert!(auth.get_token().is_none());
    }

    #[test]
    fn test_valid_token() {
        let token = jwt(&format!(r#"{{"data":{{"username":"bilbo"}},"exp":{}}}"#, now_secs() + 3600));
        let auth = SessionAuth::with_token(token.clone());
        assert!(auth.is_logged_in());
        assert_eq!(auth.get_token(), Some(token));
    }

    #[test]
    fn test_expired_token_is_absent() {
        let token = jwt(&format!(r#"{{"exp":{}}}"#, now_secs() - 60));
        let auth = SessionAuth::with_token(token);
        assert!(!auth.is_logged_in());
        assert!(auth.get_token().is_none());
    }

    #[test]
    fn test_garbage_token_is_logged_out() {
        let auth = SessionAuth::with_token("not-a-jwt");
        assert!(!auth.is_logged_in());
        assert!(auth.get_token().is_none());
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        assert!(!is_expired(&jwt(r#"{"sub":"1"}"#), u64::MAX));
    }

    #[test]
    fn test_login_logout() {
        let auth = SessionAuth::new();
        auth.login(jwt(r#"{"sub":"1"}"#));
        assert!(auth.is_logged_in());
        auth.logout();
        assert!(!auth.is_logged_in());
    }
}
