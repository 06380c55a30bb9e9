//! Authentication
//!
//! 계정 관리(가입, 로그인, 소셜 로그인)는 외부 인증 서비스가 담당하고,
//! 이 서버는 HS256 Bearer 토큰만 검증한다. 검증된 토큰은 요청 단위
//! 사용자 컨텍스트(`AuthUser`)가 되어 핸들러와 서비스에 명시적으로 전달된다.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, AppState};

/// 토큰 claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: usize,
}

/// 인증된 사용자 (요청 컨텍스트)
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl AuthUser {
    /// 본인 소유 리소스이거나 관리자인지
    pub fn can_access(&self, owner_id: Option<i64>) -> bool {
        self.is_admin || owner_id == Some(self.user_id)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// 관리자 전용 엔드포인트용 extractor
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(claims.into())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = user.user_id, "Admin endpoint accessed by non-admin");
            return Err(ApiError::Forbidden("관리자 권한이 필요합니다".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// 토큰 검증
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        ApiError::Unauthorized
    })
}

/// 토큰 발급 (인증 서비스 / 테스트 / 운영 스크립트용)
pub fn issue_token(
    user_id: i64,
    username: &str,
    is_admin: bool,
    secret: &str,
    ttl: Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        is_admin,
        exp: (Utc::now() + ttl).timestamp() as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(7, "kim", false, "secret", Duration::hours(1)).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "kim");
        assert!(!claims.is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(7, "kim", true, "secret", Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_token(&token, "other"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(7, "kim", false, "secret", Duration::hours(-2)).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn test_can_access() {
        let user = AuthUser { user_id: 1, username: "a".into(), is_admin: false };
        assert!(user.can_access(Some(1)));
        assert!(!user.can_access(Some(2)));
        assert!(!user.can_access(None));

        let admin = AuthUser { user_id: 9, username: "root".into(), is_admin: true };
        assert!(admin.can_access(Some(2)));
    }
}
