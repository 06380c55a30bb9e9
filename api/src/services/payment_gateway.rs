//! Payment Gateway (PortOne / iamport REST)
//!
//! 결제 검증과 환불은 결제사 REST API로 처리한다.
//!
//! ```text
//! POST /users/getToken       {imp_key, imp_secret}     → access_token, expired_at
//! GET  /payments/{imp_uid}                             → status, amount, merchant_uid
//! POST /payments/cancel      {reason, imp_uid, amount} → 취소 결과
//! ```
//!
//! 응답은 항상 `{code, message, response}` 형태이고 `code != 0`이면 실패.
//! 액세스 토큰은 만료 직전까지 프로세스 내에 캐시한다.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// 결제사 에러
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 결제 상태 / 금액 / 주문번호 불일치
    #[error("결제 검증 결과가 주문과 일치하지 않습니다: {0}")]
    Mismatch(String),

    /// 결제사가 요청을 거절 (code != 0)
    #[error("{0}")]
    Rejected(String),

    /// 네트워크 / 응답 파싱 실패
    #[error("payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 검증된 결제 정보
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayPayment {
    pub imp_uid: String,
    pub merchant_uid: String,
    pub amount: i64,
    pub status: String,
    #[serde(default)]
    pub pay_method: Option<String>,
}

/// 환불 요청
#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imp_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_uid: Option<String>,
    /// 생략 시 전액 취소
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

/// 결제사 추상화 (테스트에서는 mock 사용)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// 결제 조회 후 `paid` 상태 + 금액 + 주문번호 일치 확인
    async fn verify_payment(
        &self,
        imp_uid: &str,
        merchant_uid: &str,
        amount: i64,
    ) -> Result<GatewayPayment, GatewayError>;

    async fn refund_payment(&self, request: &RefundRequest) -> Result<(), GatewayError>;
}

/// 결제사 공통 응답 envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    message: Option<String>,
    response: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, GatewayError> {
        match (self.code, self.response) {
            (0, Some(response)) => Ok(response),
            (_, _) => Err(GatewayError::Rejected(
                self.message
                    .unwrap_or_else(|| format!("PortOne error code {}", self.code)),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// unix seconds
    expired_at: i64,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    imp_key: &'a str,
    imp_secret: &'a str,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// PortOne REST 클라이언트
pub struct PortOneClient {
    base_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
    /// 캐시된 액세스 토큰
    cached_token: RwLock<Option<CachedToken>>,
}

impl PortOneClient {
    /// 만료 이 시간 전부터는 토큰 재발급 (초)
    const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

    /// 요청 타임아웃
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .context("failed to build PortOne HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            http,
            cached_token: RwLock::new(None),
        })
    }

    /// 액세스 토큰 조회
    ///
    /// # Caching Strategy
    ///
    /// 결제사가 알려준 만료 시각 60초 전까지 재사용
    async fn access_token(&self) -> Result<String, GatewayError> {
        // 캐시 확인
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if token_is_fresh(cached.expires_at, Utc::now()) {
                    return Ok(cached.token.clone());
                }
            }
        }

        // 새로 발급
        let token: TokenResponse = self
            .http
            .post(format!("{}/users/getToken", self.base_url))
            .json(&TokenRequest {
                imp_key: &self.api_key,
                imp_secret: &self.api_secret,
            })
            .send()
            .await?
            .json::<Envelope<TokenResponse>>()
            .await?
            .into_result()?;

        let expires_at = Utc
            .timestamp_opt(token.expired_at, 0)
            .single()
            .unwrap_or_else(Utc::now);

        tracing::debug!("PortOne access token refreshed (expires {})", expires_at);

        // 캐시 업데이트
        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        Ok(token.access_token)
    }
}

fn token_is_fresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (expires_at - now).num_seconds() > PortOneClient::TOKEN_REFRESH_MARGIN_SECS
}

/// 조회된 결제가 주문과 일치하는지 확인
pub fn check_paid(
    payment: &GatewayPayment,
    merchant_uid: &str,
    amount: i64,
) -> Result<(), GatewayError> {
    if payment.status != "paid" {
        return Err(GatewayError::Mismatch(format!("status={}", payment.status)));
    }
    if payment.amount != amount {
        return Err(GatewayError::Mismatch(format!(
            "amount={} expected={}",
            payment.amount, amount
        )));
    }
    if payment.merchant_uid != merchant_uid {
        return Err(GatewayError::Mismatch(format!(
            "merchant_uid={}",
            payment.merchant_uid
        )));
    }
    Ok(())
}

#[async_trait]
impl PaymentGateway for PortOneClient {
    async fn verify_payment(
        &self,
        imp_uid: &str,
        merchant_uid: &str,
        amount: i64,
    ) -> Result<GatewayPayment, GatewayError> {
        tracing::info!(
            "Verifying payment: imp_uid={}, merchant_uid={}, amount={}",
            imp_uid,
            merchant_uid,
            amount
        );

        let token = self.access_token().await?;
        let payment: GatewayPayment = self
            .http
            .get(format!("{}/payments/{}", self.base_url, imp_uid))
            .bearer_auth(token)
            .send()
            .await?
            .json::<Envelope<GatewayPayment>>()
            .await?
            .into_result()?;

        if let Err(e) = check_paid(&payment, merchant_uid, amount) {
            tracing::warn!("Payment verification failed for {}: {}", merchant_uid, e);
            return Err(e);
        }

        tracing::info!("Payment verification successful: {}", merchant_uid);
        Ok(payment)
    }

    async fn refund_payment(&self, request: &RefundRequest) -> Result<(), GatewayError> {
        if request.imp_uid.is_none() && request.merchant_uid.is_none() {
            return Err(GatewayError::Rejected(
                "imp_uid 또는 merchant_uid가 필요합니다.".to_string(),
            ));
        }

        let token = self.access_token().await?;
        self.http
            .post(format!("{}/payments/cancel", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?
            .json::<Envelope<serde_json::Value>>()
            .await?
            .into_result()?;

        tracing::info!(
            "Payment cancelled: imp_uid={:?}, amount={:?}",
            request.imp_uid,
            request.amount
        );
        Ok(())
    }
}
