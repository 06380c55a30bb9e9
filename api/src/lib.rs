//! SkillBridge Learning Platform API Library
//!
//! # Overview
//!
//! 이 라이브러리는 SkillBridge 온라인 학습 플랫폼의 백엔드 API를 제공합니다.
//! 강의 수강, 미션(쪽지시험), 중간/기말고사 프로젝트, 수료증, 장바구니/결제,
//! 관리자 리포트를 다룹니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │ Render  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴─────┬──────┴────────────┘          │
//! │                          │                               │
//! └──────────────────────────┼───────────────────────────────┘
//!                 ┌──────────┴──────────┐
//!                 ▼                     ▼
//!        ┌────────────────┐   ┌──────────────────┐
//!        │ skillbridge-   │   │ PortOne Gateway  │
//!        │ core (rules)   │   │ (HTTP)           │
//!        └────────────────┘   └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `auth`: Bearer 토큰 → 요청 단위 사용자 컨텍스트
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (수료 판정, 진도, 수료증, 결제, 리포트)
//! - `db`: 데이터베이스 연동 (Repository trait + PostgreSQL 구현)
//! - `render`: 수료증 / 출석부 HTML 문서
//! - `types`: 공통 타입 정의
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skillbridge_api::{config::Config, db::Database};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod render;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::{Database, Repository};
pub use error::ApiError;
pub use services::{MediaStorage, PaymentGateway, PortOneClient};

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub media: Arc<MediaStorage>,
    pub config: Arc<Config>,
}
