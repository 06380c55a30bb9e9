//! Database Module
//!
//! PostgreSQL 연동. 커넥션 풀은 sqlx `PgPool` 하나를 공유하고,
//! Repository trait 구현은 관심사별 파일로 나눈다.
//!
//! - `catalog.rs`: 과정 / 과목 / 강의 / 문제 조회
//! - `learning.rs`: 수강, 강의 진도, 미션 응시, 프로젝트, 수료증
//! - `commerce.rs`: 장바구니, 결제, 환불
//! - `reports.rs`: 관리자 집계
//!
//! 여러 행을 바꾸는 상태 전이는 `pool.begin()` 트랜잭션 하나로 처리하고,
//! 수료 전이는 `WHERE status = 'enrolled'` 조건부 UPDATE로 멱등하게 만든다.

mod catalog;
mod commerce;
mod learning;
mod models;
mod reports;
pub mod repository;

pub use models::*;
pub use repository::{
    CatalogRepository, CertificateRepository, CommerceRepository, EnrollmentRepository,
    ProgressRepository, ReportRepository, Repository, ReviewFilter, SubmissionFilter,
};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for Database {
    /// Health check
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
