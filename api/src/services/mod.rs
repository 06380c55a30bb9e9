//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `catalog`: 과정 상세 / 과정 구조
//! - `progress`: 강의 시청, 미션 채점, 프로젝트 제출 / 평가
//! - `completion`: 수료 판정 (enrolled → completed)
//! - `certificates`: 수료증 발급 / 문서
//! - `commerce`: 장바구니, 결제 검증, 환불
//! - `reports`: 관리자 리포트, 출석부, 수동 수강 관리
//! - `payment_gateway`: PortOne 결제사 클라이언트
//! - `storage`: 프로젝트 파일 저장

pub mod catalog;
pub mod certificates;
pub mod commerce;
pub mod completion;
pub mod payment_gateway;
pub mod progress;
pub mod reports;
pub mod storage;

pub use payment_gateway::{GatewayError, PaymentGateway, PortOneClient};
pub use storage::MediaStorage;
