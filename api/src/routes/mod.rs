//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크 (인증 없음)
//! - `/courses/*` - 과정 목록 / 상세
//! - `/learning/*` - 학습 (강의, 미션, 프로젝트, 수료증 발급)
//! - `/certificates/*` - 수료증 조회 / 문서
//! - `/cart/*` - 장바구니
//! - `/payments/*` - 주문 / 결제 검증 / 결제 내역
//! - `/admin/*` - 관리자 리포트, 프로젝트 평가, 환불, 수동 수강 관리

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod certificates;
pub mod health;
pub mod learning;
pub mod payments;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// 개발 환경 허용 origin
const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.is_production() {
        // 프로덕션: ALLOWED_ORIGINS에 등록된 도메인만 허용
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        CorsLayer::new()
            .allow_origin(DEV_ORIGINS.map(HeaderValue::from_static))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET    /health
///
/// GET    /courses                         GET  /courses/:id
///
/// GET    /learning/dashboard              GET  /learning/courses/:id/resume
/// GET    /learning/lectures/:id/video
/// GET    /learning/lectures/:id/mission   POST /learning/lectures/:id/mission
/// GET    /learning/attempts/:id
/// POST   /learning/subjects/:id/project   GET  /learning/projects/:id
/// POST   /learning/enrollments/:id/certificate
///
/// GET    /certificates/:id                GET  /certificates/:id/document
///
/// GET    /cart                            DELETE /cart
/// POST   /cart/items/:id (course)         DELETE /cart/items/:id (cart item)
///
/// POST   /payments/checkout               POST /payments/validate
/// GET    /payments                        GET  /payments/:id
///
/// GET    /admin/dashboard                 GET  /admin/projects
/// POST   /admin/projects/:id/review       GET  /admin/courses/progress
/// GET    /admin/courses/:id/attendance    GET  /admin/courses/:id/attendance/document
/// POST   /admin/payments/:id/refund       POST /admin/enrollments
/// ```
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Catalog
        .route("/courses", get(catalog::list_courses))
        .route("/courses/:id", get(catalog::get_course))

        // Learning
        .route("/learning/dashboard", get(learning::dashboard))
        .route("/learning/courses/:id/resume", get(learning::resume))
        .route("/learning/lectures/:id/video", get(learning::video_lecture))
        .route(
            "/learning/lectures/:id/mission",
            get(learning::mission).post(learning::submit_mission),
        )
        .route("/learning/attempts/:id", get(learning::mission_result))
        .route(
            "/learning/subjects/:id/project",
            post(learning::submit_project)
                .layer(DefaultBodyLimit::max(learning::MAX_PROJECT_FILE_BYTES)),
        )
        .route("/learning/projects/:id", get(learning::project_detail))
        .route("/learning/enrollments/:id/certificate", post(certificates::issue))

        // Certificates
        .route("/certificates/:id", get(certificates::view))
        .route("/certificates/:id/document", get(certificates::document))

        // Cart
        .route("/cart", get(cart::view).delete(cart::clear))
        // POST은 과정 id, DELETE는 장바구니 항목 id
        .route("/cart/items/:id", post(cart::add_item).delete(cart::remove_item))

        // Payments
        .route("/payments/checkout", post(payments::checkout))
        .route("/payments/validate", post(payments::validate))
        .route("/payments", get(payments::history))
        .route("/payments/:id", get(payments::detail))

        // Admin
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/projects", get(admin::list_projects))
        .route("/admin/projects/:id/review", post(admin::review_project))
        .route("/admin/courses/progress", get(admin::course_progress))
        .route("/admin/courses/:id/attendance", get(admin::attendance))
        .route("/admin/courses/:id/attendance/document", get(admin::attendance_document))
        .route("/admin/payments/:id/refund", post(admin::refund_payment))
        .route("/admin/enrollments", post(admin::manage_enrollment))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
