//! Cart / checkout / payment verification / refund.
//!
//! 결제 검증은 장바구니 합계와 결제사 조회 결과가 모두 일치해야 통과한다.
//! 통과 시 결제 기록 + 수강 등록 + 장바구니 비우기가 한 트랜잭션으로 묶인다.
//! 결제사 호출이 실패하면 어떤 상태도 바꾸지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillbridge_core::identifiers::merchant_uid;
use skillbridge_core::PaymentStatus;

use crate::auth::AuthUser;
use crate::db::{CartLine, CompletedOrder, Payment, Repository};
use crate::error::ApiError;
use crate::services::payment_gateway::{PaymentGateway, RefundRequest};
use crate::types::Won;

// ============ Cart ============

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_price: Won,
    pub count: usize,
}

impl CartView {
    fn from_lines(items: Vec<CartLine>) -> Self {
        Self {
            total_price: items.iter().map(|l| l.price).sum(),
            count: items.len(),
            items,
        }
    }
}

pub async fn cart_view(repo: &dyn Repository, user: &AuthUser) -> Result<CartView, ApiError> {
    Ok(CartView::from_lines(repo.cart_lines(user.user_id).await?))
}

/// 장바구니 담기 (이미 담긴 과정은 그대로)
pub async fn add_to_cart(
    repo: &dyn Repository,
    user: &AuthUser,
    course_id: i64,
) -> Result<CartView, ApiError> {
    let course = repo
        .find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {}", course_id)))?;

    if repo.find_enrollment(user.user_id, course_id).await?.is_some() {
        return Err(ApiError::Conflict("이미 수강 중인 과정입니다".to_string()));
    }

    if repo.add_cart_item(user.user_id, course_id).await? {
        tracing::debug!(user_id = user.user_id, "🛒 Added to cart: {}", course.title);
    }
    cart_view(repo, user).await
}

pub async fn remove_from_cart(
    repo: &dyn Repository,
    user: &AuthUser,
    item_id: i64,
) -> Result<CartView, ApiError> {
    let line = repo
        .find_cart_line(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cart item {}", item_id)))?;

    if line.user_id != user.user_id {
        return Err(ApiError::Forbidden("본인의 장바구니 항목만 삭제할 수 있습니다".to_string()));
    }

    repo.remove_cart_item(item_id).await?;
    cart_view(repo, user).await
}

pub async fn clear_cart(repo: &dyn Repository, user: &AuthUser) -> Result<CartView, ApiError> {
    let removed = repo.clear_cart(user.user_id).await?;
    tracing::debug!(user_id = user.user_id, removed, "Cart cleared");
    cart_view(repo, user).await
}

// ============ Checkout ============

/// 결제창에 넘길 주문 정보
#[derive(Debug, Serialize)]
pub struct CheckoutOrder {
    pub merchant_uid: String,
    /// 결제창 표시용 주문명
    pub name: String,
    pub amount: Won,
    pub buyer_name: String,
    pub items: Vec<CartLine>,
}

fn order_name(items: &[CartLine]) -> String {
    match items {
        [] => String::new(),
        [only] => only.title.clone(),
        [first, rest @ ..] => format!("{} 외 {}건", first.title, rest.len()),
    }
}

pub async fn checkout(
    repo: &dyn Repository,
    user: &AuthUser,
    now: DateTime<Utc>,
) -> Result<CheckoutOrder, ApiError> {
    let cart = CartView::from_lines(repo.cart_lines(user.user_id).await?);
    if cart.items.is_empty() {
        return Err(ApiError::BadRequest("장바구니가 비어 있습니다".to_string()));
    }

    let order = CheckoutOrder {
        merchant_uid: merchant_uid(now.date_naive()),
        name: order_name(&cart.items),
        amount: cart.total_price,
        buyer_name: user.username.clone(),
        items: cart.items,
    };

    tracing::info!(
        user_id = user.user_id,
        "🧾 Checkout {}: {} ({}원)",
        order.merchant_uid,
        order.name,
        order.amount
    );
    Ok(order)
}

// ============ Payment ============

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentValidation {
    pub imp_uid: String,
    pub merchant_uid: String,
    pub amount: Won,
}

/// 결제 검증 후 주문 확정
///
/// 같은 merchant_uid로 이미 확정된 결제가 있으면 그 결과를 돌려준다.
pub async fn validate_payment(
    repo: &dyn Repository,
    gateway: &dyn PaymentGateway,
    user: &AuthUser,
    request: &PaymentValidation,
) -> Result<Vec<Payment>, ApiError> {
    let existing = repo.payments_by_merchant_uid(&request.merchant_uid).await?;
    if !existing.is_empty() {
        if existing.iter().all(|p| p.user_id == Some(user.user_id)) {
            tracing::debug!("Order {} already confirmed", request.merchant_uid);
            return Ok(existing);
        }
        return Err(ApiError::Conflict("이미 사용된 주문번호입니다".to_string()));
    }

    let lines = repo.cart_lines(user.user_id).await?;
    if lines.is_empty() {
        return Err(ApiError::BadRequest("장바구니가 비어 있습니다".to_string()));
    }

    let cart_total: Won = lines.iter().map(|l| l.price).sum();
    if request.amount != cart_total {
        tracing::warn!(
            user_id = user.user_id,
            "Payment amount {} does not match cart total {}",
            request.amount,
            cart_total
        );
        return Err(ApiError::ValidationError(
            "결제 금액이 장바구니 금액과 일치하지 않습니다".to_string(),
        ));
    }

    let verified = gateway
        .verify_payment(&request.imp_uid, &request.merchant_uid, request.amount)
        .await?;

    let payments = repo
        .record_completed_order(&CompletedOrder {
            user_id: user.user_id,
            merchant_uid: &request.merchant_uid,
            imp_uid: &verified.imp_uid,
            payment_method: verified.pay_method.as_deref(),
            lines: &lines,
        })
        .await?;

    tracing::info!(
        user_id = user.user_id,
        "💳 Payment completed: {} ({} courses, {}원)",
        request.merchant_uid,
        payments.len(),
        cart_total
    );
    Ok(payments)
}

pub async fn payment_history(repo: &dyn Repository, user: &AuthUser) -> Result<Vec<Payment>, ApiError> {
    Ok(repo.list_user_payments(user.user_id).await?)
}

/// 결제 상세 (본인 또는 관리자)
pub async fn payment_detail(
    repo: &dyn Repository,
    user: &AuthUser,
    payment_id: i64,
) -> Result<Payment, ApiError> {
    let payment = repo
        .find_payment(payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Payment {}", payment_id)))?;

    if !user.can_access(payment.user_id) {
        return Err(ApiError::Forbidden("본인의 결제 내역만 조회할 수 있습니다".to_string()));
    }
    Ok(payment)
}

/// 환불 (관리자)
///
/// 결제사 취소가 성공한 뒤에만 결제 상태를 바꾸고 수강 등록을 삭제한다.
pub async fn refund_payment(
    repo: &dyn Repository,
    gateway: &dyn PaymentGateway,
    admin: &AuthUser,
    payment_id: i64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<Payment, ApiError> {
    let payment = repo
        .find_payment(payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Payment {}", payment_id)))?;

    if payment.payment_status != PaymentStatus::Completed {
        return Err(ApiError::Conflict(format!(
            "환불할 수 없는 결제 상태입니다: {}",
            payment.payment_status
        )));
    }

    let reason = match reason.trim() {
        "" => "관리자 환불",
        r => r,
    };
    let request = RefundRequest {
        reason: reason.to_string(),
        imp_uid: payment.imp_uid.clone(),
        merchant_uid: payment
            .imp_uid
            .is_none()
            .then(|| payment.merchant_uid.clone()),
        amount: Some(payment.amount),
    };

    if let Err(e) = gateway.refund_payment(&request).await {
        tracing::warn!(payment_id, "Refund rejected by gateway: {}", e);
        return Err(e.into());
    }

    // 동시 환불 요청은 조건부 UPDATE에서 하나만 성공
    let refunded = repo
        .refund_payment(payment_id, reason, now)
        .await?
        .ok_or_else(|| ApiError::Conflict("이미 환불된 결제입니다".to_string()))?;

    tracing::info!(
        payment_id,
        admin_id = admin.user_id,
        "↩️  Payment refunded: {}원 ({})",
        refunded.amount,
        reason
    );
    Ok(refunded)
}
