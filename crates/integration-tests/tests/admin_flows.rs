//! Back-office services driven over HTTP against the fake backend.

#![allow(clippy::unwrap_used)]

use axum::http::Method;
use bookstore_admin::{AdminClient, AdminError, ProductQuery, UserUpdate};
use bookstore_core::clock::Clock;
use bookstore_core::pagination::PageRequest;
use bookstore_core::validation::{ProductForm, PromotionForm};
use bookstore_core::{Money, OrderId, OrderStatus, ProductId, PromotionStatus, UserId, UserRole};
use bookstore_integration_tests::{
    FakeBackend, admin_client, administrator, book, customer, jwt, page_of, test_clock,
};
use chrono::{Duration, NaiveDate};
use serde_json::json;

async fn signed_in(backend: &FakeBackend) -> AdminClient {
    let (admin, _) = admin_client(backend);
    let token = jwt(test_clock().now() + Duration::days(1));
    backend.ok(Method::POST, "auth/login", &json!({ "token": token }));
    backend.ok(Method::GET, "users/my-info", &administrator());
    admin.login("admin@example.com", "secret123").await.unwrap();
    admin
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_customer_account_is_refused() {
    let backend = FakeBackend::start().await;
    let (admin, clock) = admin_client(&backend);
    backend.ok(
        Method::POST,
        "auth/login",
        &json!({ "token": jwt(clock.now() + Duration::days(1)) }),
    );
    backend.ok(Method::GET, "users/my-info", &customer());

    let result = admin.login("reader@example.com", "secret123").await;

    assert!(matches!(result, Err(AdminError::NotAdmin)));
    assert!(matches!(admin.require_admin(), Err(AdminError::NotAuthenticated)));
}

#[tokio::test]
async fn test_writes_require_sign_in() {
    let backend = FakeBackend::start().await;
    let (admin, _) = admin_client(&backend);

    let result = admin.delete_product(ProductId::new(5)).await;

    assert!(matches!(result, Err(AdminError::NotAuthenticated)));
    assert!(backend.requests().is_empty());
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_order_editor_fetches_products_in_order() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::GET,
        "orders/17",
        &json!({
            "id": 17,
            "status": "PACKING",
            "order_details": [
                { "product_id": 5, "product_name": "Dế Mèn", "price": 100000, "quantity": 2 },
                { "product_id": 6, "product_name": "Đã xóa", "price": 50000, "quantity": 1 }
            ],
            "vouchers": [{ "code": "SALE30", "discount_amount": 30000 }],
            "created_at": [2025, 5, 20, 14, 30, 0]
        }),
    );
    backend.ok(Method::GET, "products/5", &book(5, 110_000, 4));

    let editor = admin.order_editor(OrderId::new(17)).await.unwrap();

    assert_eq!(editor.lines.len(), 2);
    assert_eq!(editor.lines[0].product.as_ref().unwrap().price, Money::new(110_000));
    assert!(editor.lines[1].product.is_none());
    assert_eq!(editor.totals.total, Money::new(220_000));
    assert_eq!(
        editor.allowed_transitions,
        vec![OrderStatus::Delivering, OrderStatus::Cancelled]
    );

    let paths: Vec<String> = backend
        .requests()
        .into_iter()
        .filter(|r| r.path.starts_with("products/"))
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, vec!["products/5", "products/6"]);
}

#[tokio::test]
async fn test_missing_order_editor_is_not_found() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;

    let result = admin.order_editor(OrderId::new(404)).await;

    assert!(matches!(result, Err(AdminError::NotFound(_))));
}

#[tokio::test]
async fn test_status_update_rejects_backwards_moves() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(Method::GET, "orders/20", &json!({ "id": 20, "status": "DELIVERING" }));
    backend.ok(Method::PUT, "orders/20", &json!({ "id": 20, "status": "COMPLETED" }));

    let order = admin.order(OrderId::new(20)).await.unwrap();
    let result = admin.update_order_status(&order, OrderStatus::Packing).await;
    assert!(matches!(
        result,
        Err(AdminError::InvalidTransition {
            from: OrderStatus::Delivering,
            to: OrderStatus::Packing
        })
    ));
    assert!(backend.requests_to(&Method::PUT, "orders/20").is_empty());

    let updated = admin
        .update_order_status(&order, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(
        backend.requests_to(&Method::PUT, "orders/20")[0].body,
        json!({ "status": "COMPLETED" })
    );
}

#[tokio::test]
async fn test_order_list_filters_by_status() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::GET,
        "orders",
        &page_of(&json!([{ "id": 1, "status": "PENDING" }]), 1),
    );

    let page = admin
        .list_orders(PageRequest::default(), Some(OrderStatus::Pending))
        .await;

    assert_eq!(page.content.len(), 1);
    let query = backend.requests_to(&Method::GET, "orders")[0].query.clone().unwrap();
    assert!(query.contains("status=PENDING"));
}

// ============================================================================
// Products, promotions, users
// ============================================================================

#[tokio::test]
async fn test_product_search_and_invalid_form() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::GET,
        "products/search",
        &page_of(&json!([book(5, 100_000, 4)]), 1),
    );

    let query = ProductQuery {
        keyword: Some("dế mèn".to_string()),
        ..ProductQuery::default()
    };
    assert_eq!(admin.list_products(&query).await.content.len(), 1);
    assert!(
        backend.requests_to(&Method::GET, "products/search")[0]
            .query
            .as_deref()
            .unwrap()
            .contains("keyword=")
    );

    let form = ProductForm {
        name: "   ".to_string(),
        price: 0,
        ..ProductForm::default()
    };
    let Err(AdminError::Validation(errors)) = admin.create_product(&form).await else {
        panic!("expected validation errors");
    };
    assert!(errors.get("name").is_some());
    assert!(errors.get("price").is_some());
    assert!(backend.requests_to(&Method::POST, "products").is_empty());
}

#[tokio::test]
async fn test_voucher_needs_exactly_one_discount_value() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;

    let form = PromotionForm {
        code: Some("SALE".to_string()),
        discount_name: "Khuyến mãi".to_string(),
        discount_percentage: Some(10.into()),
        discount_amount: Some(Money::new(20_000)),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30),
        product_ids: Vec::new(),
    };
    let Err(AdminError::Validation(errors)) = admin.create_voucher(&form).await else {
        panic!("expected validation errors");
    };
    assert!(errors.get("discount_value").is_some());
    assert!(backend.requests_to(&Method::POST, "vouchers").is_empty());
}

#[tokio::test]
async fn test_promotion_lists_carry_status() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::GET,
        "vouchers",
        &json!([
            { "code": "OLD", "discount_amount": 10000, "start_date": "2025-01-01", "end_date": "2025-01-31" },
            { "code": "NOW", "discount_amount": 10000, "start_date": "2025-05-01", "end_date": "2025-06-30" },
            { "code": "SOON", "discount_amount": 10000, "start_date": "2025-12-01", "end_date": "2025-12-31" }
        ]),
    );

    let statuses: Vec<PromotionStatus> = admin
        .list_vouchers()
        .await
        .into_iter()
        .map(|listed| listed.status)
        .collect();

    assert_eq!(
        statuses,
        vec![
            PromotionStatus::Expired,
            PromotionStatus::Active,
            PromotionStatus::Upcoming
        ]
    );
}

#[tokio::test]
async fn test_user_update_and_self_delete_guard() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::PUT,
        "users/7",
        &json!({ "id": 7, "email": "reader@example.com", "role": "ADMIN" }),
    );

    let update = UserUpdate {
        role: Some(UserRole::Admin),
        ..UserUpdate::default()
    };
    let user = admin.update_user(UserId::new(7), &update).await.unwrap();
    assert!(user.is_admin());
    assert_eq!(
        backend.requests_to(&Method::PUT, "users/7")[0].body,
        json!({ "role": "ADMIN" })
    );

    assert!(matches!(
        admin.delete_user(UserId::new(1)).await,
        Err(AdminError::SelfDelete)
    ));
    assert!(backend.requests_to(&Method::DELETE, "users/1").is_empty());
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_counts_orders_and_revenue() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.ok(
        Method::GET,
        "orders",
        &page_of(
            &json!([
                {
                    "id": 1,
                    "status": "COMPLETED",
                    "order_details": [{ "product_id": 5, "price": 100000, "quantity": 2 }]
                },
                {
                    "id": 2,
                    "status": "COMPLETED",
                    "order_details": [{ "product_id": 6, "price": 50000, "quantity": 1 }],
                    "vouchers": [{ "discount_percentage": 10 }]
                },
                { "id": 3, "status": "PENDING" },
                { "id": 4, "status": "CANCELLED" }
            ]),
            4,
        ),
    );
    backend.ok(Method::GET, "products", &page_of(&json!([book(5, 100_000, 4)]), 42));
    backend.ok(Method::GET, "users", &page_of(&json!([customer()]), 9));

    let dashboard = admin.dashboard().await;

    assert_eq!(dashboard.orders.total_orders, 4);
    assert_eq!(dashboard.orders.count(OrderStatus::Completed), 2);
    assert_eq!(dashboard.orders.count(OrderStatus::Delivering), 0);
    assert_eq!(dashboard.orders.revenue, Money::new(245_000));
    assert_eq!(dashboard.product_count, 42);
    assert_eq!(dashboard.user_count, 9);
}

#[tokio::test]
async fn test_dashboard_survives_backend_outage() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend).await;
    backend.fail(Method::GET, "orders", 500, "Lỗi máy chủ");

    let dashboard = admin.dashboard().await;

    assert_eq!(dashboard.orders.total_orders, 0);
    assert_eq!(dashboard.product_count, 0);
}
