//! Storefront services driven over HTTP against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::Method;
use bookstore_core::pagination::PageRequest;
use bookstore_core::clock::Clock;
use bookstore_core::storage::{KeyValueStore, StorageError};
use bookstore_core::validation::RegistrationForm;
use bookstore_core::{CategoryId, Email, Money, OrderId, OrderStatus, ProductId, PromotionStatus, ShippingInfo};
use bookstore_integration_tests::{
    FakeBackend, StorefrontHarness, book, customer, page_of, test_clock,
};
use bookstore_storefront::{Checkout, ProductFilter, ServiceError, Storefront};
use chrono::Duration;
use serde_json::{Value, json};

fn active_voucher() -> Value {
    json!({
        "id": 4,
        "code": "SALE30",
        "discount_name": "Giảm 30.000đ",
        "discount_amount": 30000,
        "start_date": "2025-05-01",
        "end_date": "2025-06-30"
    })
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_login_persists_session_and_sends_bearer_token() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    let token = h.expect_login(&backend, &customer());

    let user = h
        .storefront
        .auth()
        .login("reader@example.com", "secret123")
        .await
        .unwrap();

    assert_eq!(user.full_name, "Nguyễn Văn A");
    assert_eq!(h.store.get("access_token").as_deref(), Some(token.as_str()));
    assert!(h.store.get("user").unwrap().contains("reader@example.com"));

    let login = &backend.requests_to(&Method::POST, "auth/login")[0];
    assert_eq!(login.body["email"], "reader@example.com");
    assert!(login.authorization.is_none());

    let info = &backend.requests_to(&Method::GET, "users/my-info")[0];
    assert_eq!(info.authorization.as_deref(), Some(format!("Bearer {token}").as_str()));
}

#[tokio::test]
async fn test_logout_clears_session_even_when_backend_fails() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    let token = h.expect_login(&backend, &customer());
    let auth = h.storefront.auth();
    auth.login("reader@example.com", "secret123").await.unwrap();

    backend.fail(Method::POST, "auth/logout", 500, "Lỗi máy chủ");
    auth.logout().await.unwrap();

    assert_eq!(backend.requests_to(&Method::POST, "auth/logout")[0].body["token"], token);
    assert!(h.store.get("access_token").is_none());
    assert!(h.store.get("user").is_none());
    assert!(auth.current_user().is_none());
}

#[tokio::test]
async fn test_rejected_login_shows_server_message() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.fail(Method::POST, "auth/login", 401, "Email hoặc mật khẩu không đúng");

    let err = h
        .storefront
        .auth()
        .login("reader@example.com", "wrong-password")
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Email hoặc mật khẩu không đúng");
    assert!(h.store.get("access_token").is_none());
}

#[tokio::test]
async fn test_expired_stored_session_is_dropped() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    h.expect_login(&backend, &customer());
    let auth = h.storefront.auth();
    auth.login("reader@example.com", "secret123").await.unwrap();

    h.clock.advance(Duration::days(2));

    assert!(auth.restore().is_none());
    assert!(h.store.get("access_token").is_none());
}

// ============================================================================
// Registration and confirmation resend
// ============================================================================

#[tokio::test]
async fn test_registration_then_resend_follows_throttle() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(Method::POST, "users", &customer());
    backend.ok(Method::POST, "auth/resend-confirmation", &Value::Null);

    let form = RegistrationForm {
        email: "reader@example.com".to_string(),
        full_name: "Nguyễn Văn A".to_string(),
        password: "secret123".to_string(),
        confirm_password: "secret123".to_string(),
        phone_number: Some("0912345678".to_string()),
    };
    h.storefront.auth().register(&form).await.unwrap();
    let sent = &backend.requests_to(&Method::POST, "users")[0];
    assert!(sent.body.get("confirm_password").is_none());

    let resend = h.storefront.resend(Email::parse("reader@example.com").unwrap());
    let view = resend.view();
    assert_eq!(view.counter(), "1/3");
    assert!(view.can_resend);

    let view = resend.resend().await.unwrap();
    assert_eq!(view.counter(), "2/3");
    assert!(!view.can_resend);
    let call = &backend.requests_to(&Method::POST, "auth/resend-confirmation")[0];
    assert_eq!(call.query.as_deref(), Some("email=reader%40example.com"));

    // Refused during cooldown, without a request.
    assert!(matches!(
        resend.resend().await,
        Err(ServiceError::ResendRefused(_))
    ));
    assert_eq!(
        backend.requests_to(&Method::POST, "auth/resend-confirmation").len(),
        1
    );

    h.clock.advance(Duration::seconds(61));
    assert!(resend.view().can_resend);
    assert_eq!(resend.resend().await.unwrap().counter(), "3/3");

    h.clock.advance(Duration::seconds(61));
    let view = resend.view();
    assert!(!view.can_resend);
    assert!(view.notice.is_some());
}

/// Storage that reads empty and refuses every write.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(std::io::Error::other("disk full").into())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(std::io::Error::other("disk full").into())
    }
}

#[tokio::test]
async fn test_registration_succeeds_when_counter_cannot_be_stored() {
    let backend = FakeBackend::start().await;
    backend.ok(Method::POST, "users", &customer());
    let storefront = Storefront::new(
        backend.api(),
        Arc::new(ReadOnlyStore),
        test_clock() as Arc<dyn Clock>,
    );

    let form = RegistrationForm {
        email: "reader@example.com".to_string(),
        full_name: "Nguyễn Văn A".to_string(),
        password: "secret123".to_string(),
        confirm_password: "secret123".to_string(),
        phone_number: None,
    };
    let user = storefront.auth().register(&form).await.unwrap();

    assert_eq!(user.email, "reader@example.com");
    assert_eq!(backend.requests_to(&Method::POST, "users").len(), 1);
}

#[tokio::test]
async fn test_failed_resend_is_not_counted() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.fail(Method::POST, "auth/resend-confirmation", 500, "Không gửi được email");

    let resend = h.storefront.resend(Email::parse("reader@example.com").unwrap());
    let err = resend.resend().await.unwrap_err();

    assert_eq!(err.user_message(), "Không gửi được email");
    assert!(resend.view().can_resend);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_enveloped_and_bare_bodies_both_decode() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.respond(
        Method::GET,
        "categories",
        200,
        &json!([{ "id": 3, "name": "Văn học" }, { "id": 4, "name": "Thiếu nhi" }]),
    );
    backend.ok(
        Method::GET,
        "products",
        &page_of(&json!([book(5, 100_000, 10), book(6, 50_000, 0)]), 2),
    );

    let catalog = h.storefront.catalog();
    let categories = catalog.categories().await;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].name, "Thiếu nhi");

    let filter = ProductFilter {
        category_id: Some(CategoryId::new(3)),
    };
    let products = catalog.list_products(PageRequest::default(), &filter).await;
    assert_eq!(products.total_elements, 2);
    assert!(!products.content[1].in_stock());

    let listing = &backend.requests_to(&Method::GET, "products")[0];
    let query = listing.query.as_deref().unwrap();
    assert!(query.contains("page=0"));
    assert!(query.contains("categoryId=3"));
}

#[tokio::test]
async fn test_product_listing_accepts_bare_array() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(Method::GET, "products", &json!([book(5, 100_000, 10)]));

    let products = h
        .storefront
        .catalog()
        .list_products(PageRequest::default(), &ProductFilter::default())
        .await;

    assert_eq!(products.content.len(), 1);
    assert_eq!(products.total_elements, 1);
}

#[tokio::test]
async fn test_failed_reads_fail_open_and_are_not_cached() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.fail(Method::GET, "products", 500, "Lỗi máy chủ");
    backend.fail(Method::GET, "categories", 503, "Bảo trì");

    let catalog = h.storefront.catalog();
    assert!(
        catalog
            .list_products(PageRequest::default(), &ProductFilter::default())
            .await
            .is_empty()
    );
    assert!(catalog.categories().await.is_empty());

    backend.ok(Method::GET, "categories", &json!([{ "id": 3, "name": "Văn học" }]));
    assert_eq!(catalog.categories().await.len(), 1);
    assert_eq!(catalog.categories().await.len(), 1);
    assert_eq!(backend.requests_to(&Method::GET, "categories").len(), 2);
}

#[tokio::test]
async fn test_product_view_applies_best_discount() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(Method::GET, "products/5", &book(5, 100_000, 10));
    backend.ok(
        Method::GET,
        "discounts",
        &json!([
            {
                "discount_name": "Hè rực rỡ",
                "discount_percentage": 10,
                "start_date": [2025, 5, 1],
                "end_date": [2025, 6, 30],
                "product_ids": [5]
            },
            {
                "discount_name": "Đã kết thúc",
                "discount_percentage": 50,
                "start_date": [2025, 1, 1],
                "end_date": [2025, 1, 31]
            }
        ]),
    );

    let view = h
        .storefront
        .catalog()
        .product_view(ProductId::new(5))
        .await
        .unwrap();

    assert_eq!(view.sale_price, Money::new(90_000));
    assert!(view.is_on_sale());
}

// ============================================================================
// Cart and checkout
// ============================================================================

#[tokio::test]
async fn test_place_order_posts_cart_and_clears_it() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    h.expect_login(&backend, &customer());
    h.storefront
        .auth()
        .login("reader@example.com", "secret123")
        .await
        .unwrap();

    backend.ok(Method::GET, "products/5", &book(5, 100_000, 10));
    backend.ok(Method::GET, "vouchers/code/SALE30", &active_voucher());
    backend.ok(
        Method::POST,
        "orders",
        &json!({
            "id": 99,
            "user_id": 7,
            "status": "PENDING",
            "order_details": [{ "product_id": 5, "price": 100000, "quantity": 2 }],
            "vouchers": [{ "code": "SALE30", "discount_amount": 30000 }],
            "payment_method": "COD",
            "full_name": "Nguyễn Văn A",
            "phone_number": "0912345678",
            "address": "12 Hàng Bạc, Hà Nội"
        }),
    );

    let cart = h.storefront.cart();
    cart.add(ProductId::new(5), 2).await.unwrap();
    assert_eq!(cart.cart().item_count(), 2);

    let checkout = Checkout {
        shipping: ShippingInfo {
            full_name: "Nguyễn Văn A".to_string(),
            phone_number: "0912345678".to_string(),
            address: "12 Hàng Bạc, Hà Nội".to_string(),
            note: None,
        },
        voucher_codes: vec!["SALE30".to_string()],
        ..Checkout::default()
    };
    let orders = h.storefront.orders();
    assert_eq!(
        orders.preview(&checkout.voucher_codes).await.unwrap().total,
        Money::new(170_000)
    );

    let order = orders.place_order(&checkout).await.unwrap();

    assert_eq!(order.id, OrderId::new(99));
    assert_eq!(order.totals().total, Money::new(170_000));
    assert!(cart.cart().is_empty());

    let sent = &backend.requests_to(&Method::POST, "orders")[0];
    assert_eq!(sent.body["user_id"], 7);
    assert_eq!(sent.body["total_money"], 170_000);
    assert_eq!(sent.body["voucher_codes"], json!(["SALE30"]));
    assert_eq!(sent.body["full_name"], "Nguyễn Văn A");
    assert_eq!(sent.body["order_details"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    h.expect_login(&backend, &customer());
    h.storefront
        .auth()
        .login("reader@example.com", "secret123")
        .await
        .unwrap();
    backend.ok(Method::GET, "products/5", &book(5, 100_000, 10));
    backend.fail(Method::POST, "orders", 400, "Sản phẩm không đủ số lượng");

    let cart = h.storefront.cart();
    cart.add(ProductId::new(5), 1).await.unwrap();
    let checkout = Checkout {
        shipping: ShippingInfo {
            full_name: "Nguyễn Văn A".to_string(),
            phone_number: "0912345678".to_string(),
            address: "Hà Nội".to_string(),
            note: None,
        },
        ..Checkout::default()
    };

    let err = h.storefront.orders().place_order(&checkout).await.unwrap_err();

    assert_eq!(err.user_message(), "Sản phẩm không đủ số lượng");
    assert_eq!(cart.cart().item_count(), 1);
}

#[tokio::test]
async fn test_out_of_stock_product_is_not_added() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(Method::GET, "products/6", &book(6, 50_000, 0));

    let result = h.storefront.cart().add(ProductId::new(6), 1).await;

    assert!(matches!(result, Err(ServiceError::ProductUnavailable(_))));
    assert!(h.storefront.cart().cart().is_empty());
}

// ============================================================================
// Vouchers and orders
// ============================================================================

#[tokio::test]
async fn test_voucher_lookup_distinguishes_unknown_and_expired() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(
        Method::GET,
        "vouchers/code/WINTER",
        &json!({
            "code": "WINTER",
            "discount_percentage": 20,
            "start_date": "2025-01-01",
            "end_date": "2025-01-31"
        }),
    );
    backend.ok(Method::GET, "vouchers/code/SALE30", &active_voucher());

    let vouchers = h.storefront.vouchers();
    assert!(matches!(
        vouchers.lookup("NOPE").await,
        Err(ServiceError::VoucherNotFound(code)) if code == "NOPE"
    ));
    assert!(matches!(
        vouchers.lookup("WINTER").await,
        Err(ServiceError::VoucherUnavailable { status: PromotionStatus::Expired, .. })
    ));
    assert_eq!(vouchers.lookup(" SALE30 ").await.unwrap().code, "SALE30");
}

#[tokio::test]
async fn test_voucher_code_is_one_path_segment() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    let vouchers = h.storefront.vouchers();

    assert!(matches!(
        vouchers.lookup("SALE/50").await,
        Err(ServiceError::VoucherNotFound(_))
    ));
    assert!(matches!(
        vouchers.lookup("../../users").await,
        Err(ServiceError::VoucherNotFound(_))
    ));
    assert!(matches!(
        vouchers.lookup("..").await,
        Err(ServiceError::VoucherNotFound(_))
    ));

    let paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec!["vouchers/code/SALE%2F50", "vouchers/code/..%2F..%2Fusers"]
    );
}

#[tokio::test]
async fn test_only_pending_orders_are_cancelled() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);
    backend.ok(Method::GET, "orders/12", &json!({ "id": 12, "status": "CONFIRMED" }));
    backend.ok(Method::GET, "orders/13", &json!({ "id": 13, "status": "PENDING" }));
    backend.ok(Method::PUT, "orders/13/cancel", &Value::Null);

    let orders = h.storefront.orders();
    let confirmed = orders.order(OrderId::new(12)).await.unwrap();
    assert!(matches!(
        orders.cancel(&confirmed).await,
        Err(ServiceError::NotCancellable(OrderStatus::Confirmed))
    ));
    assert!(backend.requests_to(&Method::PUT, "orders/12/cancel").is_empty());

    let pending = orders.order(OrderId::new(13)).await.unwrap();
    let cancelled = orders.cancel(&pending).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_missing_order_reads_as_none() {
    let backend = FakeBackend::start().await;
    let h = StorefrontHarness::new(&backend);

    assert!(h.storefront.orders().order(OrderId::new(404)).await.is_none());
}
