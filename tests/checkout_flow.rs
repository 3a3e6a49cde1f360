//! End-to-end checkout flow against a mock gateway: voucher discount,
//! transaction creation, status polling, and callback handling.

#![cfg(feature = "async")]

use chrono::{TimeZone as _, Utc};
use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use duitku_rs::checkout::Checkout;
use duitku_rs::models::{
    CallbackNotification, DiscountType, MerchantOrderId, Reference, TransactionRequest,
    TransactionStatus, Voucher, VoucherCode,
};
use duitku_rs::signature;
use duitku_rs::store::{InMemoryStore, Store};

const INQUIRY_PATH: &str = "/webapi/api/merchant/v2/inquiry";
const STATUS_PATH: &str = "/webapi/api/merchant/transactionStatus";

fn voucher_fixture() -> Voucher {
    Voucher {
        code: VoucherCode::from("HEMAT50"),
        discount_type: DiscountType::Percentage,
        discount_value: 50,
        min_purchase: 50_000,
        max_discount: Some(20_000),
        usage_limit: Some(100),
        used_count: 0,
        valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        valid_until: Utc.with_ymd_and_hms(2030, 12, 31, 0, 0, 0).unwrap(),
        is_active: true,
    }
}

fn request_fixture(amount: i64) -> TransactionRequest {
    TransactionRequest::new(
        amount,
        "SP".to_owned(),
        MerchantOrderId::from("ORDER-FLOW-1"),
        "Template Toko Online".to_owned(),
        "buyer@example.com".to_owned(),
        "https://example.com/callback".to_owned(),
        "https://example.com/return".to_owned(),
    )
}

async fn checkout_for(server: &MockServer) -> Checkout<InMemoryStore> {
    let store = InMemoryStore::new();
    store
        .upsert_vouchers(vec![voucher_fixture()])
        .await
        .unwrap();
    Checkout::builder()
        .merchant_code("D1234")
        .api_key("secret")
        .base_url(server.uri())
        .store(store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn full_checkout_flow() {
    let server = MockServer::start().await;

    // The storefront computed a 100 000 IDR order; the voucher halves
    // it but is capped at 20 000.
    let total = 100_000_i64;

    // Gateway accepts the discounted transaction.
    let discounted = 80_000_i64;
    let expected_signature = signature::inquiry(
        "D1234",
        "ORDER-FLOW-1",
        discounted,
        &SecretString::from("secret".to_owned()),
    );
    Mock::given(method("POST"))
        .and(path(INQUIRY_PATH))
        .and(body_partial_json(serde_json::json!({
            "merchantCode": "D1234",
            "paymentAmount": discounted,
            "signature": expected_signature,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "merchantCode": "D1234",
            "reference": "D1234FLOW001",
            "paymentUrl": "https://sandbox.duitku.com/pay/flow",
            "qrString": "000201",
            "amount": "80000",
            "statusCode": "00",
            "statusMessage": "SUCCESS"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let checkout = checkout_for(&server).await;

    // 1. Apply the voucher.
    let discount = checkout
        .apply_voucher(&VoucherCode::from("HEMAT50"), total, Utc::now())
        .await
        .unwrap();
    assert_eq!(discount, 20_000);

    // 2. Create the transaction for the discounted total.
    let response = checkout.pay(request_fixture(total - discount)).await.unwrap();
    assert_eq!(response.reference, Reference::from("D1234FLOW001"));

    // The order is recorded as pending.
    let recorded = checkout
        .store()
        .order(&MerchantOrderId::from("ORDER-FLOW-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recorded.status, TransactionStatus::Pending);
    assert_eq!(recorded.amount, discounted);
    assert_eq!(recorded.reference, Some(Reference::from("D1234FLOW001")));

    // 3. The gateway later confirms payment via callback.
    let api_key = SecretString::from("secret".to_owned());
    let genuine = signature::callback("D1234", "80000", "ORDER-FLOW-1", &api_key);
    let callback = CallbackNotification {
        merchant_code: "D1234".to_owned(),
        amount: "80000".to_owned(),
        merchant_order_id: MerchantOrderId::from("ORDER-FLOW-1"),
        product_detail: Some("Template Toko Online".to_owned()),
        additional_param: None,
        payment_code: Some("SP".to_owned()),
        result_code: TransactionStatus::Success,
        merchant_user_id: None,
        reference: Reference::from("D1234FLOW001"),
        publisher_order_id: None,
        sp_user_hash: None,
        settlement_date: None,
        issuer_code: Some("93600014".to_owned()),
        signature: genuine,
    };
    let status = checkout.handle_callback(&callback).await.unwrap();
    assert_eq!(status, TransactionStatus::Success);

    let settled = checkout
        .store()
        .order(&MerchantOrderId::from("ORDER-FLOW-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, TransactionStatus::Success);

    // The voucher counter moved exactly once.
    let used = checkout
        .store()
        .voucher(&VoucherCode::from("HEMAT50"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(used.used_count, 1);
}

#[tokio::test]
async fn status_poll_reconciles_expired_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INQUIRY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "merchantCode": "D1234",
            "reference": "D1234FLOW002",
            "paymentUrl": "https://sandbox.duitku.com/pay/flow",
            "amount": "100000",
            "statusCode": "00",
            "statusMessage": "SUCCESS"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "merchantCode": "D1234",
            "reference": "D1234FLOW002",
            "amount": "100000",
            "statusCode": "02",
            "statusMessage": "EXPIRED"
        })))
        .mount(&server)
        .await;

    let checkout = checkout_for(&server).await;
    let _created = checkout.pay(request_fixture(100_000)).await.unwrap();

    let polled = checkout
        .refresh_status(&MerchantOrderId::from("ORDER-FLOW-1"))
        .await
        .unwrap();
    assert_eq!(polled.status_code, TransactionStatus::Cancelled);

    let recorded = checkout
        .store()
        .order(&MerchantOrderId::from("ORDER-FLOW-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recorded.status, TransactionStatus::Cancelled);
}

#[tokio::test]
async fn forged_callback_leaves_order_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INQUIRY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "merchantCode": "D1234",
            "reference": "D1234FLOW003",
            "amount": "100000",
            "statusCode": "00",
            "statusMessage": "SUCCESS"
        })))
        .mount(&server)
        .await;

    let checkout = checkout_for(&server).await;
    let _created = checkout.pay(request_fixture(100_000)).await.unwrap();

    let forged = CallbackNotification {
        merchant_code: "D1234".to_owned(),
        amount: "100000".to_owned(),
        merchant_order_id: MerchantOrderId::from("ORDER-FLOW-1"),
        product_detail: None,
        additional_param: None,
        payment_code: None,
        result_code: TransactionStatus::Success,
        merchant_user_id: None,
        reference: Reference::from("D1234FLOW003"),
        publisher_order_id: None,
        sp_user_hash: None,
        settlement_date: None,
        issuer_code: None,
        signature: "ffffffffffffffffffffffffffffffff".to_owned(),
    };
    assert!(checkout.handle_callback(&forged).await.is_err());

    let recorded = checkout
        .store()
        .order(&MerchantOrderId::from("ORDER-FLOW-1"))
        .await
        .unwrap()
        .unwrap();
    // Still pending: the forged callback changed nothing.
    assert_eq!(recorded.status, TransactionStatus::Pending);
}
