//! Behavioral tests for the cart and checkout services over in-memory
//! stores and a scripted payment gateway.

use sundry_commerce::services::{CartError, CheckoutError};
use sundry_core::{Money, ProductId};
use sundry_integration_tests::{Harness, PaymentMode};

#[tokio::test]
async fn test_sequential_adds_converge_on_one_row() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let product = harness.store.add_product("Sticker Sheet", 500);
    let cart = harness.cart_service();

    for _ in 0..4 {
        cart.add_to_cart(Some(user), product)
            .await
            .expect("add_to_cart failed");
    }

    let rows = harness.store.cart_rows(user);
    assert_eq!(rows.len(), 1, "expected exactly one cart row");
    assert_eq!(rows[0].quantity.get(), 4);
}

#[tokio::test]
async fn test_add_requires_authentication() {
    let harness = Harness::new();
    let product = harness.store.add_product("Sticker Sheet", 500);
    let cart = harness.cart_service();

    let err = cart.add_to_cart(None, product).await.unwrap_err();
    assert!(matches!(err, CartError::Unauthenticated));
    assert_eq!(
        err.to_string(),
        "You must be signed in to do that"
    );
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let cart = harness.cart_service();

    let err = cart
        .add_to_cart(Some(user), ProductId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::UnknownProduct(_)));
    assert!(harness.store.cart_rows(user).is_empty());
}

#[tokio::test]
async fn test_checkout_charges_and_snapshots_the_cart() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let stickers = harness.store.add_product("Sticker Sheet", 500);
    let pin = harness.store.add_product("Enamel Pin", 300);
    let cart = harness.cart_service();

    cart.add_to_cart(Some(user), stickers).await.expect("add");
    cart.add_to_cart(Some(user), stickers).await.expect("add");
    cart.add_to_cart(Some(user), pin).await.expect("add");

    let order = harness
        .checkout_service()
        .checkout(Some(user), "tok_visa")
        .await
        .expect("checkout failed");

    // One charge for the full amount
    let charges = harness.gateway.charges();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount, Money::from_minor(1300));
    assert_eq!(charges[0].currency, "usd");

    // Order total matches the charge; items preserve quantities
    assert_eq!(order.order.total, Money::from_minor(1300));
    assert_eq!(order.order.charge, charges[0].id);
    assert_eq!(order.items.len(), 2);
    let quantity_of = |name: &str| {
        order
            .items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.quantity.get())
    };
    assert_eq!(quantity_of("Sticker Sheet"), Some(2));
    assert_eq!(quantity_of("Enamel Pin"), Some(1));

    // Cart is empty afterwards
    assert!(harness.store.cart_rows(user).is_empty());
}

#[tokio::test]
async fn test_declined_charge_creates_nothing() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let product = harness.store.add_product("Sticker Sheet", 500);
    let cart = harness.cart_service();
    cart.add_to_cart(Some(user), product).await.expect("add");
    cart.add_to_cart(Some(user), product).await.expect("add");

    harness.gateway.set_mode(PaymentMode::Decline);
    let err = harness
        .checkout_service()
        .checkout(Some(user), "tok_chargeDeclined")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Payment(_)));

    // No order, cart untouched
    assert!(harness.store.orders().is_empty());
    let rows = harness.store.cart_rows(user);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity.get(), 2);
}

#[tokio::test]
async fn test_checkout_empty_cart_never_reaches_the_gateway() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");

    let err = harness
        .checkout_service()
        .checkout(Some(user), "tok_visa")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(harness.gateway.charges().is_empty());
}

#[tokio::test]
async fn test_dangling_product_lines_are_skipped() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let kept = harness.store.add_product("Sticker Sheet", 500);
    let deleted = harness.store.add_product("Enamel Pin", 300);
    let cart = harness.cart_service();
    cart.add_to_cart(Some(user), kept).await.expect("add");
    cart.add_to_cart(Some(user), deleted).await.expect("add");

    harness.store.remove_product(deleted);

    let order = harness
        .checkout_service()
        .checkout(Some(user), "tok_visa")
        .await
        .expect("checkout failed");

    assert_eq!(order.order.total, Money::from_minor(500));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Sticker Sheet");
}

#[tokio::test]
async fn test_cart_of_only_dangling_lines_is_empty() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let product = harness.store.add_product("Sticker Sheet", 500);
    let cart = harness.cart_service();
    cart.add_to_cart(Some(user), product).await.expect("add");

    harness.store.remove_product(product);

    let err = harness
        .checkout_service()
        .checkout(Some(user), "tok_visa")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(harness.gateway.charges().is_empty());
}

#[tokio::test]
async fn test_order_failure_after_charge_surfaces_the_charge_id() {
    let harness = Harness::new();
    let user = harness.store.add_user("Ada", "ada@example.com");
    let product = harness.store.add_product("Sticker Sheet", 500);
    let cart = harness.cart_service();
    cart.add_to_cart(Some(user), product).await.expect("add");

    harness.store.fail_next_order();
    let err = harness
        .checkout_service()
        .checkout(Some(user), "tok_visa")
        .await
        .unwrap_err();

    let charges = harness.gateway.charges();
    assert_eq!(charges.len(), 1);
    match err {
        CheckoutError::ChargedWithoutOrder { charge_id, .. } => {
            assert_eq!(charge_id, charges[0].id);
        }
        other => panic!("expected ChargedWithoutOrder, got {other:?}"),
    }

    // Nothing was committed; the cart survives for a retry
    assert!(harness.store.orders().is_empty());
    assert_eq!(harness.store.cart_rows(user).len(), 1);
}
