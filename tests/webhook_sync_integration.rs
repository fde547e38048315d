//! Integration tests for webhook synchronization.
//!
//! These tests drive the dispatcher end to end:
//! 1. A provider event is routed to the handler for its kind
//! 2. The handler reads and writes subscriptions inside one transaction
//! 3. The transaction commits on success and rolls back on failure
//!
//! Uses the in-memory billing store so no database is required.

use serde_json::{json, Value};
use std::sync::Arc;

use subscription_sync::adapters::InMemoryBillingStore;
use subscription_sync::application::{
    DispatchOutcome, GetSubscriptionStatusHandler, GetSubscriptionStatusQuery,
    ProvisionSubscriptionCommand, ProvisionSubscriptionHandler, WebhookDispatcher,
};
use subscription_sync::domain::billing::{
    CheckoutSession, EventEnvelope, EventKind, PayloadDeserializer, Plan, PlanTier, Subscription,
    SubscriptionStatus, WebhookError, DEFAULT_API_VERSION,
};
use subscription_sync::domain::foundation::{PlanId, SubscriptionId, Timestamp, UserId};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn catalog_plan(tier: PlanTier, price_id: Option<&str>, price_cents: i64) -> Plan {
    Plan {
        id: PlanId::new(),
        tier,
        monthly_token_limit: 10_000,
        daily_message_limit: 10,
        price_cents,
        currency: "EUR".to_string(),
        provider_price_id: price_id.map(String::from),
        created_at: Timestamp::now(),
        updated_at: Timestamp::now(),
    }
}

struct Harness {
    store: InMemoryBillingStore,
    dispatcher: WebhookDispatcher,
    free: Plan,
    plus: Plan,
}

impl Harness {
    fn new() -> Self {
        let free = catalog_plan(PlanTier::Free, None, 0);
        let plus = catalog_plan(PlanTier::Plus, Some("price_plus"), 999);
        let max = catalog_plan(PlanTier::Max, Some("price_max"), 2_999);
        let store = InMemoryBillingStore::with_catalog(vec![free.clone(), plus.clone(), max]);
        let dispatcher = WebhookDispatcher::with_standard_handlers(
            Arc::new(store.clone()),
            PayloadDeserializer::default(),
        )
        .expect("standard handlers are unique");
        Self {
            store,
            dispatcher,
            free,
            plus,
        }
    }

    async fn seed(&self, customer_id: &str, plan: &Plan, status: SubscriptionStatus) -> Subscription {
        let mut sub = Subscription::create_free(SubscriptionId::new(), UserId::new(), self.free.clone());
        sub.plan = plan.clone();
        sub.provider_customer_id = Some(customer_id.to_string());
        sub.status = status;
        self.store.add_subscription(sub.clone()).await;
        sub
    }

    async fn current(&self, sub: &Subscription) -> Subscription {
        self.store.subscription(&sub.id).await.expect("subscription exists")
    }
}

fn event(id: &str, kind: EventKind, object: Value) -> EventEnvelope {
    EventEnvelope::new(id, kind.as_str(), Some(DEFAULT_API_VERSION.to_string()), object)
}

fn invoice(customer: &str) -> Value {
    json!({
        "object": "invoice",
        "id": "in_1",
        "customer": customer,
        "subscription": "sub_1",
        "amount_paid": 999,
        "currency": "eur"
    })
}

fn provider_subscription(customer: &str, price_id: &str) -> Value {
    json!({
        "object": "subscription",
        "id": "sub_1",
        "customer": customer,
        "status": "active",
        "cancel_at_period_end": false,
        "current_period_end": 1_735_689_600,
        "items": { "data": [ { "price": { "id": price_id } } ] }
    })
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_completed_links_once() {
    let h = Harness::new();
    let sub = h.seed("cus_X", &h.free, SubscriptionStatus::Active).await;
    let checkout = event(
        "evt_checkout",
        EventKind::CheckoutCompleted,
        json!({
            "object": "checkout.session",
            "id": "cs_1",
            "customer": "cus_X",
            "subscription": "sub_S"
        }),
    );

    let outcome = h.dispatcher.handle(&checkout).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Handled(EventKind::CheckoutCompleted));

    let linked = h.current(&sub).await;
    assert_eq!(linked.provider_subscription_id.as_deref(), Some("sub_S"));
    assert_eq!(linked.status, SubscriptionStatus::Active);
    let writes = h.store.committed_writes();

    // Redelivery changes nothing.
    h.dispatcher.handle(&checkout).await.unwrap();
    assert_eq!(h.current(&sub).await, linked);
    assert_eq!(h.store.committed_writes(), writes);
}

// =============================================================================
// Invoices
// =============================================================================

#[tokio::test]
async fn payment_failure_then_recovery() {
    let h = Harness::new();
    let sub = h.seed("cus_Y", &h.plus, SubscriptionStatus::Active).await;

    h.dispatcher
        .handle(&event("evt_failed", EventKind::InvoicePaymentFailed, invoice("cus_Y")))
        .await
        .unwrap();
    assert_eq!(h.current(&sub).await.status, SubscriptionStatus::PastDue);

    h.dispatcher
        .handle(&event("evt_ok", EventKind::InvoicePaymentSucceeded, invoice("cus_Y")))
        .await
        .unwrap();
    assert_eq!(h.current(&sub).await.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn payment_succeeded_on_active_subscription_does_not_write() {
    let h = Harness::new();
    let sub = h.seed("cus_Y", &h.plus, SubscriptionStatus::Active).await;
    let before = h.current(&sub).await;

    h.dispatcher
        .handle(&event("evt_ok", EventKind::InvoicePaymentSucceeded, invoice("cus_Y")))
        .await
        .unwrap();

    assert_eq!(h.current(&sub).await, before);
    assert_eq!(h.store.committed_writes(), 0);
}

// =============================================================================
// Subscription lifecycle
// =============================================================================

#[tokio::test]
async fn deletion_resets_to_free() {
    let h = Harness::new();
    let mut seeded = h.seed("cus_Z", &h.plus, SubscriptionStatus::PastDue).await;
    seeded.provider_subscription_id = Some("sub_1".to_string());
    seeded.cancel_at_period_end = true;
    h.store.add_subscription(seeded.clone()).await;

    h.dispatcher
        .handle(&event(
            "evt_deleted",
            EventKind::SubscriptionDeleted,
            provider_subscription("cus_Z", "price_plus"),
        ))
        .await
        .unwrap();

    let reset = h.current(&seeded).await;
    assert_eq!(reset.plan.tier, PlanTier::Free);
    assert_eq!(reset.status, SubscriptionStatus::Active);
    assert!(reset.provider_customer_id.is_none());
    assert!(reset.provider_subscription_id.is_none());
    assert!(!reset.cancel_at_period_end);
    assert!(reset.current_period_end.is_none());
}

#[tokio::test]
async fn subscription_updated_moves_to_new_plan() {
    let h = Harness::new();
    let sub = h.seed("cus_U", &h.plus, SubscriptionStatus::Active).await;

    h.dispatcher
        .handle(&event(
            "evt_updated",
            EventKind::SubscriptionUpdated,
            provider_subscription("cus_U", "price_max"),
        ))
        .await
        .unwrap();

    let updated = h.current(&sub).await;
    assert_eq!(updated.plan.tier, PlanTier::Max);
    assert_eq!(updated.current_period_end, Timestamp::from_epoch_secs(1_735_689_600));
}

// =============================================================================
// Routing and failures
// =============================================================================

#[tokio::test]
async fn unknown_event_type_is_skipped() {
    let h = Harness::new();
    let unknown = EventEnvelope::new("evt_x", "customer.created", None, json!({ "object": "customer" }));

    let outcome = h.dispatcher.handle(&unknown).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Skipped);
    assert_eq!(h.store.commit_count(), 0);
    assert_eq!(h.store.rollback_count(), 0);
}

#[tokio::test]
async fn unknown_customer_rolls_back_and_is_acknowledged() {
    let h = Harness::new();

    let err = h
        .dispatcher
        .handle(&event("evt_ghost", EventKind::InvoicePaymentFailed, invoice("cus_ghost")))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::SubscriptionNotFound { .. }));
    assert_eq!(err.status_code(), http::StatusCode::OK);
    assert_eq!(h.store.rollback_count(), 1);
}

#[tokio::test]
async fn session_expected_but_invoice_delivered() {
    let envelope = event("evt_wrong", EventKind::CheckoutCompleted, invoice("cus_X"));

    let err = PayloadDeserializer::default()
        .deserialize::<CheckoutSession>(&envelope)
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Session"), "{}", message);
    assert!(message.contains("Invoice"), "{}", message);
}

// =============================================================================
// Provisioning and status query
// =============================================================================

#[tokio::test]
async fn provisioned_subscription_reflects_checkout() {
    let h = Harness::new();
    let user_id = UserId::new();

    let provisioned = ProvisionSubscriptionHandler::new(Arc::new(h.store.clone()))
        .handle(ProvisionSubscriptionCommand { user_id })
        .await
        .unwrap()
        .subscription;

    let mut with_customer = h.current(&provisioned).await;
    with_customer.provider_customer_id = Some("cus_new".to_string());
    h.store.add_subscription(with_customer).await;

    h.dispatcher
        .handle(&event(
            "evt_checkout",
            EventKind::CheckoutCompleted,
            json!({
                "object": "checkout.session",
                "id": "cs_2",
                "customer": "cus_new",
                "subscription": "sub_new"
            }),
        ))
        .await
        .unwrap();

    let view = GetSubscriptionStatusHandler::new(Arc::new(h.store.clone()))
        .handle(GetSubscriptionStatusQuery { user_id })
        .await
        .unwrap();

    assert_eq!(view.plan, PlanTier::Free);
    assert_eq!(view.status, SubscriptionStatus::Active);
    assert!(view.has_provider_subscription);
}
