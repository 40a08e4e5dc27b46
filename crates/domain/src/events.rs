//! Domain events recorded in the audit log.
//!
//! Events are written after each successful mutation and read back only
//! for history. Entity state is never rebuilt from them.

use chrono::{DateTime, Utc};
use common::{Context, CustomerId, OrderId};
use event_store::{EventStore, EventStoreError, EventStoreExt, RecordedEvent};
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::order::Order;

/// Stored type tags, one per [`DomainEvent`] variant.
pub mod event_types {
    pub const CUSTOMER_CREATED: &str = "customer.created";
    pub const CUSTOMER_UPDATED: &str = "customer.updated";
    pub const CUSTOMER_DELETED: &str = "customer.deleted";
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_UPDATED: &str = "order.updated";
    pub const ORDER_DELETED: &str = "order.deleted";
    pub const CUSTOMER_ASSIGNED_TO_ORDER: &str = "order.customer_assigned";
}

/// Everything that can happen to a customer or an order.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// Customer was created.
    CustomerCreated(CustomerData),

    /// Customer name or email was replaced.
    CustomerUpdated(CustomerData),

    /// Customer was deleted.
    CustomerDeleted(CustomerDeletedData),

    /// Order was created.
    OrderCreated(OrderData),

    /// Order product, quantity or customer link was replaced.
    OrderUpdated(OrderData),

    /// Order was deleted.
    OrderDeleted(OrderDeletedData),

    /// Order was linked to a customer.
    CustomerAssignedToOrder(CustomerAssignedData),
}

/// Payload of CustomerCreated and CustomerUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerData {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Payload of CustomerDeleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDeletedData {
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Payload of OrderCreated and OrderUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub order_id: OrderId,
    pub product: String,
    pub quantity: i32,
    pub customer_id: Option<CustomerId>,
    pub occurred_at: DateTime<Utc>,
}

/// Payload of OrderDeleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDeletedData {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Payload of CustomerAssignedToOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAssignedData {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

impl CustomerData {
    fn now(id: CustomerId, customer: &Customer) -> Self {
        Self {
            customer_id: id,
            name: customer.name().to_string(),
            email: customer.email().to_string(),
            occurred_at: Utc::now(),
        }
    }
}

impl OrderData {
    fn now(id: OrderId, order: &Order) -> Self {
        Self {
            order_id: id,
            product: order.product().to_string(),
            quantity: order.quantity(),
            customer_id: order.customer_id(),
            occurred_at: Utc::now(),
        }
    }
}

impl DomainEvent {
    pub fn customer_created(id: CustomerId, customer: &Customer) -> Self {
        DomainEvent::CustomerCreated(CustomerData::now(id, customer))
    }

    pub fn customer_updated(id: CustomerId, customer: &Customer) -> Self {
        DomainEvent::CustomerUpdated(CustomerData::now(id, customer))
    }

    pub fn customer_deleted(id: CustomerId) -> Self {
        DomainEvent::CustomerDeleted(CustomerDeletedData {
            customer_id: id,
            occurred_at: Utc::now(),
        })
    }

    pub fn order_created(id: OrderId, order: &Order) -> Self {
        DomainEvent::OrderCreated(OrderData::now(id, order))
    }

    pub fn order_updated(id: OrderId, order: &Order) -> Self {
        DomainEvent::OrderUpdated(OrderData::now(id, order))
    }

    pub fn order_deleted(id: OrderId) -> Self {
        DomainEvent::OrderDeleted(OrderDeletedData {
            order_id: id,
            occurred_at: Utc::now(),
        })
    }

    pub fn customer_assigned(order_id: OrderId, customer_id: CustomerId) -> Self {
        DomainEvent::CustomerAssignedToOrder(CustomerAssignedData {
            order_id,
            customer_id,
            occurred_at: Utc::now(),
        })
    }
}

impl RecordedEvent for DomainEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::CustomerCreated(_) => event_types::CUSTOMER_CREATED,
            DomainEvent::CustomerUpdated(_) => event_types::CUSTOMER_UPDATED,
            DomainEvent::CustomerDeleted(_) => event_types::CUSTOMER_DELETED,
            DomainEvent::OrderCreated(_) => event_types::ORDER_CREATED,
            DomainEvent::OrderUpdated(_) => event_types::ORDER_UPDATED,
            DomainEvent::OrderDeleted(_) => event_types::ORDER_DELETED,
            DomainEvent::CustomerAssignedToOrder(_) => event_types::CUSTOMER_ASSIGNED_TO_ORDER,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::CustomerCreated(d) | DomainEvent::CustomerUpdated(d) => d.occurred_at,
            DomainEvent::CustomerDeleted(d) => d.occurred_at,
            DomainEvent::OrderCreated(d) | DomainEvent::OrderUpdated(d) => d.occurred_at,
            DomainEvent::OrderDeleted(d) => d.occurred_at,
            DomainEvent::CustomerAssignedToOrder(d) => d.occurred_at,
        }
    }

    fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            DomainEvent::CustomerCreated(d) | DomainEvent::CustomerUpdated(d) => {
                serde_json::to_value(d)
            }
            DomainEvent::CustomerDeleted(d) => serde_json::to_value(d),
            DomainEvent::OrderCreated(d) | DomainEvent::OrderUpdated(d) => serde_json::to_value(d),
            DomainEvent::OrderDeleted(d) => serde_json::to_value(d),
            DomainEvent::CustomerAssignedToOrder(d) => serde_json::to_value(d),
        }
    }

    fn decode(event_type: &str, payload: serde_json::Value) -> event_store::Result<Self> {
        let event = match event_type {
            event_types::CUSTOMER_CREATED => {
                DomainEvent::CustomerCreated(serde_json::from_value(payload)?)
            }
            event_types::CUSTOMER_UPDATED => {
                DomainEvent::CustomerUpdated(serde_json::from_value(payload)?)
            }
            event_types::CUSTOMER_DELETED => {
                DomainEvent::CustomerDeleted(serde_json::from_value(payload)?)
            }
            event_types::ORDER_CREATED => DomainEvent::OrderCreated(serde_json::from_value(payload)?),
            event_types::ORDER_UPDATED => DomainEvent::OrderUpdated(serde_json::from_value(payload)?),
            event_types::ORDER_DELETED => DomainEvent::OrderDeleted(serde_json::from_value(payload)?),
            event_types::CUSTOMER_ASSIGNED_TO_ORDER => {
                DomainEvent::CustomerAssignedToOrder(serde_json::from_value(payload)?)
            }
            other => return Err(EventStoreError::UnknownEventType(other.to_string())),
        };
        Ok(event)
    }
}

/// Appends an event without letting a failure reach the caller.
///
/// The mutation that produced the event has already committed, so an
/// append error is logged and counted, then dropped.
pub(crate) async fn record_event<S: EventStore>(store: &S, ctx: &Context, event: DomainEvent) {
    let event_type = event.event_type();
    match store.store_event(ctx, &event).await {
        Ok(()) => {
            metrics::counter!("domain_events_recorded_total", "event_type" => event_type)
                .increment(1);
        }
        Err(error) => {
            tracing::warn!(event_type, %error, "failed to record domain event");
            metrics::counter!("domain_events_dropped_total", "event_type" => event_type)
                .increment(1);
        }
    }
}
