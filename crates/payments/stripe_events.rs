use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CUSTOMER_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const CUSTOMER_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

#[derive(Debug, Error)]
pub enum StripeEventDecodeError {
    #[error("malformed webhook body: {0}")]
    MalformedBody(serde_json::Error),
    #[error("unexpected object for {event_type}: {source}")]
    UnexpectedObject {
        event_type: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct StripeEventEnvelope {
    id: Option<String>,
    #[serde(rename = "type")]
    type_: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: Option<String>,
    pub customer: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionObject {
    pub id: Option<String>,
    pub customer: String,
    pub status: Option<String>,
}

/// Events the billing state machine reacts to. Anything else is acknowledged
/// without being inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum StripeWebhookEvent {
    CheckoutSessionCompleted(CheckoutSession),
    SubscriptionUpdated(SubscriptionObject),
    SubscriptionDeleted(SubscriptionObject),
    Unhandled { event_type: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStripeEvent {
    pub id: Option<String>,
    pub event: StripeWebhookEvent,
}

impl StripeWebhookEvent {
    pub fn event_type(&self) -> &str {
        match self {
            StripeWebhookEvent::CheckoutSessionCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            StripeWebhookEvent::SubscriptionUpdated(_) => CUSTOMER_SUBSCRIPTION_UPDATED,
            StripeWebhookEvent::SubscriptionDeleted(_) => CUSTOMER_SUBSCRIPTION_DELETED,
            StripeWebhookEvent::Unhandled { event_type } => event_type,
        }
    }
}

/// Decodes a raw webhook body into a typed event. The `type` is read first,
/// then `data.object` is validated against the shape that type requires.
pub fn decode_stripe_event(payload: &[u8]) -> Result<DecodedStripeEvent, StripeEventDecodeError> {
    let envelope: StripeEventEnvelope =
        serde_json::from_slice(payload).map_err(StripeEventDecodeError::MalformedBody)?;

    let object = envelope.data.object;
    let event_type = envelope.type_;

    let event = match event_type.as_str() {
        CHECKOUT_SESSION_COMPLETED => {
            StripeWebhookEvent::CheckoutSessionCompleted(object_as(&event_type, object)?)
        }
        CUSTOMER_SUBSCRIPTION_UPDATED => {
            StripeWebhookEvent::SubscriptionUpdated(object_as(&event_type, object)?)
        }
        CUSTOMER_SUBSCRIPTION_DELETED => {
            StripeWebhookEvent::SubscriptionDeleted(object_as(&event_type, object)?)
        }
        _ => StripeWebhookEvent::Unhandled { event_type },
    };

    Ok(DecodedStripeEvent {
        id: envelope.id,
        event,
    })
}

fn object_as<T: serde::de::DeserializeOwned>(
    event_type: &str,
    object: serde_json::Value,
) -> Result<T, StripeEventDecodeError> {
    serde_json::from_value(object).map_err(|source| StripeEventDecodeError::UnexpectedObject {
        event_type: event_type.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_checkout_session_with_metadata() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_1",
                "customer": "cus_9",
                "metadata": {"userId": "6f1c", "plan": "enterprise"}
            }}
        }"#;

        let decoded = decode_stripe_event(payload).unwrap();
        assert_eq!(decoded.id.as_deref(), Some("evt_1"));
        match decoded.event {
            StripeWebhookEvent::CheckoutSessionCompleted(session) => {
                assert_eq!(session.customer.as_deref(), Some("cus_9"));
                assert_eq!(session.metadata_value("plan"), Some("enterprise"));
                assert_eq!(session.metadata_value("missing"), None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decodes_subscription_deleted_with_only_customer() {
        let payload = br#"{"type":"customer.subscription.deleted","data":{"object":{"customer":"cus_123"}}}"#;

        let decoded = decode_stripe_event(payload).unwrap();
        assert_eq!(
            decoded.event,
            StripeWebhookEvent::SubscriptionDeleted(SubscriptionObject {
                id: None,
                customer: "cus_123".to_string(),
                status: None,
            })
        );
    }

    #[test]
    fn unknown_types_are_unhandled_not_rejected() {
        let payload = br#"{"id":"evt_2","type":"invoice.paid","data":{"object":{"anything":1}}}"#;

        let decoded = decode_stripe_event(payload).unwrap();
        assert_eq!(decoded.event.event_type(), "invoice.paid");
        assert!(matches!(decoded.event, StripeWebhookEvent::Unhandled { .. }));
    }

    #[test]
    fn known_type_with_wrong_shape_is_rejected() {
        let payload = br#"{"type":"customer.subscription.updated","data":{"object":{"status":"active"}}}"#;

        assert!(matches!(
            decode_stripe_event(payload),
            Err(StripeEventDecodeError::UnexpectedObject { .. })
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            decode_stripe_event(b"not json"),
            Err(StripeEventDecodeError::MalformedBody(_))
        ));
        assert!(matches!(
            decode_stripe_event(br#"{"type":"x"}"#),
            Err(StripeEventDecodeError::MalformedBody(_))
        ));
    }
}
