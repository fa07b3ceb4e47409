//! Envelope for events delivered over the realtime stream.

use crate::conversation::{ConversationEvent, ReactionSummary};
use crate::Urn;
use serde::{Deserialize, Serialize};

/// Decoded realtime payload.
///
/// Carries the fields of two unrelated event families at once; which family is
/// present is decided by the payload's top-level keys, not by this record.
///
/// - Message events: `event` and `previous_event_in_conversation`.
/// - Reaction events: `reaction_added`, `actor_mini_profile_urn`, `event_urn`
///   and `reaction_summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealTimeEventStreamEvent {
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub previous_event_in_conversation: Option<Urn>,
    pub event: Option<ConversationEvent>,

    pub reaction_added: Option<bool>,
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub actor_mini_profile_urn: Option<Urn>,
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub event_urn: Option<Urn>,
    pub reaction_summary: Option<ReactionSummary>,
}

impl RealTimeEventStreamEvent {
    /// Payload key that carries conversation events.
    pub const EVENT_KEY: &'static str = "event";
    /// Payload key that carries reaction changes.
    pub const REACTION_ADDED_KEY: &'static str = "reactionAdded";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_reaction_family() {
        let event: RealTimeEventStreamEvent = serde_json::from_value(json!({
            "reactionAdded": true,
            "actorMiniProfileUrn": "urn:li:fs_miniProfile:ACoAAB",
            "eventUrn": "urn:li:fs_event:(2-abc,2-MTYx)",
            "reactionSummary": { "count": 2, "emoji": "👍", "viewerReacted": false, "firstReactedAt": 1700000000000_i64 }
        }))
        .unwrap();

        assert_eq!(event.reaction_added, Some(true));
        assert!(event.event.is_none());
        assert_eq!(event.reaction_summary.unwrap().count, 2);
        assert_eq!(event.event_urn.unwrap().parts().len(), 2);
    }

    #[test]
    fn decodes_message_family() {
        let event: RealTimeEventStreamEvent = serde_json::from_value(json!({
            "previousEventInConversation": "urn:li:fs_event:(2-abc,2-MTYw)",
            "event": {
                "eventContent": {
                    "com.linkedin.voyager.messaging.event.MessageEvent": { "body": "ping" }
                }
            }
        }))
        .unwrap();

        assert_eq!(event.reaction_added, None);
        assert_eq!(event.event.unwrap().message().unwrap().body, "ping");
    }

    #[test]
    fn explicit_nulls_in_plain_fields_do_not_reject_the_payload() {
        let event: RealTimeEventStreamEvent =
            serde_json::from_value(json!({ "event": { "subtype": null } })).unwrap();
        assert_eq!(event.event.unwrap().subtype, "");

        let event: RealTimeEventStreamEvent = serde_json::from_value(json!({
            "reactionAdded": true,
            "reactionSummary": { "count": 1, "emoji": null }
        }))
        .unwrap();
        let summary = event.reaction_summary.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.emoji, "");

        let event: RealTimeEventStreamEvent = serde_json::from_value(json!({
            "event": {
                "eventContent": {
                    "com.linkedin.voyager.messaging.event.MessageEvent": {
                        "attachments": null,
                        "body": null,
                        "attributedBody": { "text": "hi", "attributes": null }
                    }
                }
            }
        }))
        .unwrap();
        let conversation_event = event.event.unwrap();
        let message = conversation_event.message().unwrap();
        assert_eq!(message.body, "");
        assert!(message.attachments.is_empty());
        assert_eq!(message.text(), "hi");

        let event: RealTimeEventStreamEvent =
            serde_json::from_value(json!({ "event": { "reactionSummaries": null } })).unwrap();
        assert!(event.event.unwrap().reaction_summaries.is_empty());
    }
}
