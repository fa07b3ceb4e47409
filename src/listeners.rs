//! Listeners that log what the realtime stream delivers.

use async_trait::async_trait;
use entity::conversation::ConversationEvent;
use entity::RealTimeEventStreamEvent;
use events::{BoxError, Listener, ListenerKey, ListenerRegistry, StreamEvent};
use log::*;
use std::sync::Arc;

pub struct LogStreamEvents;

#[async_trait]
impl Listener for LogStreamEvents {
    async fn handle(&self, event: &StreamEvent) -> Result<(), BoxError> {
        match event {
            StreamEvent::Frame(frame) => trace!("Frame: {frame}"),
            StreamEvent::Payload { kind, event } => info!("{}", describe_payload(kind, event)),
            StreamEvent::Timeout(e) => warn!("Event stream timed out, reconnecting: {e}"),
            StreamEvent::StreamError(e) => warn!("Event stream error: {e}"),
        }
        Ok(())
    }
}

/// Register [`LogStreamEvents`] for every reserved key and both payload kinds.
pub fn register_logging_listeners(registry: &ListenerRegistry) {
    let listener: Arc<dyn Listener> = Arc::new(LogStreamEvents);
    for key in [
        ListenerKey::AllEvents,
        ListenerKey::payload(RealTimeEventStreamEvent::EVENT_KEY),
        ListenerKey::payload(RealTimeEventStreamEvent::REACTION_ADDED_KEY),
        ListenerKey::Timeout,
        ListenerKey::StreamError,
    ] {
        registry.register(key, Arc::clone(&listener));
    }
}

fn describe_payload(kind: &str, event: &RealTimeEventStreamEvent) -> String {
    if kind == RealTimeEventStreamEvent::REACTION_ADDED_KEY {
        let emoji = event
            .reaction_summary
            .as_ref()
            .map(|summary| summary.emoji.as_str())
            .unwrap_or("?");
        let target = event
            .event_urn
            .as_ref()
            .map(|urn| urn.to_string())
            .unwrap_or_default();
        let verb = if event.reaction_added == Some(true) {
            "added"
        } else {
            "removed"
        };
        return format!("Reaction {emoji} {verb} on {target}");
    }

    match &event.event {
        Some(conversation_event) => describe_conversation_event(conversation_event),
        None => format!("{kind} payload without a conversation event"),
    }
}

fn describe_conversation_event(event: &ConversationEvent) -> String {
    let sender = event
        .sender()
        .and_then(|member| member.mini_profile.as_ref())
        .map(|profile| profile.display_name())
        .unwrap_or_else(|| "someone".to_string());

    match event.message() {
        Some(message) if message.is_recalled() => format!("{sender} deleted a message"),
        Some(message) => format!("{sender}: {}", message.text()),
        None => format!("{sender} sent a {} event", event.subtype),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RealTimeEventStreamEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn registers_one_listener_per_key() {
        let registry = ListenerRegistry::new();
        register_logging_listeners(&registry);

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.payload_kinds(), ["event", "reactionAdded"]);
        assert!(registry.has_listeners(&ListenerKey::Timeout));
    }

    #[test]
    fn describes_messages_with_sender() {
        let event = payload(json!({
            "event": {
                "eventContent": {
                    "com.linkedin.voyager.messaging.event.MessageEvent": { "body": "hello" }
                },
                "from": {
                    "com.linkedin.voyager.messaging.MessagingMember": {
                        "miniProfile": { "firstName": "Ada", "lastName": "Lovelace" }
                    }
                }
            }
        }));

        assert_eq!(describe_payload("event", &event), "Ada Lovelace: hello");
    }

    #[test]
    fn describes_reactions() {
        let event = payload(json!({
            "reactionAdded": true,
            "eventUrn": "urn:li:fs_event:(2-abc,2-MTYx)",
            "reactionSummary": { "emoji": "🎉", "count": 1 }
        }));

        assert_eq!(
            describe_payload("reactionAdded", &event),
            "Reaction 🎉 added on urn:li:fs_event:(2-abc,2-MTYx)"
        );
    }
}
