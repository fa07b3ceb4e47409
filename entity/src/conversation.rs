//! Conversation events and reactions.

use crate::message::MessageEvent;
use crate::profile::MessagingMember;
use crate::{tagged_union, Timestamp, Urn};
use serde::{Deserialize, Serialize};

tagged_union! {
    /// Payload of a conversation event.
    pub struct EventContent {
        "com.linkedin.voyager.messaging.event.MessageEvent" => message_event: MessageEvent,
    }
}

tagged_union! {
    /// Sender of a conversation event, carried under the `from` key.
    pub struct EventSender {
        "com.linkedin.voyager.messaging.MessagingMember" => messaging_member: MessagingMember,
    }
}

/// Aggregate of one emoji's reactions on a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReactionSummary {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub count: i64,
    #[serde(with = "crate::serde_helpers::optional_millis")]
    pub first_reacted_at: Option<Timestamp>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub emoji: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub viewer_reacted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationEvent {
    #[serde(with = "crate::serde_helpers::optional_millis")]
    pub created_at: Option<Timestamp>,
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub entity_urn: Option<Urn>,
    pub event_content: Option<EventContent>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub subtype: String,
    #[serde(rename = "from")]
    pub from_: Option<EventSender>,
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub previous_event_in_conversation: Option<Urn>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub reaction_summaries: Vec<ReactionSummary>,
}

impl ConversationEvent {
    /// The message carried by this event, if it is a message event.
    pub fn message(&self) -> Option<&MessageEvent> {
        self.event_content.as_ref()?.message_event.as_ref()
    }

    pub fn sender(&self) -> Option<&MessagingMember> {
        self.from_.as_ref()?.messaging_member.as_ref()
    }
}
