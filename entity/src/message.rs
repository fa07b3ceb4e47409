//! Message bodies, attachments and the custom content variants a message can carry.

use crate::{tagged_union, Timestamp, Urn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextEntity {
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub urn: Option<Urn>,
}

tagged_union! {
    /// What an attributed span of text refers to.
    pub struct AttributeType {
        "com.linkedin.pemberly.text.Entity" => text_entity: TextEntity,
    }
}

/// A span of `AttributedBody::text`, such as a mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub start: i64,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub length: i64,
    #[serde(rename = "type")]
    pub attribute_type: Option<AttributeType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributedBody {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageAttachmentReference {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageAttachment {
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub id: Option<Urn>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub byte_size: i64,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub media_type: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub name: String,
    pub reference: Option<MessageAttachmentReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GifInfo {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub original_height: i64,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub original_width: i64,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThirdPartyMediaInfo {
    pub previewgif: Option<GifInfo>,
    pub nanogif: Option<GifInfo>,
    pub gif: Option<GifInfo>,
}

/// Media hosted by a third party, e.g. a GIF picked from a search provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThirdPartyMedia {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub media_type: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub id: String,
    pub media: Option<ThirdPartyMediaInfo>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalText {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub static_legal_text: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub custom_legal_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpInmailStandardSubContent {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub action: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub action_text: String,
}

tagged_union! {
    pub struct SpInmailSubContent {
        "com.linkedin.voyager.messaging.event.message.spinmail.SpInmailStandardSubContent"
            => standard: SpInmailStandardSubContent,
    }
}

/// Sponsored InMail content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpInmailContent {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub sp_inmail_type: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub advertiser_label: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub body: String,
    pub legal_text: Option<LegalText>,
    pub sub_content: Option<SpInmailSubContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationNameUpdateContent {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub new_name: String,
}

tagged_union! {
    /// Non-text content attached to a message.
    pub struct MessageCustomContent {
        "com.linkedin.voyager.messaging.event.message.ConversationNameUpdateContent"
            => conversation_name_update_content: ConversationNameUpdateContent,
        "com.linkedin.voyager.messaging.event.message.spinmail.SpInmailContent"
            => sp_inmail_content: SpInmailContent,
        "com.linkedin.voyager.messaging.shared.ThirdPartyMedia"
            => third_party_media: ThirdPartyMedia,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageEvent {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub message_body_render_format: String,
    pub subject: Option<String>,
    /// Set once the sender has deleted the message.
    #[serde(with = "crate::serde_helpers::optional_millis")]
    pub recalled_at: Option<Timestamp>,
    pub attributed_body: Option<AttributedBody>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub attachments: Vec<MessageAttachment>,
    pub custom_content: Option<MessageCustomContent>,
}

impl MessageEvent {
    /// The message text, preferring the attributed body when present.
    pub fn text(&self) -> &str {
        match &self.attributed_body {
            Some(attributed) if !attributed.text.is_empty() => &attributed.text,
            _ => &self.body,
        }
    }

    pub fn is_recalled(&self) -> bool {
        self.recalled_at.is_some()
    }
}
