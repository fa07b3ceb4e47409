//! Member profiles and their pictures.

use crate::{tagged_union, Timestamp, Urn};
use serde::{Deserialize, Deserializer, Serialize};

const UNKNOWN_DIMENSION: i64 = -1;

fn unknown_dimension<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(UNKNOWN_DIMENSION))
}

/// One rendition of a vector image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artifact {
    #[serde(deserialize_with = "unknown_dimension")]
    pub height: i64,
    #[serde(deserialize_with = "unknown_dimension")]
    pub width: i64,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub file_identifying_url_path_segment: String,
    #[serde(with = "crate::serde_helpers::optional_millis")]
    pub expires_at: Option<Timestamp>,
}

impl Default for Artifact {
    fn default() -> Self {
        Self {
            height: UNKNOWN_DIMENSION,
            width: UNKNOWN_DIMENSION,
            file_identifying_url_path_segment: String::new(),
            expires_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorImage {
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub artifacts: Vec<Artifact>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub root_url: String,
}

impl VectorImage {
    /// Full URL of the last (largest) artifact, if any.
    pub fn largest_artifact_url(&self) -> Option<String> {
        self.artifacts
            .last()
            .map(|artifact| format!("{}{}", self.root_url, artifact.file_identifying_url_path_segment))
    }
}

tagged_union! {
    /// Profile or conversation picture.
    pub struct Picture {
        "com.linkedin.common.VectorImage" => vector_image: VectorImage,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiniProfile {
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub entity_urn: Option<Urn>,
    pub public_identifier: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    #[serde(deserialize_with = "crate::serde_helpers::null_as_default")]
    pub memorialized: bool,
    pub picture: Option<Picture>,
}

impl MiniProfile {
    /// First and last name joined, falling back to the public identifier.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.public_identifier.clone().unwrap_or_default()
        } else {
            name
        }
    }
}

/// A participant in a conversation as seen by the messaging service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagingMember {
    #[serde(with = "crate::serde_helpers::optional_urn")]
    pub entity_urn: Option<Urn>,
    pub mini_profile: Option<MiniProfile>,
    pub alternate_name: Option<String>,
    pub alternate_image: Option<Picture>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn artifact_defaults_to_unknown_dimensions() {
        let artifact: Artifact = serde_json::from_value(json!({})).unwrap();
        assert_eq!(artifact.height, -1);
        assert_eq!(artifact.width, -1);

        let artifact: Artifact = serde_json::from_value(json!({
            "height": null,
            "width": 64,
            "fileIdentifyingUrlPathSegment": null
        }))
        .unwrap();
        assert_eq!(artifact.height, -1);
        assert_eq!(artifact.width, 64);
        assert_eq!(artifact.file_identifying_url_path_segment, "");
    }

    #[test]
    fn null_name_parts_and_flags_still_decode() {
        let profile: MiniProfile = serde_json::from_value(json!({
            "firstName": null,
            "publicIdentifier": "ada",
            "memorialized": null
        }))
        .unwrap();
        assert!(!profile.memorialized);
        assert_eq!(profile.display_name(), "ada");
    }

    #[test]
    fn picture_resolves_vector_image_by_namespace() {
        let member: MessagingMember = serde_json::from_value(json!({
            "entityUrn": "urn:li:fs_messagingMember:(2-abc,ACoAAB)",
            "miniProfile": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "picture": {
                    "com.linkedin.common.VectorImage": {
                        "rootUrl": "https://media.example.com/",
                        "artifacts": [
                            { "width": 100, "height": 100, "fileIdentifyingUrlPathSegment": "100.jpg" },
                            { "width": 400, "height": 400, "fileIdentifyingUrlPathSegment": "400.jpg" }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let image = member
            .mini_profile
            .and_then(|profile| profile.picture)
            .and_then(|picture| picture.vector_image)
            .unwrap();
        assert_eq!(
            image.largest_artifact_url().as_deref(),
            Some("https://media.example.com/400.jpg")
        );
    }

    #[test]
    fn display_name_falls_back_to_public_identifier() {
        let profile = MiniProfile {
            first_name: Some("Ada".to_string()),
            last_name: Some(String::new()),
            ..MiniProfile::default()
        };
        assert_eq!(profile.display_name(), "Ada");

        let profile = MiniProfile {
            public_identifier: Some("ada-lovelace".to_string()),
            ..MiniProfile::default()
        };
        assert_eq!(profile.display_name(), "ada-lovelace");
    }
}
