//! Runtime configuration for the desktop shell.

use desktop_app_contract::ApplicationId;
use serde::{Deserialize, Serialize};

use crate::model::DesktopSkin;

/// Base z-index applied below every managed window.
pub const DEFAULT_BASE_Z_INDEX: u32 = 100;
/// Delay applied to bare-app deep-link launches so the shell can finish mounting first.
pub const DEFAULT_DEEP_LINK_LAUNCH_DELAY_MS: u32 = 100;
/// Per-instance cap on buffered update signals.
pub const DEFAULT_UPDATE_INBOX_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Maps a `/<namespace>/<id>` deep link onto an app launch carrying `{ <data_key>: <id> }`.
pub struct DeepLinkNamespace {
    /// First path segment, for example `notes`.
    pub namespace: String,
    /// App launched for this namespace.
    pub app_id: ApplicationId,
    /// Key of the launch payload that receives the second path segment.
    pub data_key: String,
}

impl DeepLinkNamespace {
    /// Creates a namespace mapping.
    pub fn new(namespace: &str, app_id: ApplicationId, data_key: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            app_id,
            data_key: data_key.to_string(),
        }
    }
}

fn default_deep_link_namespaces() -> Vec<DeepLinkNamespace> {
    vec![
        DeepLinkNamespace::new("ipod", ApplicationId::trusted("media.ipod"), "videoId"),
        DeepLinkNamespace::new("notes", ApplicationId::trusted("notes.notepad"), "noteId"),
        DeepLinkNamespace::new("memes", ApplicationId::trusted("media.memes"), "memeId"),
        DeepLinkNamespace::new(
            "lists",
            ApplicationId::trusted("productivity.lists"),
            "listId",
        ),
    ]
}

fn default_base_z_index() -> u32 {
    DEFAULT_BASE_Z_INDEX
}

fn default_deep_link_launch_delay_ms() -> u32 {
    DEFAULT_DEEP_LINK_LAUNCH_DELAY_MS
}

fn default_update_inbox_limit() -> usize {
    DEFAULT_UPDATE_INBOX_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Desktop shell configuration. Missing fields fall back to their defaults.
pub struct DesktopConfig {
    /// Z-index below the bottom-most window.
    #[serde(default = "default_base_z_index")]
    pub base_z_index: u32,
    /// Delay before a bare-app deep link is dispatched.
    #[serde(default = "default_deep_link_launch_delay_ms")]
    pub deep_link_launch_delay_ms: u32,
    /// Active visual skin.
    #[serde(default)]
    pub skin: DesktopSkin,
    /// Recognized `/<namespace>/<id>` deep-link prefixes.
    #[serde(default = "default_deep_link_namespaces")]
    pub deep_link_namespaces: Vec<DeepLinkNamespace>,
    /// Per-instance cap on buffered update signals.
    #[serde(default = "default_update_inbox_limit")]
    pub update_inbox_limit: usize,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            base_z_index: DEFAULT_BASE_Z_INDEX,
            deep_link_launch_delay_ms: DEFAULT_DEEP_LINK_LAUNCH_DELAY_MS,
            skin: DesktopSkin::default(),
            deep_link_namespaces: default_deep_link_namespaces(),
            update_inbox_limit: DEFAULT_UPDATE_INBOX_LIMIT,
        }
    }
}

impl DesktopConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns a copy with a different skin.
    pub fn with_skin(mut self, skin: DesktopSkin) -> Self {
        self.skin = skin;
        self
    }

    /// Looks up a deep-link namespace by its path segment.
    pub fn namespace(&self, segment: &str) -> Option<&DeepLinkNamespace> {
        self.deep_link_namespaces
            .iter()
            .find(|entry| entry.namespace == segment)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = DesktopConfig::from_json("{}").expect("parse config");
        assert_eq!(config, DesktopConfig::default());
        assert_eq!(config.base_z_index, 100);
        assert_eq!(
            config.namespace("notes").map(|ns| ns.app_id.as_str()),
            Some("notes.notepad")
        );
        let ipod = config.namespace("ipod").expect("ipod namespace");
        assert_eq!(ipod.app_id.as_str(), "media.ipod");
        assert_eq!(ipod.data_key, "videoId");
    }

    #[test]
    fn skin_and_namespaces_override_defaults() {
        let config = DesktopConfig::from_json(
            r#"{
                "skin": "windows-xp",
                "deepLinkNamespaces": [
                    { "namespace": "todo", "appId": "productivity.todo", "dataKey": "taskId" }
                ]
            }"#,
        )
        .expect("parse config");

        assert_eq!(config.skin, DesktopSkin::WindowsXp);
        assert_eq!(
            DesktopConfig::default().with_skin(DesktopSkin::WindowsXp).skin,
            config.skin
        );
        assert_eq!(config.deep_link_namespaces.len(), 1);
        assert!(config.namespace("notes").is_none());
        assert_eq!(config.update_inbox_limit, DEFAULT_UPDATE_INBOX_LIMIT);
    }

    #[test]
    fn invalid_namespace_app_id_is_rejected() {
        let err = DesktopConfig::from_json(
            r#"{ "deepLinkNamespaces": [{ "namespace": "x", "appId": "bad", "dataKey": "k" }] }"#,
        );
        assert!(err.is_err());
    }
}
