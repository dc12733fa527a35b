use serde::{Deserialize, Serialize};

use crate::config::{SocketConfig, StyleConfig};

pub const STYLE_PLUGIN: &str = "style";
pub const SOCKET_PLUGIN: &str = "socket";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginConfig {
    Style(StyleConfig),
    Socket(SocketConfig),
}

impl PluginConfig {
    pub fn name(&self) -> &'static str {
        match self {
            PluginConfig::Style(_) => STYLE_PLUGIN,
            PluginConfig::Socket(_) => SOCKET_PLUGIN,
        }
    }
}

/// Plugins registered on one application instance, in registration order.
///
/// Registering a name twice replaces the earlier configuration in place, so
/// running the boot sequence again on the same set never fails.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PluginSet {
    entries: Vec<(&'static str, PluginConfig)>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configuration that was replaced, if any.
    pub fn register(&mut self, config: PluginConfig) -> Option<PluginConfig> {
        let name = config.name();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, config)),
            None => {
                self.entries.push((name, config));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PluginConfig> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, c)| c)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_registration_order() {
        let mut set = PluginSet::new();
        set.register(PluginConfig::Style(StyleConfig::default()));
        set.register(PluginConfig::Socket(SocketConfig::default()));
        assert_eq!(set.names().collect::<Vec<_>>(), vec![STYLE_PLUGIN, SOCKET_PLUGIN]);
    }

    #[test]
    fn re_registering_replaces_without_error() {
        let mut set = PluginSet::new();
        assert!(set.register(PluginConfig::Style(StyleConfig::default())).is_none());

        let restyled = StyleConfig {
            href: "/other.css".into(),
            ..StyleConfig::default()
        };
        let previous = set.register(PluginConfig::Style(restyled.clone()));

        assert_eq!(previous, Some(PluginConfig::Style(StyleConfig::default())));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(STYLE_PLUGIN), Some(&PluginConfig::Style(restyled)));
    }
}
