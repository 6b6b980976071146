//! Per-platform table of command descriptors.

use std::collections::BTreeMap;

use crate::command::CommandDescriptor;
use crate::commands;
use crate::error::CoreError;
use crate::options::Platform;

/// Commands available on one platform, keyed by name.
#[derive(Debug, Clone)]
pub struct Registry {
    platform: Platform,
    commands: BTreeMap<&'static str, CommandDescriptor>,
}

impl Registry {
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            commands: BTreeMap::new(),
        }
    }

    /// The common commands plus the platform's own implementations.
    pub fn for_platform(platform: Platform) -> Self {
        let specific = match platform {
            Platform::Java => commands::java(),
            Platform::JavaScript => commands::javascript(),
        };
        commands::common()
            .into_iter()
            .chain(specific)
            .fold(Self::empty(platform), Self::with)
    }

    /// Adds a descriptor, replacing one with the same name.
    pub fn with(mut self, descriptor: CommandDescriptor) -> Self {
        self.commands.insert(descriptor.name(), descriptor);
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&CommandDescriptor, CoreError> {
        self.commands
            .get(name)
            .ok_or_else(|| CoreError::UnknownCommand(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }
}
