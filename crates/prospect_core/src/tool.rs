//! Mining tools.

use serde::{Deserialize, Serialize};

use crate::resources::{same_targets, targets_label, ResourceType};

/// Equipment that lets a unit mine specific resources.
///
/// Tools are values: upgrading a unit replaces its tool with a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    efficiency: u32,
    targets: Vec<ResourceType>,
}

impl Tool {
    /// Create a tool. Efficiency is raised to at least 1.
    #[must_use]
    pub fn new(efficiency: u32, targets: Vec<ResourceType>) -> Self {
        Self {
            efficiency: efficiency.max(1),
            targets,
        }
    }

    /// Resources mined per successful action, before modifiers.
    #[must_use]
    pub const fn efficiency(&self) -> u32 {
        self.efficiency
    }

    /// Resources this tool can mine.
    #[must_use]
    pub fn targets(&self) -> &[ResourceType] {
        &self.targets
    }

    /// Check whether this tool can mine a resource.
    #[must_use]
    pub fn can_mine(&self, resource: ResourceType) -> bool {
        self.targets.contains(&resource)
    }

    /// Check whether this tool targets exactly the given set, ignoring order.
    #[must_use]
    pub fn has_targets(&self, targets: &[ResourceType]) -> bool {
        same_targets(&self.targets, targets)
    }

    /// Job label derived from the target set.
    #[must_use]
    pub fn job_label(&self) -> String {
        targets_label(&self.targets)
    }
}
