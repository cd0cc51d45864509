//! Global resource ledger and purchased buildings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::building::Building;
use crate::resources::{ResourceBundle, ResourceType};

/// The player's stockpile and buildings.
///
/// Amounts never go negative: removal clamps at zero. Callers that must
/// not overspend check [`contains_all`](Self::contains_all) first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Inventory {
    resources: BTreeMap<ResourceType, u32>,
    buildings: Vec<Building>,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount held of a resource.
    #[must_use]
    pub fn amount(&self, resource: ResourceType) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// Every resource with its amount, in catalogue order.
    pub fn amounts(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        ResourceType::ALL.into_iter().map(|r| (r, self.amount(r)))
    }

    /// Add to a resource.
    pub fn add(&mut self, resource: ResourceType, amount: u32) {
        let entry = self.resources.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove from a resource, clamping at zero.
    pub fn remove(&mut self, resource: ResourceType, amount: u32) {
        let entry = self.resources.entry(resource).or_insert(0);
        *entry = entry.saturating_sub(amount);
    }

    /// Whether at least `amount` of a resource is held.
    #[must_use]
    pub fn contains(&self, resource: ResourceType, amount: u32) -> bool {
        self.amount(resource) >= amount
    }

    /// Whether every amount of a bundle is held.
    #[must_use]
    pub fn contains_all(&self, bundle: &ResourceBundle) -> bool {
        self.shortfall(bundle).is_none()
    }

    /// First resource of a bundle that is short, as
    /// `(resource, required, available)`.
    #[must_use]
    pub fn shortfall(&self, bundle: &ResourceBundle) -> Option<(ResourceType, u32, u32)> {
        bundle
            .iter()
            .map(|(&resource, &required)| (resource, required, self.amount(resource)))
            .find(|&(_, required, available)| available < required)
    }

    /// Remove every amount of a bundle, clamping each at zero.
    pub fn remove_all(&mut self, bundle: &ResourceBundle) {
        for (&resource, &amount) in bundle {
            self.remove(resource, amount);
        }
    }

    /// Buildings in purchase order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Add a purchased building.
    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub(crate) fn take_buildings(&mut self) -> Vec<Building> {
        std::mem::take(&mut self.buildings)
    }

    pub(crate) fn restore_buildings(&mut self, buildings: Vec<Building>) {
        self.buildings = buildings;
    }
}
