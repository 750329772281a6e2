//! Per-unit ammo bookkeeping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::weapons::{Ammo, WeaponKind};

/// Ammo per weapon plus the current selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    ammo: BTreeMap<WeaponKind, Ammo>,
    selected: WeaponKind,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Starting ammo for every weapon, unlimited weapon selected
    pub fn new() -> Self {
        let mut inventory = Self {
            ammo: BTreeMap::new(),
            selected: WeaponKind::DungBall,
        };
        inventory.reset();
        inventory
    }

    pub fn reset(&mut self) {
        self.ammo = WeaponKind::ALL
            .iter()
            .map(|&kind| (kind, kind.archetype().starting_ammo))
            .collect();
        self.selected = WeaponKind::DungBall;
    }

    pub fn ammo(&self, kind: WeaponKind) -> Ammo {
        self.ammo.get(&kind).copied().unwrap_or(Ammo::Limited(0))
    }

    pub fn can_use(&self, kind: WeaponKind) -> bool {
        self.ammo(kind).is_available()
    }

    /// Spend one round; unlimited never decrements. `false` when empty.
    pub fn use_ammo(&mut self, kind: WeaponKind) -> bool {
        match self.ammo.get_mut(&kind) {
            Some(Ammo::Unlimited) => true,
            Some(Ammo::Limited(n)) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    /// Add rounds, clamped to the archetype maximum
    pub fn add_ammo(&mut self, kind: WeaponKind, amount: u32) {
        let max = kind.archetype().max_ammo;
        let entry = self.ammo.entry(kind).or_insert(Ammo::Limited(0));
        if let Ammo::Limited(n) = entry {
            *n = match max {
                Ammo::Unlimited => n.saturating_add(amount),
                Ammo::Limited(cap) => n.saturating_add(amount).min(cap),
            };
        }
    }

    /// Select a weapon; refused when it has no ammo
    pub fn select_weapon(&mut self, kind: WeaponKind) -> bool {
        if self.can_use(kind) {
            self.selected = kind;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> WeaponKind {
        self.selected
    }

    /// (weapon, ammo, usable) rows in menu order
    pub fn entries(&self) -> impl Iterator<Item = (WeaponKind, Ammo, bool)> + '_ {
        self.ammo
            .iter()
            .map(|(&kind, &ammo)| (kind, ammo, ammo.is_available()))
    }
}
