use serde::{Deserialize, Serialize};

/// Weapon kinds. Blaster recharges from a native reservoir; the other three
/// consume ammo packs held in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Blaster,
    Shotgun,
    RocketLauncher,
    Railgun,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Blaster,
        WeaponKind::Shotgun,
        WeaponKind::RocketLauncher,
        WeaponKind::Railgun,
    ];

    /// The inventory item that grants this weapon.
    pub fn weapon_item(self) -> ItemKind {
        match self {
            WeaponKind::Blaster => ItemKind::Blaster,
            WeaponKind::Shotgun => ItemKind::Shotgun,
            WeaponKind::RocketLauncher => ItemKind::RocketLauncher,
            WeaponKind::Railgun => ItemKind::Railgun,
        }
    }

    /// The inventory ammo pack this weapon draws from, or `None` for a
    /// weapon with a native rechargeable reservoir.
    pub fn ammo_item(self) -> Option<ItemKind> {
        match self {
            WeaponKind::Blaster => None,
            WeaponKind::Shotgun => Some(ItemKind::ShotgunAmmo),
            WeaponKind::RocketLauncher => Some(ItemKind::RocketAmmo),
            WeaponKind::Railgun => Some(ItemKind::RailgunAmmo),
        }
    }

    pub fn has_native_reservoir(self) -> bool {
        matches!(self, WeaponKind::Blaster)
    }

    /// Fires a single simulated projectile with a finite lifetime.
    pub fn is_projectile(self) -> bool {
        matches!(self, WeaponKind::Blaster | WeaponKind::RocketLauncher)
    }

    /// Fires several pellets as instantaneous clipped segments.
    pub fn is_spread(self) -> bool {
        matches!(self, WeaponKind::Shotgun)
    }

    /// Fires one long instantaneous clipped segment.
    pub fn is_long_hitscan(self) -> bool {
        matches!(self, WeaponKind::Railgun)
    }

    /// Rocket splash applies to any bullet fired as this weapon kind,
    /// including enemy-fired ones (Towers reuse `RocketLauncher`'s config).
    pub fn has_splash(self) -> bool {
        matches!(self, WeaponKind::RocketLauncher)
    }
}

/// Everything that can occupy a slot in a player's inventory: weapons, ammo
/// packs, and consumables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Blaster,
    Shotgun,
    RocketLauncher,
    Railgun,
    BlasterAmmo,
    ShotgunAmmo,
    RocketAmmo,
    RailgunAmmo,
    AidKit,
    Goggles,
}

impl ItemKind {
    pub const ALL: [ItemKind; 10] = [
        ItemKind::Blaster,
        ItemKind::Shotgun,
        ItemKind::RocketLauncher,
        ItemKind::Railgun,
        ItemKind::BlasterAmmo,
        ItemKind::ShotgunAmmo,
        ItemKind::RocketAmmo,
        ItemKind::RailgunAmmo,
        ItemKind::AidKit,
        ItemKind::Goggles,
    ];

    /// The weapon this item switches to when used, if it is a weapon item.
    pub fn grants_weapon(self) -> Option<WeaponKind> {
        match self {
            ItemKind::Blaster => Some(WeaponKind::Blaster),
            ItemKind::Shotgun => Some(WeaponKind::Shotgun),
            ItemKind::RocketLauncher => Some(WeaponKind::RocketLauncher),
            ItemKind::Railgun => Some(WeaponKind::Railgun),
            _ => None,
        }
    }
}

/// A single inventory line: an item kind plus how many the player holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item_kind: ItemKind,
    pub quantity: u32,
}

/// Ordered inventory, matching `spec.md` §3's "ordered sequence of
/// `{itemKind, quantity>=0}`".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory(pub Vec<InventoryEntry>);

impl Inventory {
    pub fn quantity_of(&self, kind: ItemKind) -> u32 {
        self.0
            .iter()
            .find(|e| e.item_kind == kind)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    /// Adds `amount` units of `kind`, creating the entry if absent.
    pub fn add(&mut self, kind: ItemKind, amount: u32) {
        if amount == 0 {
            return;
        }
        if let Some(entry) = self.0.iter_mut().find(|e| e.item_kind == kind) {
            entry.quantity += amount;
        } else {
            self.0.push(InventoryEntry {
                item_kind: kind,
                quantity: amount,
            });
        }
    }

    /// Removes up to `amount` units of `kind`. Returns `true` if at least
    /// one unit was available and consumed.
    pub fn consume(&mut self, kind: ItemKind, amount: u32) -> bool {
        if let Some(entry) = self.0.iter_mut().find(|e| e.item_kind == kind) {
            if entry.quantity == 0 {
                return false;
            }
            entry.quantity = entry.quantity.saturating_sub(amount);
            true
        } else {
            false
        }
    }

    /// Merges another inventory's contents additively into this one (used
    /// when picking up a dropped chest).
    pub fn merge_from(&mut self, other: &Inventory) {
        for entry in &other.0 {
            self.add(entry.item_kind, entry.quantity);
        }
    }

    pub fn starting() -> Inventory {
        let mut inv = Inventory::default();
        inv.add(ItemKind::Blaster, 1);
        inv
    }
}
