//! Items and their combat/consumption properties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything an agent can hold or find lying around.
///
/// `Water` is a location fixture: it can sit in a location's item list but is
/// never carried, picked up, or depleted by drinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Chainsaw,
    Pistol,
    Rifle,
    EnergyBar,
    Water,
    WaterBottle,
    RustyPipe,
    Hatchet,
    AerosolFlamethrower,
    Bandage,
    Wrench,
    Hacksaw,
    Rpg,
    Atgm,
    HolyWater,
    Nothing,
}

impl Item {
    /// Damage dealt when swung, fired, or thrown at another agent.
    pub fn damage(self) -> u32 {
        match self {
            Item::Chainsaw => 45,
            Item::Pistol => 50,
            Item::Rifle => 60,
            Item::RustyPipe => 25,
            Item::Hatchet => 30,
            Item::AerosolFlamethrower => 20,
            Item::Wrench => 20,
            Item::Hacksaw => 15,
            Item::Rpg => 100,
            Item::Atgm => 200,
            Item::HolyWater => 15,
            _ => 10,
        }
    }

    /// Whether using the item destroys it.
    pub fn consumable(self) -> bool {
        matches!(
            self,
            Item::EnergyBar
                | Item::WaterBottle
                | Item::AerosolFlamethrower
                | Item::Bandage
                | Item::HolyWater
                | Item::Rpg
                | Item::Atgm
        )
    }

    /// Short code used in location labels.
    pub fn code(self) -> &'static str {
        match self {
            Item::Chainsaw => "CS",
            Item::Pistol => "PSTL",
            Item::Rifle => "RFL",
            Item::EnergyBar => "EB",
            Item::Water => "WS",
            Item::WaterBottle => "WB",
            Item::RustyPipe => "RP",
            Item::Hatchet => "HTCHT",
            Item::AerosolFlamethrower => "IAF",
            Item::Bandage => "BDG",
            Item::Wrench => "WRNC",
            Item::Hacksaw => "HS",
            Item::Rpg => "RPG",
            Item::Atgm => "ATGM",
            Item::HolyWater => "HW",
            Item::Nothing => "NT",
        }
    }

    /// Full display name.
    pub fn name(self) -> &'static str {
        match self {
            Item::Chainsaw => "CHAINSAW",
            Item::Pistol => "PISTOL",
            Item::Rifle => "RIFLE",
            Item::EnergyBar => "ENERGY BAR",
            Item::Water => "WATER SOURCE",
            Item::WaterBottle => "WATER BOTTLE",
            Item::RustyPipe => "RUSTY PIPE",
            Item::Hatchet => "HATCHET",
            Item::AerosolFlamethrower => "IMPROVISED AEROSOL FLAMETHROWER",
            Item::Bandage => "BANDAGE",
            Item::Wrench => "WRENCH",
            Item::Hacksaw => "HACKSAW",
            Item::Rpg => "ROCKET-PROPELLED GRENADE LAUNCHER",
            Item::Atgm => "ANTI-TANK GUIDED MISSILE",
            Item::HolyWater => "HOLY WATER",
            Item::Nothing => "NOTHING",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_table() {
        assert_eq!(Item::Pistol.damage(), 50);
        assert_eq!(Item::Rifle.damage(), 60);
        assert_eq!(Item::RustyPipe.damage(), 25);
        assert_eq!(Item::Atgm.damage(), 200);
        // Non-weapons fall through to the bare-hands value.
        assert_eq!(Item::EnergyBar.damage(), 10);
        assert_eq!(Item::Nothing.damage(), 10);
    }

    #[test]
    fn test_consumable_set() {
        for item in [
            Item::EnergyBar,
            Item::WaterBottle,
            Item::AerosolFlamethrower,
            Item::Bandage,
            Item::HolyWater,
            Item::Rpg,
            Item::Atgm,
        ] {
            assert!(item.consumable(), "{item} should be consumable");
        }
        for item in [Item::Chainsaw, Item::Pistol, Item::Rifle, Item::Wrench, Item::Nothing] {
            assert!(!item.consumable(), "{item} should not be consumable");
        }
    }

    #[test]
    fn test_display_uses_long_name() {
        assert_eq!(Item::Atgm.to_string(), "ANTI-TANK GUIDED MISSILE");
        assert_eq!(Item::Atgm.code(), "ATGM");
    }
}
