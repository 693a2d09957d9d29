//! Unit archetypes, base statistics and the leveling rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Side;

/// Health every archetype starts with at level one.
pub const STARTING_HEALTH: f64 = 50.0;

/// Upper bound for unit health.
pub const MAX_HEALTH: f64 = 100.0;

const LEVEL_UP_HEALTH_BASE: f64 = 80.0;

/// Closed set of unit kinds. Each archetype fixes base stats and ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    /// Close-quarters player unit with long movement.
    Swordsman,
    /// Balanced player unit.
    Bowman,
    /// Long-range player unit with high defence.
    Magician,
    /// Balanced computer unit.
    Vampire,
    /// Close-quarters computer unit with long movement.
    Undead,
    /// Long-range computer unit.
    Daemon,
}

/// Base statistics and ranges attached to an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeProfile {
    /// Attack at level one.
    pub attack: f64,
    /// Defence at level one.
    pub defence: f64,
    /// Maximum Chebyshev distance the unit may move in one action.
    pub move_range: u32,
    /// Maximum Chebyshev distance the unit may strike at.
    pub attack_range: u32,
}

impl Archetype {
    /// Every archetype, player kinds first.
    pub const ALL: [Archetype; 6] = [
        Archetype::Swordsman,
        Archetype::Bowman,
        Archetype::Magician,
        Archetype::Vampire,
        Archetype::Undead,
        Archetype::Daemon,
    ];

    /// Archetypes recruited by the player.
    pub const PLAYER: [Archetype; 3] = [
        Archetype::Bowman,
        Archetype::Swordsman,
        Archetype::Magician,
    ];

    /// Archetypes fielded by the computer.
    pub const COMPUTER: [Archetype; 3] = [Archetype::Vampire, Archetype::Undead, Archetype::Daemon];

    /// Returns the base statistics table entry for the archetype.
    #[must_use]
    pub const fn profile(self) -> ArchetypeProfile {
        match self {
            Self::Swordsman | Self::Undead => ArchetypeProfile {
                attack: 40.0,
                defence: 10.0,
                move_range: 4,
                attack_range: 1,
            },
            Self::Bowman | Self::Vampire => ArchetypeProfile {
                attack: 25.0,
                defence: 25.0,
                move_range: 2,
                attack_range: 2,
            },
            Self::Magician => ArchetypeProfile {
                attack: 10.0,
                defence: 40.0,
                move_range: 1,
                attack_range: 4,
            },
            Self::Daemon => ArchetypeProfile {
                attack: 10.0,
                defence: 10.0,
                move_range: 1,
                attack_range: 4,
            },
        }
    }

    /// Side that controls units of this archetype.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Swordsman | Self::Bowman | Self::Magician => Side::Player,
            Self::Vampire | Self::Undead | Self::Daemon => Side::Computer,
        }
    }

    /// Lowercase name used by the serialized match format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Swordsman => "swordsman",
            Self::Bowman => "bowman",
            Self::Magician => "magician",
            Self::Vampire => "vampire",
            Self::Undead => "undead",
            Self::Daemon => "daemon",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A combatant with leveled statistics.
///
/// Health is expressed directly as a percentage in `0.0..=100.0`, so the
/// leveling rule reads it as the share of health retained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit {
    level: u32,
    attack: f64,
    defence: f64,
    health: f64,
    archetype: Archetype,
}

impl Unit {
    /// Creates a level-one unit carrying the archetype's base statistics.
    #[must_use]
    pub const fn new(archetype: Archetype) -> Self {
        let profile = archetype.profile();
        Self {
            level: 1,
            attack: profile.attack,
            defence: profile.defence,
            health: STARTING_HEALTH,
            archetype,
        }
    }

    /// Creates a unit at `level` by replaying `level_up` on a fresh level-one unit.
    ///
    /// Base statistics are assigned before the first level-up so attack and
    /// defence scale with every replayed level. A level of zero yields a
    /// level-one unit.
    #[must_use]
    pub fn at_level(archetype: Archetype, level: u32) -> Self {
        let mut unit = Self::new(archetype);
        for _ in 1..level {
            unit.level_up();
        }
        unit
    }

    /// Rebuilds a unit from previously persisted statistics.
    #[must_use]
    pub fn from_parts(
        level: u32,
        attack: f64,
        defence: f64,
        health: f64,
        archetype: Archetype,
    ) -> Self {
        Self {
            level,
            attack,
            defence,
            health: health.clamp(0.0, MAX_HEALTH),
            archetype,
        }
    }

    /// Advances the unit one level.
    ///
    /// Health resets to `min(level + 80, 100)` and attack/defence scale by
    /// `(80 + health_before) / 100`, never dropping below their current value.
    pub fn level_up(&mut self) {
        self.level += 1;
        let health_percent = self.health;
        self.health = (f64::from(self.level) + LEVEL_UP_HEALTH_BASE).min(MAX_HEALTH);
        let multiplier = (LEVEL_UP_HEALTH_BASE + health_percent) / 100.0;
        self.attack = self.attack.max((self.attack * multiplier).round());
        self.defence = self.defence.max((self.defence * multiplier).round());
    }

    /// Lowers health by `amount`, clamping at zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        self.health = (self.health - amount).max(0.0);
        self.health
    }

    /// Whether the unit still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current attack.
    #[must_use]
    pub const fn attack(&self) -> f64 {
        self.attack
    }

    /// Current defence.
    #[must_use]
    pub const fn defence(&self) -> f64 {
        self.defence
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Archetype fixed at creation.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Side controlling the unit.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.archetype.side()
    }

    /// Movement range granted by the archetype.
    #[must_use]
    pub const fn move_range(&self) -> u32 {
        self.archetype.profile().move_range
    }

    /// Attack range granted by the archetype.
    #[must_use]
    pub const fn attack_range(&self) -> u32 {
        self.archetype.profile().attack_range
    }

    /// Overrides the current health. Used by scenario setup.
    pub fn set_health(&mut self, health: f64) {
        self.health = health.clamp(0.0, MAX_HEALTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archetype_table_matches_base_stats() {
        let swordsman = Unit::new(Archetype::Swordsman);
        assert_eq!(swordsman.attack(), 40.0);
        assert_eq!(swordsman.defence(), 10.0);
        assert_eq!(swordsman.move_range(), 4);
        assert_eq!(swordsman.attack_range(), 1);

        let daemon = Unit::new(Archetype::Daemon);
        assert_eq!(daemon.attack(), 10.0);
        assert_eq!(daemon.defence(), 10.0);
        assert_eq!(daemon.move_range(), 1);
        assert_eq!(daemon.attack_range(), 4);

        for archetype in Archetype::ALL {
            let unit = Unit::new(archetype);
            assert_eq!(unit.level(), 1);
            assert_eq!(unit.health(), STARTING_HEALTH);
        }
    }

    #[test]
    fn sides_split_archetypes() {
        assert!(Archetype::PLAYER.iter().all(|kind| kind.side() == Side::Player));
        assert!(Archetype::COMPUTER
            .iter()
            .all(|kind| kind.side() == Side::Computer));
    }

    #[test]
    fn level_up_with_low_health_keeps_stats() {
        let mut bowman = Unit::new(Archetype::Bowman);
        bowman.set_health(10.0);
        bowman.level_up();

        assert_eq!(bowman.level(), 2);
        assert_eq!(bowman.health(), 82.0);
        assert_eq!(bowman.attack(), 25.0);
        assert_eq!(bowman.defence(), 25.0);
    }

    #[test]
    fn level_up_scales_with_retained_health() {
        let mut swordsman = Unit::new(Archetype::Swordsman);
        swordsman.level_up();

        // multiplier (80 + 50) / 100 = 1.3
        assert_eq!(swordsman.attack(), 52.0);
        assert_eq!(swordsman.defence(), 13.0);
        assert_eq!(swordsman.health(), 82.0);
    }

    #[test]
    fn health_caps_at_one_hundred() {
        let mut magician = Unit::new(Archetype::Magician);
        for _ in 0..30 {
            let before = (magician.attack(), magician.defence());
            magician.level_up();
            assert!(magician.attack() >= before.0);
            assert!(magician.defence() >= before.1);
            assert!(magician.health() <= MAX_HEALTH);
        }
        assert_eq!(magician.health(), MAX_HEALTH);
    }

    #[test]
    fn direct_construction_scales_base_stats() {
        let vampire = Unit::at_level(Archetype::Vampire, 3);
        let mut replayed = Unit::new(Archetype::Vampire);
        replayed.level_up();
        replayed.level_up();

        assert_eq!(vampire, replayed);
        assert_eq!(vampire.level(), 3);
        // 25 -> round(25 * 1.3) = 33 -> round(33 * 1.62) = 53
        assert_eq!(vampire.attack(), 53.0);
        assert_eq!(vampire.health(), 83.0);
    }

    #[test]
    fn zero_level_construction_is_level_one() {
        assert_eq!(Unit::at_level(Archetype::Undead, 0), Unit::new(Archetype::Undead));
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut undead = Unit::new(Archetype::Undead);
        assert_eq!(undead.take_damage(12.5), 37.5);
        assert_eq!(undead.take_damage(100.0), 0.0);
        assert!(!undead.is_alive());
    }
}
