#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves strikes into damage and score commands.

use skirmish_core::{Command, Event, Side, Unit, UnitId};

/// Points awarded to the player for removing an enemy unit.
pub const KILL_BONUS: u64 = 10;

/// Points awarded when the final level is won.
pub const COMPLETION_BONUS: u64 = 1000;

const VICTORY_BONUS_PER_LEVEL: u64 = 50;

const MINIMUM_DAMAGE_SHARE: f64 = 0.1;

/// Damage dealt by `attacker` to `target`.
///
/// Defence soaks attack, but at least a tenth of the attack always lands.
#[must_use]
pub fn damage(attacker: &Unit, target: &Unit) -> f64 {
    (attacker.attack() - target.defence()).max(attacker.attack() * MINIMUM_DAMAGE_SHARE)
}

/// Bonus for winning the round of the provided level.
#[must_use]
pub const fn victory_bonus(level: u32) -> u64 {
    level as u64 * VICTORY_BONUS_PER_LEVEL
}

/// Result of a single resolved strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Health removed from the target.
    pub damage: f64,
    /// Health the target is left with.
    pub remaining_health: f64,
    /// Whether the strike kills the target.
    pub lethal: bool,
    /// Points the strike earns.
    pub points: u64,
}

/// Outcome of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundOutcome {
    /// The computer's roster was eliminated.
    PlayerWon,
    /// The player's roster was eliminated.
    ComputerWon,
}

/// Combat resolution system.
#[derive(Debug, Default)]
pub struct Combat;

impl Combat {
    /// Creates a new combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves an attack and queues the commands that carry it out.
    ///
    /// Queues, in order, the damage score, the damage itself and the kill
    /// bonus. Only player strikes score.
    pub fn strike(
        &self,
        attacker_side: Side,
        attacker: &Unit,
        target_id: UnitId,
        target: &Unit,
        out: &mut Vec<Command>,
    ) -> Strike {
        let damage = damage(attacker, target);
        let remaining_health = (target.health() - damage).max(0.0);
        let lethal = remaining_health <= 0.0;
        let scores = attacker_side == Side::Player;

        let mut points = 0;
        if scores {
            points += damage.round() as u64;
            out.push(Command::AwardScore {
                points: damage.round() as u64,
            });
        }
        out.push(Command::ApplyDamage {
            target: target_id,
            amount: damage,
        });
        if scores && lethal {
            points += KILL_BONUS;
            out.push(Command::AwardScore { points: KILL_BONUS });
        }

        Strike {
            damage,
            remaining_health,
            lethal,
            points,
        }
    }
}

/// Inspects world events for a roster elimination.
#[must_use]
pub fn round_outcome(events: &[Event]) -> Option<RoundOutcome> {
    events.iter().find_map(|event| match event {
        Event::RosterEliminated {
            side: Side::Computer,
        } => Some(RoundOutcome::PlayerWon),
        Event::RosterEliminated { side: Side::Player } => Some(RoundOutcome::ComputerWon),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Archetype, CellIndex};

    #[test]
    fn equal_bowmen_deal_a_tenth_of_attack() {
        let bowman = Unit::new(Archetype::Bowman);
        assert_eq!(damage(&bowman, &bowman), 2.5);
    }

    #[test]
    fn defence_soaks_attack() {
        let swordsman = Unit::new(Archetype::Swordsman);
        let daemon = Unit::new(Archetype::Daemon);
        assert_eq!(damage(&swordsman, &daemon), 30.0);
        assert_eq!(damage(&daemon, &swordsman), 1.0);
    }

    #[test]
    fn damage_never_drops_below_floor() {
        for attacker in Archetype::ALL {
            for target in Archetype::ALL {
                let attacker = Unit::at_level(attacker, 3);
                let target = Unit::at_level(target, 1);
                assert!(damage(&attacker, &target) >= attacker.attack() * 0.1);
            }
        }
    }

    #[test]
    fn victory_bonus_scales_with_level() {
        assert_eq!(victory_bonus(1), 50);
        assert_eq!(victory_bonus(4), 200);
    }

    #[test]
    fn player_kill_queues_scores_around_damage() {
        let combat = Combat::new();
        let swordsman = Unit::new(Archetype::Swordsman);
        let mut daemon = Unit::new(Archetype::Daemon);
        daemon.set_health(20.0);

        let mut out = Vec::new();
        let strike = combat.strike(Side::Player, &swordsman, UnitId::new(4), &daemon, &mut out);

        assert!(strike.lethal);
        assert_eq!(strike.remaining_health, 0.0);
        assert_eq!(strike.points, 40);
        assert_eq!(
            out,
            vec![
                Command::AwardScore { points: 30 },
                Command::ApplyDamage {
                    target: UnitId::new(4),
                    amount: 30.0,
                },
                Command::AwardScore { points: KILL_BONUS },
            ]
        );
    }

    #[test]
    fn computer_strikes_do_not_score() {
        let combat = Combat::new();
        let undead = Unit::new(Archetype::Undead);
        let mut bowman = Unit::new(Archetype::Bowman);
        bowman.set_health(5.0);

        let mut out = Vec::new();
        let strike = combat.strike(Side::Computer, &undead, UnitId::new(1), &bowman, &mut out);

        assert!(strike.lethal);
        assert_eq!(strike.points, 0);
        assert_eq!(
            out,
            vec![Command::ApplyDamage {
                target: UnitId::new(1),
                amount: 15.0,
            }]
        );
    }

    #[test]
    fn round_outcome_reads_elimination() {
        assert_eq!(round_outcome(&[]), None);
        assert_eq!(
            round_outcome(&[
                Event::UnitDied {
                    unit: UnitId::new(2),
                    side: Side::Computer,
                    cell: CellIndex::new(60),
                },
                Event::RosterEliminated {
                    side: Side::Computer
                },
            ]),
            Some(RoundOutcome::PlayerWon)
        );
        assert_eq!(
            round_outcome(&[Event::RosterEliminated { side: Side::Player }]),
            Some(RoundOutcome::ComputerWon)
        );
    }
}
