#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy one-ply decision engine for the computer side.
//!
//! Every living computer unit is scored for a direct attack from where it
//! stands and for each move-then-attack option. The single best action over
//! the whole roster wins.

use std::collections::BTreeMap;

use log::debug;
use skirmish_core::{
    attack_cells, movement_cells, BoardSize, CellIndex, PlacedUnitSnapshot, Unit, UnitId,
};
use skirmish_system_combat::damage;

const FINISHING_BONUS: f64 = 10.0;
const DEFENCE_WEIGHT: f64 = 0.1;
const ATTACK_WEIGHT: f64 = 0.05;
const MOVE_PENALTY: f64 = 0.9;

/// Desirability of `attacker` striking `target`.
///
/// Finishing blows earn a bonus; sturdy targets are penalised and dangerous
/// ones rewarded.
#[must_use]
pub fn attack_score(attacker: &Unit, target: &Unit) -> f64 {
    let damage = damage(attacker, target);
    let finishing = if target.health() <= damage {
        FINISHING_BONUS
    } else {
        0.0
    };
    damage + finishing - DEFENCE_WEIGHT * target.defence() + ATTACK_WEIGHT * target.attack()
}

/// Action chosen for the computer's turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    /// Acting unit.
    pub unit: UnitId,
    /// Cell the acting unit starts on.
    pub from: CellIndex,
    /// Cell to move to before attacking, if any.
    pub move_to: Option<CellIndex>,
    /// Unit to strike.
    pub target: UnitId,
    /// Cell the target stands on.
    pub target_cell: CellIndex,
    /// Score of the chosen action.
    pub score: f64,
}

#[derive(Clone, Copy, Debug)]
struct BestTarget {
    target: UnitId,
    cell: CellIndex,
    score: f64,
}

/// Opponent decision system that reuses its occupancy scratch map.
#[derive(Debug, Default)]
pub struct Opponent {
    occupancy: BTreeMap<CellIndex, Occupant>,
}

#[derive(Clone, Copy, Debug)]
struct Occupant {
    id: UnitId,
    unit: Unit,
    hostile: bool,
}

impl Opponent {
    /// Creates a new opponent with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the highest-scoring attack available to the computer.
    ///
    /// Ties keep the earliest option evaluated: units in roster order, the
    /// direct attack before any move, cells in row-major order. Returns `None`
    /// when no unit can reach a living enemy this turn.
    pub fn decide(
        &mut self,
        computer: &[PlacedUnitSnapshot],
        player: &[PlacedUnitSnapshot],
        board: BoardSize,
    ) -> Option<Decision> {
        self.prepare_occupancy(computer, player);

        let mut best: Option<Decision> = None;
        for acting in computer.iter().filter(|placed| placed.unit.is_alive()) {
            if let Some(direct) = self.best_target_from(&acting.unit, acting.cell, board) {
                consider(&mut best, acting, None, direct.score, direct);
            }

            for cell in movement_cells(acting.cell, acting.unit.move_range(), board) {
                if self.occupancy.contains_key(&cell) {
                    continue;
                }
                if let Some(found) = self.best_target_from(&acting.unit, cell, board) {
                    consider(&mut best, acting, Some(cell), found.score * MOVE_PENALTY, found);
                }
            }
        }

        match &best {
            Some(decision) => debug!(
                "[Opponent] unit {} targets unit {} (move {:?}, score {:.2})",
                decision.unit.get(),
                decision.target.get(),
                decision.move_to.map(|cell| cell.get()),
                decision.score
            ),
            None => debug!("[Opponent] no reachable target, passing"),
        }
        best
    }

    fn prepare_occupancy(
        &mut self,
        computer: &[PlacedUnitSnapshot],
        player: &[PlacedUnitSnapshot],
    ) {
        self.occupancy.clear();
        for (placed, hostile) in computer
            .iter()
            .map(|placed| (placed, false))
            .chain(player.iter().map(|placed| (placed, true)))
        {
            let _ = self.occupancy.insert(
                placed.cell,
                Occupant {
                    id: placed.id,
                    unit: placed.unit,
                    hostile,
                },
            );
        }
    }

    fn best_target_from(
        &self,
        attacker: &Unit,
        origin: CellIndex,
        board: BoardSize,
    ) -> Option<BestTarget> {
        let mut best: Option<BestTarget> = None;
        for cell in attack_cells(origin, attacker.attack_range(), board) {
            let Some(occupant) = self.occupancy.get(&cell) else {
                continue;
            };
            if !occupant.hostile || !occupant.unit.is_alive() {
                continue;
            }
            let score = attack_score(attacker, &occupant.unit);
            if best.map_or(true, |existing| score > existing.score) {
                best = Some(BestTarget {
                    target: occupant.id,
                    cell,
                    score,
                });
            }
        }
        best
    }
}

fn consider(
    best: &mut Option<Decision>,
    acting: &PlacedUnitSnapshot,
    move_to: Option<CellIndex>,
    score: f64,
    target: BestTarget,
) {
    if let Some(existing) = best {
        if score <= existing.score {
            return;
        }
    }
    *best = Some(Decision {
        unit: acting.id,
        from: acting.cell,
        move_to,
        target: target.target,
        target_cell: target.cell,
        score,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Archetype, Side};

    fn placed(id: u32, archetype: Archetype, cell: u32) -> PlacedUnitSnapshot {
        PlacedUnitSnapshot {
            id: UnitId::new(id),
            side: archetype.side(),
            unit: Unit::new(archetype),
            cell: CellIndex::new(cell),
        }
    }

    #[test]
    fn attack_score_rewards_finishing_blows() {
        let undead = Unit::new(Archetype::Undead);
        let healthy = Unit::new(Archetype::Magician);
        let mut weak = Unit::new(Archetype::Magician);
        weak.set_health(4.0);

        // damage max(40 - 40, 4) = 4
        let base = 4.0 - 0.1 * 40.0 + 0.05 * 10.0;
        assert!((attack_score(&undead, &healthy) - base).abs() < 1e-9);
        assert!((attack_score(&undead, &weak) - (base + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn no_reachable_enemy_passes() {
        let computer = [placed(1, Archetype::Daemon, 63)];
        let player = [placed(2, Archetype::Bowman, 0)];
        let mut opponent = Opponent::new();
        assert_eq!(opponent.decide(&computer, &player, BoardSize::default()), None);
        assert_eq!(opponent.decide(&computer, &[], BoardSize::default()), None);
    }

    #[test]
    fn direct_attack_beats_equal_move() {
        let computer = [placed(1, Archetype::Vampire, 27)];
        let player = [placed(2, Archetype::Bowman, 29)];
        let decision = Opponent::new()
            .decide(&computer, &player, BoardSize::default())
            .expect("decision");
        assert_eq!(decision.move_to, None);
        assert_eq!(decision.target, UnitId::new(2));
        assert_eq!(decision.target_cell, CellIndex::new(29));
        assert_eq!(decision.from, CellIndex::new(27));
    }

    #[test]
    fn dead_targets_are_ignored() {
        let computer = [placed(1, Archetype::Daemon, 60)];
        let mut corpse = placed(2, Archetype::Swordsman, 44);
        corpse.unit.set_health(0.0);
        let decision = Opponent::new().decide(&computer, &[corpse], BoardSize::default());
        assert_eq!(decision, None);
        assert_eq!(corpse.side, Side::Player);
    }
}
