use skirmish_core::{Archetype, CellIndex, Command, Event, Side, Unit, UnitId};
use skirmish_system_combat::{round_outcome, Combat, RoundOutcome, KILL_BONUS};
use skirmish_world::{self as world, query, World};

fn deploy(world: &mut World, unit: Unit, cell: u32) -> UnitId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::DeployUnit {
            side: unit.side(),
            unit,
            cell: CellIndex::new(cell),
        },
        &mut events,
    );
    query::occupant(world, CellIndex::new(cell)).expect("deployed")
}

fn execute(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn bowman_exchange_lowers_health_by_exact_damage() {
    let mut world = World::default();
    let attacker = deploy(&mut world, Unit::new(Archetype::Bowman), 8);
    let target = deploy(&mut world, Unit::new(Archetype::Vampire), 10);

    let combat = Combat::new();
    let mut commands = Vec::new();
    let attacker_unit = query::unit(&world, attacker).expect("attacker");
    let target_unit = query::unit(&world, target).expect("target");
    let strike = combat.strike(Side::Player, &attacker_unit, target, &target_unit, &mut commands);
    assert_eq!(strike.damage, 2.5);

    let events = execute(&mut world, commands);
    assert_eq!(query::unit(&world, target).map(|unit| unit.health()), Some(47.5));
    assert_eq!(query::match_state(&world).score(), 3);
    assert_eq!(round_outcome(&events), None);
}

#[test]
fn killing_last_enemy_wins_the_round_and_scores_bonus() {
    let mut world = World::default();
    let swordsman = deploy(&mut world, Unit::at_level(Archetype::Swordsman, 3), 40);
    let mut weak = Unit::new(Archetype::Daemon);
    weak.set_health(12.0);
    let target = deploy(&mut world, weak, 48);

    let combat = Combat::new();
    let attacker = query::unit(&world, swordsman).expect("attacker");
    let mut commands = Vec::new();
    let strike = combat.strike(Side::Player, &attacker, target, &weak, &mut commands);
    assert!(strike.lethal);

    let events = execute(&mut world, commands);
    assert_eq!(round_outcome(&events), Some(RoundOutcome::PlayerWon));
    assert!(query::roster(&world, Side::Computer).is_empty());
    assert_eq!(
        query::match_state(&world).score(),
        strike.damage.round() as u64 + KILL_BONUS
    );
    assert_eq!(strike.points, query::match_state(&world).score());
}

#[test]
fn computer_win_leaves_score_untouched() {
    let mut world = World::default();
    let mut bowman = Unit::new(Archetype::Bowman);
    bowman.set_health(1.0);
    let target = deploy(&mut world, bowman, 0);
    let undead = deploy(&mut world, Unit::new(Archetype::Undead), 9);

    let attacker = query::unit(&world, undead).expect("undead");
    let mut commands = Vec::new();
    let _ = Combat::new().strike(Side::Computer, &attacker, target, &bowman, &mut commands);
    let events = execute(&mut world, commands);

    assert_eq!(round_outcome(&events), Some(RoundOutcome::ComputerWon));
    assert_eq!(query::match_state(&world).score(), 0);
}
