use skirmish_core::{Archetype, BoardSize, CellIndex, Command, Side, Unit, UnitId};
use skirmish_system_opponent::{attack_score, Opponent};
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

fn decide(world: &World) -> Option<skirmish_system_opponent::Decision> {
    Opponent::new().decide(
        &query::placed_units(world, Side::Computer),
        &query::placed_units(world, Side::Player),
        query::board(world),
    )
}

#[test]
fn moves_into_range_when_no_direct_attack_exists() {
    let mut world = World::default();
    let undead = deploy(&mut world, Unit::new(Archetype::Undead), 56);
    let bowman = deploy(&mut world, Unit::new(Archetype::Bowman), 24);

    let decision = decide(&world).expect("decision");
    assert_eq!(decision.unit, undead);
    assert_eq!(decision.target, bowman);
    assert_eq!(decision.target_cell, CellIndex::new(24));

    let destination = decision.move_to.expect("move before attacking");
    let board = query::board(&world);
    assert!(skirmish_core::distance(destination, CellIndex::new(24), board) <= 1);
    assert!(skirmish_core::distance(CellIndex::new(56), destination, board) <= 4);
    // row-major: first free cell adjacent to the target within reach
    assert_eq!(destination, CellIndex::new(25));

    let expected = attack_score(&Unit::new(Archetype::Undead), &Unit::new(Archetype::Bowman)) * 0.9;
    assert!((decision.score - expected).abs() < 1e-9);

    let mut events = Vec::new();
    world::apply(&mut world, Command::EndTurn, &mut events);
    world::apply(
        &mut world,
        Command::MoveUnit {
            unit: undead,
            to: destination,
        },
        &mut events,
    );
    assert_eq!(query::cell_of(&world, undead), Some(destination));
    assert!(query::attack_targets(&world, undead).contains(&CellIndex::new(24)));
}

#[test]
fn prefers_finishing_blow_over_healthier_target() {
    let mut world = World::default();
    let _daemon = deploy(&mut world, Unit::new(Archetype::Daemon), 35);
    let _healthy = deploy(&mut world, Unit::new(Archetype::Swordsman), 19);
    let mut wounded = Unit::new(Archetype::Swordsman);
    wounded.set_health(1.0);
    let wounded_id = deploy(&mut world, wounded, 21);

    let decision = decide(&world).expect("decision");
    assert_eq!(decision.target, wounded_id);
    assert_eq!(decision.move_to, None);
}

#[test]
fn ties_keep_the_first_unit_in_roster_order() {
    let mut world = World::default();
    let first = deploy(&mut world, Unit::new(Archetype::Vampire), 26);
    let _second = deploy(&mut world, Unit::new(Archetype::Vampire), 30);
    let _target = deploy(&mut world, Unit::new(Archetype::Bowman), 28);

    let decision = decide(&world).expect("decision");
    assert_eq!(decision.unit, first);
    assert_eq!(decision.move_to, None);
}

#[test]
fn killed_units_are_never_targeted() {
    let mut world = World::default();
    let _vampire = deploy(&mut world, Unit::new(Archetype::Vampire), 27);
    let doomed = deploy(&mut world, Unit::new(Archetype::Magician), 28);
    let survivor = deploy(&mut world, Unit::new(Archetype::Bowman), 0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ApplyDamage {
            target: doomed,
            amount: 100.0,
        },
        &mut events,
    );

    assert_eq!(query::unit(&world, doomed), None);
    let decision = decide(&world).expect("decision");
    assert_eq!(decision.target, survivor);
    assert_eq!(decision.target_cell, CellIndex::new(0));
    assert!(decision.move_to.is_some());
}

#[test]
fn decisions_replay_deterministically() {
    let mut world = World::new(BoardSize::new(8));
    for (archetype, cell) in [
        (Archetype::Vampire, 49),
        (Archetype::Undead, 52),
        (Archetype::Daemon, 62),
        (Archetype::Bowman, 9),
        (Archetype::Swordsman, 12),
        (Archetype::Magician, 14),
    ] {
        let _ = deploy(&mut world, Unit::new(archetype), cell);
    }
    let first = decide(&world);
    assert!(first.is_some());
    for _ in 0..10 {
        assert_eq!(decide(&world), first);
    }
}
