use std::path::PathBuf;

use game_content::ContentFactory;
use game_core::{ControlKind, GameEvent, WorldQuery};

fn factory() -> ContentFactory {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data");
    ContentFactory::new(root)
}

#[test]
fn shipped_arena_loads() {
    let (arena, roster) = factory().build_arena("arena", 1).expect("shipped arena loads");
    let world = arena.world();

    assert_eq!(roster.len(), world.combatants().len());
    let knight = roster
        .iter()
        .find(|(name, _)| name == "knight")
        .map(|(_, id)| *id)
        .expect("knight is on the roster");
    assert_eq!(world.human(), Some(knight));
    assert!(
        roster
            .iter()
            .filter(|(_, id)| *id != knight)
            .all(|(_, id)| world.control(*id).map(|c| c.kind()) != Some(ControlKind::Human))
    );
    assert!(!world.cover_anchors().is_empty());
}

#[test]
fn shipped_arena_runs_deterministically() {
    let run = |seed| {
        let (mut arena, _) = factory().build_arena("arena", seed).expect("shipped arena loads");
        (0..200)
            .flat_map(|_| arena.step(16))
            .filter(|event| !matches!(event, GameEvent::Feedback(_)))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
}
