//! End-to-end games played through the public surface, the way a display
//! layer drives the engine: click, then drain the updates.

use mineclear_core::*;

fn engine(size: Coord2, mines: &[Coord2], cheats: u8) -> Engine {
    let layout = MineLayout::from_mine_coords(size, mines).expect("valid layout");
    let mut engine = Engine::from_layout(layout, cheats).expect("valid engine");
    engine.drain_updates();
    engine
}

#[test]
fn one_cell_board_is_won_immediately() {
    let mut engine = Engine::new(GameConfig::new((1, 1), 0, 0).unwrap()).unwrap();
    assert_eq!(engine.drain_updates(), vec![(0, 0)]);

    engine.handle_click((0, 0), ClickAction::Default);

    assert_eq!(engine.get_cell((0, 0)), Some(Cell::Number(0)));
    assert!(engine.has_won());
    assert_eq!(engine.drain_updates(), vec![(0, 0)]);
}

#[test]
fn three_by_three_with_a_mine_is_rejected_up_front() {
    let config = GameConfig::new((3, 3), 1, 0);
    assert_eq!(config, Err(GameError::TooManyMines { mines: 1, max: 0 }));
}

#[test]
fn corner_start_keeps_the_corner_block_clear() {
    let config = GameConfig::new((5, 5), 1, 0).unwrap();
    for seed in 0..100 {
        let mut engine = Engine::with_seed(config, seed).unwrap();
        engine.handle_click((0, 0), ClickAction::Default);

        let mines: Vec<_> = iter_coords(engine.size())
            .filter(|&coords| engine.has_mine_at(coords))
            .collect();
        assert_eq!(mines.len(), 1);
        let (x, y) = mines[0];
        assert!(x >= 2 || y >= 2, "mine at {:?} next to the start", mines[0]);
    }
}

#[test]
fn clicking_a_flag_does_nothing() {
    let mut engine = engine((3, 3), &[(2, 2)], 0);
    engine.handle_click((1, 1), ClickAction::Flag);
    engine.drain_updates();

    engine.handle_click((1, 1), ClickAction::Default);

    assert_eq!(engine.get_cell((1, 1)), Some(Cell::Flag));
    assert!(engine.drain_updates().is_empty());
}

#[test]
fn chord_on_two_reveals_the_rest() {
    // M . M
    // . 2 .
    // . . .
    let mut engine = engine((3, 3), &[(0, 0), (2, 0)], 0);
    engine.handle_click((1, 1), ClickAction::Default);
    engine.handle_click((0, 0), ClickAction::Flag);
    engine.handle_click((2, 0), ClickAction::Flag);
    engine.drain_updates();

    let outcome = engine.handle_click((1, 1), ClickAction::Default);

    assert_eq!(outcome, ClickOutcome::Won);
    assert_eq!(engine.get_cell((1, 0)), Some(Cell::Number(2)));
    assert_eq!(engine.get_cell((0, 1)), Some(Cell::Number(1)));
    assert_eq!(engine.get_cell((1, 2)), Some(Cell::Number(0)));
    assert_eq!(engine.get_cell((0, 0)), Some(Cell::Flag));
    let updates = engine.drain_updates();
    assert_eq!(updates.len(), 6);
    assert!(!updates.contains(&(1, 1)));
}

#[test]
fn losing_click_shows_what_went_wrong() {
    let mut engine = engine((4, 4), &[(0, 0), (3, 3)], 0);
    engine.handle_click((1, 0), ClickAction::Default);
    assert_eq!(engine.get_cell((1, 0)), Some(Cell::Number(1)));
    engine.handle_click((1, 1), ClickAction::Flag);
    engine.handle_click((3, 3), ClickAction::Mark);
    engine.drain_updates();

    let outcome = engine.handle_click((0, 0), ClickAction::Default);

    assert_eq!(outcome, ClickOutcome::Lost);
    assert!(engine.is_game_over());
    assert!(!engine.has_won());
    assert_eq!(engine.get_cell((0, 0)), Some(Cell::MineLost));
    assert_eq!(engine.get_cell((1, 1)), Some(Cell::FlagNot));
    assert_eq!(engine.get_cell((3, 3)), Some(Cell::Mine));
    assert_eq!(engine.drain_updates(), vec![(0, 0), (1, 1), (3, 3)]);
}

#[test]
fn full_game_with_cheat_and_restart() {
    let mut engine = Engine::with_seed(GameConfig::intermediate(), 2024).unwrap();
    assert_eq!(engine.cheats_remaining(), 1);

    engine.handle_click((8, 8), ClickAction::Default);
    let mine = iter_coords(engine.size())
        .find(|&coords| engine.has_mine_at(coords) && engine.get_cell(coords).is_none())
        .expect("intermediate board has hidden mines");

    engine.handle_click(mine, ClickAction::Cheat);
    assert_eq!(engine.get_cell(mine), Some(Cell::MineSafe));
    assert!(!engine.can_cheat());
    assert!(!engine.is_game_over());

    // clear every safe cell left
    for coords in iter_coords(engine.size()) {
        if !engine.has_mine_at(coords) {
            engine.handle_click(coords, ClickAction::Default);
        }
    }
    assert!(engine.has_won());
    assert!(
        iter_coords(engine.size())
            .filter(|&coords| engine.has_mine_at(coords))
            .all(|coords| engine.get_cell(coords) == Some(Cell::MineSafe))
    );

    engine.restart();
    assert!(!engine.is_game_over());
    assert!(engine.can_cheat());
    assert_eq!(engine.drain_updates().len(), 256);
}

#[test]
fn new_game_after_dense_layout_counts_only_real_mines() {
    let mut engine = engine((3, 3), &[(0, 0)], 0);
    engine.new_game();
    assert_eq!(engine.total_mines(), 0);

    let mut restored = Engine::from_bytes(&engine.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, engine);

    assert_eq!(restored.handle_click((1, 1), ClickAction::Default), ClickOutcome::Won);
    assert_eq!(restored.remaining_mines(), 0);
    assert!(iter_coords(restored.size()).all(|coords| !restored.has_mine_at(coords)));
}
