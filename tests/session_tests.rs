//! Session behaviour through the public API only.

use std::time::Duration;

use tetoris::config::{gravity_interval, ROWS};
use tetoris::input::Command;
use tetoris::session::{GameEvent, Phase, Session};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_session_idle_until_started() {
    let mut session = Session::with_seed(1);
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.active().is_none());
    assert!(!session.apply(Command::MoveLeft, ms(0)));
    session.tick(ms(5000));
    assert_eq!(session.board().occupied_count(), 0);
}

#[test]
fn test_blank_name_becomes_default() {
    let mut session = Session::with_seed(1);
    session.start("   ");
    assert_eq!(session.player(), Some("Player"));
    assert_eq!(session.stats().level, 1);
}

#[test]
fn test_hard_drop_lands_on_floor() {
    let mut session = Session::with_seed(2);
    session.start("floor");
    assert!(session.apply(Command::HardDrop, ms(0)));
    let rows = session.board().rows();
    assert_eq!(session.board().occupied_count(), 4);
    assert!(rows[ROWS - 1].iter().any(|c| c.is_some()));
    assert!(session.drain_events().contains(&GameEvent::Locked));
    // The next piece is already falling.
    assert_eq!(session.phase(), Phase::Falling);
    assert!(session.active().is_some());
}

#[test]
fn test_gravity_waits_a_full_interval() {
    let mut session = Session::with_seed(3);
    session.start("g");
    let y0 = session.active().map(|p| p.y);
    let interval = gravity_interval(1).as_millis() as u64;

    session.tick(ms(0));
    session.tick(ms(interval));
    assert_eq!(session.active().map(|p| p.y), y0);
    session.tick(ms(interval + 1));
    assert_eq!(session.active().map(|p| p.y), y0.map(|y| y + 1));
}

#[test]
fn test_stacking_ends_the_run_once() {
    let mut session = Session::with_seed(5);
    session.start("stack");
    let mut guard = 0;
    while !session.is_over() {
        session.apply(Command::HardDrop, ms(guard));
        guard += 1;
        assert!(guard < 200, "run never ended");
    }
    assert!(session.active().is_none());
    assert!(!session.apply(Command::MoveLeft, ms(guard)));

    let run = session.take_finished_run().expect("finished run");
    assert_eq!(run.name, "stack");
    assert_eq!(session.take_finished_run(), None);

    session.restart();
    assert_eq!(session.phase(), Phase::Falling);
    assert_eq!(session.board().occupied_count(), 0);
    assert_eq!(session.stats().score, 0);
}
