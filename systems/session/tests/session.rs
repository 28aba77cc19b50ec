use std::time::Duration;

use gem_maze_core::{Color, Direction, GameStatus, Grid, Position};
use gem_maze_rendering::{palette, FrameBuffer, FrameRecorder};
use gem_maze_system_input::SharedDirection;
use gem_maze_system_session::{GameConfig, Pacer, Session, SessionError};
use gem_maze_world::{query, Level};

#[derive(Debug, Default)]
struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

type TestSession = Session<FrameBuffer<FrameRecorder>, RecordingPacer>;

fn config() -> GameConfig {
    GameConfig {
        seed: Some(7),
        ..GameConfig::default()
    }
}

fn session_for(level: Level, direction: SharedDirection) -> TestSession {
    let matrix = FrameBuffer::new(level.grid(), FrameRecorder::new());
    Session::new(level, config(), matrix, RecordingPacer::default(), direction)
        .expect("level fits the display")
}

fn ascii_session(rows: &[&str]) -> TestSession {
    let level = Level::from_ascii(rows).expect("test map is valid");
    session_for(level, SharedDirection::default())
}

fn frames(session: &TestSession) -> Vec<String> {
    session
        .matrix()
        .sink()
        .frames()
        .iter()
        .map(|frame| frame.to_ascii())
        .collect()
}

#[test]
fn open_grid_walk_collects_the_gem_exactly_on_arrival() {
    let level = Level::new(
        Grid::new(12, 8),
        Vec::new(),
        vec![Position::new(5, 5)],
        Position::new(0, 0),
        Vec::new(),
    )
    .expect("valid level");
    let direction = SharedDirection::default();
    let mut session = session_for(level, direction.clone());

    for tick in 1..=10u32 {
        if tick == 6 {
            direction.store(Direction::Down);
        }
        let status = session.tick().expect("tick succeeds");
        let player = query::player(session.world());

        let arrived = player.position == Position::new(5, 5);
        assert_eq!(player.found_gems, u32::from(arrived), "tick {tick}");
        assert_eq!(arrived, tick == 10, "tick {tick}");
        let expected = if arrived {
            GameStatus::LevelWon
        } else {
            GameStatus::Playing
        };
        assert_eq!(status, expected);
    }

    let recorder = session.matrix().sink();
    assert_eq!(recorder.frames().len(), 11);
    assert!(recorder
        .last()
        .expect("frames presented")
        .is_filled_with(palette::WIN));
}

#[test]
fn three_hits_exhaust_the_lives() {
    let mut session = ascii_session(&["#G#..", "#P#.*", "###.."]);
    let initial = frames(&session)[0].clone();

    let status = session.run().expect("session runs to completion");

    assert_eq!(status, GameStatus::LivesExhausted);
    assert_eq!(query::lives(session.world()), 0);
    assert_eq!(session.ticks(), 3);

    let tick_delay = Duration::from_millis(500);
    let hit_pause = Duration::from_millis(5000);
    assert_eq!(
        session.pacer().pauses,
        vec![tick_delay, hit_pause, tick_delay, hit_pause, tick_delay, hit_pause]
    );

    let recorder = session.matrix().sink();
    let alerts = recorder
        .frames()
        .iter()
        .filter(|frame| frame.is_filled_with(palette::HIT_ALERT))
        .count();
    assert_eq!(alerts, 4, "three alerts plus the final frame");
    assert_eq!(frames(&session)[2], initial);
    assert!(recorder
        .last()
        .expect("frames presented")
        .is_filled_with(Color::RED));
}

#[test]
fn winning_before_any_hit_ends_with_full_lives() {
    let mut session = ascii_session(&["P*..G"]);

    let status = session.run().expect("session runs to completion");

    assert_eq!(status, GameStatus::LevelWon);
    assert_eq!(query::lives(session.world()), 3);
    assert_eq!(session.ticks(), 1);
    let enemy = query::enemy_view(session.world()).into_vec()[0];
    assert_eq!(enemy.position, Position::new(4, 0));
}

#[test]
fn winning_after_a_hit_keeps_the_remaining_lives() {
    let level = Level::from_ascii(&["*P*G"]).expect("test map is valid");
    let direction = SharedDirection::default();
    let mut session = session_for(level, direction.clone());

    assert_eq!(session.tick().expect("tick succeeds"), GameStatus::Playing);
    assert_eq!(query::lives(session.world()), 2);
    assert_eq!(query::player(session.world()).found_gems, 1);

    direction.store(Direction::Left);
    let status = session.tick().expect("tick succeeds");

    assert_eq!(status, GameStatus::LevelWon);
    assert_eq!(query::lives(session.world()), 2);
    assert_eq!(session.pacer().pauses, vec![Duration::from_millis(5000)]);
    assert_eq!(
        frames(&session),
        vec![
            "*P*G".to_owned(),
            "RRRR".to_owned(),
            "*P.G".to_owned(),
            "GGGG".to_owned(),
        ]
    );
    assert!(session
        .matrix()
        .sink()
        .last()
        .expect("frames presented")
        .is_filled_with(palette::WIN));
}

#[test]
fn reset_keeps_collected_gems() {
    let mut session = ascii_session(&["P*G.*"]);

    let status = session.tick().expect("tick succeeds");

    assert_eq!(status, GameStatus::Playing);
    assert_eq!(query::lives(session.world()), 2);
    assert_eq!(query::player(session.world()).found_gems, 1);
    assert_eq!(
        frames(&session),
        vec![
            "P*G.*".to_owned(),
            "RRRRR".to_owned(),
            "P.G.*".to_owned(),
        ]
    );
}

#[test]
fn terminal_session_ignores_further_ticks() {
    let mut session = ascii_session(&["P*..G"]);
    let _ = session.run().expect("session runs to completion");
    let presented = session.matrix().sink().frames().len();

    assert_eq!(session.tick().expect("no-op tick"), GameStatus::LevelWon);
    assert_eq!(session.matrix().sink().frames().len(), presented);
    assert_eq!(session.ticks(), 1);
}

#[test]
fn restart_after_game_over_rebuilds_the_level() {
    let mut session = ascii_session(&["#G#..", "#P#.*", "###.."]);
    let initial = frames(&session)[0].clone();
    let _ = session.run().expect("session runs to completion");

    session.restart().expect("restart succeeds");

    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(query::lives(session.world()), 3);
    assert_eq!(session.ticks(), 0);
    assert_eq!(frames(&session).last(), Some(&initial));
}

#[test]
fn run_for_stops_at_the_tick_limit() {
    let mut session = ascii_session(&["P....", ".....", "*...."]);

    let status = session.run_for(Some(2)).expect("ticks succeed");

    assert_eq!(status, GameStatus::Playing);
    assert_eq!(session.ticks(), 2);
    assert_eq!(query::player(session.world()).position, Position::new(2, 0));
    assert_eq!(session.pacer().pauses.len(), 2);
}

#[test]
fn enemies_chase_on_the_classic_maze() {
    let direction = SharedDirection::new(Direction::Up);
    let mut session = session_for(Level::classic(), direction.clone());

    // The configured start heading replaces whatever the cell held.
    assert_eq!(direction.load(), Direction::Right);
    let status = session.run_for(Some(8)).expect("ticks succeed");

    assert!(!status.is_terminal() || status == GameStatus::LivesExhausted);
    assert!(session.ticks() <= 8);
}

#[test]
fn level_must_fit_the_display() {
    let matrix = FrameBuffer::new(Grid::new(4, 4), FrameRecorder::new());
    let result = Session::new(
        Level::classic(),
        config(),
        matrix,
        RecordingPacer::default(),
        SharedDirection::default(),
    );

    assert!(matches!(
        result,
        Err(SessionError::GridMismatch {
            level_width: 12,
            level_height: 8,
            display_width: 4,
            display_height: 4,
        })
    ));
}
