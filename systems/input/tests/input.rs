use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use gem_maze_core::Direction;
use gem_maze_system_input::{
    Button, ButtonPanel, Feedback, InputSampler, SamplerConfig, SharedDirection, Silent,
    PRESS_TONE_HZ,
};

#[derive(Default)]
struct HeldButtons(Vec<Button>);

impl ButtonPanel for HeldButtons {
    fn is_pressed(&self, button: Button) -> bool {
        self.0.contains(&button)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Cue {
    Tone(u32),
    ToneOff,
    Vibrate,
    VibrateOff,
}

#[derive(Clone, Default)]
struct RecordingFeedback(Arc<Mutex<Vec<Cue>>>);

impl RecordingFeedback {
    fn cues(&self) -> Vec<Cue> {
        self.0.lock().expect("cue log lock").clone()
    }

    fn push(&self, cue: Cue) {
        self.0.lock().expect("cue log lock").push(cue);
    }
}

impl Feedback for RecordingFeedback {
    fn play_tone(&mut self, frequency_hz: u32) {
        self.push(Cue::Tone(frequency_hz));
    }

    fn stop_tone(&mut self) {
        self.push(Cue::ToneOff);
    }

    fn vibrate(&mut self) {
        self.push(Cue::Vibrate);
    }

    fn stop(&mut self) {
        self.push(Cue::VibrateOff);
    }
}

fn instant_config() -> SamplerConfig {
    SamplerConfig {
        debounce: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
    }
}

#[test]
fn idle_pass_keeps_direction_and_silences_feedback() {
    let direction = SharedDirection::default();
    let feedback = RecordingFeedback::default();
    let mut sampler = InputSampler::new(
        HeldButtons::default(),
        feedback.clone(),
        direction.clone(),
        instant_config(),
    );

    assert_eq!(sampler.sample_once(), None);
    assert_eq!(direction.load(), Direction::Right);
    assert_eq!(feedback.cues(), vec![Cue::ToneOff, Cue::VibrateOff]);
}

#[test]
fn press_stores_direction_with_feedback() {
    let direction = SharedDirection::default();
    let feedback = RecordingFeedback::default();
    let mut sampler = InputSampler::new(
        HeldButtons(vec![Button::Up]),
        feedback.clone(),
        direction.clone(),
        instant_config(),
    );

    assert_eq!(sampler.sample_once(), Some(Direction::Up));
    assert_eq!(direction.load(), Direction::Up);
    assert_eq!(
        feedback.cues(),
        vec![
            Cue::Tone(PRESS_TONE_HZ),
            Cue::Vibrate,
            Cue::ToneOff,
            Cue::VibrateOff,
        ]
    );
}

#[test]
fn last_polled_button_wins_when_several_are_held() {
    let direction = SharedDirection::default();
    let mut sampler = InputSampler::new(
        HeldButtons(vec![Button::Left, Button::Up, Button::Down]),
        Silent,
        direction.clone(),
        instant_config(),
    );

    // Polled in Up, Down, Left, Right order.
    assert_eq!(sampler.sample_once(), Some(Direction::Left));
    assert_eq!(direction.load(), Direction::Left);
}

#[test]
fn auxiliary_buttons_do_not_steer() {
    let direction = SharedDirection::new(Direction::Down);
    let mut sampler = InputSampler::new(
        HeldButtons(vec![Button::A, Button::B]),
        Silent,
        direction.clone(),
        instant_config(),
    );

    assert_eq!(sampler.sample_once(), None);
    assert_eq!(direction.load(), Direction::Down);
}

#[test]
fn debounce_delays_each_accepted_press() {
    let debounce = Duration::from_millis(20);
    let mut sampler = InputSampler::new(
        HeldButtons(vec![Button::Up, Button::Right]),
        Silent,
        SharedDirection::default(),
        SamplerConfig {
            debounce,
            poll_interval: Duration::ZERO,
        },
    );

    let started = Instant::now();
    let _ = sampler.sample_once();

    assert!(started.elapsed() >= debounce * 2);
}

struct SwitchPanel {
    down: Arc<AtomicBool>,
}

impl ButtonPanel for SwitchPanel {
    fn is_pressed(&self, button: Button) -> bool {
        button == Button::Down && self.down.load(Ordering::Acquire)
    }
}

#[test]
fn spawned_sampler_publishes_presses_until_stopped() {
    let down = Arc::new(AtomicBool::new(false));
    let direction = SharedDirection::default();
    let handle = InputSampler::new(
        SwitchPanel {
            down: Arc::clone(&down),
        },
        Silent,
        direction.clone(),
        instant_config(),
    )
    .spawn()
    .expect("sampler thread starts");

    assert!(handle.is_running());
    down.store(true, Ordering::Release);

    let deadline = Instant::now() + Duration::from_secs(5);
    while direction.load() != Direction::Down && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(direction.load(), Direction::Down);

    handle.stop();
}
