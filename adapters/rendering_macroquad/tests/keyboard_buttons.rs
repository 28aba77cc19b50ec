use gem_maze_rendering_macroquad::{buttons_for_key, KeyboardButtons, KEY_BINDINGS};
use gem_maze_system_input::{Button, ButtonPanel};
use macroquad::input::KeyCode;

#[test]
fn clones_observe_the_same_buttons() {
    let window_side = KeyboardButtons::new();
    let sampler_side = window_side.clone();

    window_side.set_held(Button::Left, true);
    window_side.set_held(Button::A, true);

    assert!(sampler_side.is_pressed(Button::Left));
    assert!(sampler_side.is_pressed(Button::A));
    assert!(!sampler_side.is_pressed(Button::Right));

    window_side.set_held(Button::Left, false);
    assert!(!sampler_side.is_pressed(Button::Left));
    assert!(sampler_side.is_pressed(Button::A));

    window_side.release_all();
    assert!(!sampler_side.is_pressed(Button::A));
}

#[test]
fn every_button_has_a_key() {
    for button in [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
    ] {
        assert!(
            KEY_BINDINGS.iter().any(|&(_, bound)| bound == button),
            "{button:?} has no key"
        );
    }
}

#[test]
fn arrows_and_letters_steer_alike() {
    assert_eq!(buttons_for_key(KeyCode::Up).collect::<Vec<_>>(), vec![Button::Up]);
    assert_eq!(buttons_for_key(KeyCode::W).collect::<Vec<_>>(), vec![Button::Up]);
    assert_eq!(buttons_for_key(KeyCode::Z).collect::<Vec<_>>(), vec![Button::A]);
    assert_eq!(buttons_for_key(KeyCode::F1).count(), 0);
}
