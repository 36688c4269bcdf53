use crossterm::event::KeyCode;

use crate::grid::Dir;

/// Adds one velocity step along `dir`, leaving the other axis alone. Screen
/// space: up is negative y.
pub fn steer(velocity: (f64, f64), dir: Dir, step: f64) -> (f64, f64) {
    let (vx, vy) = velocity;
    match dir {
        Dir::Up => (vx, vy - step),
        Dir::Down => (vx, vy + step),
        Dir::Left => (vx - step, vy),
        Dir::Right => (vx + step, vy),
    }
}

/// Arrow keys and vi keys.
pub fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}
