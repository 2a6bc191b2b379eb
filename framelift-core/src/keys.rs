//! Keys whose default page action is suppressed while a game is embedded.

/// `KeyboardEvent.key` values for the arrows, WASD and space.
pub const GAME_KEYS: [&str; 9] = [
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "w",
    "a",
    "s",
    "d",
    " ",
];

/// Whether a key-down for `key` would scroll the page under the game.
///
/// Matching is exact: `"W"` (shifted) is not intercepted.
#[must_use]
pub fn is_game_key(key: &str) -> bool {
    GAME_KEYS.contains(&key)
}
