//! Scoped ownership of the character's action map

use std::ops::{Deref, DerefMut};

use crate::action_map::ActionMap;

/// Keeps an [`ActionMap`] enabled while alive
///
/// The map is enabled on construction and disabled when the guard is
/// dropped or consumed with [`into_map`](CharacterInput::into_map).
#[derive(Debug)]
pub struct CharacterInput {
    map: ActionMap,
}

impl CharacterInput {
    pub fn new(mut map: ActionMap) -> Self {
        map.enable();
        Self { map }
    }

    /// Disable the map and hand it back
    pub fn into_map(mut self) -> ActionMap {
        let mut map = std::mem::take(&mut self.map);
        map.disable();
        map
    }
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self::new(ActionMap::new())
    }
}

impl Deref for CharacterInput {
    type Target = ActionMap;

    fn deref(&self) -> &ActionMap {
        &self.map
    }
}

impl DerefMut for CharacterInput {
    fn deref_mut(&mut self) -> &mut ActionMap {
        &mut self.map
    }
}

impl Drop for CharacterInput {
    fn drop(&mut self) {
        self.map.disable();
    }
}
