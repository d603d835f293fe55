//! Pushball - side-scrolling push-the-ball platformer
//!
//! The game crate wires the engine crates together:
//! - [`config`] - Layered TOML/env configuration
//! - [`game`] - Game state: scenes, transitions, player
//! - [`input`] - Application-level key mapping
//! - [`scene`] - Scene builder and built-in scenes
//! - [`systems`] - Frame driver and main menu

pub mod config;
pub mod game;
pub mod input;
pub mod scene;
pub mod systems;
