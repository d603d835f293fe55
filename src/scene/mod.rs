//! Scene construction utilities
//!
//! This module provides a declarative API for building scene templates,
//! plus the built-in demo scenes.

mod demo;
mod scene_builder;

pub use demo::demo_scenes;
pub use scene_builder::SceneBuilder;
