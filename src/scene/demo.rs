//! Built-in scenes: main menu, loading screen and the first level

use pushball_core::Scene;
use pushball_math::Vec3;
use pushball_physics::PhysicsMaterial;

use crate::config::ScenesConfig;
use crate::scene::SceneBuilder;

/// Templates for every scene the game flow references
pub fn demo_scenes(config: &ScenesConfig) -> Vec<Scene> {
    vec![
        SceneBuilder::new(&config.main_menu).build(),
        SceneBuilder::new(&config.transition_scene).with_load_steps(2).build(),
        SceneBuilder::new(&config.first_level)
            .with_load_steps(config.load_steps)
            .add_floor(0.0, PhysicsMaterial::CONCRETE)
            .add_slope(Vec3::new(12.0, 0.0, 0.0), 25.0, PhysicsMaterial::CONCRETE)
            .add_player(Vec3::new(0.0, 0.5, 0.0))
            .add_ball("ball", Vec3::new(3.0, 0.5, 0.0), 0.5)
            .add_ball("far_ball", Vec3::new(8.0, 0.5, 0.0), 0.5)
            .add_push_exclusion(Vec3::new(-6.0, 1.0, 0.0), Vec3::new(2.0, 2.0, 1.0))
            .build(),
    ]
}
