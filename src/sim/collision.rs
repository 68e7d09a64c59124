//! Collision tests for the flight minigame
//!
//! Everything in the playfield is treated as a circle: asteroids by their
//! own radius, the shuttle by a fixed half-width, pickups by a fixed reach.

use glam::Vec2;

/// Circle-circle overlap (touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    (a - b).length() < a_radius + b_radius
}

/// Shuttle vs. asteroid
#[inline]
pub fn shuttle_hits_asteroid(
    shuttle: Vec2,
    shuttle_half_width: f32,
    asteroid: Vec2,
    asteroid_radius: f32,
) -> bool {
    circles_overlap(shuttle, shuttle_half_width, asteroid, asteroid_radius)
}

/// Shuttle vs. pickup: the pickup is a point collected within `reach`
#[inline]
pub fn shuttle_reaches_pickup(shuttle: Vec2, pickup: Vec2, reach: f32) -> bool {
    circles_overlap(shuttle, reach, pickup, 0.0)
}
