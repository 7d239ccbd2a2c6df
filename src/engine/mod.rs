// Engine module - ECS components, systems, camera, input, meshes and the HUD.
// Nothing in here knows about gestures beyond the `Mode` it is told to show.

pub mod camera;
pub mod components;
pub mod debug_overlay;
pub mod input;
pub mod mesh;
pub mod systems;

// Re-export commonly used items
pub use components::*;
