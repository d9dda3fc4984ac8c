// splash-engine - browser particle demo
//
// Particles are spawned by pointer clicks, rendered as WebGL point sprites,
// and advanced each animation frame by a drag-and-gravity model with a floor
// bounce at the bottom of normalized device space.
//
// The simulation core (`sim`) is pure and builds on every target; the DOM and
// WebGL plumbing (`app`, the GL half of `render`) only exists on wasm32.

pub mod render;
pub mod shaders;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod app;

pub use sim::{Particle, Simulation, Vec2};

/// `println!`-style logging to the browser console.
#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ( $( $t:tt )* ) => {
        web_sys::console::log_1(&format!( $( $t )* ).into())
    };
}

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_error {
    ( $( $t:tt )* ) => {
        web_sys::console::error_1(&format!( $( $t )* ).into())
    };
}
