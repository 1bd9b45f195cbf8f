pub mod frames;
pub mod loudness;
pub mod transform;
pub mod window;
