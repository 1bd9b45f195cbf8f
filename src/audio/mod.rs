pub mod decode;
pub mod levels;
