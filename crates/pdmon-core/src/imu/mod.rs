pub mod magnitude;
pub mod window;

pub use magnitude::{vector_norm3, MagnitudePair, MotionSample};
pub use window::{MagnitudeWindow, WindowBuffer, WindowState, WindowStorage};
