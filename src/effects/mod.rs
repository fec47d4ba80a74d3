//! # Motion Effects
//!
//! The effect engine: a pure function from a source image, an [`Effect`] and
//! a [`FrameClock`] to one output frame of the requested size.
//!
//! ## Built-in Effects
//!
//! - **Zoom in / out**: centered scale between 1.0x and 1.5x
//! - **Fade in / out**: one-second ramp from or to black
//! - **Slide left / right**: the image travels in from one edge
//! - **Pan left-to-right / right-to-left**: horizontal drift over a 1.2x crop
//! - **Ken Burns**: slow zoom to 1.3x with a diagonal drift
//!
//! ## Usage
//!
//! ```rust,no_run
//! use still_motion::effects::{render_frame, Effect, FrameClock};
//! use still_motion::video::Frame;
//!
//! # fn main() -> still_motion::Result<()> {
//! let image = Frame::new_filled(640, 360, [90, 140, 200]);
//! let effect: Effect = "ken-burns".parse()?;
//! let frame = render_frame(&image, effect, FrameClock::new(12, 120, 24), 640, 360)?;
//! assert_eq!(frame.dimensions(), (640, 360));
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod geometry;
pub mod kind;

pub use engine::{render_frame, FrameClock, RenderRequest};
pub use geometry::{scaled_crop_or_pad, translate};
pub use kind::Effect;
