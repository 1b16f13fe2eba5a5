pub mod core;
pub use core::{ChargeIm, Im, PatchIm};

pub mod frame;
pub use frame::ChargeFrame;

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "im-io")]
pub mod io;
