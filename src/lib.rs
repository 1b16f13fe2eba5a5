// Library crate root.
//
// This crate is used both as a binary (src/main.rs) and as a library.
// Keeping modules here prevents "dead_code" warnings for public APIs that are
// intentionally exported for host frameworks.

pub mod units;
pub mod point;
pub mod binning;
pub mod gauss;
pub mod im;
pub mod desc;
pub mod depo;
pub mod error;
pub mod config;
pub mod geom;
pub mod diffusion;
pub mod bucket_vec;
pub mod accum;
pub mod raster;
pub mod source;
pub mod sink;

#[cfg(test)]
pub mod test_helpers;
