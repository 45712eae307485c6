//! Multi-dimensional integration over axis-aligned boxes.
//!
//! The work is delegated to a [`CubatureOracle`](crate::integrate::traits::CubatureOracle);
//! [`HaltonOracle`] is the routine used by [`integrate_box`](crate::integrate::integrate_box).

mod halton;

pub use halton::HaltonOracle;
