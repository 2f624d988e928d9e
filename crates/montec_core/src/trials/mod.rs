//! Ready-made trial domains.
//!
//! - [`QuarterCircle`]: π from uniform points in the unit square
//! - [`NormalTail`]: conditional mean of a standard normal above a threshold
//! - [`UniformIntegral`]: definite integral by uniform sampling

mod integral;
mod normal_tail;
mod pi;

pub use integral::UniformIntegral;
pub use normal_tail::NormalTail;
pub use pi::QuarterCircle;
