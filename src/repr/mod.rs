//! Native model representations that converted models are stored in.

pub mod gbdt;
pub mod gblinear;
