pub mod check;
pub mod metrics;
pub mod serve;
pub mod status;
