pub mod histogram;
pub mod partition;
