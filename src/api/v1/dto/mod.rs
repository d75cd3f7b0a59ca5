pub mod batch;
pub mod incoming;
