pub mod batch;
pub mod health;
pub mod incoming;
pub mod me;
