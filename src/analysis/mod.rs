pub mod dashboard;
pub mod derived;
