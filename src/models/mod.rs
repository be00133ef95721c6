pub mod application;
pub mod bed;
pub mod user;
