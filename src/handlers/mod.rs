pub mod account_handlers;
pub mod api_v1;
pub mod application_handlers;
pub mod auth_handlers;
pub mod bed_handlers;
pub mod dashboard;
