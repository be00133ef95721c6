use askama::Template;

use super::PageContext;
use crate::models::application::Application;
use crate::models::bed::BedAssignment;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct AdminDashboardTemplate {
    pub ctx: PageContext,
    pub total_beds: i64,
    pub reserved_beds: i64,
    pub available_beds: i64,
    /// Pre-formatted to one decimal place.
    pub occupancy_rate: String,
    pub paid_count: i64,
    pub pending_count: i64,
    pub pending_applications: i64,
    pub recent_allotments: Vec<BedAssignment>,
}

#[derive(Template)]
#[template(path = "student_dashboard.html")]
pub struct StudentDashboardTemplate {
    pub ctx: PageContext,
    pub bed: Option<BedAssignment>,
    pub applications: Vec<Application>,
}
