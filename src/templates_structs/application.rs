use askama::Template;

use super::PageContext;
use crate::models::application::{Application, ApplicationWithUser};

#[derive(Template)]
#[template(path = "apply_bed.html")]
pub struct ApplyTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "my_applications.html")]
pub struct MyApplicationsTemplate {
    pub ctx: PageContext,
    pub applications: Vec<Application>,
}

#[derive(Template)]
#[template(path = "admin_applications.html")]
pub struct AdminApplicationsTemplate {
    pub ctx: PageContext,
    pub applications: Vec<ApplicationWithUser>,
}
