use askama::Template;

use super::PageContext;
use crate::models::bed::BedAssignment;
use crate::models::user::UserDisplay;

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub user: UserDisplay,
    pub bed: Option<BedAssignment>,
}
