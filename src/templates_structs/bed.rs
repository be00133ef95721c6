use askama::Template;

use super::PageContext;
use crate::models::bed::BedAssignment;

#[derive(Template)]
#[template(path = "beds.html")]
pub struct BedsTemplate {
    pub ctx: PageContext,
    pub allotments: Vec<BedAssignment>,
    pub total_beds: i64,
    pub available_beds: i64,
}

#[derive(Template)]
#[template(path = "add_bed.html")]
pub struct AddBedTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub results: Vec<BedAssignment>,
    pub query: String,
    pub search_type: String,
}
