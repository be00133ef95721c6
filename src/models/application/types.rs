use serde::Deserialize;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_REJECTED: &str = "Rejected";

/// A student's request for a bed. Status is monotonic:
/// Pending -> Approved | Rejected, terminal once set.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub student_name: String,
    pub student_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub applied_date: String,
    pub reviewed_date: Option<String>,
    pub bed_no: Option<i64>,
    pub notes: Option<String>,
}

impl Application {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Application joined with the owning user, for the admin review list.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationWithUser {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub user_email: String,
    pub student_name: String,
    pub student_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub applied_date: String,
    pub reviewed_date: Option<String>,
    pub bed_no: Option<i64>,
    pub notes: Option<String>,
}

/// Applicant data for a new queue entry.
pub struct NewApplication {
    pub student_name: String,
    pub student_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

/// Form data from the student "apply for bed" form.
#[derive(Debug, Deserialize)]
pub struct ApplyForm {
    pub student_name: String,
    pub student_id: String,
    pub contact: String,
    pub email: String,
    pub csrf_token: String,
}

/// Form data from the admin reject dialog.
#[derive(Debug, Deserialize)]
pub struct RejectForm {
    #[serde(default)]
    pub notes: String,
    pub csrf_token: String,
}
