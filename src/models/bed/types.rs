use serde::Deserialize;

pub const PAYMENT_PAID: &str = "Paid";
pub const PAYMENT_PENDING: &str = "Pending";

/// One row of the ledger: a currently assigned bed slot.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BedAssignment {
    pub bed_no: i64,
    pub name: String,
    pub student_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub check_in_date: String,
    pub payment_status: String,
    pub user_id: Option<i64>,
}

/// Occupant data for a new ledger row. The bed number is chosen by the
/// allocation workflow, never by the caller.
pub struct NewBed {
    pub name: String,
    pub student_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<i64>,
}

/// Form data from the admin "add bed" form.
#[derive(Debug, Deserialize)]
pub struct BedForm {
    pub name: String,
    pub student_id: String,
    pub contact: String,
    pub email: String,
    pub csrf_token: String,
}

/// Form data from the payment status dropdown on the bed list.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub status: String,
    pub csrf_token: String,
}
