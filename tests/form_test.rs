//! Form decoding tests: the field shapes the handlers rely on, decoded the
//! same way actix's Form extractor does it.

use hms::models::application::{ApplyForm, RejectForm};
use hms::models::bed::{BedForm, PaymentForm};

#[test]
fn apply_form_decodes_all_fields() {
    let body = "student_name=Amara+O.&student_id=S-100&contact=555-0101\
                &email=amara%40example.com&csrf_token=abc";
    let form: ApplyForm = serde_urlencoded::from_str(body).expect("Failed to decode form");
    assert_eq!(form.student_name, "Amara O.");
    assert_eq!(form.student_id, "S-100");
    assert_eq!(form.email, "amara@example.com");
    assert_eq!(form.csrf_token, "abc");
}

#[test]
fn reject_form_notes_default_to_empty() {
    // The reject dialog may submit without a reason.
    let form: RejectForm =
        serde_urlencoded::from_str("csrf_token=abc").expect("Failed to decode form");
    assert_eq!(form.notes, "");
    assert_eq!(form.csrf_token, "abc");
}

#[test]
fn bed_form_requires_all_fields_present() {
    let ok: Result<BedForm, _> =
        serde_urlencoded::from_str("name=Jane&student_id=&contact=&email=&csrf_token=abc");
    assert!(ok.is_ok());

    // Missing csrf_token is a decode failure, not an empty string.
    let missing: Result<BedForm, _> =
        serde_urlencoded::from_str("name=Jane&student_id=&contact=&email=");
    assert!(missing.is_err());
}

#[test]
fn payment_form_carries_raw_status() {
    let form: PaymentForm =
        serde_urlencoded::from_str("status=Paid&csrf_token=abc").expect("Failed to decode form");
    assert_eq!(form.status, "Paid");
}
