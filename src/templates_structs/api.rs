use serde::Serialize;

/// JSON payload for GET /api/v1/beds/availability.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub total_beds: i64,
    pub reserved_beds: i64,
    pub available_beds: i64,
    pub pending_applications: i64,
}
