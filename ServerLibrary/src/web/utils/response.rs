use serde::Serialize;

#[derive(Serialize)]
pub struct VehicleCountResponse {
    vehicle_count: usize,
}

impl VehicleCountResponse {
    pub fn new(vehicle_count: usize) -> Self {
        Self {
            vehicle_count,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

impl ErrorResponse {
    pub fn new<T: Into<String>>(error: T) -> Self {
        Self {
            error: error.into(),
        }
    }
}
