use serde::Serialize;

pub const DATA_SAVED: &str = "data_saved";

/// Body returned by `POST /save`.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub msg: String,
}

impl SaveResponse {
    pub fn saved() -> Self {
        SaveResponse {
            success: true,
            msg: DATA_SAVED.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
