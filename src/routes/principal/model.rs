use serde::{Deserialize, Serialize};

use crate::models::{Course, Purchase};
use crate::validation::{Rule, Schema};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<Purchase>,
    pub courses: Vec<Course>,
}

pub fn signup_schema() -> Schema {
    Schema::new()
        .field(
            "firstName",
            [
                Rule::Required,
                Rule::String,
                Rule::MinLen(3, "firstName must be at least 3 characters long"),
            ],
        )
        .field(
            "lastName",
            [
                Rule::Required,
                Rule::String,
                Rule::MinLen(3, "lastName must be at least 3 characters long"),
            ],
        )
        .field("email", [Rule::Required, Rule::String, Rule::Email])
        .field(
            "password",
            [
                Rule::Required,
                Rule::String,
                Rule::MinLen(6, "password must be at least 6 characters long"),
            ],
        )
}
