mod handler;
mod model;

pub use handler::{login, logout, purchases, signup};
pub use model::{LoginRequest, PurchasesResponse, SignupRequest, signup_schema};
