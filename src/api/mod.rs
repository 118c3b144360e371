mod handlers;
mod health;
mod metrics;
mod models;
mod routes;

pub use models::{
    EmergencyAlertRequest, EmergencyAlertResponse, SendDonorNotificationRequest,
    SendNotificationResponse, SendRequesterNotificationRequest,
};
pub use routes::api_routes;
