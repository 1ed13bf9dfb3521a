pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod telemetry;

pub use api::ApiClient;
pub use errors::{GatewayError, GatewayResult};
pub use gateway::{AuthAttempt, Gateway, Session, SessionCache, SessionProvider, TenantResolver};
