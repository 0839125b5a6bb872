//! HTTP-boundary semantics for the netgate device gateway.
//!
//! Maps REST-style requests (`GET /{host}/vlans/`, `POST /{host}/interfaces/`,
//! ...) onto [`netgate::CommandGateway`] calls and maps their outcomes onto
//! status codes and JSON bodies. No HTTP server is bundled: anything that can
//! hand over a method, a path with query and an optional body can drive
//! [`Api::handle`].
//!
//! ```rust,no_run
//! use netgate::Gateway;
//! use netgate_api::{Api, ApiConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::from_env()?;
//! let gateway = Gateway::ssh(config.gateway_options())?;
//! let api = Api::new(gateway, config);
//!
//! let response = api.handle("GET", "/10.0.0.1/vlans/?vlan_id=10", None).await;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod routes;
pub mod settings;

pub use error::{ApiError, Result};
pub use routes::{Api, ApiResponse, Route};
pub use settings::ApiConfig;
