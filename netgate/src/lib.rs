//! # netgate
//!
//! Run show and configuration commands on network devices over an
//! interactive SSH shell and turn the terminal output into structured data.
//!
//! ## Layers
//!
//! - [`transport`] and [`channel`]: SSH sessions, PTY channels and prompt
//!   matching with ANSI stripping
//! - [`driver`]: command exchanges, privilege navigation, interactive flows
//!   and failure detection
//! - [`normalize`]: registered per-command parsers and TextFSM templates
//! - [`gateway`]: one session per call, closed before anything is returned
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netgate::{CommandGateway, CommandOutput, CommandRequest, DeviceTarget, Gateway, GatewayOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Gateway::ssh(GatewayOptions::default())?;
//!     let target = DeviceTarget::new("10.0.0.1", "admin", "secret");
//!
//!     match gateway.run_command(&target, CommandRequest::command("show vlan")).await? {
//!         CommandOutput::Structured(record) => println!("{}", serde_json::to_string_pretty(&record)?),
//!         other => println!("{:?}", other),
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod directive;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod platform;
pub mod transport;

pub use directive::{ConfigDirective, InterfaceConfig};
pub use driver::{CommandResult, GenericDriver, InteractiveBuilder, InteractiveStep};
pub use error::{Error, GatewayError};
pub use gateway::{
    CommandGateway, CommandOutput, CommandRequest, ConfigRequest, Gateway, GatewayOptions,
    RecordSelection,
};
pub use normalize::{Normalizer, StructuredRecord, TextTemplate};
pub use platform::{PlatformDefinition, PrivilegeLevel};
pub use transport::{Connector, DeviceTarget, SshConfig, SshConnector};
