//! Command and config gateway.
//!
//! One call is one session: connect, open, run a single exchange, close,
//! then normalize. Sessions are never reused, and the session is closed
//! before any result or error leaves the call.
//!
//! Failures are split by phase. Anything that goes wrong before the
//! session is ready (connect, authentication, first prompt, on-open
//! commands) is [`GatewayError::Authentication`]; once commands are
//! flowing, a failure is [`GatewayError::TransportTimeout`].

mod options;
mod request;

pub use options::GatewayOptions;
pub use request::{CommandOutput, CommandRequest, ConfigRequest, Exchange, RecordSelection};

use std::future::Future;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::channel::Shell;
use crate::driver::{CommandResult, GenericDriver};
use crate::error::{Error, GatewayError, Result};
use crate::normalize::Normalizer;
use crate::platform::{PlatformDefinition, PlatformRegistry};
use crate::transport::{Connector, DeviceTarget, SshConnector};

/// Runs commands and configuration against devices.
///
/// This is the seam the API layer is written against.
pub trait CommandGateway: Send + Sync {
    /// Run a show command (or interactive flow) and normalize its output.
    fn run_command(
        &self,
        target: &DeviceTarget,
        request: CommandRequest,
    ) -> impl Future<Output = std::result::Result<CommandOutput, GatewayError>> + Send;

    /// Apply configuration and report whether the device accepted it.
    fn run_config(
        &self,
        target: &DeviceTarget,
        request: ConfigRequest,
    ) -> impl Future<Output = std::result::Result<CommandResult, GatewayError>> + Send;
}

/// Gateway over a [`Connector`], one fresh session per call.
pub struct Gateway<C> {
    connector: C,
    platform: PlatformDefinition,
    normalizer: Normalizer,
    options: GatewayOptions,
}

impl Gateway<SshConnector> {
    /// Gateway that reaches devices over SSH.
    pub fn ssh(options: GatewayOptions) -> Result<Self> {
        let connector = SshConnector::new(options.connect_timeout)
            .operation_timeout(options.operation_timeout)
            .search_depth(options.search_depth)
            .terminal_size(options.terminal_width, options.terminal_height);
        Self::new(connector, options)
    }
}

impl<C: Connector> Gateway<C> {
    /// Create a gateway for `options.platform` with the built-in parsers.
    pub fn new(connector: C, options: GatewayOptions) -> Result<Self> {
        let platform = PlatformRegistry::lookup(&options.platform)?;
        Ok(Self {
            connector,
            platform,
            normalizer: Normalizer::with_builtin_parsers()?,
            options,
        })
    }

    /// Replace the normalizer.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Get a reference to the normalizer.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Get the gateway options.
    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    async fn open(
        &self,
        target: &DeviceTarget,
        markers: Option<Vec<String>>,
    ) -> std::result::Result<GenericDriver<C::Shell>, GatewayError> {
        let authentication = |source: Error| GatewayError::Authentication {
            host: target.host.clone(),
            source,
        };

        let shell = self.connector.connect(target).await.map_err(authentication)?;
        let mut driver = GenericDriver::new(shell, self.platform.clone())
            .map_err(authentication)?
            .with_timeout(self.options.operation_timeout)
            .with_auth_secondary(SecretString::from(target.secret.expose_secret().to_owned()));
        if let Some(markers) = markers {
            driver = driver.with_failure_markers(markers);
        }

        if let Err(e) = driver.open().await {
            close(&mut driver, &target.host).await;
            return Err(authentication(e));
        }
        debug!("{}: session open", target.host);
        Ok(driver)
    }

    fn normalize(&self, request: &CommandRequest, result: CommandResult) -> CommandOutput {
        if let Some(template) = &request.template {
            let records = self.normalizer.templated(template, result.raw_text());
            return request
                .selection
                .apply(records)
                .unwrap_or_else(|| CommandOutput::Raw(result.into_raw_text()));
        }

        let Exchange::Single(command) = &request.exchange else {
            return CommandOutput::Raw(result.into_raw_text());
        };
        match self
            .normalizer
            .structured(&self.platform.name, command, result.raw_text())
            .into_record()
        {
            Some(record) => CommandOutput::Structured(record),
            None => CommandOutput::Raw(result.into_raw_text()),
        }
    }
}

impl<C: Connector> CommandGateway for Gateway<C> {
    async fn run_command(
        &self,
        target: &DeviceTarget,
        request: CommandRequest,
    ) -> std::result::Result<CommandOutput, GatewayError> {
        let mut driver = self.open(target, request.failed_when_contains.clone()).await?;

        let outcome = match &request.exchange {
            Exchange::Single(command) => driver.send_command(command).await,
            Exchange::Interactive(steps) => driver.send_interactive(steps, None).await,
        };
        close(&mut driver, &target.host).await;

        let result = outcome.map_err(|source| GatewayError::TransportTimeout {
            host: target.host.clone(),
            source,
        })?;

        if result.failed() {
            debug!("{}: '{}' rejected by device", target.host, result.command());
            return Ok(CommandOutput::Rejected(result));
        }
        Ok(self.normalize(&request, result))
    }

    async fn run_config(
        &self,
        target: &DeviceTarget,
        request: ConfigRequest,
    ) -> std::result::Result<CommandResult, GatewayError> {
        let mut driver = self.open(target, request.failed_when_contains.clone()).await?;

        let outcome = match &request.exchange {
            Exchange::Single(config) => {
                let lines: Vec<&str> = config.lines().collect();
                driver.send_config(&lines, request.stop_on_failed).await
            }
            Exchange::Interactive(steps) => {
                let config_privilege = self.platform.config_privilege.as_str();
                driver.send_interactive(steps, Some(config_privilege)).await
            }
        };
        close(&mut driver, &target.host).await;

        outcome.map_err(|source| GatewayError::TransportTimeout {
            host: target.host.clone(),
            source,
        })
    }
}

async fn close<S: Shell>(driver: &mut GenericDriver<S>, host: &str) {
    if let Err(e) = driver.close().await {
        warn!("{}: close failed: {}", host, e);
    }
}
