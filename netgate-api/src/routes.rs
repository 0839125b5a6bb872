//! Route resolution and outcome-to-status mapping.

use log::{debug, info, warn};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::{Value, json};

use netgate::{
    CommandGateway, CommandOutput, CommandRequest, ConfigRequest, GatewayError, InterfaceConfig,
};

use crate::error::{ApiError, Result};
use crate::settings::ApiConfig;

const API_NAME: &str = "Network Device API";
const COMMAND_EXECUTED: &str = "Command executed successfully";
const CONFIG_CHANGED: &str = "Config changed successfully";
const HOST_UNREACHABLE: &str = "Timed out connecting to host, does it exist?";

/// A resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /`
    Root,

    /// `GET /{host}/vlans/?vlan_id=`
    Vlans { host: String, vlan_id: Option<String> },

    /// `GET /{host}/ip-interfaces/`
    IpInterfaces { host: String },

    /// `GET /{host}/interfaces/?interface_name=`
    Interfaces {
        host: String,
        interface_name: Option<String>,
    },

    /// `GET /{host}/interfaces-config/?interface_name=`
    InterfacesConfig { host: String, interface_name: String },

    /// `POST /{host}/interfaces/` with an [`InterfaceConfig`] body
    ConfigureInterface { host: String, change: InterfaceConfig },
}

impl Route {
    /// Resolve a method, a path with optional query string, and a body.
    ///
    /// Unknown paths are [`ApiError::NotFound`]; a known path with the
    /// wrong method is [`ApiError::MethodNotAllowed`]. Empty query values
    /// count as absent.
    pub fn resolve(method: &str, path_and_query: &str, body: Option<&str>) -> Result<Self> {
        let (path, query) = path_and_query
            .split_once('?')
            .unwrap_or((path_and_query, ""));
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(percent_decode)
            .collect();
        let param = |name: &str| query_param(query, name);
        let get = method.eq_ignore_ascii_case("GET");
        let post = method.eq_ignore_ascii_case("POST");

        let route = match segments.as_slice() {
            [] if get => Route::Root,
            [host, resource] => {
                let host = host.clone();
                match resource.as_str() {
                    "vlans" if get => Route::Vlans {
                        host,
                        vlan_id: param("vlan_id"),
                    },
                    "ip-interfaces" if get => Route::IpInterfaces { host },
                    "interfaces" if get => Route::Interfaces {
                        host,
                        interface_name: param("interface_name"),
                    },
                    "interfaces" if post => {
                        let change = serde_json::from_str(body.unwrap_or_default())?;
                        Route::ConfigureInterface { host, change }
                    }
                    "interfaces-config" if get => Route::InterfacesConfig {
                        host,
                        interface_name: param("interface_name").ok_or(ApiError::MissingInterface)?,
                    },
                    "vlans" | "ip-interfaces" | "interfaces" | "interfaces-config" => {
                        return Err(ApiError::MethodNotAllowed);
                    }
                    _ => return Err(ApiError::NotFound),
                }
            }
            [] => return Err(ApiError::MethodNotAllowed),
            _ => return Err(ApiError::NotFound),
        };
        Ok(route)
    }

    /// Device host this route talks to.
    pub fn host(&self) -> Option<&str> {
        match self {
            Route::Root => None,
            Route::Vlans { host, .. }
            | Route::IpInterfaces { host }
            | Route::Interfaces { host, .. }
            | Route::InterfacesConfig { host, .. }
            | Route::ConfigureInterface { host, .. } => Some(host),
        }
    }

    /// Show command for read-only routes.
    pub fn command(&self) -> Option<String> {
        match self {
            Route::Vlans { vlan_id: None, .. } => Some("show vlan".to_string()),
            Route::Vlans {
                vlan_id: Some(id), ..
            } => Some(format!("show vlan id {id}")),
            Route::IpInterfaces { .. } => Some("show ip interface brief".to_string()),
            Route::Interfaces {
                interface_name: None,
                ..
            } => Some("show interfaces".to_string()),
            Route::Interfaces {
                interface_name: Some(name),
                ..
            } => Some(format!("show interface {name}")),
            Route::InterfacesConfig { interface_name, .. } => {
                Some(format!("show run interface {interface_name}"))
            }
            Route::Root | Route::ConfigureInterface { .. } => None,
        }
    }
}

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"detail": ...}` with the given status.
    pub fn detail(status: u16, detail: impl Into<Value>) -> Self {
        Self::new(status, json!({ "detail": detail.into() }))
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        let detail = match &err {
            ApiError::InvalidBody(source) => source.to_string(),
            other => other.to_string(),
        };
        Self::detail(status, detail)
    }
}

impl From<GatewayError> for ApiResponse {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Authentication { .. } => Self::detail(404, HOST_UNREACHABLE),
            GatewayError::TransportTimeout { .. } => Self::detail(504, err.to_string()),
        }
    }
}

/// Request handler over a [`CommandGateway`].
pub struct Api<G> {
    gateway: G,
    config: ApiConfig,
}

impl<G: CommandGateway> Api<G> {
    pub fn new(gateway: G, config: ApiConfig) -> Self {
        Self { gateway, config }
    }

    /// Get a reference to the gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Get a reference to the settings.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve and run one request.
    pub async fn handle(&self, method: &str, path_and_query: &str, body: Option<&str>) -> ApiResponse {
        let response = match Route::resolve(method, path_and_query, body) {
            Ok(route) => self.dispatch(route).await,
            Err(e) => e.into(),
        };
        info!("{} {} {}", method, path_and_query, response.status);
        response
    }

    /// Run a resolved route.
    pub async fn dispatch(&self, route: Route) -> ApiResponse {
        let Some(host) = route.host() else {
            return ApiResponse::new(200, json!({ "message": API_NAME }));
        };
        let target = self.config.target(host);

        if let Route::ConfigureInterface { change, .. } = &route {
            return match self
                .gateway
                .run_config(&target, ConfigRequest::directive(change))
                .await
            {
                Ok(result) if result.failed() => {
                    debug!("{}: config rejected", host);
                    ApiResponse::detail(400, result.failure_reason().unwrap_or(result.raw_text()))
                }
                Ok(_) => ApiResponse::new(201, json!({ "message": CONFIG_CHANGED })),
                Err(e) => {
                    warn!("{}", e);
                    e.into()
                }
            };
        }

        let Some(command) = route.command() else {
            return ApiError::NotFound.into();
        };
        match self.gateway.run_command(&target, CommandRequest::command(command)).await {
            Ok(CommandOutput::Rejected(result)) => ApiResponse::detail(400, result.raw_text()),
            Ok(output) => match serde_json::to_value(&output) {
                Ok(detail) => ApiResponse::new(200, json!({ "message": COMMAND_EXECUTED, "detail": detail })),
                Err(e) => ApiResponse::detail(500, e.to_string()),
            },
            Err(e) => {
                warn!("{}", e);
                e.into()
            }
        }
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| percent_decode(key) == name)
        .map(|(_, value)| percent_decode(value))
        .filter(|value| !value.is_empty())
}

/// Decode `%XX` escapes and `+` as space. Malformed escapes pass through.
fn percent_decode(text: &str) -> String {
    percent_decode_str(&text.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
