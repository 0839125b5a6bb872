//! Cisco IOS-XE platform definition.
//!
//! Privilege levels:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Configuration mode with `(config*)#` prompt
//!
//! # Prompt Examples
//!
//! ```text
//! csr1000v-1>                        # exec mode
//! csr1000v-1#                        # privilege_exec mode
//! csr1000v-1(config)#                # configuration mode
//! csr1000v-1(config-if)#             # config sub-mode (interface)
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├──────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │   disable   │       #        │        end           │  (config*)#   │
//! └──────┘◄────────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Registry name of the IOS-XE platform.
pub const NAME: &str = "cisco_iosxe";

/// Output substrings IOS-XE prints when it rejects a command.
pub const FAILURE_MARKERS: [&str; 4] = [
    "% Ambiguous command",
    "% Incomplete command",
    "% Invalid input detected",
    "% Unknown command",
];

/// Create the Cisco IOS-XE platform definition.
///
/// Patterns are multiline so `^` anchors at the prompt line rather than the
/// start of the buffer.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$")
        .expect("valid exec prompt pattern");

    // "#" alone also ends configuration prompts
    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .expect("valid privilege_exec prompt pattern")
        .child_of("exec")
        .entered_with("enable")
        .left_with("disable")
        .with_password_prompt(r"(?mi)^password:\s?$")
        .expect("valid enable password pattern")
        .excluding("(config");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .expect("valid configuration prompt pattern")
    .child_of("privilege_exec")
    .entered_with("configure terminal")
    .left_with("end");

    let mut definition = PlatformDefinition::new(NAME)
        .with_level(exec)
        .with_level(privilege_exec)
        .with_level(configuration)
        .with_default_privilege("privilege_exec")
        .with_config_privilege("configuration")
        .with_open_command("terminal length 0")
        .with_open_command("terminal width 512")
        .with_close_command("exit");

    for marker in FAILURE_MARKERS {
        definition = definition.with_failure_marker(marker);
    }
    definition
}
