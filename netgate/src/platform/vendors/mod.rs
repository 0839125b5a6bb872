//! Vendor-specific platform definitions and output parsers.

pub mod cisco_iosxe;
