//! Filesystem path constants.

/// Default config file path for the controller.
pub const DEFAULT_CONFIG: &str = "/etc/porch/config.yaml";

/// Default ISC dhcpd lease database.
pub const DEFAULT_LEASES_FILE: &str = "/var/lib/dhcp/dhcpd.leases";
