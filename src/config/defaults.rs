//! Default values for configuration fields

use std::path::PathBuf;

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    5000
}

pub fn default_sources_file() -> PathBuf {
    PathBuf::from("iptv.json")
}

pub fn default_reload_every_request() -> bool {
    true
}

pub fn default_source_timeout() -> String {
    "30s".to_string()
}

pub fn default_include_failure_markers() -> bool {
    false
}

pub fn default_ip_echo_url() -> String {
    "https://api.ipify.org".to_string()
}

pub fn default_probe_timeout() -> String {
    "5s".to_string()
}
