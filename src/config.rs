use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medilink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP server.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8700";

/// Get the application data directory.
/// `MEDILINK_DATA_DIR` overrides; otherwise ~/Medilink/data.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDILINK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(APP_NAME).join("data")
}

/// Path of the identity directory file (users + session tokens).
/// `MEDILINK_DIRECTORY` overrides; otherwise `<data_dir>/directory.json`.
pub fn directory_file() -> PathBuf {
    if let Ok(path) = std::env::var("MEDILINK_DIRECTORY") {
        return PathBuf::from(path);
    }
    data_dir().join("directory.json")
}

/// Bind address, `MEDILINK_ADDR` override.
pub fn bind_addr() -> SocketAddr {
    std::env::var("MEDILINK_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| DEFAULT_ADDR.parse().expect("default addr is valid"))
}

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_addr_parses() {
        let addr: SocketAddr = DEFAULT_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8700);
    }

    #[test]
    fn directory_file_under_data_dir_by_default() {
        if std::env::var("MEDILINK_DIRECTORY").is_err()
            && std::env::var("MEDILINK_DATA_DIR").is_err()
        {
            assert!(directory_file().starts_with(data_dir()));
        }
    }

    #[test]
    fn app_name_is_medilink() {
        assert_eq!(APP_NAME, "Medilink");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
