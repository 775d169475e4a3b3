//! Process configuration, from flags or `CAMPUS_EXPENSES_*` variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "campus-expenses", version, about = "Expense tracking service for college cost centers")]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "CAMPUS_EXPENSES_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// TOML file holding the login table.
    #[arg(
        long,
        env = "CAMPUS_EXPENSES_CREDENTIALS",
        default_value = "credentials.toml"
    )]
    pub credentials: PathBuf,

    /// How long a login stays valid without an explicit logout.
    #[arg(
        long,
        env = "CAMPUS_EXPENSES_SESSION_TTL_SECS",
        default_value_t = 8 * 60 * 60
    )]
    pub session_ttl_secs: u64,

    /// Unsigned upload endpoint for receipt images. Receipts are skipped
    /// when unset.
    #[arg(long, env = "CAMPUS_EXPENSES_IMAGE_UPLOAD_URL")]
    pub image_upload_url: Option<String>,

    /// Upload preset sent alongside each receipt.
    #[arg(
        long,
        env = "CAMPUS_EXPENSES_IMAGE_UPLOAD_PRESET",
        default_value = "expenses"
    )]
    pub image_upload_preset: String,
}

impl Config {
    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.session_ttl_secs).unwrap_or(i64::MAX))
    }

    /// Sweep often enough that short TTLs are honored promptly, but never
    /// more than once a second.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_secs.clamp(1, 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::try_parse_from(["campus-expenses"]).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.credentials, PathBuf::from("credentials.toml"));
        assert_eq!(config.session_ttl_secs, 8 * 60 * 60);
        assert_eq!(config.image_upload_url, None);
        assert_eq!(config.image_upload_preset, "expenses");
    }

    #[test]
    fn session_ttl_converts_to_signed_duration() {
        let config = Config::try_parse_from([
            "campus-expenses",
            "--session-ttl-secs",
            "90",
        ])
        .unwrap();
        assert_eq!(config.session_ttl(), time::Duration::seconds(90));
        assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(60));
    }

    #[test]
    fn sweep_interval_tracks_short_ttls() {
        let config =
            Config::try_parse_from(["campus-expenses", "--session-ttl-secs", "5"]).unwrap();
        assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(5));
    }
}
