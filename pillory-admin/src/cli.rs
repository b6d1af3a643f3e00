use std::time::Duration;

pub(crate) fn args() -> Args {
    <Args as clap::Parser>::parse()
}

/// Manage Pillory administrators and the avatar cache.
#[derive(Debug, clap::Parser)]
#[command(name = "pillory-admin", version)]
pub(crate) enum Args {
    /// Create a new administrator
    #[clap(name = "create")]
    Create {
        username: String,
        password: String,
        email: String,

        /// Grant super admin rights
        #[arg(long)]
        super_admin: bool,
    },

    /// List every administrator
    #[clap(name = "list")]
    List,

    /// Permanently delete an administrator
    #[clap(name = "delete")]
    Delete { username: String },

    /// Set a new password for an administrator
    #[clap(name = "password")]
    Password {
        username: String,
        new_password: String,
    },

    /// Remove cached avatar images
    #[clap(name = "clear-cache")]
    ClearCache {
        /// Only remove images older than this many hours
        #[arg(long)]
        older_than_hours: Option<u64>,
    },
}

pub(crate) fn hours(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_create_with_flag() {
        let args = Args::try_parse_from([
            "pillory-admin",
            "create",
            "root",
            "secret1",
            "root@example.com",
            "--super-admin",
        ])
        .unwrap();

        match args {
            Args::Create { username, password, email, super_admin } => {
                assert_eq!(username, "root");
                assert_eq!(password, "secret1");
                assert_eq!(email, "root@example.com");
                assert!(super_admin);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_requires_all_positionals() {
        assert!(Args::try_parse_from(["pillory-admin", "create", "root", "secret1"]).is_err());
    }

    #[test]
    fn parses_clear_cache_bound() {
        let args =
            Args::try_parse_from(["pillory-admin", "clear-cache", "--older-than-hours", "48"]).unwrap();
        assert!(matches!(args, Args::ClearCache { older_than_hours: Some(48) }));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Args::try_parse_from(["pillory-admin", "promote", "root"]).is_err());
    }

    #[test]
    fn hours_to_duration() {
        assert_eq!(hours(2), Duration::from_secs(7200));
        assert_eq!(hours(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
