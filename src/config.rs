use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// Which settings profile to load. Selected by `APP_SETTINGS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Testing,
    Production,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    // Accepts plain names and dotted class paths such as
    // `project.server.config.DevelopmentConfig`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.rsplit('.').next().unwrap_or(s).to_ascii_lowercase();
        match name.trim_end_matches("config") {
            "development" | "dev" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(anyhow!("unknown settings profile: {}", s)),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Testing => f.write_str("testing"),
            Self::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub rounds: u32,
    pub memory_kib: u32,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub profile: Profile,
    pub database_url: String,
    pub secret_key: String,
    pub hash_cost: HashCost,
    pub bind_addr: String,
    pub session_ttl: Duration,
    pub debug: bool,
}

pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const DEV_SECRET: &str = "my_precious";

impl Settings {
    pub fn development() -> Self {
        Self {
            profile: Profile::Development,
            database_url: "dev.sqlite".to_string(),
            secret_key: DEV_SECRET.to_string(),
            hash_cost: HashCost { rounds: 2, memory_kib: 19 * 1024 },
            bind_addr: "127.0.0.1:8080".to_string(),
            session_ttl: Duration::from_secs(60 * 60),
            debug: true,
        }
    }

    pub fn testing() -> Self {
        Self {
            profile: Profile::Testing,
            database_url: ":memory:".to_string(),
            secret_key: DEV_SECRET.to_string(),
            hash_cost: HashCost { rounds: 1, memory_kib: 1024 },
            bind_addr: "127.0.0.1:0".to_string(),
            session_ttl: Duration::from_secs(5 * 60),
            debug: false,
        }
    }

    pub fn production() -> Self {
        Self {
            profile: Profile::Production,
            database_url: "medilog.sqlite".to_string(),
            secret_key: String::new(),
            hash_cost: HashCost { rounds: 3, memory_kib: 64 * 1024 },
            bind_addr: "0.0.0.0:8080".to_string(),
            session_ttl: Duration::from_secs(15 * 60),
            debug: false,
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Development => Self::development(),
            Profile::Testing => Self::testing(),
            Profile::Production => Self::production(),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "medilog=debug,info"
        } else {
            "info"
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("APP_SETTINGS") {
            Some(name) => name.parse()?,
            None => Profile::Development,
        };
        let mut settings = Self::for_profile(profile);
        if let Some(url) = lookup("DATABASE_URL") {
            settings.database_url = url;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            settings.secret_key = secret;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            settings.bind_addr = addr;
        }
        if let Some(rounds) = lookup("HASH_ROUNDS") {
            settings.hash_cost.rounds = rounds
                .parse()
                .with_context(|| format!("HASH_ROUNDS is not a number: {}", rounds))?;
        }
        if let Some(ttl) = lookup("SESSION_TTL_SECS") {
            let secs = ttl
                .parse()
                .with_context(|| format!("SESSION_TTL_SECS is not a number: {}", ttl))?;
            settings.session_ttl = Duration::from_secs(secs);
        }
        if settings.session_ttl.is_zero() || settings.session_ttl > MAX_SESSION_TTL {
            return Err(anyhow!(
                "SESSION_TTL_SECS must be between 1 and {}",
                MAX_SESSION_TTL.as_secs()
            ));
        }
        if settings.hash_cost.rounds == 0 {
            return Err(anyhow!("HASH_ROUNDS must be at least 1"));
        }
        if settings.profile == Profile::Production && settings.secret_key.is_empty() {
            return Err(anyhow!("SECRET_KEY must be set in production"));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_development() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.profile, Profile::Development);
        assert!(settings.debug);
    }

    #[test]
    fn accepts_dotted_profile_names() {
        let p: Profile = "project.server.config.TestingConfig".parse().unwrap();
        assert_eq!(p, Profile::Testing);
        assert!("staging".parse::<Profile>().is_err());
    }

    #[test]
    fn environment_overrides_profile_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("APP_SETTINGS", "testing"),
            ("DATABASE_URL", "other.sqlite"),
            ("HASH_ROUNDS", "4"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "other.sqlite");
        assert_eq!(settings.hash_cost.rounds, 4);
    }

    #[test]
    fn production_requires_secret() {
        assert!(Settings::from_lookup(lookup(&[("APP_SETTINGS", "production")])).is_err());
        let settings = Settings::from_lookup(lookup(&[
            ("APP_SETTINGS", "production"),
            ("SECRET_KEY", "s3cret"),
        ]))
        .unwrap();
        assert!(!settings.debug);
    }

    #[test]
    fn session_ttl_is_bounded() {
        let settings = Settings::from_lookup(lookup(&[("SESSION_TTL_SECS", "600")])).unwrap();
        assert_eq!(settings.session_ttl, Duration::from_secs(600));
        let max = MAX_SESSION_TTL.as_secs().to_string();
        assert!(Settings::from_lookup(lookup(&[("SESSION_TTL_SECS", max.as_str())])).is_ok());

        for bad in ["0", "100000000000000000", "18446744073709551615", "-1"] {
            assert!(
                Settings::from_lookup(lookup(&[("SESSION_TTL_SECS", bad)])).is_err(),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn debug_profiles_log_more() {
        let dev = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(dev.log_filter(), "medilog=debug,info");
        let test = Settings::from_lookup(lookup(&[("APP_SETTINGS", "testing")])).unwrap();
        assert_eq!(test.log_filter(), "info");
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(Settings::from_lookup(lookup(&[("HASH_ROUNDS", "many")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("HASH_ROUNDS", "0")])).is_err());
    }
}
