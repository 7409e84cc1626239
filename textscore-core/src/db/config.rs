use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

use crate::Error;

/// Connection settings. `url`, when set, wins over the individual parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "textscore".to_string(),
            password: String::new(),
            database: "textscore".to_string(),
            max_connections: 5,
        }
    }
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..Self::default() }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, Error> {
        if let Some(url) = &self.url {
            return Ok(PgConnectOptions::from_str(url)?);
        }

        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if !self.password.is_empty() {
            opts = opts.password(&self.password);
        }
        Ok(opts)
    }

    /// Target for log lines, without the password.
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) => redact_url(url),
            None => format!("postgres://{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }
}

fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{}://{}@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
