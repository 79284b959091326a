use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::gateway::ModuleStatus;

#[derive(Debug, Clone)]
pub struct CancelConfig {
    pub module_enabled: bool,
    pub order_service_url: String,
    pub locale: String,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for CancelConfig {
    fn default() -> Self {
        Self {
            module_enabled: true,
            order_service_url: "http://localhost:8084".to_string(),
            locale: "en_US".to_string(),
            request_timeout: Duration::from_secs(10),
            host: "0.0.0.0".to_string(),
            port: 8092,
        }
    }
}

impl CancelConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let module_enabled = match lookup("MUNDIPAGG_MODULE_ENABLED") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("MUNDIPAGG_MODULE_ENABLED has invalid value {value:?}"))?,
            None => defaults.module_enabled,
        };
        let order_service_url = lookup("ORDER_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.order_service_url);
        let locale = lookup("CANCEL_LOCALE").unwrap_or(defaults.locale);
        let timeout_secs = match lookup("ORDER_SERVICE_TIMEOUT_SECONDS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .context("ORDER_SERVICE_TIMEOUT_SECONDS must be a whole number of seconds")?,
            None => defaults.request_timeout.as_secs(),
        };
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().context("PORT must be a valid port number")?,
            None => defaults.port,
        };

        Ok(Self {
            module_enabled,
            order_service_url,
            locale,
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
            host,
            port,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().context("HOST must be an IP address")?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl ModuleStatus for CancelConfig {
    fn module_enabled(&self) -> bool {
        self.module_enabled
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("expected a boolean, got {other}")),
    }
}
