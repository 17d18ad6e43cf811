use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scheduling policy knobs shared by the validator, the slot generator and the
/// weekly staffing audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    pub weekly_hour_ceiling: f64,
    pub monthly_hour_ceiling: Option<f64>,
    /// The staffing audit only evaluates its rules once the roster has at
    /// least this many people.
    pub min_audit_roster_size: usize,
    pub required_weekly_shifts: usize,
    pub default_slot_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            weekly_hour_ceiling: 52.0,
            monthly_hour_ceiling: None,
            min_audit_roster_size: 4,
            required_weekly_shifts: 6,
            default_slot_minutes: 30,
        }
    }
}

impl SchedulingPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            weekly_hour_ceiling: parse_or("WEEKLY_HOUR_CEILING", defaults.weekly_hour_ceiling),
            monthly_hour_ceiling: match env::var("MONTHLY_HOUR_CEILING") {
                Ok(raw) => match raw.parse::<f64>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("MONTHLY_HOUR_CEILING is not a number ({}), monthly ceiling disabled", raw);
                        None
                    }
                },
                Err(_) => None,
            },
            min_audit_roster_size: parse_or("STAFFING_MIN_ROSTER_SIZE", defaults.min_audit_roster_size),
            required_weekly_shifts: parse_or("STAFFING_REQUIRED_SHIFTS", defaults.required_weekly_shifts),
            default_slot_minutes: parse_or("DEFAULT_SLOT_MINUTES", defaults.default_slot_minutes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub server_port: u16,
    pub scheduling: SchedulingPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            server_port: parse_or("SERVER_PORT", 3000),
            scheduling: SchedulingPolicy::from_env(),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - schedules will be kept in memory");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value ({}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
