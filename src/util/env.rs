//! Process environment configuration, read once at startup.
//!
//! Variables are looked up after `dotenvy` has merged any `.env` file into
//! the environment, so local development and deployed configuration share
//! one code path.

use chrono::NaiveTime;
use thiserror::Error;

use crate::constants::{
    DEFAULT_FIRE_HOUR, DEFAULT_FIRE_MINUTE, DEFAULT_FIRE_SECOND, FIRE_TIME_FORMAT,
};

#[derive(Debug, Error)]
pub enum EnvErr {
    #[error("missing required environment variable '{0}'")]
    Missing(&'static str),

    #[error("environment variable '{var}' holds an unparseable value: {value}")]
    Invalid { var: &'static str, value: String },
}

pub type EnvResult<T> = core::result::Result<T, EnvErr>;

#[derive(Debug, Clone)]
pub struct Env {
    pub discord_token: String,
    /// `0` means unset; validated at send time, not here.
    pub check_in_channel_id: u64,
    /// Daily fire time-of-day, UTC.
    pub check_in_time: NaiveTime,
}

impl Env {
    pub fn new() -> EnvResult<Self> {
        let discord_token =
            std::env::var("DISCORD_TOKEN").map_err(|_| EnvErr::Missing("DISCORD_TOKEN"))?;

        let check_in_channel_id = match std::env::var("CHECK_IN_CHANNEL_ID") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| EnvErr::Invalid {
                var: "CHECK_IN_CHANNEL_ID",
                value: raw,
            })?,
            Err(_) => 0,
        };

        let check_in_time = match std::env::var("CHECK_IN_TIME") {
            Ok(raw) => NaiveTime::parse_from_str(&raw, FIRE_TIME_FORMAT).map_err(|_| {
                EnvErr::Invalid {
                    var: "CHECK_IN_TIME",
                    value: raw,
                }
            })?,
            Err(_) => default_fire_time(),
        };

        Ok(Self {
            discord_token,
            check_in_channel_id,
            check_in_time,
        })
    }
}

pub fn default_fire_time() -> NaiveTime {
    // constants are in range, construction cannot fail
    NaiveTime::from_hms_opt(DEFAULT_FIRE_HOUR, DEFAULT_FIRE_MINUTE, DEFAULT_FIRE_SECOND)
        .unwrap_or_default()
}
