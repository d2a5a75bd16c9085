use crate::common::lionheart_client::SessionQuery;
use crate::common::strava_client::StravaCredentials;
use clap::Parser;
use std::path::PathBuf;

pub const STRAVA_CLIENT_ID: &str = "STRAVA_CLIENT_ID";
pub const STRAVA_CLIENT_SECRET: &str = "STRAVA_CLIENT_SECRET";
pub const STRAVA_REFRESH_TOKEN: &str = "STRAVA_REFRESH_TOKEN";
pub const F45_STUDIO_CODE: &str = "F45_STUDIO_CODE";
pub const F45_USER_ID: &str = "F45_USER_ID";
pub const F45_LIONHEART_SERIAL_NUMBER: &str = "F45_LIONHEART_SERIAL_NUMBER";
pub const F45_CLASS_DATE: &str = "F45_CLASS_DATE";
pub const F45_CLASS_TIME: &str = "F45_CLASS_TIME";
pub const DRY_RUN: &str = "DRY_RUN";
pub const LIONHEART_API_URL: &str = "LIONHEART_API_URL";
pub const STRAVA_API_URL: &str = "STRAVA_API_URL";

pub const DEFAULT_OUTPUT_PATH: &str = "workout.tcx";

/// Upload an F45 Lionheart class session to Strava as a TCX activity.
///
/// Every setting can also come from a GitHub Actions input (`INPUT_<NAME>`)
/// or a plain environment variable (`<NAME>`), in that order of precedence
/// after the command line.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// Strava API client ID
    #[arg(long)]
    pub strava_client_id: Option<String>,
    /// Strava API client secret
    #[arg(long)]
    pub strava_client_secret: Option<String>,
    /// Strava refresh token with activity:write scope
    #[arg(long)]
    pub strava_refresh_token: Option<String>,
    /// F45 studio code
    #[arg(long)]
    pub studio_code: Option<String>,
    /// F45 user ID
    #[arg(long)]
    pub user_id: Option<String>,
    /// Lionheart heart rate monitor serial number
    #[arg(long)]
    pub serial_number: Option<String>,
    /// Class date, e.g. 2024-05-01
    #[arg(long)]
    pub class_date: Option<String>,
    /// Class start time, e.g. 18:30
    #[arg(long)]
    pub class_time: Option<String>,
    /// Generate the TCX file without uploading it
    #[arg(long)]
    pub dry_run: bool,
    /// Where to write the TCX file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Override the Lionheart API base URL
    #[arg(long)]
    pub lionheart_api_url: Option<String>,
    /// Override the Strava API base URL
    #[arg(long)]
    pub strava_api_url: Option<String>,
    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: StravaCredentials,
    pub session: SessionQuery,
    pub dry_run: bool,
    pub output_path: PathBuf,
    pub lionheart_api_url: Option<String>,
    pub strava_api_url: Option<String>,
}

impl Config {
    /// Resolves settings from the command line and the process environment.
    pub fn from_args(args: &Args) -> Self {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Resolves each setting from the first non-empty of: flag, `INPUT_<NAME>`, `<NAME>`.
    pub fn resolve<F>(args: &Args, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |flag: &Option<String>, name: &str| -> Option<String> {
            non_empty(flag.clone())
                .or_else(|| non_empty(env(&format!("INPUT_{name}"))))
                .or_else(|| non_empty(env(name)))
        };

        let dry_run = args.dry_run
            || setting(&None, DRY_RUN).is_some_and(|value| value.eq_ignore_ascii_case("true"));

        Self {
            credentials: StravaCredentials {
                client_id: setting(&args.strava_client_id, STRAVA_CLIENT_ID),
                client_secret: setting(&args.strava_client_secret, STRAVA_CLIENT_SECRET),
                refresh_token: setting(&args.strava_refresh_token, STRAVA_REFRESH_TOKEN),
            },
            session: SessionQuery {
                class_date: setting(&args.class_date, F45_CLASS_DATE).unwrap_or_default(),
                class_time: setting(&args.class_time, F45_CLASS_TIME).unwrap_or_default(),
                studio_code: setting(&args.studio_code, F45_STUDIO_CODE).unwrap_or_default(),
                serial_number: setting(&args.serial_number, F45_LIONHEART_SERIAL_NUMBER)
                    .unwrap_or_default(),
                user_id: setting(&args.user_id, F45_USER_ID).unwrap_or_default(),
            },
            dry_run,
            output_path: args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            lionheart_api_url: setting(&args.lionheart_api_url, LIONHEART_API_URL),
            strava_api_url: setting(&args.strava_api_url, STRAVA_API_URL),
        }
    }

    /// Names of session settings that resolved to nothing.
    pub fn missing_session_settings(&self) -> Vec<&'static str> {
        let session = &self.session;
        [
            (F45_CLASS_DATE, &session.class_date),
            (F45_CLASS_TIME, &session.class_time),
            (F45_STUDIO_CODE, &session.studio_code),
            (F45_LIONHEART_SERIAL_NUMBER, &session.serial_number),
            (F45_USER_ID, &session.user_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
