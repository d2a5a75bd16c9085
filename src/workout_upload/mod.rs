use crate::common::config::Config;
use crate::common::lionheart_client::{LionheartClient, LionheartProfile, LionheartSession, SessionQuery};
use crate::common::strava_client::{StravaClient, StravaCredentials, UploadResponse};
use std::path::{Path, PathBuf};

mod description;
mod run;

pub use description::{activity_description, activity_title};

/// How a successful run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The activity was accepted by Strava.
    Uploaded(UploadResponse),
    /// The TCX file was written but uploading was disabled.
    DryRun {
        session: Box<LionheartSession>,
        profile: Option<Box<LionheartProfile>>,
    },
}

/// One end-to-end run: fetch, render, save and (unless dry run) upload.
pub struct WorkoutUpload {
    lionheart_client: LionheartClient,
    strava_client: StravaClient,
    credentials: StravaCredentials,
    session_query: SessionQuery,
    output_path: PathBuf,
    dry_run: bool,
}

impl WorkoutUpload {
    pub fn new(
        lionheart_client: LionheartClient,
        strava_client: StravaClient,
        credentials: StravaCredentials,
        session_query: SessionQuery,
        output_path: &Path,
        dry_run: bool,
    ) -> Self {
        Self {
            lionheart_client,
            strava_client,
            credentials,
            session_query,
            output_path: output_path.to_path_buf(),
            dry_run,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let lionheart_client = match &config.lionheart_api_url {
            Some(url) => LionheartClient::with_endpoint(url.as_str())?,
            None => LionheartClient::new()?,
        };
        let strava_client = match &config.strava_api_url {
            Some(url) => StravaClient::with_endpoint(url.as_str())?,
            None => StravaClient::new()?,
        };

        Ok(Self::new(
            lionheart_client,
            strava_client,
            config.credentials.clone(),
            config.session.clone(),
            &config.output_path,
            config.dry_run,
        ))
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
