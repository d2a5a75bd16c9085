use super::{RunOutcome, WorkoutUpload, activity_description, activity_title};
use crate::common::metrics;
use crate::common::strava_client::{TCX_DATA_TYPE, UploadParameters};
use crate::common::types::{PipelineError, PipelineResult};
use crate::tcx::{TcxDocument, generate_tcx};
use function_timer::time;
use tracing::{info, warn};

impl WorkoutUpload {
    #[time("workout_upload_duration")]
    pub async fn run(&self) -> PipelineResult<RunOutcome> {
        // Phase 1: the three reads are independent
        let (token, session, profile) = tokio::join!(
            self.strava_client.exchange_refresh_token(&self.credentials),
            self.lionheart_client.fetch_session(&self.session_query),
            self.lionheart_client.fetch_profile(&self.session_query.user_id),
        );

        if let Err(e) = &token {
            warn!("No Strava access token, upload will not be possible: {}", e);
        }

        let Some(session) = session else {
            return Err(PipelineError::SessionUnavailable);
        };

        if profile.is_none() {
            info!("No profile summary available, using a short description");
        }

        // Phase 2: render and save
        let document = generate_tcx(&session)?;
        metrics::set_trackpoint_count(document.trackpoints as u64);
        info!(
            "Generated TCX for session {} with {} trackpoints",
            session.data.session_id, document.trackpoints
        );

        self.save_tcx(&document).await?;

        let points = session
            .data
            .summary
            .as_ref()
            .and_then(|summary| summary.points)
            .unwrap_or_default();
        let description = activity_description(points, profile.as_ref());

        if self.dry_run {
            info!("Workout data generated but not uploaded to Strava");
            return Ok(RunOutcome::DryRun {
                session: Box::new(session),
                profile: profile.map(Box::new),
            });
        }

        // Phase 3: upload the saved file
        let token = token?;
        let file = tokio::fs::read(&self.output_path)
            .await
            .map_err(|source| self.persistence_error(source))?;

        let params = UploadParameters {
            file,
            file_name: self.upload_file_name(),
            name: activity_title(&session),
            description,
            data_type: TCX_DATA_TYPE.to_string(),
            trainer: None,
            commute: None,
            external_id: None,
        };

        let response = self.strava_client.upload(&token, params).await?;
        info!("Workout uploaded to Strava");

        Ok(RunOutcome::Uploaded(response))
    }

    async fn save_tcx(&self, document: &TcxDocument) -> PipelineResult<()> {
        tokio::fs::write(&self.output_path, document.as_bytes())
            .await
            .map_err(|source| self.persistence_error(source))?;

        info!("Saved TCX file to {}", self.output_path.display());
        Ok(())
    }

    fn persistence_error(&self, source: std::io::Error) -> PipelineError {
        PipelineError::Persistence {
            path: self.output_path.display().to_string(),
            source,
        }
    }

    fn upload_file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workout.tcx".to_string())
    }
}
