use crate::common::metrics;
use crate::common::types::FetchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const ENDPOINT: &str = "https://api.lionheart.f45.com/v3";

/// Sample type marking a minute that carries a recorded heart rate.
pub const RECORDED_BPM: &str = "recordedBpm";

// Session API types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LionheartSession {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub success: bool,
    pub data: SessionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub session_id: String,
    pub version: Option<SessionVersion>,
    pub studio: Studio,
    pub workout: Workout,
    // Optional on the wire so a malformed session fails in TCX generation
    // rather than being reported as missing.
    pub class_info: Option<ClassInfo>,
    pub summary: Option<SessionSummary>,
    pub heartrate: Option<HeartRateConfig>,
    pub graph: Option<Graph>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionVersion {
    pub tag: Option<String>,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    #[serde(default)]
    pub studio_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type")]
    pub workout_type: Option<WorkoutType>,
    pub logo: Option<WorkoutLogo>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutType {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutLogo {
    pub url: Option<String>,
    pub dimensions: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

// Fields read by TCX generation are optional so their absence is reported
// by the generator instead of failing the fetch.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassInfo {
    pub localized_date_time: String,
    pub date: String,
    pub time: String,
    /// Class start, seconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub timezone: String,
    pub duration_in_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSummary {
    pub points: Option<f64>,
    pub heartrate: Option<HeartRateSummary>,
    pub estimated_calories: Option<f64>,
    pub tracked_duration_in_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateSummary {
    pub average: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartRateConfig {
    pub calculation_method: Option<CalculationMethod>,
    pub inputs: Option<HeartRateInputs>,
    pub zones: Vec<HeartRateZone>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationMethod {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateInputs {
    #[serde(rename = "maxHR")]
    pub max_hr: Option<HeartRateInput>,
    #[serde(rename = "restingHR")]
    pub resting_hr: Option<HeartRateInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateInput {
    pub default: Option<f64>,
    #[serde(rename = "override")]
    pub override_value: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartRateZone {
    pub zone_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub min_percentage: Option<f64>,
    pub max_percentage: Option<f64>,
    pub min_bpm: Option<f64>,
    pub max_bpm: Option<f64>,
    pub bpm_label: Option<String>,
    pub computed_duration: Option<ComputedDuration>,
    pub computed_percentage: Option<ComputedPercentage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedDuration {
    pub seconds: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedPercentage {
    pub value: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Graph {
    #[serde(rename = "type")]
    pub graph_type: String,
    pub time_series: Option<Vec<TimeSeriesSample>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesSample {
    /// Offset from class start.
    pub minute: Option<u32>,
    #[serde(rename = "type")]
    pub sample_type: String,
    pub bpm: Option<BpmRange>,
}

impl TimeSeriesSample {
    /// Peak bpm of this minute, if it is a recorded heart-rate sample with a range.
    pub fn recorded_max_bpm(&self) -> Option<f64> {
        if self.sample_type == RECORDED_BPM {
            self.bpm.as_ref().and_then(|bpm| bpm.max)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BpmRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

// Profile API types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LionheartProfile {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub success: bool,
    pub data: ProfileData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    pub summary: ProfileSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub all_time: Option<TimeframeSummary>,
    pub year: Option<TimeframeSummary>,
    pub quarter: Option<TimeframeSummary>,
    pub month: Option<TimeframeSummary>,
    pub week: Option<TimeframeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeSummary {
    pub timeframe: Option<Timeframe>,
    pub session_count: u32,
    pub average_points: f64,
    pub average_calories: f64,
    pub max_points: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeframe {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub number_of_days: Option<u32>,
}

/// Identifies one class session on the Lionheart API.
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    pub class_date: String,
    pub class_time: String,
    pub studio_code: String,
    pub serial_number: String,
    pub user_id: String,
}

impl SessionQuery {
    /// Path key of the session resource: `{date}_{time}:studio:{code}:serial:{serial}`.
    /// The first colon of the class time is dropped, so `18:30` becomes `1830`.
    pub fn session_key(&self) -> String {
        let class_time = self.class_time.replacen(':', "", 1);
        format!(
            "{}_{}:studio:{}:serial:{}",
            encode_path_component(&self.class_date),
            encode_path_component(&class_time),
            encode_path_component(&self.studio_code),
            encode_path_component(&self.serial_number),
        )
    }
}

/// Percent-encodes a path component, leaving `:` as is since it is legal in a path segment.
fn encode_path_component(value: &str) -> String {
    urlencoding::encode(value).replace("%3A", ":")
}

pub struct LionheartClient {
    client: reqwest::Client,
    endpoint: String,
}

impl LionheartClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, super::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one class session. Any failure is logged and reported as `None`.
    pub async fn fetch_session(&self, query: &SessionQuery) -> Option<LionheartSession> {
        match self.try_fetch_session(query).await {
            Ok(session) => {
                metrics::increment_lionheart_api_success();
                Some(session)
            }
            Err(e) => {
                metrics::increment_lionheart_api_failure();
                error!("Failed to fetch data from Lionheart Session API: {}", e);
                None
            }
        }
    }

    /// Fetches the user's summary statistics. Any failure is logged and reported as `None`.
    pub async fn fetch_profile(&self, user_id: &str) -> Option<LionheartProfile> {
        match self.try_fetch_profile(user_id).await {
            Ok(profile) => {
                metrics::increment_lionheart_api_success();
                Some(profile)
            }
            Err(e) => {
                metrics::increment_lionheart_api_failure();
                error!("Failed to fetch data from Lionheart Profile API: {}", e);
                None
            }
        }
    }

    pub async fn try_fetch_session(
        &self,
        query: &SessionQuery,
    ) -> Result<LionheartSession, FetchError> {
        let path = format!("{}/sessions/{}", self.endpoint, query.session_key());
        self.get_json(&path, &query.user_id).await
    }

    pub async fn try_fetch_profile(&self, user_id: &str) -> Result<LionheartProfile, FetchError> {
        let path = format!("{}/profile/sessions/summary", self.endpoint);
        self.get_json(&path, user_id).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, user_id: &str) -> Result<T, FetchError> {
        debug!("GET {}", path);

        let response = self
            .client
            .get(path)
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
