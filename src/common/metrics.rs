use metrics::{counter, gauge};

/// Error/Reliability Metrics - Success/Failure pairs
pub fn increment_lionheart_api_success() {
    counter!("lionheart_api_total", "result" => "success").increment(1);
}

pub fn increment_lionheart_api_failure() {
    counter!("lionheart_api_total", "result" => "failure").increment(1);
}

pub fn increment_strava_api_success() {
    counter!("strava_api_total", "result" => "success").increment(1);
}

pub fn increment_strava_api_failure() {
    counter!("strava_api_total", "result" => "failure").increment(1);
}

pub fn increment_strava_upload_success() {
    counter!("strava_upload_total", "result" => "success").increment(1);
}

pub fn increment_strava_upload_failure() {
    counter!("strava_upload_total", "result" => "failure").increment(1);
}

/// Business Logic Metrics
pub fn set_trackpoint_count(count: u64) {
    gauge!("tcx_trackpoint_count").set(count as f64);
}
