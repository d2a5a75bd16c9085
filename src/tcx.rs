//! Training Center XML (TCX) rendering of a Lionheart class session.
//!
//! The document holds a single activity with one lap spanning the whole
//! class and a flat track of per-minute heart-rate samples. Rendering is a
//! pure function of the session: identical input yields identical bytes.

use crate::common::lionheart_client::LionheartSession;
use crate::common::types::{PipelineError, PipelineResult};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

const TCX_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

/// Strava's activity form does not tell F45 class types apart, so every
/// session is filed under one sport.
pub const ACTIVITY_SPORT: &str = "AlpineSki";

const LAP_INTENSITY: &str = "Active";
const LAP_TRIGGER_METHOD: &str = "Manual";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcxDocument {
    pub xml: String,
    pub trackpoints: usize,
}

impl TcxDocument {
    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }
}

/// Renders a session as a TCX document.
///
/// Fails when the session lacks any field the document needs (class start and
/// duration, calories, heart-rate summary, the time series or a usable
/// sample's minute) or when a time is out of range. There is no partial output.
pub fn generate_tcx(session: &LionheartSession) -> PipelineResult<TcxDocument> {
    let data = &session.data;
    let class_info = data
        .class_info
        .as_ref()
        .ok_or_else(|| missing_field("classInfo"))?;
    let summary = data.summary.as_ref().ok_or_else(|| missing_field("summary"))?;
    let graph = data.graph.as_ref().ok_or_else(|| missing_field("graph"))?;

    let timestamp = class_info
        .timestamp
        .ok_or_else(|| missing_field("classInfo.timestamp"))?;
    let duration_in_minutes = class_info
        .duration_in_minutes
        .ok_or_else(|| missing_field("classInfo.durationInMinutes"))?;
    let calories = summary
        .estimated_calories
        .ok_or_else(|| missing_field("summary.estimatedCalories"))?;
    let heartrate = summary
        .heartrate
        .as_ref()
        .ok_or_else(|| missing_field("summary.heartrate"))?;
    let average_bpm = heartrate
        .average
        .ok_or_else(|| missing_field("summary.heartrate.average"))?;
    let max_bpm = heartrate
        .max
        .ok_or_else(|| missing_field("summary.heartrate.max"))?;
    let time_series = graph
        .time_series
        .as_ref()
        .ok_or_else(|| missing_field("graph.timeSeries"))?;

    let start_time = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        PipelineError::DocumentGeneration(format!("class timestamp {timestamp} is out of range"))
    })?;
    let start = iso_timestamp(start_time);
    let total_seconds = u64::from(duration_in_minutes) * 60;

    let mut tcx = TcxWriter::new();
    tcx.declaration()?;
    tcx.start("TrainingCenterDatabase", &[("xmlns", TCX_NAMESPACE)])?;
    tcx.start("Activities", &[])?;
    tcx.start("Activity", &[("Sport", ACTIVITY_SPORT)])?;
    tcx.text_element("Id", &start)?;

    tcx.start("Lap", &[("StartTime", &start)])?;
    tcx.text_element("TotalTimeSeconds", &total_seconds.to_string())?;
    tcx.text_element("DistanceMeters", "0")?;
    tcx.text_element("Calories", &calories.to_string())?;
    tcx.value_element("AverageHeartRateBpm", &average_bpm.to_string())?;
    tcx.value_element("MaximumHeartRateBpm", &max_bpm.to_string())?;
    tcx.text_element("Intensity", LAP_INTENSITY)?;
    tcx.text_element("TriggerMethod", LAP_TRIGGER_METHOD)?;

    tcx.start("Track", &[])?;
    let mut trackpoints = 0;
    for sample in time_series {
        // Only the peak of each minute is kept.
        let Some(bpm) = sample.recorded_max_bpm() else {
            continue;
        };
        let minute = sample
            .minute
            .ok_or_else(|| missing_field("graph.timeSeries.minute"))?;
        let time = start_time
            .checked_add_signed(TimeDelta::minutes(i64::from(minute)))
            .ok_or_else(|| {
                PipelineError::DocumentGeneration(format!(
                    "sample minute {minute} is out of range"
                ))
            })?;

        tcx.start("Trackpoint", &[])?;
        tcx.text_element("Time", &iso_timestamp(time))?;
        tcx.value_element("HeartRateBpm", &bpm.to_string())?;
        tcx.end("Trackpoint")?;
        trackpoints += 1;
    }
    tcx.end("Track")?;

    tcx.end("Lap")?;
    tcx.end("Activity")?;
    tcx.end("Activities")?;
    tcx.end("TrainingCenterDatabase")?;

    Ok(TcxDocument {
        xml: tcx.finish()?,
        trackpoints,
    })
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T08:30:00.000Z`.
fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn missing_field(field: &str) -> PipelineError {
    PipelineError::DocumentGeneration(format!("session is missing `{field}`"))
}

struct TcxWriter {
    writer: Writer<Vec<u8>>,
}

impl TcxWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> PipelineResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| PipelineError::DocumentGeneration(e.to_string()))
    }

    fn declaration(&mut self) -> PipelineResult<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", None, None)))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> PipelineResult<()> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> PipelineResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> PipelineResult<()> {
        self.start(name, &[])?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<name><Value>text</Value></name>`, the TCX shape for heart-rate fields.
    fn value_element(&mut self, name: &str, text: &str) -> PipelineResult<()> {
        self.start(name, &[])?;
        self.text_element("Value", text)?;
        self.end(name)
    }

    fn finish(self) -> PipelineResult<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| PipelineError::DocumentGeneration(e.to_string()))
    }
}
