pub mod common;
pub mod tcx;
pub mod workout_upload;

pub use workout_upload::{RunOutcome, WorkoutUpload};
