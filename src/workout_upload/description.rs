use crate::common::lionheart_client::{LionheartProfile, LionheartSession};

/// Strava activity name: `"<studio> - <workout>"`.
pub fn activity_title(session: &LionheartSession) -> String {
    format!("{} - {}", session.data.studio.name, session.data.workout.name)
}

/// Strava activity description.
///
/// With an all-time profile summary this is four lines comparing the class
/// to the athlete's history; otherwise just the class points.
pub fn activity_description(points: f64, profile: Option<&LionheartProfile>) -> String {
    match profile.and_then(|p| p.data.summary.all_time.as_ref()) {
        Some(all_time) => format!(
            "🥊 Average Score: {}\n🥇 Current Class: {}\n💥 Max Score: {}\n🦁 Sessions: {}",
            all_time.average_points, points, all_time.max_points, all_time.session_count
        ),
        None => format!("{points} 🏆"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> LionheartProfile {
        serde_json::from_value(json!({
            "status": 200,
            "success": true,
            "data": {
                "summary": {
                    "allTime": {
                        "timeframe": {"id": 1, "name": "All Time", "numberOfDays": null},
                        "sessionCount": 212,
                        "averagePoints": 38.5,
                        "averageCalories": 602,
                        "maxPoints": 77
                    },
                    "week": {
                        "timeframe": {"id": 5, "name": "Week", "numberOfDays": 7},
                        "sessionCount": 3,
                        "averagePoints": 44,
                        "averageCalories": 650,
                        "maxPoints": 51
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_description_without_profile() {
        assert_eq!(activity_description(42.0, None), "42 🏆");
    }

    #[test]
    fn test_description_with_profile() {
        let description = activity_description(42.0, Some(&profile()));
        let lines: Vec<&str> = description.lines().collect();

        assert_eq!(
            lines,
            vec![
                "🥊 Average Score: 38.5",
                "🥇 Current Class: 42",
                "💥 Max Score: 77",
                "🦁 Sessions: 212",
            ]
        );
    }

    #[test]
    fn test_description_falls_back_without_all_time_summary() {
        let mut profile = profile();
        profile.data.summary.all_time = None;

        assert_eq!(activity_description(35.0, Some(&profile)), "35 🏆");
    }

    #[test]
    fn test_title() {
        let session: LionheartSession = serde_json::from_value(json!({
            "data": {
                "sessionId": "s-1",
                "studio": {"name": "F45 Bondi"},
                "workout": {"name": "Panthers"}
            }
        }))
        .unwrap();

        assert_eq!(activity_title(&session), "F45 Bondi - Panthers");
    }
}
