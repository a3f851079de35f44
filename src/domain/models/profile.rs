use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_DISPLAY_NAME: &str = "Researcher";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    /// Accrued simulated compute time, in seconds.
    #[serde(default)]
    pub estimated_gpu_usage: f64,
}

impl Default for Profile {
    fn default() -> Profile {
        return Profile {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            estimated_gpu_usage: 0.0,
        };
    }
}

pub fn format_gpu_time(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{seconds:.0} sec");
    }
    if seconds < 3600.0 {
        return format!("{:.1} min", seconds / 60.0);
    }

    return format!("{:.2} hrs", seconds / 3600.0);
}
