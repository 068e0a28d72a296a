use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "halfpace";

/// Where the config and log files live.
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}_config.json")))
    }

    /// Default home of the yearly result files.
    pub fn dataset_dir() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join("results"))
            .unwrap_or_else(|| PathBuf::from("results"))
    }

    /// `~/.local/state/halfpace` on Linux, the local data dir elsewhere.
    pub fn log_path() -> PathBuf {
        let dir = Self::project().map(|pd| {
            pd.state_dir()
                .unwrap_or_else(|| pd.data_local_dir())
                .to_path_buf()
        });
        match dir {
            Some(dir) => dir.join(format!("{APP_NAME}.log")),
            None => PathBuf::from(format!("{APP_NAME}.log")),
        }
    }
}
