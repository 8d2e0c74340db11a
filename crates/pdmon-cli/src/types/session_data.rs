use std::path::PathBuf;

/// A recorded session on disk
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Path to the IMU CSV file
    pub imu_file: PathBuf,
    /// Optional YAML configuration used for the replay
    pub config_file: Option<PathBuf>,
    /// Session name (derived from the IMU filename)
    pub name: String,
}

impl SessionData {
    pub fn new(imu_file: PathBuf, config_file: Option<PathBuf>) -> Self {
        let name = imu_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed_session")
            .to_string();

        Self {
            imu_file,
            config_file,
            name,
        }
    }

    pub fn has_config(&self) -> bool {
        self.config_file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_comes_from_file_stem() {
        let session = SessionData::new(PathBuf::from("/data/walk_03.csv"), None);
        assert_eq!(session.name, "walk_03");
        assert!(!session.has_config());
    }
}
