use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoasterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required secret: {name} (set {env} or [{section}] in the config file)")]
    MissingSecret {
        name: &'static str,
        env: &'static str,
        section: &'static str,
    },
}

impl RoasterError {
    /// Short error code string used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            RoasterError::Config(_) => "CONFIG_ERROR",
            RoasterError::MissingSecret { .. } => "MISSING_SECRET",
        }
    }
}

pub type Result<T> = std::result::Result<T, RoasterError>;
