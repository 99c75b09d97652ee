/// Dashboard failure taxonomy. None of these are fatal: network failures
/// collapse to empty results at the call site, rendering failures surface
/// as a message while the partial chart is disposed, validation failures
/// stay inline next to the control that raised them.
#[derive(Debug, Clone)]
pub enum DashboardError {
    NetworkError(String),
    RenderingError(String),
    ValidationError(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::NetworkError(msg) => write!(f, "network: {}", msg),
            DashboardError::RenderingError(msg) => write!(f, "rendering: {}", msg),
            DashboardError::ValidationError(msg) => write!(f, "validation: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {}

pub type NetworkResult<T> = Result<T, DashboardError>;
pub type RenderingResult<T> = Result<T, DashboardError>;
