use tracing::Level;

use super::LogRotationKind;

pub(super) const fn log_level() -> Level {
    Level::INFO
}

pub(super) const fn rotation() -> LogRotationKind {
    LogRotationKind::Hourly
}
