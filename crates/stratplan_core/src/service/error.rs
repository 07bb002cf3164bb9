//! Error type shared by the analytics services.

use crate::model::node::{ProjectId, StrategyId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors from analytics use-cases.
///
/// A strategy without projects is not an error; it reports the `No Data`
/// health label instead.
#[derive(Debug)]
pub enum AnalyticsError {
    /// Requested strategy does not exist.
    StrategyNotFound(StrategyId),
    /// Requested project does not exist.
    ProjectNotFound(ProjectId),
    /// Repository-level failure, propagated unchanged.
    Repo(RepoError),
}

impl AnalyticsError {
    /// True for the 404-equivalent variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StrategyNotFound(_) | Self::ProjectNotFound(_))
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrategyNotFound(id) => write!(f, "strategy not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AnalyticsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AnalyticsError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
