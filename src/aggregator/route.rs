//! Which store a mutation is sent to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::TaskPath;

/// The store a mutation was sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A personal task in the current view.
    Personal,
    /// A workspace task, addressed by its path.
    Workspace(TaskPath),
    /// The id was not in the current view and was sent to the personal store
    /// on the assumption that it is personal.
    PersonalFallback,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal => f.write_str("personal store"),
            Self::Workspace(path) => write!(f, "workspace store at {path}"),
            Self::PersonalFallback => f.write_str("personal store (id not in view)"),
        }
    }
}

/// What to do with an update or delete for an id absent from the merged view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdPolicy {
    /// Send it to the personal store and report [`Route::PersonalFallback`].
    #[default]
    AssumePersonal,
    /// Fail with [`Error::NotInView`](crate::Error::NotInView) without calling any store.
    Reject,
}

impl std::str::FromStr for UnknownIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "assume_personal" | "assume-personal" => Ok(Self::AssumePersonal),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown id policy '{other}' (expected assume_personal or reject)")),
        }
    }
}
