//! Task categories used for filtering and color-coding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display category of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Regular work item. Also the effective category of uncategorized tasks.
    Work,
    /// Meeting or call.
    Meeting,
    /// Hard deadline.
    Deadline,
    /// Personal errand.
    Personal,
    /// Project milestone or project-scoped item.
    Project,
}

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Self; 5] =
        [Self::Work, Self::Meeting, Self::Deadline, Self::Personal, Self::Project];

    /// The key used for this category in a [`FilterSet`](super::FilterSet).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Meeting => "meeting",
            Self::Deadline => "deadline",
            Self::Personal => "personal",
            Self::Project => "project",
        }
    }

    /// Display color stamped onto tasks created with this category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Work => "#3b82f6",
            Self::Meeting => "#8b5cf6",
            Self::Deadline => "#ef4444",
            Self::Personal => "#10b981",
            Self::Project => "#f59e0b",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{s}' (expected one of: work, meeting, deadline, personal, project)"
                )
            })
    }
}
