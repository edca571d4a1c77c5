use serde::Serialize;

use crate::error::{Error, Result};

/// Extension of an active skill document.
pub const ENABLED_SUFFIX: &str = ".md";

/// Extension of a skill document that is kept on disk but switched off.
pub const DISABLED_SUFFIX: &str = ".md.disabled";

/// Whether an installed skill is active. `Enabled` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillState {
    Enabled,
    Disabled,
}

impl SkillState {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Enabled => ENABLED_SUFFIX,
            Self::Disabled => DISABLED_SUFFIX,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }

    /// File name of `id` in this state.
    pub fn file_name(self, id: &str) -> String {
        format!("{id}{}", self.suffix())
    }
}

impl std::fmt::Display for SkillState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// A skill document present in a store directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledSkill {
    pub id: String,
    pub state: SkillState,
}

impl InstalledSkill {
    /// Derive identifier and state from a directory entry name.
    ///
    /// Returns `None` for names that are neither `<id>.md` nor `<id>.md.disabled`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (id, state) = if let Some(id) = name.strip_suffix(DISABLED_SUFFIX) {
            (id, SkillState::Disabled)
        } else if let Some(id) = name.strip_suffix(ENABLED_SUFFIX) {
            (id, SkillState::Enabled)
        } else {
            return None;
        };
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            state,
        })
    }
}

/// Result of an enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The file was renamed.
    Changed,
    /// The skill was already in the requested state; nothing was touched.
    AlreadyInState,
}

/// Reject identifiers that would resolve outside the store directory.
pub fn check_identifier(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0');
    if invalid {
        return Err(Error::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}
