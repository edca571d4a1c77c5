use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    types::{InstalledSkill, SkillState, ToggleOutcome, check_identifier},
};

/// The installed-skills collection of one target.
///
/// At most one of `<id>.md` / `<id>.md.disabled` exists per identifier;
/// enable and disable keep it that way by refusing to act when the requested
/// state already holds.
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// All installed skills with their state.
    async fn list(&self) -> Result<Vec<InstalledSkill>>;

    /// Switch a disabled skill on.
    async fn enable(&self, id: &str) -> Result<ToggleOutcome>;

    /// Switch an enabled skill off, keeping its content.
    async fn disable(&self, id: &str) -> Result<ToggleOutcome>;
}

/// Store backed by a directory, toggled with a single rename.
#[derive(Debug, Clone)]
pub struct FsSkillStore {
    dir: PathBuf,
}

impl FsSkillStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn set_state(&self, id: &str, wanted: SkillState) -> Result<ToggleOutcome> {
        check_identifier(id)?;

        let target = self.dir.join(wanted.file_name(id));
        if tokio::fs::try_exists(&target).await? {
            debug!(skill = id, state = %wanted, "skill already in requested state");
            return Ok(ToggleOutcome::AlreadyInState);
        }

        let current = wanted.opposite();
        let source = self.dir.join(current.file_name(id));
        if !tokio::fs::try_exists(&source).await? {
            return Err(Error::not_found(format!("{current} skill '{id}'"), source));
        }

        tokio::fs::rename(&source, &target).await?;
        info!(skill = id, state = %wanted, dir = %self.dir.display(), "toggled skill");
        Ok(ToggleOutcome::Changed)
    }
}

#[async_trait]
impl SkillStore for FsSkillStore {
    async fn list(&self) -> Result<Vec<InstalledSkill>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut skills: Vec<InstalledSkill> = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(skill) = name.to_str().and_then(InstalledSkill::from_file_name) else {
                continue;
            };
            // Follows symlinks, matching what enable/disable see.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => continue,
                Ok(_) => skills.push(skill),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %entry.path().display(), "skipping dangling symlink");
                },
                Err(e) => return Err(e.into()),
            }
        }

        skills.sort_by(|a, b| a.id.cmp(&b.id).then(a.state.cmp(&b.state)));
        skills.dedup_by(|later, kept| {
            let duplicate = later.id == kept.id;
            if duplicate {
                warn!(skill = %kept.id, dir = %self.dir.display(), "both enabled and disabled forms present, reporting enabled");
            }
            duplicate
        });
        Ok(skills)
    }

    async fn enable(&self, id: &str) -> Result<ToggleOutcome> {
        self.set_state(id, SkillState::Enabled).await
    }

    async fn disable(&self, id: &str) -> Result<ToggleOutcome> {
        self.set_state(id, SkillState::Disabled).await
    }
}

/// In-memory store, kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySkillStore {
    skills: Mutex<Vec<InstalledSkill>>,
}

impl InMemorySkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a skill directly.
    pub async fn insert(&self, id: &str, state: SkillState) {
        let mut skills = self.skills.lock().await;
        match skills.iter_mut().find(|s| s.id == id) {
            Some(existing) => existing.state = state,
            None => skills.push(InstalledSkill {
                id: id.to_string(),
                state,
            }),
        }
    }

    async fn set_state(&self, id: &str, wanted: SkillState) -> Result<ToggleOutcome> {
        check_identifier(id)?;
        let mut skills = self.skills.lock().await;
        let skill = skills.iter_mut().find(|s| s.id == id).ok_or_else(|| {
            let current = wanted.opposite();
            Error::not_found(format!("{current} skill '{id}'"), current.file_name(id))
        })?;
        if skill.state == wanted {
            return Ok(ToggleOutcome::AlreadyInState);
        }
        skill.state = wanted;
        Ok(ToggleOutcome::Changed)
    }
}

#[async_trait]
impl SkillStore for InMemorySkillStore {
    async fn list(&self) -> Result<Vec<InstalledSkill>> {
        Ok(self.skills.lock().await.clone())
    }

    async fn enable(&self, id: &str) -> Result<ToggleOutcome> {
        self.set_state(id, SkillState::Enabled).await
    }

    async fn disable(&self, id: &str) -> Result<ToggleOutcome> {
        self.set_state(id, SkillState::Disabled).await
    }
}
