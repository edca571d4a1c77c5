//! Config schema types (upstream source, install targets, catalog, validation).
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub source: SourceConfig,
    pub install: InstallConfig,
    /// Extra install targets. Entries whose `name` matches a built-in target
    /// replace it.
    pub targets: Vec<TargetConfig>,
    pub catalog: CatalogConfig,
    pub validate: ValidateConfig,
}

impl VaultConfig {
    /// Built-in targets merged with the ones declared in the config file.
    pub fn target_table(&self) -> TargetTable {
        let mut table = TargetTable::default();
        for target in &self.targets {
            table.upsert(target.clone());
        }
        table
    }
}

/// Where `install` fetches skills from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// GitHub repository, `owner/repo` or a full GitHub URL.
    pub repo: String,
    /// Branch, tag, or commit. `None` means the default branch.
    pub reference: Option<String>,
    /// Directory inside the snapshot that holds the skill documents.
    pub subtree: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo: "mandadapu/Agentic-Vault".into(),
            reference: None,
            subtree: "skills".into(),
        }
    }
}

/// Installer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Parent directory for per-invocation scratch directories.
    /// Defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

/// One AI tool integration with its own skills directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Short name used on the command line (`--target <name>`).
    pub name: String,
    /// Marker directory under the home directory, e.g. `.claude`.
    pub dir: String,
    /// Human-readable tool name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl TargetConfig {
    pub fn new(name: &str, dir: &str, display_name: &str) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            display_name: Some(display_name.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// `<home>/<dir>/skills`
    pub fn skills_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.dir).join("skills")
    }
}

/// Ordered, immutable set of install targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    targets: Vec<TargetConfig>,
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            targets: vec![
                TargetConfig::new("claude", ".claude", "Claude Code"),
                TargetConfig::new("cursor", ".cursor", "Cursor"),
                TargetConfig::new("gemini", ".gemini", "Gemini CLI"),
                TargetConfig::new("codex", ".codex", "Codex CLI"),
            ],
        }
    }
}

impl TargetTable {
    pub fn find(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetConfig> {
        self.targets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    fn upsert(&mut self, target: TargetConfig) {
        match self.targets.iter_mut().find(|t| t.name == target.name) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
    }
}

/// Presentation grouping used by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CategoryConfig {
    fn new(label: &str, skills: &[&str]) -> Self {
        Self {
            label: label.into(),
            skills: skills.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryConfig::new("1. Strategy & Vision", &[
                    "product-vision-architect",
                    "architect-planner",
                    "architecture-decision-records",
                    "documentation-architect",
                ]),
                CategoryConfig::new("2. AI Logic & Search", &[
                    "ai-agents-architect",
                    "langchain-architect",
                    "rag-systems-architect",
                    "rag-implementation-engineer",
                    "prompt-strategist",
                    "embedding-strategist",
                ]),
                CategoryConfig::new("3. Engineering & UI", &[
                    "ui-craftsman",
                    "ui-builder",
                    "mcp-builder",
                ]),
                CategoryConfig::new("4. Infrastructure & Pipeline", &[
                    "k8s-platform-architect",
                    "container-architect",
                    "deployment-engineer",
                    "mlops-pipeline-architect",
                    "config-validator",
                ]),
                CategoryConfig::new("5. Safety, Security & Ops", &[
                    "toxic-skills-scanner",
                    "agent-security-hardener",
                    "skill-audit",
                    "hydra-security-loop",
                    "compliance-officer",
                    "deployment-procedures",
                    "incident-response-specialist",
                    "architect-review",
                ]),
            ],
        }
    }
}

/// Settings for the `validate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Directory scanned when no explicit files are given.
    pub default_dir: PathBuf,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("skills"),
        }
    }
}
