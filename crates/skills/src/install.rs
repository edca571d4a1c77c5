use std::path::{Component, Path, PathBuf};

use {
    async_trait::async_trait,
    serde::Serialize,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    scan::scan_markdown,
    types::{ENABLED_SUFFIX, SkillState},
};

const USER_AGENT: &str = "agentic-vault";
const SCRATCH_PREFIX: &str = "agentic-vault-";

/// Produces a versioned copy of the upstream skill collection.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Human-readable name of the upstream, used in errors and logs.
    fn describe(&self) -> String;

    /// Materialise the snapshot under `dest` (which already exists).
    /// Returns the commit the snapshot was taken at, when known.
    async fn fetch(&self, dest: &Path) -> Result<Option<String>>;
}

/// Downloads a GitHub repository tarball.
#[derive(Debug, Clone)]
pub struct GithubTarballFetcher {
    owner: String,
    repo: String,
    reference: Option<String>,
    client: reqwest::Client,
}

impl GithubTarballFetcher {
    /// Accepts `owner/repo` or a GitHub URL; `reference` pins a branch, tag or sha.
    pub fn from_source(source: &str, reference: Option<String>) -> Result<Self> {
        let (owner, repo) = parse_source(source)?;
        Ok(Self {
            owner,
            repo,
            reference: reference.filter(|r| !r.trim().is_empty()),
            client: reqwest::Client::new(),
        })
    }

    fn tarball_url(&self) -> String {
        match &self.reference {
            Some(reference) => format!(
                "https://api.github.com/repos/{}/{}/tarball/{reference}",
                self.owner, self.repo
            ),
            None => format!(
                "https://api.github.com/repos/{}/{}/tarball",
                self.owner, self.repo
            ),
        }
    }

    async fn fetch_latest_commit_sha(&self) -> Option<String> {
        let mut url = format!(
            "https://api.github.com/repos/{}/{}/commits?per_page=1",
            self.owner, self.repo
        );
        if let Some(reference) = &self.reference {
            url.push_str("&sha=");
            url.push_str(reference);
        }
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let value: serde_json::Value = response.json().await.ok()?;
        value
            .as_array()?
            .first()?
            .get("sha")?
            .as_str()
            .filter(|sha| sha.len() == 40)
            .map(ToOwned::to_owned)
    }
}

#[async_trait]
impl SnapshotFetcher for GithubTarballFetcher {
    fn describe(&self) -> String {
        match &self.reference {
            Some(reference) => format!("{}/{}@{reference}", self.owner, self.repo),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }

    async fn fetch(&self, dest: &Path) -> Result<Option<String>> {
        let commit_sha = self.fetch_latest_commit_sha().await;
        let resp = self
            .client
            .get(self.tarball_url())
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Fetch {
                source_name: self.describe(),
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let bytes = resp.bytes().await?;
        debug!(source = %self.describe(), size = bytes.len(), "downloaded snapshot tarball");

        let dest = dest.to_path_buf();
        let source_name = self.describe();
        tokio::task::spawn_blocking(move || unpack_tarball(&bytes, &dest, &source_name))
            .await
            .map_err(|e| Error::message(format!("unpack task failed: {e}")))??;

        info!(source = %self.describe(), commit = ?commit_sha, "fetched skill snapshot");
        Ok(commit_sha)
    }
}

fn unpack_tarball(bytes: &[u8], dest: &Path, source_name: &str) -> Result<()> {
    let canonical_dest = std::fs::canonicalize(dest)?;
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            warn!(source = %source_name, "skipping symlink/hardlink archive entry");
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(stripped) = sanitize_archive_path(&path)? else {
            continue;
        };

        let target = dest.join(&stripped);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
            let canonical_parent = std::fs::canonicalize(parent)?;
            if !canonical_parent.starts_with(&canonical_dest) {
                return Err(Error::UnsafeArchive(path.display().to_string()));
            }
        }

        if target.exists() && std::fs::symlink_metadata(&target)?.file_type().is_symlink() {
            return Err(Error::UnsafeArchive(path.display().to_string()));
        }

        if entry_type.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }

        entry.unpack(&target)?;
    }
    Ok(())
}

/// Drop the archive's top-level directory and reject escaping components.
fn sanitize_archive_path(path: &Path) -> Result<Option<PathBuf>> {
    let stripped: PathBuf = path.components().skip(1).collect();
    if stripped.as_os_str().is_empty() {
        return Ok(None);
    }

    for component in stripped.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeArchive(path.display().to_string()));
            },
        }
    }

    Ok(Some(stripped))
}

/// Parse `owner/repo` from a source string.
/// Accepts `owner/repo`, `https://github.com/owner/repo`, or with trailing slash/`.git`.
fn parse_source(source: &str) -> Result<(String, String)> {
    let s = source.trim().trim_end_matches('/').trim_end_matches(".git");
    let s = s
        .strip_prefix("https://github.com/")
        .or_else(|| s.strip_prefix("http://github.com/"))
        .or_else(|| s.strip_prefix("github.com/"))
        .unwrap_or(s);
    match s.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        },
        _ => Err(Error::InvalidSource(source.to_string())),
    }
}

/// What an install run put on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallSummary {
    /// Identifiers copied into the target, in copy order.
    pub installed: Vec<String>,
    pub commit: Option<String>,
    pub target: PathBuf,
}

/// Copies the skill subtree of a fresh snapshot into a target directory.
#[derive(Debug, Clone)]
pub struct Installer {
    scratch_root: Option<PathBuf>,
    subtree: String,
}

impl Installer {
    pub fn new(subtree: impl Into<String>) -> Self {
        Self {
            scratch_root: None,
            subtree: subtree.into(),
        }
    }

    /// Create snapshot directories under `root` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Fetch, then copy every `*.md` in the snapshot's skill subtree into
    /// `target_dir`, flattened by basename. Existing files are overwritten and
    /// a disabled copy of the same skill is removed.
    ///
    /// The snapshot directory is removed on every exit path.
    pub async fn install(
        &self,
        fetcher: &dyn SnapshotFetcher,
        target_dir: &Path,
    ) -> Result<InstallSummary> {
        tokio::fs::create_dir_all(target_dir).await?;

        let scratch = self.scratch_dir().await?;
        debug!(scratch = %scratch.path().display(), "created snapshot directory");

        let commit = fetcher.fetch(scratch.path()).await?;

        let subtree = scratch.path().join(&self.subtree);
        if !subtree.is_dir() {
            return Err(Error::MissingSubtree {
                subtree: self.subtree.clone(),
            });
        }

        let files = scan_markdown(&subtree)?;
        if files.is_empty() {
            return Err(Error::EmptySnapshot(PathBuf::from(&self.subtree)));
        }

        let mut installed: Vec<String> = Vec::with_capacity(files.len());
        for file in &files {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %file.display(), "skipping skill file with non UTF-8 name");
                continue;
            };
            let Some(id) = name.strip_suffix(ENABLED_SUFFIX) else {
                continue;
            };

            tokio::fs::copy(file, target_dir.join(name)).await?;

            let disabled = target_dir.join(SkillState::Disabled.file_name(id));
            if tokio::fs::try_exists(&disabled).await? {
                tokio::fs::remove_file(&disabled).await?;
                debug!(skill = id, "removed disabled copy superseded by install");
            }

            if installed.iter().any(|existing| existing == id) {
                debug!(skill = id, path = %file.display(), "duplicate basename in snapshot, later copy wins");
            } else {
                installed.push(id.to_string());
            }
        }

        info!(
            count = installed.len(),
            source = %fetcher.describe(),
            target = %target_dir.display(),
            "installed skills"
        );

        Ok(InstallSummary {
            installed,
            commit,
            target: target_dir.to_path_buf(),
        })
    }

    async fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        match &self.scratch_root {
            Some(root) => {
                tokio::fs::create_dir_all(root).await?;
                Ok(builder.tempdir_in(root)?)
            },
            None => Ok(builder.tempdir()?),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    /// Writes a fixed set of files into the snapshot directory.
    struct FakeFetcher {
        files: Vec<(&'static str, &'static str)>,
        fail: bool,
    }

    impl FakeFetcher {
        fn with_files(files: &[(&'static str, &'static str)]) -> Self {
            Self {
                files: files.to_vec(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                files: vec![("skills/a.md", "a")],
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SnapshotFetcher for FakeFetcher {
        fn describe(&self) -> String {
            "fake/upstream".into()
        }

        async fn fetch(&self, dest: &Path) -> Result<Option<String>> {
            for (rel, content) in &self.files {
                let path = dest.join(rel);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, content).unwrap();
            }
            if self.fail {
                return Err(Error::Fetch {
                    source_name: self.describe(),
                    reason: "HTTP 503 Service Unavailable".into(),
                });
            }
            Ok(Some("0123456789abcdef0123456789abcdef01234567".into()))
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_parse_source_valid() {
        let (owner, repo) = parse_source("mandadapu/Agentic-Vault").unwrap();
        assert_eq!(owner, "mandadapu");
        assert_eq!(repo, "Agentic-Vault");
    }

    #[rstest]
    #[case("https://github.com/owner/repo")]
    #[case("https://github.com/owner/repo/")]
    #[case("https://github.com/owner/repo.git")]
    #[case("github.com/owner/repo")]
    #[case("  owner/repo ")]
    fn test_parse_source_github_url(#[case] source: &str) {
        let (o, r) = parse_source(source).unwrap();
        assert_eq!(o, "owner");
        assert_eq!(r, "repo");
    }

    #[rstest]
    #[case("noslash")]
    #[case("too/many/parts")]
    #[case("/empty-owner")]
    #[case("empty-repo/")]
    fn test_parse_source_invalid(#[case] source: &str) {
        assert!(matches!(
            parse_source(source),
            Err(Error::InvalidSource(_))
        ));
    }

    #[test]
    fn test_sanitize_archive_path_rejects_parent_dir() {
        let path = Path::new("repo-root/../../etc/passwd");
        assert!(matches!(
            sanitize_archive_path(path),
            Err(Error::UnsafeArchive(_))
        ));
    }

    #[test]
    fn test_sanitize_archive_path_strips_top_level() {
        let path = Path::new("owner-repo-abc123/skills/architect-review.md");
        let sanitized = sanitize_archive_path(path).unwrap().unwrap();
        assert_eq!(sanitized, PathBuf::from("skills/architect-review.md"));
        assert!(
            sanitize_archive_path(Path::new("owner-repo-abc123/"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_tarball_url_includes_reference() {
        let fetcher =
            GithubTarballFetcher::from_source("owner/repo", Some("v1.7.0".into())).unwrap();
        assert_eq!(
            fetcher.tarball_url(),
            "https://api.github.com/repos/owner/repo/tarball/v1.7.0"
        );
        assert_eq!(fetcher.describe(), "owner/repo@v1.7.0");

        let fetcher = GithubTarballFetcher::from_source("owner/repo", Some(" ".into())).unwrap();
        assert_eq!(
            fetcher.tarball_url(),
            "https://api.github.com/repos/owner/repo/tarball"
        );
    }

    type TarGz = tar::Builder<flate2::write::GzEncoder<Vec<u8>>>;

    fn tar_gz(build: impl FnOnce(&mut TarGz)) -> Vec<u8> {
        let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
            Vec::new(),
            flate2::Compression::default(),
        ));
        build(&mut builder);
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn add_file(builder: &mut TarGz, path: &str, content: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, content).unwrap();
    }

    fn add_link(builder: &mut TarGz, kind: tar::EntryType, path: &str, target: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(0);
        header.set_mode(0o777);
        builder.append_link(&mut header, path, target).unwrap();
    }

    /// Writes the name bytes directly; the builder refuses `..` in paths.
    fn add_file_with_raw_name(builder: &mut TarGz, path: &str, content: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.as_gnu_mut().unwrap().name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, content).unwrap();
    }

    #[test]
    fn test_unpack_tarball_strips_root_and_writes_files() {
        let bytes = tar_gz(|b| {
            add_file(
                b,
                "owner-repo-abc123/skills/architect-review.md",
                b"# Architect Review\n",
            );
        });

        let tmp = tempfile::tempdir().unwrap();
        unpack_tarball(&bytes, tmp.path(), "owner/repo").unwrap();
        let written =
            std::fs::read_to_string(tmp.path().join("skills/architect-review.md")).unwrap();
        assert_eq!(written, "# Architect Review\n");
    }

    #[test]
    fn test_unpack_tarball_skips_links() {
        let bytes = tar_gz(|b| {
            add_link(
                b,
                tar::EntryType::Symlink,
                "owner-repo-abc123/skills/passwd.md",
                "/etc/passwd",
            );
            add_file(b, "owner-repo-abc123/skills/skill-audit.md", b"audit");
            add_link(
                b,
                tar::EntryType::Link,
                "owner-repo-abc123/skills/hard.md",
                "owner-repo-abc123/skills/skill-audit.md",
            );
        });

        let tmp = tempfile::tempdir().unwrap();
        unpack_tarball(&bytes, tmp.path(), "owner/repo").unwrap();

        let skills = tmp.path().join("skills");
        assert_eq!(names(&skills), vec!["skill-audit.md"]);
        assert!(std::fs::symlink_metadata(skills.join("passwd.md")).is_err());
    }

    #[test]
    fn test_unpack_tarball_rejects_escaping_entry() {
        let bytes = tar_gz(|b| {
            add_file(b, "owner-repo-abc123/skills/a.md", b"a");
            add_file_with_raw_name(b, "owner-repo-abc123/../../escape.md", b"x");
        });

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("snapshot");
        std::fs::create_dir_all(&dest).unwrap();

        let err = unpack_tarball(&bytes, &dest, "owner/repo").unwrap_err();
        assert!(matches!(err, Error::UnsafeArchive(ref p) if p.contains("escape.md")));
        assert!(!tmp.path().join("escape.md").exists());
    }

    #[tokio::test]
    async fn test_install_single_file_leaves_no_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("scratch");
        let target = tmp.path().join("home/.claude/skills");
        let fetcher = FakeFetcher::with_files(&[
            ("skills/architect-review.md", "# Architect Review\n"),
            ("README.md", "not a skill"),
        ]);

        let summary = Installer::new("skills")
            .with_scratch_root(&scratch)
            .install(&fetcher, &target)
            .await
            .unwrap();

        assert_eq!(summary.installed, vec!["architect-review"]);
        assert!(summary.commit.is_some());
        assert_eq!(summary.target, target);
        assert_eq!(names(&target), vec!["architect-review.md"]);
        assert!(names(&scratch).is_empty());
    }

    #[tokio::test]
    async fn test_install_flattens_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("target");
        let fetcher = FakeFetcher::with_files(&[
            ("skills/tier-1/architect-review.md", "a"),
            ("skills/tier-2/skill-audit.md", "b"),
            ("skills/tier-2/notes.txt", "c"),
        ]);

        let summary = Installer::new("skills")
            .with_scratch_root(tmp.path().join("scratch"))
            .install(&fetcher, &target)
            .await
            .unwrap();

        assert_eq!(summary.installed, vec!["architect-review", "skill-audit"]);
        assert_eq!(names(&target), vec!["architect-review.md", "skill-audit.md"]);
    }

    #[tokio::test]
    async fn test_install_overwrites_and_reenables() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("target");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("architect-review.md.disabled"), "old").unwrap();
        std::fs::write(target.join("skill-audit.md"), "old").unwrap();
        std::fs::write(target.join("local-only.md"), "mine").unwrap();

        let fetcher = FakeFetcher::with_files(&[
            ("skills/architect-review.md", "new a"),
            ("skills/skill-audit.md", "new b"),
        ]);
        Installer::new("skills")
            .with_scratch_root(tmp.path().join("scratch"))
            .install(&fetcher, &target)
            .await
            .unwrap();

        assert_eq!(names(&target), vec![
            "architect-review.md",
            "local-only.md",
            "skill-audit.md"
        ]);
        assert_eq!(
            std::fs::read_to_string(target.join("skill-audit.md")).unwrap(),
            "new b"
        );
        assert_eq!(
            std::fs::read_to_string(target.join("local-only.md")).unwrap(),
            "mine"
        );
    }

    #[tokio::test]
    async fn test_install_missing_subtree() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("scratch");
        let fetcher = FakeFetcher::with_files(&[("docs/readme.md", "x")]);

        let err = Installer::new("skills")
            .with_scratch_root(&scratch)
            .install(&fetcher, &tmp.path().join("target"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingSubtree { ref subtree } if subtree == "skills"));
        assert!(names(&scratch).is_empty());
    }

    #[tokio::test]
    async fn test_install_empty_subtree() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::with_files(&[("skills/notes.txt", "x")]);

        let err = Installer::new("skills")
            .with_scratch_root(tmp.path().join("scratch"))
            .install(&fetcher, &tmp.path().join("target"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptySnapshot(_)));
    }

    #[tokio::test]
    async fn test_install_fetch_failure_cleans_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("scratch");
        let target = tmp.path().join("target");

        let err = Installer::new("skills")
            .with_scratch_root(&scratch)
            .install(&FakeFetcher::failing(), &target)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("fake/upstream"));
        assert!(names(&scratch).is_empty());
        assert!(names(&target).is_empty());
    }
}
