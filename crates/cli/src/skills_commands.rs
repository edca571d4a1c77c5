//! `install`, `list`, `enable`, `disable`, and `targets`.

use std::path::Path;

use {
    agentic_vault_config::{TargetConfig, TargetTable},
    agentic_vault_skills::{
        catalog::{EntryStatus, ListingEntry, ListingReport, UNGROUPED_LABEL, build_listing},
        install::{GithubTarballFetcher, Installer, SnapshotFetcher},
        store::{FsSkillStore, SkillStore},
        types::ToggleOutcome,
    },
    anyhow::{Result, anyhow},
    clap::Args,
};

use crate::{Context, style::Palette};

/// Which assistant's skills directory to act on. Exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Claude Code (~/.claude/skills).
    #[arg(long)]
    claude: bool,
    /// Cursor (~/.cursor/skills).
    #[arg(long)]
    cursor: bool,
    /// Gemini CLI (~/.gemini/skills).
    #[arg(long)]
    gemini: bool,
    /// Codex CLI (~/.codex/skills).
    #[arg(long)]
    codex: bool,
    /// Any target by name, including ones declared in the config file.
    #[arg(long, value_name = "NAME")]
    target: Option<String>,
}

impl TargetArgs {
    pub fn name(&self) -> &str {
        if let Some(name) = &self.target {
            name
        } else if self.claude {
            "claude"
        } else if self.cursor {
            "cursor"
        } else if self.gemini {
            "gemini"
        } else {
            "codex"
        }
    }
}

/// `agentic-vault --claude` and friends: install without naming the subcommand.
#[derive(Args, Debug, Clone, Default)]
#[group(id = "InstallShortcut", multiple = false)]
pub struct InstallShortcut {
    /// Shorthand for `install --claude`.
    #[arg(long)]
    claude: bool,
    /// Shorthand for `install --cursor`.
    #[arg(long)]
    cursor: bool,
    /// Shorthand for `install --gemini`.
    #[arg(long)]
    gemini: bool,
    /// Shorthand for `install --codex`.
    #[arg(long)]
    codex: bool,
}

impl InstallShortcut {
    /// The install target this shortcut names, if any flag was given.
    pub fn into_target(self) -> Option<TargetArgs> {
        let Self {
            claude,
            cursor,
            gemini,
            codex,
        } = self;
        (claude || cursor || gemini || codex).then_some(TargetArgs {
            claude,
            cursor,
            gemini,
            codex,
            target: None,
        })
    }
}

fn resolve_target<'a>(table: &'a TargetTable, args: &TargetArgs) -> Result<&'a TargetConfig> {
    let name = args.name();
    table.find(name).ok_or_else(|| {
        anyhow!(
            "unknown target '{name}' (available: {})",
            table.names().join(", ")
        )
    })
}

fn target_store(ctx: &Context, args: &TargetArgs) -> Result<(TargetConfig, FsSkillStore)> {
    let table = ctx.config.target_table();
    let target = resolve_target(&table, args)?.clone();
    let store = FsSkillStore::new(target.skills_dir(&ctx.home));
    Ok((target, store))
}

pub async fn handle_install(
    ctx: &Context,
    args: &TargetArgs,
    source: Option<String>,
    reference: Option<String>,
) -> Result<()> {
    let p = ctx.palette;
    let table = ctx.config.target_table();
    let target = resolve_target(&table, args)?;
    let dest = target.skills_dir(&ctx.home);

    let repo = source.unwrap_or_else(|| ctx.config.source.repo.clone());
    let reference = reference.or_else(|| ctx.config.source.reference.clone());
    let fetcher = GithubTarballFetcher::from_source(&repo, reference)?;

    let mut installer = Installer::new(ctx.config.source.subtree.clone());
    if let Some(scratch) = &ctx.config.install.scratch_dir {
        installer = installer.with_scratch_root(scratch);
    }

    println!(
        "Installing skills for {}{}{} from {}...",
        p.bold,
        target.label(),
        p.reset,
        fetcher.describe()
    );

    let summary = installer.install(&fetcher, &dest).await?;

    for id in &summary.installed {
        println!("  {}+{} {id}", p.green, p.reset);
    }
    println!(
        "\n{}Installed {} skill(s){} into {}",
        p.green,
        summary.installed.len(),
        p.reset,
        summary.target.display()
    );
    if let Some(commit) = &summary.commit {
        println!("{}commit {commit}{}", p.dim, p.reset);
    }
    Ok(())
}

pub async fn handle_list(ctx: &Context, args: &TargetArgs, json: bool) -> Result<()> {
    let (target, store) = target_store(ctx, args)?;
    let installed = store.list().await?;
    let report = build_listing(&ctx.config.catalog, &installed);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render_listing(&report, &target, store.dir(), ctx.palette));
    Ok(())
}

fn render_entry(out: &mut String, entry: &ListingEntry, p: Palette) {
    let line = match entry.status {
        EntryStatus::Enabled => format!("  {}✓{} {}\n", p.green, p.reset, entry.id),
        EntryStatus::Disabled => format!(
            "  {}○{} {} {}(disabled){}\n",
            p.yellow, p.reset, entry.id, p.dim, p.reset
        ),
        EntryStatus::Missing => format!("  {}· {} (not installed){}\n", p.dim, entry.id, p.reset),
    };
    out.push_str(&line);
}

fn render_listing(report: &ListingReport, target: &TargetConfig, dir: &Path, p: Palette) -> String {
    let mut out = format!(
        "{}{} skills{} {}({}){}\n\n",
        p.bold,
        target.label(),
        p.reset,
        p.dim,
        dir.display(),
        p.reset
    );

    for group in &report.groups {
        out.push_str(&format!("{}{}{}{}\n", p.bold, p.cyan, group.label, p.reset));
        for entry in &group.entries {
            render_entry(&mut out, entry, p);
        }
        out.push('\n');
    }

    if !report.ungrouped.is_empty() {
        out.push_str(&format!("{}{}{}{}\n", p.bold, p.cyan, UNGROUPED_LABEL, p.reset));
        for entry in &report.ungrouped {
            render_entry(&mut out, entry, p);
        }
        out.push('\n');
    }

    if report.is_empty() {
        out.push_str(&format!(
            "No skills installed. Run `agentic-vault install --target {}` first.\n",
            target.name
        ));
    } else {
        out.push_str(&format!(
            "{}Total:{} {} enabled, {} disabled\n",
            p.bold, p.reset, report.enabled, report.disabled
        ));
    }
    out
}

pub async fn handle_toggle(
    ctx: &Context,
    args: &TargetArgs,
    skill: &str,
    enable: bool,
) -> Result<()> {
    let p = ctx.palette;
    let (target, store) = target_store(ctx, args)?;

    let result = if enable {
        store.enable(skill).await
    } else {
        store.disable(skill).await
    };
    let verb = if enable {
        "enabled"
    } else {
        "disabled"
    };

    match result {
        Ok(ToggleOutcome::Changed) => {
            println!(
                "{}✓{} {skill} {verb} for {}",
                p.green,
                p.reset,
                target.label()
            );
        },
        Ok(ToggleOutcome::AlreadyInState) => {
            println!("{}{skill} is already {verb}{}", p.dim, p.reset);
        },
        Err(e) if e.is_not_found() => {
            eprintln!(
                "{}✗{} skill '{skill}' not found in {} ({})",
                p.red,
                p.reset,
                store.dir().display(),
                target.label()
            );
            std::process::exit(1);
        },
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn handle_targets(ctx: &Context) {
    let p = ctx.palette;
    for target in ctx.config.target_table().iter() {
        println!(
            "  {}{:<8}{} {:<12} {}{}{}",
            p.bold,
            target.name,
            p.reset,
            target.label(),
            p.dim,
            target.skills_dir(&ctx.home).display(),
            p.reset
        );
    }
}
