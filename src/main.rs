use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use settings_editor::cfg::{CfgFile, LineKind};
use settings_editor::config::{self, EditorConfig};
use settings_editor::edit::{commit, load_document, plan_save, restore, SavePlan, SaveResult};
use settings_editor::markup::{MarkupFile, Segment};
use settings_editor::tree::{build_tree, flatten_files, NodeKind, TreeNode};
use settings_editor::{
    logging, Dialect, Document, FileUpdate, HistoryStore, RootGuard, SaveRequest, UpdateOutcome,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "settings-editor")]
#[command(about = "Format-preserving editor for .cfg and .xml settings files", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./settings-editor.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Settings root directory (overrides the config file)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List editable settings files
    Tree {
        /// Print JSON instead of an indented listing
        #[arg(long)]
        json: bool,
    },

    /// Show the parsed lines of a settings file
    Show {
        /// Root-relative path of the file
        path: String,

        /// Print the parsed document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one value (cfg) or attribute (xml)
    Set {
        /// Root-relative path of the file
        path: String,

        /// Zero-based line index
        #[arg(short, long)]
        line: usize,

        /// Attribute name (xml files only)
        #[arg(short, long)]
        key: Option<String>,

        /// New value
        #[arg(long)]
        value: String,

        /// Dry run - show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Apply a JSON array of updates: [{"lineIndex": 3, "key": "health", "value": "150"}]
    Apply {
        /// Root-relative path of the file
        path: String,

        /// JSON file with the updates
        #[arg(short, long)]
        updates: PathBuf,

        /// Dry run - show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List saved snapshots of a file, newest first
    History {
        /// Root-relative path of the file
        path: String,

        /// Maximum number of entries (defaults to history_limit from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore a file from a snapshot
    Restore {
        /// Snapshot id
        id: u64,
    },

    /// Check that every settings file renders back byte for byte
    Verify,
}

struct Session {
    config: EditorConfig,
    guard: RootGuard,
}

impl Session {
    fn open_history(&self) -> Result<HistoryStore> {
        HistoryStore::open(&self.config.history_file).with_context(|| {
            format!(
                "failed to open history store {}",
                self.config.history_file.display()
            )
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init("warn") {
        eprintln!("{}", format!("Warning: logging disabled: {err}").yellow());
    }

    let session = load_session(cli.config, cli.root)?;

    match cli.command {
        Commands::Tree { json } => cmd_tree(&session, json),
        Commands::Show { path, json } => cmd_show(&session, &path, json),
        Commands::Set {
            path,
            line,
            key,
            value,
            dry_run,
            diff,
        } => {
            let update = FileUpdate {
                line_index: line,
                key,
                value,
            };
            cmd_save(&session, SaveRequest::new(path, vec![update]), dry_run, diff)
        }
        Commands::Apply {
            path,
            updates,
            dry_run,
            diff,
        } => {
            let text = fs::read_to_string(&updates)
                .with_context(|| format!("failed to read {}", updates.display()))?;
            let updates: Vec<FileUpdate> = serde_json::from_str(&text)
                .with_context(|| format!("invalid updates JSON in {}", updates.display()))?;
            cmd_save(&session, SaveRequest::new(path, updates), dry_run, diff)
        }
        Commands::History { path, limit, json } => cmd_history(&session, &path, limit, json),
        Commands::Restore { id } => cmd_restore(&session, id),
        Commands::Verify => cmd_verify(&session),
    }
}

/// Resolve configuration
///
/// Priority order:
/// 1. Explicit --config file
/// 2. settings-editor.toml in the current directory
/// 3. Built-in defaults
///
/// `--root` overrides whatever root the configuration names. Paths still
/// relative afterwards (defaults and `--root`) resolve against the working
/// directory, once, so the guard and the history store see the same file.
fn load_session(config_path: Option<PathBuf>, root: Option<PathBuf>) -> Result<Session> {
    let cwd = env::current_dir()?;
    let mut config = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => config::discover(&cwd)?,
    };
    if let Some(root) = root {
        config.root = root;
    }
    let config = config.resolve_relative_to(&cwd);

    if !config.root.exists() {
        anyhow::bail!(
            "{}\n  {}",
            format!("Settings root does not exist: {}", config.root.display()).red(),
            "Pass --root <DIR> or set `root` in settings-editor.toml"
        );
    }

    let guard = RootGuard::new(&config.root)
        .with_context(|| format!("failed to open settings root {}", config.root.display()))?
        .forbid(&config.history_file);

    Ok(Session { config, guard })
}

fn cmd_tree(session: &Session, json: bool) -> Result<()> {
    let tree = build_tree(session.guard.root())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    println!("{}", session.guard.root().display().to_string().bold());
    print_nodes(&tree, 1);
    Ok(())
}

fn print_nodes(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.kind {
            NodeKind::Folder => {
                println!("{indent}{}/", node.name.blue().bold());
                print_nodes(&node.children, depth + 1);
            }
            NodeKind::File => println!("{indent}{}", node.name),
        }
    }
}

fn cmd_show(session: &Session, path: &str, json: bool) -> Result<()> {
    let loaded = load_document(&session.guard, path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.document)?);
        return Ok(());
    }

    match &loaded.document {
        Document::Cfg(file) => show_cfg(file),
        Document::Markup(file) => show_markup(file),
    }
    Ok(())
}

fn show_cfg(file: &CfgFile) {
    for line in file.lines() {
        let index = format!("{:>5}", line.index()).dimmed();
        match line.kind() {
            LineKind::Config => {
                let key = line.key().unwrap_or_default();
                let value = line.value().unwrap_or_default();
                print!("{index}  {} = {}", key.cyan(), value.green());
                if let Some(meta) = line.metadata() {
                    print!(
                        "  {}",
                        format!(
                            "[{}; default {}] {}",
                            meta.value_type, meta.default, meta.description
                        )
                        .dimmed()
                    );
                }
                println!();
            }
            LineKind::Comment => println!("{index}  {}", line.raw().trim_end().dimmed()),
            LineKind::Empty => println!("{index}"),
            LineKind::Unrecognized => {
                println!("{index}  {} {}", "?".yellow(), line.raw().trim_end())
            }
        }
    }
}

fn show_markup(file: &MarkupFile) {
    for line in file.lines() {
        let index = format!("{:>5}", line.index()).dimmed();
        let attributes: Vec<String> = line
            .segments()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Attribute { name, value } => {
                    Some(format!("{}={}", name.cyan(), value.green()))
                }
                Segment::Literal { .. } => None,
            })
            .collect();

        let tag = line.tag_name().unwrap_or("");
        let indent = " ".repeat(line.depth());
        if attributes.is_empty() {
            println!("{index}  {indent}{}", tag.bold());
        } else {
            println!("{index}  {indent}{} {}", tag.bold(), attributes.join(" "));
        }
    }
}

fn cmd_save(session: &Session, request: SaveRequest, dry_run: bool, show_diff: bool) -> Result<()> {
    let plan = plan_save(&session.guard, &request)?;
    report_outcomes(&request, &plan);

    if !plan.is_change() {
        println!("{} {}: no changes", "⊙".yellow(), plan.relative_path);
        return Ok(());
    }

    if dry_run {
        println!("{}", "[DRY RUN - nothing written]".cyan());
        display_diff(&plan.file, &plan.original, &plan.rendered);
        return Ok(());
    }

    let mut store = session.open_history()?;
    match commit(&session.guard, &mut store, &plan)? {
        SaveResult::Written { backup, .. } => {
            let backup = backup
                .map(|snapshot| format!(" (snapshot #{})", snapshot.id))
                .unwrap_or_default();
            println!("{} {}: saved{}", "✓".green(), plan.relative_path, backup);
        }
        SaveResult::Unchanged { .. } => {
            println!("{} {}: no changes", "⊙".yellow(), plan.relative_path);
        }
    }

    if show_diff {
        display_diff(&plan.file, &plan.original, &plan.rendered);
    }
    Ok(())
}

fn report_outcomes(request: &SaveRequest, plan: &SavePlan) {
    for (update, outcome) in request.updates.iter().zip(&plan.outcomes) {
        if let UpdateOutcome::Ignored(reason) = outcome {
            let target = match (&update.key, plan.dialect) {
                (Some(key), Dialect::Markup) => format!("line {} `{}`", update.line_index, key),
                _ => format!("line {}", update.line_index),
            };
            eprintln!("{} {}: ignored ({})", "⊘".yellow(), target, reason);
        }
    }
}

fn cmd_history(session: &Session, path: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let file = session.guard.resolve(path)?;
    let relative = session.guard.relative(&file);
    let store = session.open_history()?;
    let entries = store.history(&relative, limit.unwrap_or(session.config.history_limit));

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", format!("No snapshots for {relative}").yellow());
        return Ok(());
    }

    println!("{}", format!("Snapshots of {relative}").bold());
    for entry in entries {
        println!(
            "  #{:<5} {}  {} bytes",
            entry.id,
            format!("t={}", entry.created_at).dimmed(),
            entry.size
        );
    }
    Ok(())
}

fn cmd_restore(session: &Session, id: u64) -> Result<()> {
    let mut store = session.open_history()?;
    match restore(&session.guard, &mut store, id)? {
        SaveResult::Written { file, backup } => {
            println!(
                "{} Restored snapshot #{} to {}",
                "✓".green(),
                id,
                session.guard.relative(&file)
            );
            if let Some(backup) = backup {
                println!(
                    "{}",
                    format!("  Previous content saved as snapshot #{}", backup.id).dimmed()
                );
            }
        }
        SaveResult::Unchanged { file } => {
            println!(
                "{} {} already matches snapshot #{}",
                "⊙".yellow(),
                session.guard.relative(&file),
                id
            );
        }
    }
    Ok(())
}

fn cmd_verify(session: &Session) -> Result<()> {
    let tree = build_tree(session.guard.root())?;
    let mut checked = 0;
    let mut failed = 0;

    for node in flatten_files(&tree) {
        let loaded = match load_document(&session.guard, &node.path) {
            Ok(loaded) => loaded,
            Err(err) => {
                eprintln!("{} {}: {}", "✗".red(), node.path, err);
                failed += 1;
                continue;
            }
        };
        checked += 1;

        if loaded.round_trips() {
            println!("{} {}", "✓".green(), node.path);
        } else {
            eprintln!("{} {}: round trip differs", "✗".red(), node.path);
            display_diff(&loaded.file, &loaded.original, &loaded.document.render());
            failed += 1;
        }
    }

    println!();
    println!("Checked {checked} file(s), {failed} failure(s)");
    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed verification");
    }
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
