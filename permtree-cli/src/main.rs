// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit a permission tree stored in a YAML file from the terminal.
//!
//! The working file holds the whole tree. Mutating commands write it back, `export` produces the
//! filtered document with only the selected actions.
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use permtree_client::{Client, Credentials, FileTokenStore, MemoryTokenStore, TokenStore};
use permtree_core::{
    ActionKey, ApiResource, ChildDraft, Forest, GroupDraft, Icon, Level, PermissionAction,
    PermissionNode,
};
use permtree_editor::{Config, Editor, Notice, NoticeLevel};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[derive(Debug, Parser)]
#[command(name = "permtree", version, about = "Edit permission trees stored as YAML")]
struct Args {
    /// Working document. The built-in sample tree is used while it does not exist.
    #[arg(
        short = 'f',
        long,
        value_name = "FILE",
        default_value = "permissions.yaml",
        global = true
    )]
    file: PathBuf,

    /// Path to a TOML config file.
    #[arg(short = 'c', long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tree in display order.
    Show,

    /// Append a root group.
    AddGroup {
        name: String,
        slug: String,
        #[arg(long, default_value = "CreditCard")]
        icon: Icon,
    },

    /// Append a routable child to a node.
    AddChild {
        parent: String,
        name: String,
        slug: String,
        #[arg(long)]
        router: String,
        #[arg(long)]
        component: String,
        #[arg(long, default_value = "Zap")]
        icon: Icon,
    },

    /// Append an action to a node.
    AddAction {
        slug: String,
        code: String,
        name: String,
        /// Granted route as "METHOD path", optionally followed by an attribute.
        #[arg(short = 'r', long = "resource", value_name = "RESOURCE", required = true)]
        resources: Vec<ApiResource>,
    },

    /// Change the fields of a node.
    EditNode {
        slug: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_name = "SLUG")]
        rename: Option<String>,
        #[arg(long)]
        icon: Option<Icon>,
        #[arg(long)]
        router: Option<String>,
        #[arg(long)]
        component: Option<String>,
    },

    /// Remove an action from a node.
    RemoveAction { slug: String, code: String },

    /// Remove a direct child of a node.
    RemoveChild { parent: String, slug: String },

    /// Remove a node at any depth, together with everything below it.
    RemoveNode { slug: String },

    /// Move an item to the position of another item at the same level.
    Move {
        /// "root", "children:<slug>" or "actions:<slug>".
        level: Level,
        dragged: String,
        target: String,
    },

    /// Write the document with the selected actions.
    Export {
        /// Selected action as "slug:code".
        #[arg(short = 's', long = "select", value_name = "SLUG:CODE")]
        select: Vec<ActionKey>,

        /// Select every action of the tree.
        #[arg(long)]
        all: bool,

        /// Target file, defaults to standard output.
        #[arg(short = 'o', long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Replace the working document with a .yaml or .yml file.
    Import { path: PathBuf },

    /// Log into the backend and keep the access token.
    Login {
        #[arg(long)]
        identity: String,
        #[arg(long)]
        password: String,
    },

    /// List the API routes offered by the backend.
    Routes {
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    setup_logging();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let mut editor = open(&args.file, &config)?;

    let changed = match args.command {
        Command::Login { identity, password } => {
            login(&config, &mut editor, Credentials::new(identity, password)).await?;
            false
        }
        Command::Routes { search } => {
            routes(&config, &mut editor, search.as_deref().unwrap_or_default()).await?;
            false
        }
        command => edit(&mut editor, command)?,
    };

    if changed {
        save(&editor, &args.file)?;
    }

    if report(editor.take_notices()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn open(path: &Path, config: &Config) -> Result<Editor> {
    let editor = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let mut editor = Editor::default();
        editor
            .load_yaml(&text)
            .with_context(|| format!("could not load {}", path.display()))?;
        editor
    } else {
        debug!(path = %path.display(), "working document missing, using sample tree");
        Editor::seeded()
    };

    Ok(editor.with_export_options(config.export))
}

fn save(editor: &Editor, path: &Path) -> Result<()> {
    let text = editor.snapshot_yaml()?;
    std::fs::write(path, text).with_context(|| format!("could not write {}", path.display()))
}

/// Print notices to stderr. Returns true if any of them reports an error.
fn report(notices: Vec<Notice>) -> bool {
    let mut failed = false;
    for notice in notices {
        let label = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("{label}: {notice}");
        failed |= notice.is_error();
    }
    failed
}

/// Run a command which only touches the local tree. Returns whether the tree changed.
fn edit(editor: &mut Editor, command: Command) -> Result<bool> {
    let changed = match command {
        Command::Show => {
            print!("{}", render(editor.forest()));
            false
        }
        Command::AddGroup { name, slug, icon } => {
            editor.add_group(GroupDraft::new(name, slug, icon))
        }
        Command::AddChild {
            parent,
            name,
            slug,
            router,
            component,
            icon,
        } => editor.add_child(&parent, ChildDraft::new(name, slug, icon, router, component)),
        Command::AddAction {
            slug,
            code,
            name,
            resources,
        } => editor.add_action(&slug, PermissionAction::new(code, name, resources)),
        Command::EditNode {
            slug,
            name,
            rename,
            icon,
            router,
            component,
        } => {
            let Some(node) = editor.forest().find(&slug) else {
                bail!("no node with slug \"{slug}\" exists");
            };

            let updated = PermissionNode {
                name: name.unwrap_or_else(|| node.name.clone()),
                slug: rename.unwrap_or_else(|| node.slug.clone()),
                icon: icon.unwrap_or(node.icon),
                router: router.or_else(|| node.router.clone()),
                component: component.or_else(|| node.component.clone()),
                children: None,
                ..node.clone()
            };
            editor.edit_node_at(&slug, updated)
        }
        Command::RemoveAction { slug, code } => editor.remove_action(&slug, &code),
        Command::RemoveChild { parent, slug } => editor.remove_child(&parent, &slug),
        Command::RemoveNode { slug } => editor.remove_node(&slug),
        Command::Move {
            level,
            dragged,
            target,
        } => {
            let moved = editor.move_sibling(&level, &dragged, &target);
            if !moved {
                warn!(%level, %dragged, %target, "nothing moved");
            }
            moved
        }
        Command::Export { select, all, out } => {
            if all {
                editor.select_all();
            }
            for key in select {
                editor.select(key);
            }
            if editor.selected().is_empty() {
                warn!("no actions selected, the export is empty");
            }

            match out {
                Some(out) => {
                    if editor.write_export(&out).is_ok() {
                        eprintln!("wrote {}", out.display());
                    }
                }
                None => print!("{}", editor.export_yaml()?),
            }
            false
        }
        Command::Import { path } => editor.import_file(&path).is_ok(),
        Command::Login { .. } | Command::Routes { .. } => false,
    };

    Ok(changed)
}

fn client(config: &Config) -> Result<Client<Box<dyn TokenStore>>> {
    let tokens: Box<dyn TokenStore> = match &config.token_path {
        Some(path) => Box::new(FileTokenStore::new(path)),
        None => Box::new(MemoryTokenStore::new()),
    };
    Ok(Client::new(&config.base_url, config.request_timeout(), tokens)?)
}

async fn login(config: &Config, editor: &mut Editor, credentials: Credentials) -> Result<()> {
    if config.token_path.is_none() {
        warn!("no token_path configured, the access token is not kept after this run");
    }

    let client = client(config)?;
    client.login(&credentials).await?;
    editor.logged_in();
    eprintln!("logged in as {}", credentials.identity);
    Ok(())
}

async fn routes(config: &Config, editor: &mut Editor, search: &str) -> Result<()> {
    let client = client(config)?;

    editor.routes_loading();
    match client.routes().await {
        Ok(routes) => editor.routes_loaded(routes),
        Err(err) => editor.routes_failed(err.to_string(), err.is_auth_invalid()),
    }

    if editor.login_required() {
        eprintln!("login required, run `permtree login`");
    }

    for route in editor.search_routes(search) {
        println!("{route}");
    }
    Ok(())
}

/// Indented outline of the forest, siblings in display order.
fn render(forest: &Forest) -> String {
    let mut out = String::new();
    for root in forest.display_order() {
        render_node(&mut out, root, 0);
    }
    out
}

fn render_node(out: &mut String, node: &PermissionNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{} ({}) {} #{}", node.name, node.slug, node.icon, node.sequence);
    if let Some(router) = &node.router {
        let _ = write!(out, " {router}");
    }
    out.push('\n');

    for action in &node.actions {
        let resources: Vec<String> = action.resources.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            out,
            "{indent}  - {}: {} -> {}",
            action.code,
            action.name,
            resources.join(", ")
        );
    }

    let mut children: Vec<_> = node.children().iter().collect();
    children.sort_by_key(|child| child.sequence);
    for child in children {
        render_node(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use permtree_core::{ApiResource, Icon, Level};
    use permtree_editor::{Editor, seed};

    use super::{Args, Command, edit, render};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("permtree").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parse_commands() {
        let args = parse(&[
            "--file",
            "tree.yaml",
            "add-action",
            "admin",
            "report",
            "REPORT",
            "-r",
            "get /api/v1/reports",
            "--resource",
            "GET /api/v1/students OWN",
        ]);
        assert_eq!(args.file.to_str(), Some("tree.yaml"));
        let Command::AddAction { resources, .. } = args.command else {
            panic!("expected add-action");
        };
        assert_eq!(
            resources,
            vec![
                ApiResource::new("GET", "/api/v1/reports"),
                ApiResource::new("GET", "/api/v1/students").with_attribute("OWN"),
            ]
        );

        let args = parse(&["move", "children:users", "student", "admin"]);
        let Command::Move { level, .. } = args.command else {
            panic!("expected move");
        };
        assert_eq!(level, Level::Children("users".into()));

        let args = parse(&["add-group", "Reports", "reports", "--icon", "LightningCharge"]);
        let Command::AddGroup { icon, .. } = args.command else {
            panic!("expected add-group");
        };
        assert_eq!(icon, Icon::Zap);
    }

    #[test]
    fn reject_invalid_arguments() {
        let parse = |args: &[&str]| {
            Args::try_parse_from(std::iter::once("permtree").chain(args.iter().copied()))
        };

        assert!(parse(&["add-action", "admin", "report", "REPORT"]).is_err());
        assert!(parse(&["add-group", "Reports", "reports", "--icon", "Star"]).is_err());
        assert!(parse(&["move", "siblings", "a", "b"]).is_err());
        assert!(parse(&["export", "--select", "admin"]).is_err());
    }

    #[test]
    fn edit_commands() {
        let mut editor = Editor::seeded();

        let changed = edit(&mut editor, parse(&["remove-node", "teacher"]).command).unwrap();
        assert!(changed);
        assert!(editor.forest().find("teacher").is_none());

        let changed = edit(
            &mut editor,
            parse(&["edit-node", "student", "--rename", "pupil", "--name", "Pupil"]).command,
        )
        .unwrap();
        assert!(changed);
        let pupil = editor.forest().find("pupil").unwrap();
        assert_eq!(pupil.name, "Pupil");
        assert_eq!(pupil.router.as_deref(), Some("/system/student"));

        assert!(edit(&mut editor, parse(&["edit-node", "ghost"]).command).is_err());

        let changed = edit(&mut editor, parse(&["add-group", "Users", "users"]).command).unwrap();
        assert!(!changed);
        assert_eq!(editor.take_notices().len(), 1);
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data.yaml");
        let out_arg = out.to_str().unwrap();

        let mut editor = Editor::seeded();
        let changed = edit(
            &mut editor,
            parse(&["export", "--select", "admin:add", "--out", out_arg]).command,
        )
        .unwrap();
        assert!(!changed);

        assert!(editor.take_notices().is_empty());

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("code: add"));
        assert!(!text.contains("teacher"));
    }

    #[test]
    fn render_outline() {
        let outline = render(&seed::forest());
        let lines: Vec<&str> = outline.lines().collect();

        assert_eq!(lines[0], "USERS (users) CreditCard #200");
        assert_eq!(lines[1], "  Admin (admin) Zap #2101 /system/admin");
        assert_eq!(lines[2], "    - add: ADD -> GET /api/v1/roles, POST /api/v1/users");
    }
}
