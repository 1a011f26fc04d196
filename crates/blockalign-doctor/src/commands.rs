use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use blockalign::{
    AlignAttribute, AlignState, AlignToken, BlockRegistry, Editor, OptionSet, PluginManifest,
    ToolbarButton, toolbar as align_toolbar, validate,
};
use clap::Args;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{DoctorError, Result};

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Plugin manifest (TOML, or JSON by extension). Defaults to the
    /// built-in align-hook test plugin.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListBlocksArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ToolbarArgs {
    /// Block name or title.
    #[arg(long)]
    pub block: String,

    /// Stored alignment: a token, `null` or `unset`.
    #[arg(long, default_value = "unset")]
    pub align: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Block name or title.
    #[arg(long)]
    pub block: String,

    /// Toolbar control to click, by token or label. Repeatable.
    #[arg(long = "click")]
    pub clicks: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Markup file, or `-` for stdin.
    pub path: PathBuf,

    /// Require exactly one block.
    #[arg(long)]
    pub single: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

fn load_registry(common: &CommonArgs) -> Result<BlockRegistry> {
    let manifest = match &common.manifest {
        Some(path) => PluginManifest::from_file(path)?,
        None => PluginManifest::align_hook_fixture(),
    };
    Ok(manifest.build_registry()?)
}

fn write_json(out: &mut impl Write, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn state_label(state: AlignState) -> String {
    match state {
        AlignState::Unset => "unset".to_string(),
        AlignState::Default(token) => format!("default({token})"),
        AlignState::Explicit(token) => format!("explicit({token})"),
        AlignState::Cleared => "cleared".to_string(),
    }
}

fn parse_stored(raw: &str) -> Result<AlignAttribute> {
    match raw {
        "unset" => Ok(AlignAttribute::Unset),
        "null" => Ok(AlignAttribute::Null),
        token => token
            .parse()
            .map(AlignAttribute::Value)
            .map_err(|err| DoctorError::invalid(format!("--align: {err}"))),
    }
}

fn parse_click(raw: &str) -> Result<AlignToken> {
    AlignToken::from_label(raw)
        .or_else(|| raw.parse().ok())
        .ok_or_else(|| DoctorError::invalid(format!("--click: unknown alignment {raw:?}")))
}

fn buttons_json(buttons: &[ToolbarButton]) -> Value {
    buttons
        .iter()
        .map(|b| json!({ "label": b.label, "token": b.token, "pressed": b.pressed }))
        .collect()
}

pub fn list_blocks(args: &ListBlocksArgs, out: &mut impl Write) -> Result<()> {
    let registry = load_registry(&args.common)?;
    let settings = registry.settings();
    let rows: Vec<_> = registry
        .iter()
        .map(|block| {
            let options = OptionSet::resolve_with(block.alignment_config(), settings);
            (block, options)
        })
        .collect();

    if args.common.json {
        let blocks: Vec<Value> = rows
            .iter()
            .map(|(block, options)| {
                json!({
                    "name": block.name(),
                    "title": block.title(),
                    "options": options.as_slice(),
                    "default": block.alignment_config().default_token(),
                })
            })
            .collect();
        return write_json(
            out,
            &json!({ "wide_alignment": settings.wide_alignment, "blocks": blocks }),
        );
    }

    for (block, options) in rows {
        let options = if options.is_empty() {
            "-".to_string()
        } else {
            options
                .iter()
                .map(AlignToken::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };
        let default = block
            .alignment_config()
            .default_token()
            .map_or("-", AlignToken::as_str);
        writeln!(
            out,
            "{}\t{}\toptions={options}\tdefault={default}",
            block.name(),
            block.title()
        )?;
    }
    Ok(())
}

pub fn toolbar(args: &ToolbarArgs, out: &mut impl Write) -> Result<()> {
    let registry = load_registry(&args.common)?;
    let block = registry
        .find(&args.block)
        .ok_or_else(|| DoctorError::BlockNotFound {
            name: args.block.clone(),
        })?;
    let stored = parse_stored(&args.align)?;
    let settings = registry.settings();
    let buttons = align_toolbar::project_for(block.alignment_config(), stored, settings);

    if args.common.json {
        return write_json(
            out,
            &json!({
                "block": block.name(),
                "stored": stored.to_string(),
                "effective": block.effective(stored, settings),
                "buttons": buttons_json(&buttons),
            }),
        );
    }

    if buttons.is_empty() {
        writeln!(out, "(no alignment controls)")?;
    }
    for button in &buttons {
        let mark = if button.pressed { "x" } else { " " };
        writeln!(out, "[{mark}] {}", button.label)?;
    }
    Ok(())
}

pub fn apply(args: &ApplyArgs, out: &mut impl Write) -> Result<()> {
    let registry = load_registry(&args.common)?;
    let mut editor = Editor::new(registry);
    let id = editor.insert_block(&args.block).map_err(|_| DoctorError::BlockNotFound {
        name: args.block.clone(),
    })?;

    for raw in &args.clicks {
        let token = parse_click(raw)?;
        if !editor.click(&token.label())? {
            return Err(DoctorError::invalid(format!(
                "`{}` is not offered by {}",
                token.label(),
                args.block
            )));
        }
    }

    let markup = editor.edited_content();
    let state = editor
        .block(id)
        .map_or(AlignState::Unset, |b| b.align_state(editor.registry()));
    tracing::info!(message = "doctor.apply", client_id = %id, state = %state_label(state));

    if args.common.json {
        return write_json(
            out,
            &json!({
                "block": editor.block(id).map(|b| b.name().to_string()),
                "state": state_label(state),
                "toolbar": buttons_json(&editor.toolbar()),
                "markup": markup,
            }),
        );
    }
    writeln!(out, "{markup}")?;
    Ok(())
}

/// One block of a `check` report.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub client_id: String,
    pub name: String,
    pub valid: bool,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of checking a document.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub total: usize,
    pub invalid: usize,
    pub blocks: Vec<BlockReport>,
}

fn read_markup(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut markup = String::new();
        std::io::stdin().read_to_string(&mut markup)?;
        Ok(markup)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub fn check(args: &CheckArgs, out: &mut impl Write) -> Result<()> {
    let registry = load_registry(&args.common)?;
    let markup = read_markup(&args.path)?;

    if args.single {
        let validated = validate(&registry, &markup)?;
        if args.common.json {
            return write_json(
                out,
                &json!({
                    "name": validated.name,
                    "state": state_label(validated.state),
                    "valid": true,
                }),
            );
        }
        writeln!(out, "ok\t{}\t{}", validated.name, state_label(validated.state))?;
        return Ok(());
    }

    let mut editor = Editor::new(registry);
    editor.set_content(&markup)?;
    let blocks: Vec<BlockReport> = editor
        .blocks()
        .iter()
        .map(|b| BlockReport {
            client_id: b.client_id().to_string(),
            name: b.name().to_string(),
            valid: b.is_valid(),
            state: state_label(b.align_state(editor.registry())),
            reason: b.invalid_reason().map(ToString::to_string),
        })
        .collect();
    let report = CheckReport {
        total: blocks.len(),
        invalid: blocks.iter().filter(|b| !b.valid).count(),
        blocks,
    };

    if args.common.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        for block in &report.blocks {
            match &block.reason {
                None => writeln!(
                    out,
                    "ok\t{}\t{}\t{}",
                    block.client_id, block.name, block.state
                )?,
                Some(reason) => writeln!(
                    out,
                    "FAIL\t{}\t{}\t{reason}",
                    block.client_id, block.name
                )?,
            }
        }
    }

    let CheckReport { total, invalid, .. } = report;
    if invalid > 0 {
        return Err(DoctorError::CheckFailed { invalid, total });
    }
    Ok(())
}
