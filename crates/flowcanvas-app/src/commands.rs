//! Subcommand implementations.

use crate::cli::{Cli, Command, ReplayArgs, SourceArgs, StoreArgs};
use crate::error::{AppError, AppResult};
use crate::shortcuts::ShortcutRegistry;
use flowcanvas_core::config::EditorConfig;
use flowcanvas_core::editor::EditorSession;
use flowcanvas_core::graph::WorkflowGraph;
use flowcanvas_core::input::CanvasEvent;
use flowcanvas_core::interaction::{EditorEffect, ModeKind};
use flowcanvas_core::storage::{FileStorage, Storage};
use flowcanvas_core::workflow::WorkflowDefinition;
use flowcanvas_render::{GridStyle, RenderContext, Renderer, SvgRenderer, parse_hex_color, project};
use kurbo::Size;
use peniko::Color;
use pollster::block_on;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Outcome of a replay.
#[derive(Debug)]
pub struct ReplayReport {
    pub definition: WorkflowDefinition,
    pub events: usize,
    pub graph_changes: usize,
    /// Mode after the last event; anything but idle means a gesture was left open.
    pub final_mode: ModeKind,
}

pub fn run(cli: Cli) -> AppResult<()> {
    match cli.command {
        Command::Replay(args) => {
            let report = replay(&args)?;
            log::info!(
                "Replayed {} events, {} graph changes, final mode {:?}",
                report.events,
                report.graph_changes,
                report.final_mode
            );
            if args.output.is_none() && !args.save {
                println!("{}", report.definition.to_json()?);
            }
        }
        Command::Inspect(source) => {
            let definition = load_source(&source)?;
            print!("{}", summarize(&definition));
        }
        Command::List(store) => {
            let storage = open_store(&store)?;
            for id in block_on(storage.list())? {
                println!("{}", id);
            }
        }
        Command::Shortcuts => print!("{}", ShortcutRegistry::describe()),
    }
    Ok(())
}

fn read_file(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> AppResult<()> {
    fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn open_store(args: &StoreArgs) -> AppResult<FileStorage> {
    let storage = match &args.store {
        Some(dir) => FileStorage::new(dir.clone())?,
        None => FileStorage::default_location()?,
    };
    log::debug!("Using workflow store at {}", storage.base_path().display());
    Ok(storage)
}

/// Read the workflow named by `--file` or `--id`.
pub fn load_source(source: &SourceArgs) -> AppResult<WorkflowDefinition> {
    match (&source.file, &source.id) {
        (Some(path), _) => {
            WorkflowDefinition::from_json(&read_file(path)?).map_err(|source| AppError::Json {
                path: path.clone(),
                source,
            })
        }
        (None, Some(id)) => Ok(block_on(open_store(&source.store)?.load(id))?),
        (None, None) => Err(AppError::Usage("either --file or --id is required".to_string())),
    }
}

fn parse_color(color: &str) -> AppResult<Color> {
    parse_hex_color(color).ok_or_else(|| AppError::Usage(format!("invalid color '{}'", color)))
}

fn load_config(path: Option<&Path>) -> AppResult<EditorConfig> {
    match path {
        Some(path) => EditorConfig::from_json(&read_file(path)?).map_err(|source| AppError::Json {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(EditorConfig::default()),
    }
}

fn load_events(path: &Path) -> AppResult<Vec<CanvasEvent>> {
    serde_json::from_str(&read_file(path)?).map_err(|source| AppError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a workflow, apply the event script and write every requested output.
pub fn replay(args: &ReplayArgs) -> AppResult<ReplayReport> {
    let grid = GridStyle::from_name(&args.grid)
        .ok_or_else(|| AppError::Usage(format!("unknown grid style '{}'", args.grid)))?;
    let background = args.background.as_deref().map(parse_color).transpose()?;
    let selection_color = args.selection_color.as_deref().map(parse_color).transpose()?;
    let viewport = Size::new(args.width, args.height);
    let config = load_config(args.config.as_deref())?;
    let events = load_events(&args.events)?;

    let mut session = match (&args.source.file, &args.source.id) {
        (None, None) => EditorSession::new(config),
        _ => EditorSession::load(load_source(&args.source)?, config),
    };
    if args.fit {
        session.fit_to_content(viewport);
    }

    let count = events.len();
    let effects = session.dispatch_all(events);
    let graph_changes = effects
        .iter()
        .filter(|e| matches!(e, EditorEffect::GraphChanged(_)))
        .count();
    let final_mode = session.mode().kind();
    if final_mode != ModeKind::Idle {
        log::warn!("Event script ended in {:?} mode", final_mode);
    }

    let definition = session.definition();

    if let Some(path) = &args.output {
        write_file(path, &definition.to_json()?)?;
        log::info!("Wrote {}", path.display());
    }
    if args.save {
        let id = args
            .source
            .id
            .as_deref()
            .ok_or_else(|| AppError::Usage("--save requires --id".to_string()))?;
        let storage = open_store(&args.source.store)?;
        block_on(storage.save(id, &definition))?;
        session.mark_saved();
        log::info!("Saved workflow '{}'", id);
    }
    if let Some(path) = &args.svg {
        let mut ctx = RenderContext::new(&session, viewport).with_grid(grid);
        if let Some(color) = background {
            ctx = ctx.with_background(color);
        }
        if let Some(color) = selection_color {
            ctx = ctx.with_selection_color(color);
        }
        let mut renderer = SvgRenderer::new();
        renderer.render(&project(&ctx))?;
        write_file(path, renderer.svg())?;
        log::info!("Rendered {}", path.display());
    }

    Ok(ReplayReport {
        definition,
        events: count,
        graph_changes,
        final_mode,
    })
}

/// Human-readable summary of a workflow, including what loading would drop.
pub fn summarize(definition: &WorkflowDefinition) -> String {
    let graph = WorkflowGraph::from_definition(definition.clone());
    let name_of = |id| graph.step(id).map(|s| s.name.as_str()).unwrap_or("?");

    let mut out = String::new();
    let _ = writeln!(out, "Workflow: {} ({})", graph.name, graph.id);
    let _ = writeln!(out, "Steps: {}", graph.step_count());
    let _ = writeln!(out, "Transitions: {}", graph.transition_count());
    let _ = writeln!(
        out,
        "Start step: {}",
        graph.start_step().map(name_of).unwrap_or("none")
    );

    let dropped_steps = definition.steps.len() - graph.step_count();
    let dropped_transitions = definition.transitions.len() - graph.transition_count();
    if dropped_steps + dropped_transitions > 0 {
        let _ = writeln!(
            out,
            "Dropped on load: {} steps, {} transitions",
            dropped_steps, dropped_transitions
        );
    }

    for step in graph.steps_ordered() {
        let _ = writeln!(
            out,
            "  [{}] {} at ({}, {}){}",
            step.kind.label(),
            step.name,
            step.position.x,
            step.position.y,
            if step.is_start() { " *start" } else { "" }
        );
    }
    for transition in graph.transitions_ordered() {
        let guard = transition
            .condition
            .as_ref()
            .map(|c| format!(" [{}]", c.label()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} -> {}{}",
            name_of(transition.from()),
            name_of(transition.to()),
            guard
        );
    }
    out
}
