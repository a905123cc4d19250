use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mindmap_graph::config::{SessionConfig, ViewMode, load_config};
use mindmap_graph::graph::search_nodes;
use mindmap_graph::mindmap::JsonFileStore;
use mindmap_graph::util::truncate_chars;
use mindmap_graph::{
    MindmapRemote, MutationCoordinator, MutationOutcome, Scope, VisibilityController, build_graph,
    compute_highlight, render_frame,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Mindmap payload file (`{"nodes": [...], "relationships": [...]}`).
    #[arg(long, global = true, default_value = "mindmap.json")]
    data: PathBuf,

    /// JSON file with color and view settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the render frame for a view as JSON.
    Frame {
        /// Restrict to one chat room.
        #[arg(long, conflicts_with = "node")]
        room: Option<String>,
        /// Restrict to the tree containing this node.
        #[arg(long)]
        node: Option<String>,
        /// Center node; enables collapsing.
        #[arg(long)]
        center: Option<String>,
        #[arg(long)]
        hover: Option<String>,
        /// Click these nodes in order before rendering.
        #[arg(long = "toggle")]
        toggles: Vec<String>,
        /// Group multiple roots of a chat room under one synthetic root.
        #[arg(long)]
        group_rooms: bool,
        #[arg(long, value_parser = parse_view_mode)]
        view_mode: Option<ViewMode>,
    },
    /// Fuzzy-search node titles.
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Detach a node from its parent into a new chat room.
    Split { node_id: String },
    /// Delete a node and its relationships.
    Delete { node_id: String },
}

fn parse_view_mode(value: &str) -> Result<ViewMode, String> {
    match value {
        "2d" => Ok(ViewMode::TwoD),
        "3d" => Ok(ViewMode::ThreeD),
        other => Err(format!("unknown view mode {other:?}; expected 2d or 3d")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    let store = JsonFileStore::new(&args.data);

    match args.command {
        Command::Frame {
            room,
            node,
            center,
            hover,
            toggles,
            group_rooms,
            view_mode,
        } => {
            let scope = match (room, node) {
                (Some(room), _) => Scope::ChatRoom(room),
                (None, Some(node)) => Scope::Subtree(node),
                (None, None) => Scope::All,
            };
            config.graph.chat_room_grouping |= group_rooms;
            if let Some(view_mode) = view_mode {
                config.view_mode = view_mode;
            }

            let data = store.fetch(&scope)?;
            let graph = build_graph(&data, &config.graph.clone().with_center(center.clone()));
            let highlight = compute_highlight(&graph, hover.as_deref());
            let mut visibility = center
                .as_deref()
                .map(|center_id| VisibilityController::initialize(center_id, &graph));
            if let Some(visibility) = visibility.as_mut() {
                for clicked in &toggles {
                    let outcome = visibility.toggle(&graph, clicked);
                    info!(node_id = %clicked, ?outcome, "toggled");
                }
            }

            let frame = render_frame(&graph, &highlight, visibility.as_ref(), config.view_mode);
            print_json(&frame)?;
        }
        Command::Search { query, limit } => {
            let data = store.fetch(&Scope::All)?;
            let graph = build_graph(&data, &config.graph);
            let hits = search_nodes(&graph, &query, limit)
                .into_iter()
                .map(|hit| {
                    let node = &graph.nodes[hit.index];
                    json!({
                        "id": node.id,
                        "title": node.title,
                        "content": truncate_chars(&node.content, 80),
                        "score": hit.score,
                    })
                })
                .collect::<Vec<_>>();
            print_json(&hits)?;
        }
        Command::Split { node_id } => {
            let mut data = store.fetch(&Scope::All)?;
            let outcome = MutationCoordinator::new().split(&mut data, &node_id, &store)?;
            let new_chat_room_id = match outcome {
                MutationOutcome::Split { new_chat_room_id } => Some(new_chat_room_id),
                MutationOutcome::Deleted => None,
            };
            print_json(&json!({ "nodeId": node_id, "newChatRoomId": new_chat_room_id }))?;
        }
        Command::Delete { node_id } => {
            let mut data = store.fetch(&Scope::All)?;
            MutationCoordinator::new().delete(&mut data, &node_id, &store)?;
            print_json(&json!({ "nodeId": node_id, "deleted": true }))?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{rendered}");
    Ok(())
}
