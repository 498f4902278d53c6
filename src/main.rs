//! Postbox - Actor-based HTTP request composer
//!
//! Architecture:
//! - Prompt - reads commands from stdin and prints render state
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{mpsc, oneshot};

use postbox::constants::{APP_NAME, APP_VERSION};
use postbox::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use postbox::{AppActor, Config, HttpMethod, NetworkActor, StatusClass, Storage};

const HELP: &str = "\
Request:    method <M> | url <URL> | header <Key: Value> | headers [clear] | body [text] | send
Response:   show | search <text> | next | prev | clear | jq <$.path> | copy
Workspace:  ws new <name> | ws use <name> | col new <name> | col use <name> | ls
Requests:   save | load <n> | rename <n> <name> | delete <n>
Postman:    import <file> | export <file>
            help | quit";

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logging to file
    let (log_dir, log_file) = config.log_location();
    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let store_path = config.store_path();
    let (storage, load_error) = match Storage::open(&store_path) {
        Ok(storage) => (storage, None),
        Err(e) => {
            tracing::warn!(error = %e, path = %store_path.display(), "Failed to load workspaces");
            (Storage::empty(&store_path), Some(e))
        }
    };
    tracing::info!(path = %store_path.display(), "{} {} starting", APP_NAME, APP_VERSION);

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(net_resp_tx);
    let network = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(storage, net_cmd_tx, render_tx);
    let app = tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    println!("{} {} - type 'help' for commands", APP_NAME, APP_VERSION);
    if let Some(e) = load_error {
        println!("! Could not load {}: {}", store_path.display(), e);
    }

    run_prompt(ui_tx, &mut render_rx).await?;

    app.await.context("app actor panicked")?;
    network.await.context("network actor panicked")?;
    Ok(())
}

/// What the next render should print besides notices.
#[derive(Clone, Copy, PartialEq)]
enum Show {
    Nothing,
    Response,
    Editor,
    Tree,
    Json,
}

/// Read commands and print render state until quit or end of input.
async fn run_prompt(
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> Result<()> {
    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();
    let mut current = render_rx.recv().await.unwrap_or_default();
    let mut show = Show::Nothing;
    prompt()?;

    loop {
        tokio::select! {
            state = render_rx.recv() => {
                let Some(state) = state else { break };
                print_changes(&current, &state, show);
                show = Show::Nothing;
                current = state;
                prompt()?;
            }
            line = input.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    let _ = ui_tx.send(UiEvent::Quit);
                    break;
                };
                match handle_line(line.trim(), &current, &mut input, &ui_tx).await {
                    Ok(Action::Quit) => {
                        let _ = ui_tx.send(UiEvent::Quit);
                        break;
                    }
                    Ok(Action::Sent(next)) => show = next,
                    Ok(Action::Idle) => prompt()?,
                    Err(e) => {
                        println!("! {:#}", e);
                        prompt()?;
                    }
                }
            }
        }
    }

    Ok(())
}

enum Action {
    /// An event went to the app actor; a render will follow.
    Sent(Show),
    /// Nothing for the app actor.
    Idle,
    Quit,
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn send(ui_tx: &mpsc::UnboundedSender<UiEvent>, event: UiEvent) -> Result<()> {
    ui_tx
        .send(event)
        .map_err(|_| anyhow::anyhow!("app actor has stopped"))
}

fn parse_index(arg: &str) -> Result<usize> {
    arg.parse::<usize>()
        .with_context(|| format!("'{}' is not a request number", arg))
}

/// Map one input line to UI events.
async fn handle_line(
    line: &str,
    current: &RenderState,
    input: &mut Input,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) -> Result<Action> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let (event, show) = match (cmd, rest) {
        ("", _) => return Ok(Action::Idle),
        ("help", _) => {
            println!("{}", HELP);
            return Ok(Action::Idle);
        }
        ("quit" | "exit", _) => return Ok(Action::Quit),

        // Request editor
        ("method", m) => {
            let method = HttpMethod::parse(m)
                .with_context(|| format!("unknown method '{}'", m))?;
            (UiEvent::SetMethod(method), Show::Editor)
        }
        ("url", url) => (UiEvent::SetUrl(url.to_string()), Show::Editor),
        ("header", h) => {
            let mut text = current.headers_text.clone();
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(h);
            (UiEvent::SetHeaders(text), Show::Editor)
        }
        ("headers", "clear") => (UiEvent::SetHeaders(String::new()), Show::Editor),
        ("headers", _) => {
            print!("{}", current.headers_text);
            return Ok(Action::Idle);
        }
        ("body", "") => {
            println!("Enter the body, end with a single '.' line:");
            let mut body = Vec::new();
            while let Some(line) = input.next_line().await? {
                if line == "." {
                    break;
                }
                body.push(line);
            }
            (UiEvent::SetBody(body.join("\n")), Show::Editor)
        }
        ("body", text) => (UiEvent::SetBody(text.to_string()), Show::Editor),
        ("send", _) => {
            println!("Sending {} {} ...", current.method, current.url);
            (UiEvent::SendRequest, Show::Nothing)
        }

        // Response
        ("show", _) => {
            print_response(current);
            return Ok(Action::Idle);
        }
        ("search", q) => (UiEvent::Search(q.to_string()), Show::Response),
        ("next", _) => (UiEvent::NextMatch, Show::Response),
        ("prev", _) => (UiEvent::PrevMatch, Show::Response),
        ("clear", _) => (UiEvent::ClearSearch, Show::Response),
        ("jq", path) => (UiEvent::JsonQuery(path.to_string()), Show::Json),
        ("copy", _) => {
            let (tx, rx) = oneshot::channel();
            send(ui_tx, UiEvent::CopyResponse(tx))?;
            println!("{}", rx.await?);
            return Ok(Action::Sent(Show::Nothing));
        }

        // Workspace tree
        ("ws", rest) => match rest.split_once(' ') {
            Some(("new", name)) => (UiEvent::CreateWorkspace(name.to_string()), Show::Tree),
            Some(("use", name)) => (UiEvent::SelectWorkspace(name.to_string()), Show::Tree),
            _ => anyhow::bail!("usage: ws new <name> | ws use <name>"),
        },
        ("col", rest) => match rest.split_once(' ') {
            Some(("new", name)) => (UiEvent::CreateCollection(name.to_string()), Show::Tree),
            Some(("use", name)) => (UiEvent::SelectCollection(name.to_string()), Show::Tree),
            _ => anyhow::bail!("usage: col new <name> | col use <name>"),
        },
        ("ls", _) => {
            print_tree(current);
            return Ok(Action::Idle);
        }

        // Saved requests
        ("save", _) => (UiEvent::SaveRequest, Show::Tree),
        ("load", n) => (UiEvent::LoadRequest(parse_index(n)?), Show::Editor),
        ("rename", args) => {
            let (n, name) = args
                .split_once(' ')
                .context("usage: rename <n> <name>")?;
            let event = UiEvent::RenameRequest {
                index: parse_index(n)?,
                name: name.trim().to_string(),
            };
            (event, Show::Tree)
        }
        ("delete", n) => {
            let index = parse_index(n)?;
            let Some(name) = current.requests.get(index) else {
                anyhow::bail!("no request {}", index);
            };
            println!("Delete request '{}'? [y/N]", name);
            let answer = input.next_line().await?.unwrap_or_default();
            if !answer.trim().eq_ignore_ascii_case("y") {
                return Ok(Action::Idle);
            }
            (UiEvent::DeleteRequest(index), Show::Tree)
        }

        // Postman
        ("import", path) => {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path))?;
            (UiEvent::ImportPostman(data), Show::Tree)
        }
        ("export", path) => {
            let (tx, rx) = oneshot::channel();
            send(ui_tx, UiEvent::ExportPostman(tx))?;
            match rx.await? {
                Ok(bytes) => {
                    let path = PathBuf::from(path);
                    tokio::fs::write(&path, bytes)
                        .await
                        .with_context(|| format!("Write error: {}", path.display()))?;
                    tracing::info!(path = %path.display(), "Collection exported");
                    println!("Exported to {}", path.display());
                }
                Err(msg) => println!("! {}", msg),
            }
            return Ok(Action::Sent(Show::Nothing));
        }

        (other, _) => anyhow::bail!("unknown command '{}', try 'help'", other),
    };

    send(ui_tx, event)?;
    Ok(Action::Sent(show))
}

fn print_changes(old: &RenderState, new: &RenderState, show: Show) {
    if let Some(msg) = &new.message {
        if old.message.as_ref() != Some(msg) || show != Show::Nothing {
            println!("! {}", msg);
        }
    }
    if new.response_revision != old.response_revision {
        print_response(new);
        return;
    }
    match show {
        Show::Response => print_response(new),
        Show::Editor => print_editor(new),
        Show::Tree => print_tree(new),
        Show::Json if new.message.is_none() => println!("{}", new.json_output),
        Show::Json | Show::Nothing => {}
    }
}

fn print_editor(state: &RenderState) {
    println!("{} {}", state.method, state.url);
    print!("{}", state.headers_text);
    if !state.body.is_empty() {
        println!("\n{}", state.body);
    }
}

fn print_response(state: &RenderState) {
    if !state.status_label.is_empty() {
        let marker = match state.status_class {
            Some(StatusClass::Success) => "+",
            Some(StatusClass::Error) => "x",
            _ => "-",
        };
        println!("[{}] {}    {}", marker, state.status_label, state.meta_line);
        print!("{}", state.response_headers);
        println!();
    }
    println!("{}", state.response_text);
    if let Some(counter) = state.match_counter() {
        match state.current_match_line {
            Some(line) => println!("-- {} (line {})", counter, line + 1),
            None => println!("-- {}", counter),
        }
    }
}

fn print_tree(state: &RenderState) {
    for ws in &state.workspaces {
        let selected = state.selected_workspace.as_ref() == Some(ws);
        println!("{} {}", if selected { "*" } else { " " }, ws);
        if !selected {
            continue;
        }
        for (i, col) in state.collections.iter().enumerate() {
            let active = state.selected_collection == Some(i);
            println!("    {} {}", if active { "*" } else { " " }, col);
            if active {
                for (j, req) in state.requests.iter().enumerate() {
                    println!("        [{}] {}", j, req);
                }
            }
        }
    }
}
