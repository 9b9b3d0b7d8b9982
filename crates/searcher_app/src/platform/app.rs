use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::bail;
use engine_logging::{engine_debug, engine_info, LogDestination};
use searcher_core::{update, AppState, Msg, TypeChoice};
use searcher_engine::HistoryStore;

use super::cli::{CliArgs, LogMode};
use super::config::{self, FileConfig};
use super::effects::EffectRunner;
use super::input::{parse_command, InputCommand, HELP};
use super::ui::render::{render_history, TerminalRenderer};

const TICK: Duration = Duration::from_millis(75);

/// Everything the main loop reacts to.
pub enum LoopEvent {
    Msg(Msg),
    Input(InputCommand),
    InputClosed,
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
    /// Page requested on the command line, applied once results arrive.
    requested_page: Option<usize>,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);

        if state.results_ready() {
            if let Some(page) = self.requested_page.take() {
                let (next, effects) = update(state, Msg::PageSelected(page));
                self.runner.enqueue(effects);
                state = next;
            }
        }

        let was_dirty = state.consume_dirty();
        self.state = state;
        if was_dirty {
            let text = self.renderer.render(&self.state.view());
            if !text.is_empty() {
                let mut stdout = io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    fn search(&mut self, query: String) {
        self.dispatch(Msg::InputChanged(query));
        self.dispatch(Msg::SearchSubmitted);
    }

    /// Returns false when the user asked to quit.
    fn handle_input(&mut self, command: InputCommand) -> bool {
        match command {
            InputCommand::Search(query) => self.search(query),
            InputCommand::ToggleType(choice) => self.dispatch(Msg::TypeToggled(choice)),
            InputCommand::Page(page) => self.dispatch(Msg::PageSelected(page)),
            InputCommand::History => print!("{}", render_history(self.state.history())),
            InputCommand::Recall(position) => {
                let entry = position
                    .checked_sub(1)
                    .and_then(|index| self.state.history().get(index))
                    .cloned();
                match entry {
                    Some(query) => self.dispatch(Msg::HistorySelected(query)),
                    None => eprintln!("No history entry {position}"),
                }
            }
            InputCommand::Help => println!("{HELP}"),
            InputCommand::Quit => return false,
            InputCommand::Invalid(line) => eprintln!("Unrecognised command: {line} (try :help)"),
        }
        true
    }

    fn is_busy(&self) -> bool {
        self.state.phase().is_open()
    }
}

pub fn run_app(args: CliArgs) -> anyhow::Result<()> {
    let file_config = match &args.config {
        Some(path) => config::load_file_config(path)?,
        None => FileConfig::default(),
    };
    let config = config::resolve(&args, file_config)?;
    engine_logging::initialize(log_destination(config.log), &config.log_file, config.log_level);
    engine_info!("Starting searcher against {}", config.stream.endpoint);

    let history = HistoryStore::new(config.history_dir.clone());
    if args.show_history {
        print!("{}", render_history(&history.load()));
        return Ok(());
    }
    if args.query.is_none() && !args.interactive {
        bail!("no query given; pass a query or use --interactive");
    }

    let (loop_tx, loop_rx) = mpsc::channel();
    let runner = EffectRunner::new(config.stream.clone(), history, loop_tx.clone());
    let mut app = App {
        state: AppState::new(),
        renderer: TerminalRenderer::new(config.origin.clone()),
        requested_page: (args.page != 1).then_some(args.page),
        runner,
    };

    let stored = app.runner.load_history();
    app.dispatch(Msg::HistoryLoaded(stored));
    for doc_type in &config.types {
        app.dispatch(Msg::TypeToggled(TypeChoice::Type(*doc_type)));
    }
    if args.interactive {
        println!("{HELP}");
        spawn_input_reader(loop_tx.clone());
    }
    drop(loop_tx);
    if let Some(query) = args.query.clone() {
        app.search(query);
    }

    let mut input_closed = false;
    loop {
        let event = match loop_rx.recv_timeout(TICK) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => LoopEvent::Msg(Msg::Tick),
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            LoopEvent::Msg(msg) => app.dispatch(msg),
            LoopEvent::Input(command) => {
                if !app.handle_input(command) {
                    break;
                }
            }
            LoopEvent::InputClosed => {
                engine_debug!("Input closed");
                input_closed = true;
            }
        }

        let waiting_for_input = args.interactive && !input_closed;
        if !waiting_for_input && !app.is_busy() {
            break;
        }
    }

    engine_info!("Exiting");
    Ok(())
}

fn spawn_input_reader(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = parse_command(&line) {
                if loop_tx.send(LoopEvent::Input(command)).is_err() {
                    return;
                }
            }
        }
        let _ = loop_tx.send(LoopEvent::InputClosed);
    });
}

fn log_destination(mode: LogMode) -> LogDestination {
    match mode {
        LogMode::File => LogDestination::File,
        LogMode::Terminal => LogDestination::Terminal,
        LogMode::Both => LogDestination::Both,
        LogMode::Off => LogDestination::Off,
    }
}
