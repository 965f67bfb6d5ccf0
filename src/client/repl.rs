use crate::client::{
    ClientResult, TerminalSnafu,
    connection::Indicator,
    controller::Controller,
    form::StudentForm,
    query::{QueryMode, UnknownMode},
    status::StatusMessage,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use snafu::ResultExt;
use std::{future, ops::ControlFlow};
use tokio::{
    sync::mpsc,
    time::{self, Duration, Instant, MissedTickBehavior},
};

const HELP: &str = "\
Commands:
  add              fill in and submit a new student
  mode <m>         pick a query: all, major, age, count
  filter <value>   set the filter for major/age queries
  run              run the selected query
  reload           fetch every student again
  clear            clear the result area
  status           show connection and status messages
  offline / online tell the client the network went away or came back
  help             show this text
  quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(StudentForm),
    Mode(QueryMode),
    Filter(String),
    Run,
    Reload,
    Clear,
    Status,
    Offline,
    Online,
    Help,
    Quit,
}

///What one typed line turned into.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Empty,
    ///`add` needs more input before it becomes a [`Command::Submit`]
    Add,
    Command(Command),
}

fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(Line::Empty),
        "add" => return Ok(Line::Add),
        "mode" => {
            let mode = rest.parse().map_err(|e: UnknownMode| e.to_string())?;
            Command::Mode(mode)
        }
        "filter" => Command::Filter(rest.to_string()),
        "run" => Command::Run,
        "reload" => Command::Reload,
        "clear" => Command::Clear,
        "status" => Command::Status,
        "offline" => Command::Offline,
        "online" => Command::Online,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };

    Ok(Line::Command(command))
}

fn prompt_student(editor: &mut DefaultEditor) -> Result<StudentForm, ReadlineError> {
    Ok(StudentForm {
        first_name: editor.readline("  First name: ")?,
        last_name: editor.readline("  Last name: ")?,
        age: editor.readline("  Age: ")?,
        major: editor.readline("  Major: ")?,
        subjects: editor.readline("  Subjects (comma separated): ")?,
    })
}

///Runs on its own thread, a line editor can't share the async runtime.
fn read_commands(tx: &mpsc::Sender<Command>) -> ClientResult<()> {
    let mut editor = DefaultEditor::new().context(TerminalSnafu)?;

    loop {
        let line = match editor.readline("roster> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                let _ = tx.blocking_send(Command::Quit);
                return Ok(());
            }
            Err(e) => {
                let _ = tx.blocking_send(Command::Quit);
                return Err(e).context(TerminalSnafu);
            }
        };
        let _ = editor.add_history_entry(line.as_str());

        let command = match parse_line(&line) {
            Ok(Line::Empty) => continue,
            Ok(Line::Add) => match prompt_student(&mut editor) {
                Ok(form) => Command::Submit(form),
                Err(ReadlineError::Interrupted) => {
                    println!("  cancelled");
                    continue;
                }
                Err(e) => {
                    let _ = tx.blocking_send(Command::Quit);
                    return Err(e).context(TerminalSnafu);
                }
            },
            Ok(Line::Command(command)) => command,
            Err(problem) => {
                println!("{problem}");
                continue;
            }
        };

        let quitting = command == Command::Quit;
        if tx.blocking_send(command).is_err() || quitting {
            return Ok(());
        }
    }
}

///Remembers what has already been printed so only changes get shown.
#[derive(Debug, Default)]
struct Screen {
    indicator: Option<Indicator>,
    insert_status: Option<StatusMessage>,
    query_status: Option<StatusMessage>,
    result_revision: u64,
}

impl Screen {
    fn refresh(&mut self, controller: &Controller) {
        let now = Instant::now();

        if self.indicator.as_ref() != Some(controller.indicator()) {
            println!("{}", controller.indicator());
            self.indicator = Some(controller.indicator().clone());
        }

        for (seen, current) in [
            (&mut self.insert_status, controller.insert_status(now)),
            (&mut self.query_status, controller.query_status(now)),
        ] {
            if seen.as_ref() != current {
                if let Some(message) = current {
                    println!("{message}");
                }
                *seen = current.cloned();
            }
        }

        if self.result_revision != controller.result_revision() {
            println!("\n{}", controller.result_area());
            self.result_revision = controller.result_revision();
        }
    }
}

fn print_status(controller: &Controller) {
    let now = Instant::now();
    println!("{}", controller.indicator());
    println!("Mode: {:?}", controller.mode());
    if controller.mode().needs_filter() {
        println!("Filter: {:?}", controller.filter());
    }
    for message in [controller.insert_status(now), controller.query_status(now)]
        .into_iter()
        .flatten()
    {
        println!("{message}");
    }
}

async fn apply(controller: &mut Controller, command: Command) -> ControlFlow<()> {
    match command {
        Command::Submit(form) => {
            *controller.form_mut() = form;
            controller.submit().await;
        }
        Command::Mode(mode) => match controller.select_mode(mode) {
            Some(placeholder) => println!("Set a filter with `filter <{placeholder}>`"),
            None => println!("Mode set, `run` to query"),
        },
        Command::Filter(filter) => controller.set_filter(filter),
        Command::Run => controller.execute_query().await,
        Command::Reload => {
            if !controller.is_connected() {
                controller.check_connection().await;
            }
            controller.load_students().await;
        }
        Command::Clear => controller.clear_results(),
        Command::Status => print_status(controller),
        Command::Offline => controller.network_offline(),
        Command::Online => controller.network_online().await,
        Command::Help => println!("{HELP}"),
        Command::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

async fn reload_timer(due: Option<Instant>) {
    match due {
        Some(due) => time::sleep_until(due).await,
        None => future::pending().await,
    }
}

///Drives the controller until the user quits or the terminal goes away.
pub async fn run(mut controller: Controller, reconnect_every: Duration) -> ClientResult<()> {
    let mut screen = Screen::default();

    controller.on_load().await;
    screen.refresh(&controller);
    println!("Type `help` for a list of commands");

    let (tx, mut commands) = mpsc::channel(16);
    let reader = tokio::task::spawn_blocking(move || read_commands(&tx));

    let mut reconnect = time::interval_at(Instant::now() + reconnect_every, reconnect_every);
    reconnect.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let reload_due = controller.reload_due();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                if apply(&mut controller, command).await.is_break() {
                    break;
                }
            }
            _ = reconnect.tick() => controller.reconnect_tick().await,
            () = reload_timer(reload_due) => controller.run_due_reload(Instant::now()).await,
        }

        screen.refresh(&controller);
    }

    //the reader has sent its last command by now
    match reader.await {
        Ok(result) => result,
        Err(e) => {
            error!(?e, "Input thread panicked");
            Ok(())
        }
    }
}
