use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use personal_diary::cli::{self, Cli, Commands, PromptConfirm};
use personal_diary::config::Config;
use personal_diary::ui::{Action, UI};
use personal_diary::{DiaryController, DiaryState, FileStore, Notice};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::info;

type Controller = DiaryController<FileStore>;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::new(cli.data_dir, cli.log_level);
    let mut controller = DiaryController::new(DiaryState::new(config.store()));

    match cli.command {
        None => {
            init_file_logging(&config)?;
            info!(data_dir = %config.data_dir().display(), "opening diary");
            run_tui(&mut controller)
        }
        Some(command) => {
            tracing_subscriber::fmt()
                .with_env_filter(config.log_filter("warn"))
                .with_writer(io::stderr)
                .init();
            run_command(command, &mut controller, &config)
        }
    }
}

/// The TUI owns the terminal, so logs go to a file next to the diary.
fn init_file_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(config.data_dir())
        .wrap_err_with(|| format!("Failed to create {}", config.data_dir().display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())
        .wrap_err("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter("info"))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(controller: &mut Controller) -> Result<()> {
    let mut ui = UI::new()?;

    loop {
        let view = controller.view();
        ui.display(&view)?;

        if let Some(action) = ui.next_action(&view)? {
            match action {
                Action::Write => {
                    if let Some((title, content)) = ui.compose_entry()? {
                        let notice = controller.save(&title, &content);
                        ui.set_notice(notice);
                    }
                }
                Action::Open(entry) => {
                    ui.view_full_entry(&entry)?;
                }
                Action::Delete(id) => {
                    let notice = controller.delete(&id, &mut ui)?;
                    ui.set_notice(notice);
                }
                Action::ClearAll => {
                    let notice = controller.clear_all(&mut ui)?;
                    ui.set_notice(notice);
                }
                Action::Quit => break,
            }
        }
    }

    info!("closing diary");
    Ok(())
}

fn run_command(command: Commands, controller: &mut Controller, config: &Config) -> Result<()> {
    let notice = match command {
        Commands::List => {
            cli::handle_list(controller, &mut io::stdout().lock())?;
            return Ok(());
        }
        Commands::Path => {
            println!("{}", config.entries_file().display());
            return Ok(());
        }
        Commands::Add { title, content } => {
            cli::handle_add(controller, &title, content, &mut io::stdin().lock())?
        }
        Commands::Delete { id, yes } => {
            let mut prompt = PromptConfirm::new(io::stdin().lock(), io::stderr());
            cli::handle_delete(controller, &id, yes, &mut prompt)?
        }
        Commands::Clear { yes } => {
            let mut prompt = PromptConfirm::new(io::stdin().lock(), io::stderr());
            cli::handle_clear(controller, yes, &mut prompt)?
        }
    };
    report(notice)
}

fn report(notice: Notice) -> Result<()> {
    if notice.is_error() {
        return Err(eyre!(notice.message()));
    }
    writeln!(io::stdout(), "{notice}")?;
    Ok(())
}
