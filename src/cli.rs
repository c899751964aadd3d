use crate::clock::{Clock, RandomSource};
use crate::controller::{escape_line, Confirm, DiaryController, Notice};
use crate::error::Result;
use crate::storage::KeyValueStore;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "personal_diary")]
#[command(version, about = "A local, single-user terminal diary")]
pub struct Cli {
    /// Directory holding the diary file and log
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "personal_diary=trace" (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Runs the interactive diary when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List entries, newest first
    List,

    /// Write a new entry
    Add {
        /// Entry title (optional)
        #[arg(short, long, default_value = "")]
        title: String,

        /// Entry text; read from stdin when omitted
        content: Option<String>,
    },

    /// Delete one entry by id
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the location of the diary file
    Path,
}

/// y/N prompt on a line-oriented reader. End of input counts as "no".
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptConfirm { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        write!(self.output, "{prompt} [y/N] ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        let answer = answer.trim().to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

pub fn handle_list<S, C, R>(controller: &DiaryController<S, C, R>, out: &mut impl Write) -> Result<()>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    let view = controller.view();
    if let Some(warning) = &view.storage_warning {
        writeln!(out, "warning: {warning}")?;
    }
    if let Some(placeholder) = view.placeholder() {
        writeln!(out, "{placeholder}")?;
        return Ok(());
    }

    for entry in &view.entries {
        writeln!(
            out,
            "{}  {}  ({})",
            entry.timestamp,
            entry.title,
            escape_line(&entry.id)
        )?;
        for line in entry.content.lines() {
            writeln!(out, "    {line}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn handle_add<S, C, R>(
    controller: &mut DiaryController<S, C, R>,
    title: &str,
    content: Option<String>,
    stdin: &mut impl BufRead,
) -> Result<Notice>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(controller.save(title, &content))
}

pub fn handle_delete<S, C, R>(
    controller: &mut DiaryController<S, C, R>,
    id: &str,
    yes: bool,
    confirm: &mut impl Confirm,
) -> Result<Notice>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    if yes {
        controller.delete(id, &mut |_: &str| true)
    } else {
        controller.delete(id, confirm)
    }
}

pub fn handle_clear<S, C, R>(
    controller: &mut DiaryController<S, C, R>,
    yes: bool,
    confirm: &mut impl Confirm,
) -> Result<Notice>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    if yes {
        controller.clear_all(&mut |_: &str| true)
    } else {
        controller.clear_all(confirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SequenceRandom};
    use crate::diary_state::DiaryState;
    use crate::storage::{MemoryStore, STORAGE_KEY};
    use std::io::Cursor;

    #[test]
    fn prompt_accepts_yes_variants_only() {
        for (input, expected) in [
            ("y\n", true),
            ("YES\n", true),
            (" yes \n", true),
            ("n\n", false),
            ("\n", false),
            ("maybe\n", false),
            ("", false),
        ] {
            let mut output = Vec::new();
            let mut prompt = PromptConfirm::new(Cursor::new(input), &mut output);
            assert_eq!(prompt.confirm("Sure?").unwrap(), expected, "input {input:?}");
            assert!(String::from_utf8(output).unwrap().starts_with("Sure? [y/N] "));
        }
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["personal_diary", "add", "-t", "Hi", "body"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                title: "Hi".into(),
                content: Some("body".into())
            })
        );

        let cli =
            Cli::try_parse_from(["personal_diary", "delete", "abc", "--yes", "--data-dir", "/d"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Delete {
                id: "abc".into(),
                yes: true
            })
        );
        assert_eq!(cli.data_dir, Some(PathBuf::from("/d")));

        let cli = Cli::try_parse_from(["personal_diary"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn add_reads_stdin_when_content_is_missing_and_list_prints_it() {
        let clock = ManualClock::new(0);
        let random = SequenceRandom::new(vec![1]);
        let mut controller =
            DiaryController::new(DiaryState::with_sources(MemoryStore::new(), &clock, &random));

        let mut stdin = Cursor::new("from stdin\nsecond line\n");
        let notice = handle_add(&mut controller, "", None, &mut stdin).unwrap();
        assert_eq!(
            notice,
            Notice::Saved {
                title: "untitled".into()
            }
        );

        let mut out = Vec::new();
        handle_list(&controller, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("untitled"));
        assert!(out.contains("    from stdin\n    second line\n"));
    }

    #[test]
    fn list_escapes_control_characters_in_ids() {
        let mut store = MemoryStore::new();
        store
            .set(
                STORAGE_KEY,
                r#"[{"id":"x[2Jy","title":"t","content":"c","timestamp":1}]"#,
            )
            .unwrap();
        let controller = DiaryController::new(DiaryState::new(store));

        let mut out = Vec::new();
        handle_list(&controller, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("(x^[[2Jy)"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn list_of_empty_diary_prints_placeholder() {
        let controller = DiaryController::new(DiaryState::new(MemoryStore::new()));
        let mut out = Vec::new();
        handle_list(&controller, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No entries yet. Write your first one!\n"
        );
    }

    #[test]
    fn yes_flag_skips_the_prompt() {
        let mut controller = DiaryController::new(DiaryState::new(MemoryStore::new()));
        controller.save("", "a");
        let id = controller.view().entries[0].id.clone();

        let mut never = |_: &str| -> bool { panic!("prompt should be skipped") };
        assert_eq!(
            handle_delete(&mut controller, &id, true, &mut never).unwrap(),
            Notice::Deleted
        );
        assert_eq!(
            handle_clear(&mut controller, true, &mut never).unwrap(),
            Notice::Cleared
        );
    }
}
