use clap::Parser;

use histfix::cli::{Cli, Command, PromptConfirm, PromptSelect};
use histfix::fixup::{list_history_files, run_fixup, AssumeYes, FixupOptions};
use histfix::plan::plan_matches;
use histfix::{HfResult, Match};

fn main() {
    histfix::logging::init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> HfResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fixup(args) => {
            let (data_root, history_dir) = args.location.resolve()?;
            let options = FixupOptions {
                dry_run: args.dry_run,
            };
            let summary = if args.yes {
                run_fixup(&data_root, &history_dir, options, &PromptSelect, &AssumeYes)?
            } else {
                run_fixup(
                    &data_root,
                    &history_dir,
                    options,
                    &PromptSelect,
                    &PromptConfirm,
                )?
            };
            println!(
                "applied {}, planned {}, declined {}, failed {}, missing raw {}, missing header {}",
                summary.applied,
                summary.planned,
                summary.declined,
                summary.failed,
                summary.missing_raw,
                summary.missing_header
            );
            Ok(())
        }
        Command::Plan(args) => {
            let (data_root, history_dir) = args.location.resolve()?;
            let history_files = list_history_files(&history_dir)?;
            let matches = plan_matches(&data_root, &history_files, &PromptSelect)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for m in &matches {
                    println!("{}", describe(m));
                }
            }
            Ok(())
        }
    }
}

fn describe(m: &Match) -> String {
    let header = m
        .header
        .as_ref()
        .map_or_else(|| "<no header>".to_owned(), |p| p.display().to_string());
    let raw = m
        .raw
        .as_ref()
        .map_or_else(|| "<no raw file>".to_owned(), |p| p.display().to_string());
    format!("{} -> {raw}, {header}", m.name)
}
