use std::path::PathBuf;

use editor_core::{SessionState, compact};

#[derive(clap::Parser)]
#[command(name = "review", about = "Load a subtitle transcript and print the editing view")]
struct Args {
    /// Path to a .vtt file; the bundled interview fixture when omitted.
    path: Option<PathBuf>,

    /// Print the paragraph-merged compact view instead of one row per
    /// sentence.
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = <Args as clap::Parser>::parse();

    let raw = match &args.path {
        Some(path) => std::fs::read_to_string(path)?,
        None => scriv_data::interview_1::VTT.to_string(),
    };

    let state = SessionState::from_vtt(&raw);
    println!(
        "{} cells, {} speakers\n",
        state.cells.len(),
        state.roster.len()
    );

    let cells = if args.compact {
        compact(&state.cells, state.focus).cells
    } else {
        state.cells
    };

    for cell in &cells {
        let name = if cell.speaker_name.is_empty() {
            "(unassigned)"
        } else {
            &cell.speaker_name
        };
        println!("{:>12}  {name}: {}", cell.time, cell.text);
    }

    Ok(())
}
