//! Replay a recorded input-event trace against a headless editor.
//!
//! Reads a JSON array of `InputEvent`s from the path given as the first
//! argument (or stdin), feeds it through a fresh `AnnotationEditor`, and
//! prints the finalized polygons as JSON. Rejected events are logged and
//! skipped, the way a live UI would ignore them.
//!
//! ```text
//! RUST_LOG=debug polymark-replay trace.json
//! ```

use std::io::Read;

use polymark::{AnnotationEditor, InputEvent};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let trace: Vec<InputEvent> = serde_json::from_str(&input)?;
    log::info!("replaying {} events", trace.len());

    let mut editor = AnnotationEditor::default();
    for (i, event) in trace.into_iter().enumerate() {
        if let Err(e) = editor.handle_event(event) {
            log::warn!("event {} rejected: {}", i, e);
        }
    }

    println!("{}", serde_json::to_string_pretty(editor.store().polygons())?);
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("replay error: {}", e);
        std::process::exit(1);
    }
}
