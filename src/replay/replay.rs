/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{info, warn};
use std::io::{self, BufRead, Write};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::{Dispatcher, RecordingSink};
use crate::fleet::Fleet;
use crate::shared::StateUpdate;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub applied: usize,
    pub rejected: usize,
    pub commands: usize,
}

/**
 * Feeds recorded state updates through a dispatcher, one JSON object per line.
 *
 * Every command the dispatcher emits is written to `output` as one JSON line,
 * right after the update that caused it. Lines that do not parse or that the
 * fleet rejects are logged and skipped.
 */
pub fn replay<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    fleet: Fleet,
    readiness_gate: bool,
) -> io::Result<ReplaySummary> {
    let sink = RecordingSink::new(fleet.n_cars(), fleet.n_floors());
    let mut dispatcher = Dispatcher::new(fleet, readiness_gate, sink);
    let mut summary = ReplaySummary::default();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        let update: StateUpdate = match serde_json::from_str(line) {
            Ok(update) => update,
            Err(e) => {
                warn!("Line {}: malformed state update: {}", number + 1, e);
                summary.rejected += 1;
                continue;
            }
        };

        if let Err(e) = dispatcher.on_state_update(update) {
            warn!("Line {}: {}", number + 1, e);
            summary.rejected += 1;
            continue;
        }
        summary.applied += 1;

        for command in dispatcher.sink_mut().take() {
            serde_json::to_writer(&mut *output, &command)?;
            writeln!(output)?;
            summary.commands += 1;
        }
    }

    info!(
        "Replayed {} updates ({} rejected), {} commands",
        summary.lines, summary.rejected, summary.commands
    );
    Ok(summary)
}
