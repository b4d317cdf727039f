//! A short demonstration run: every setting of chi-1 against a random
//! tape, counting impulse 1 of the de-chi.
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{Level, event, span};

use base::prelude::*;
use base::threshold::ThresholdOperation;
use host::{Colossus, selector};

use crate::Fail;

#[derive(Debug, Clone)]
pub struct ShortRunOptions {
    pub seed: u64,
    pub tape_length: usize,
    pub threshold: Option<u16>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    tape_length: usize,
    records: usize,
    commands_sent: usize,
}

/// One line of output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum OutputLine<'a> {
    Record(&'a PrintRecord),
    Summary(&'a RunSummary),
}

fn emit<W: Write>(out: &mut W, line: &OutputLine<'_>) -> Result<(), Fail> {
    serde_json::to_writer(&mut *out, line)?;
    writeln!(out)?;
    Ok(())
}

fn random_tape(rng: &mut StdRng, n: usize) -> Vec<u8> {
    (0..n).map(|_| rng.random_range(0..32u8)).collect()
}

fn random_pattern(rng: &mut StdRng, wheel: Wheel) -> CamPattern {
    (0..wheel.length()).map(|_| rng.random::<bool>()).collect()
}

/// Set up the run on the device behind `transport`, run it, and write
/// the print records and a summary to `out`.
pub fn short_run<T: Transport, W: Write>(
    transport: T,
    options: &ShortRunOptions,
    out: &mut W,
) -> Result<(), Fail> {
    let span = span!(Level::INFO, "short run", seed = options.seed);
    let _enter = span.enter();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut session = Colossus::new(transport)?;

    session.clear_tape()?;
    session.punch_tape(&random_tape(&mut rng, options.tape_length), true)?;
    for wheel in Wheel::all() {
        session.load_pattern(wheel, &random_pattern(&mut rng, wheel))?;
    }

    session.set_q_selector_config(selector::Z | selector::CHI)?;
    session.reset_q_panel()?;
    session.set_q_panel_top_unit(0, &QPanelTopUnitConfig::new(0x10, 0x10, false, 0x10)?)?;
    let print_when = match options.threshold {
        Some(n) => ThresholdConfig::new(n, ThresholdOperation::GreaterThan)?,
        None => ThresholdConfig::ALWAYS_PRINT,
    };
    session.set_threshold(0, &print_when)?;

    let chi1 = Wheel::chi(0)?;
    session.set_stepping_mode(chi1, SteppingMode::FAST)?;
    session.printer_reset()?;
    session.initiate_run()?;

    let records = session.printer_records()?;
    for record in &records {
        emit(out, &OutputLine::Record(record))?;
    }
    let summary = RunSummary {
        seed: options.seed,
        tape_length: options.tape_length,
        records: records.len(),
        commands_sent: session.channel().commands_sent(),
    };
    event!(
        Level::INFO,
        "run printed {} records using {} commands",
        summary.records,
        summary.commands_sent
    );
    emit(out, &OutputLine::Summary(&summary))
}
