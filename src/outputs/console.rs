use std::io::{self, Write};

use super::view::{claim_badge, log_tone, match_percent, progress_percent, stage_statuses, LogTone, StageStatus, TrustBand};
use crate::kernel::state::{Generation, Phase, SessionState};

/// Text stand-in for the panels. Feed it every published snapshot; it only
/// prints what changed since the previous one.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    generation: Option<Generation>,
    phase: Option<Phase>,
    printed_log: usize,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            generation: None,
            phase: None,
            printed_log: 0,
        }
    }

    pub fn render(&mut self, snapshot: &SessionState) -> io::Result<()> {
        // New generation: its log starts over
        if self.generation != Some(snapshot.generation()) {
            if snapshot.generation() > 0 {
                writeln!(self.out, "---- query #{} ----", snapshot.generation())?;
            }
            self.generation = Some(snapshot.generation());
            self.phase = None;
            self.printed_log = 0;
        }

        for line in snapshot.reasoning_log().iter().skip(self.printed_log) {
            writeln!(self.out, "{} {}", tone_marker(log_tone(line)), line)?;
        }
        self.printed_log = snapshot.reasoning_log().len();

        if self.phase != Some(snapshot.phase()) {
            self.phase = Some(snapshot.phase());
            if snapshot.generation() > 0 {
                self.render_stages(snapshot.phase())?;
            }
            match snapshot.phase() {
                Phase::Done => self.render_result(snapshot)?,
                Phase::Idle => {
                    if let Some(error) = snapshot.error() {
                        writeln!(self.out, "!! {}", error)?;
                    }
                }
                _ => {}
            }
        }

        self.out.flush()
    }

    fn render_stages(&mut self, phase: Phase) -> io::Result<()> {
        let strip = stage_statuses(phase)
            .iter()
            .map(|(stage, status)| match status {
                StageStatus::Completed => format!("[x] {}", stage.label()),
                StageStatus::Active => format!("[>] {}", stage.label()),
                StageStatus::Pending => format!("[ ] {}", stage.label()),
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.out, "{}  ({:.0}%)", strip, progress_percent(phase))
    }

    fn render_result(&mut self, snapshot: &SessionState) -> io::Result<()> {
        let score = snapshot.trust_score();
        writeln!(self.out, "Answer: {}", snapshot.answer())?;
        writeln!(self.out, "Trust: {:.2}/1.00 ({})", score, TrustBand::from_score(score).label())?;

        for claim in snapshot.claims() {
            match claim.evidence_count {
                Some(count) => writeln!(self.out, "  {:<16} {} ({} citations)", claim_badge(claim.status), claim.text, count)?,
                None => writeln!(self.out, "  {:<16} {}", claim_badge(claim.status), claim.text)?,
            }
        }

        writeln!(self.out, "{} sources", snapshot.citations().len())?;
        for citation in snapshot.citations() {
            write!(self.out, "  {} ({}% match)", citation.source, match_percent(citation.similarity))?;
            if let Some(days) = citation.freshness_days {
                write!(self.out, ", {} days old", days)?;
            }
            writeln!(self.out)?;
            if let Some(snippet) = &citation.snippet {
                writeln!(self.out, "    \"{}\"", snippet)?;
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn tone_marker(tone: LogTone) -> &'static str {
    match tone {
        LogTone::System => "::",
        LogTone::Wait => "..",
        LogTone::Error => "!!",
        LogTone::Agent => ">>",
        LogTone::Plain => "  ",
    }
}
