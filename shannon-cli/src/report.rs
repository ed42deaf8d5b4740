use std::fmt::Write;
use std::path::Path;

use serde::Serialize;

use shannon_core::model::builder::{Approximation, ShannonModels};
use shannon_core::model::generation_input::GenerationInput;
use shannon_core::report::{transition_report, ContextReport, ProbabilityReport};
use shannon_core::{Corpus, Result};

/// Generated text of one approximation, or why it could not be produced.
#[derive(Serialize, Debug)]
pub struct ApproximationOutput {
    pub name: String,
    pub words: bool,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// Everything printed for a run.
#[derive(Serialize, Debug)]
pub struct RunReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<String>,
    pub letter_count: usize,
    pub word_count: usize,
    pub letters: std::result::Result<ProbabilityReport, String>,
    pub words: std::result::Result<ProbabilityReport, String>,
    pub approximations: Vec<ApproximationOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digram_transitions: Option<std::result::Result<Vec<ContextReport>, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_transitions: Option<std::result::Result<Vec<ContextReport>, String>>,
}

impl RunReport {
    pub fn new(
        file: &Path,
        corpus: &Corpus,
        models: &ShannonModels,
        input: &GenerationInput,
        outputs: Vec<(Approximation, Result<String>)>,
        transitions: bool,
    ) -> Self {
        let letters = models
            .letter_counts()
            .map_err(|e| e.to_string())
            .and_then(|table| ProbabilityReport::from_counts(table).map_err(|e| e.to_string()));
        let words = models
            .word_counts()
            .map_err(|e| e.to_string())
            .and_then(|table| ProbabilityReport::from_counts(table).map_err(|e| e.to_string()));

        let approximations = outputs
            .into_iter()
            .map(|(approximation, result)| {
                let name = match approximation {
                    Approximation::NGram => format!("ngram (n = {})", input.ngram_order()),
                    other => other.title().to_owned(),
                };
                let (text, error) = match result {
                    Ok(text) => (Some(text), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                ApproximationOutput { name, words: approximation.is_word(), text, error }
            })
            .collect();

        let (digram_transitions, word_transitions) = if transitions {
            let digram = models
                .character_model(Approximation::Digram)
                .map(|model| model.map(transition_report).map_err(|e| e.to_string()));
            let words = models
                .word_model(Approximation::WordTransitions)
                .map(|model| model.map(transition_report).map_err(|e| e.to_string()));
            (digram, words)
        } else {
            (None, None)
        };

        Self {
            file: file.display().to_string(),
            corpus: corpus.name().map(str::to_owned),
            letter_count: models.letter_count(),
            word_count: models.word_count(),
            letters,
            words,
            approximations,
            digram_transitions,
            word_transitions,
        }
    }

    /// Renders the report as console text.
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.render_into(&mut out, width);
        out
    }

    fn render_into(&self, out: &mut String, width: usize) -> std::fmt::Result {
        writeln!(out, "'{}' opened...\n", self.file)?;

        writeln!(out, "Letter probabilities:")?;
        render_probabilities(out, &self.letters)?;
        writeln!(out)?;
        writeln!(out, "{} letters found.", self.letter_count)?;
        writeln!(out, "{} words found.", self.word_count)?;
        writeln!(out)?;

        writeln!(out, "Character Approximations:")?;
        let (words, letters): (Vec<_>, Vec<_>) = self.approximations.iter().partition(|a| a.words);
        for approximation in letters {
            render_approximation(out, approximation, width)?;
        }

        writeln!(out)?;
        writeln!(out, "Word Approximations:")?;
        for approximation in words {
            render_approximation(out, approximation, width)?;
        }

        if let Some(digram) = &self.digram_transitions {
            writeln!(out, "Digram transitions:")?;
            render_transitions(out, digram)?;
            writeln!(out)?;
        }
        if let Some(words) = &self.word_transitions {
            writeln!(out, "Word transitions:")?;
            render_transitions(out, words)?;
            writeln!(out)?;
        }

        writeln!(out, "Word probabilities:")?;
        render_probabilities(out, &self.words)
    }
}

fn render_probabilities(
    out: &mut String,
    report: &std::result::Result<ProbabilityReport, String>,
) -> std::fmt::Result {
    match report {
        Ok(report) => {
            for entry in &report.entries {
                writeln!(
                    out,
                    "{:<6} {:>5}  {:>7.3}",
                    entry.symbol.escape_debug().to_string(),
                    entry.count,
                    entry.probability * 100.0
                )?;
            }
            Ok(())
        }
        Err(e) => writeln!(out, "unavailable: {}", e),
    }
}

fn render_transitions(
    out: &mut String,
    report: &std::result::Result<Vec<ContextReport>, String>,
) -> std::fmt::Result {
    match report {
        Ok(rows) => {
            for row in rows {
                let transitions: Vec<String> = row
                    .transitions
                    .iter()
                    .map(|(symbol, p)| format!("{}={:.3}", symbol.escape_debug(), p))
                    .collect();
                writeln!(out, "{:?} -> {}", row.context, transitions.join(" "))?;
            }
            Ok(())
        }
        Err(e) => writeln!(out, "unavailable: {}", e),
    }
}

fn render_approximation(out: &mut String, approximation: &ApproximationOutput, width: usize) -> std::fmt::Result {
    writeln!(out, "{}:", approximation.name)?;
    match (&approximation.text, &approximation.error) {
        (Some(text), _) => {
            for line in wrap(text, width) {
                writeln!(out, "{}", line)?;
            }
        }
        (None, Some(e)) => writeln!(out, "failed: {}", e)?,
        (None, None) => (),
    }
    writeln!(out)
}

/// Greedy word wrap; whitespace runs collapse to single spaces.
///
/// Words longer than `width` are kept whole on their own line.
/// A zero width returns the text unchanged.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_owned()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
