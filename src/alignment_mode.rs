use serde::{Deserialize, Serialize};

use crate::WavefrontError;

/// Whether the engine reports only the score or also reconstructs the CIGAR.
/// `ScoreOnly` never allocates a backtrace buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentScope {
    ScoreOnly,
    #[default]
    FullAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentSpan {
    #[default]
    EndToEnd, // Global
    EndsFree, // Semiglobal, glocal, etc
}

/// Sequence ends that may be left unaligned under `EndsFree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    PatternBegin,
    PatternEnd,
    TextBegin,
    TextEnd,
}

/// Alignment topology plus the score ceiling.
///
/// `max_alignment_score == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentForm {
    pub span: AlignmentSpan,
    pub pattern_begin_free: bool,
    pub pattern_end_free: bool,
    pub text_begin_free: bool,
    pub text_end_free: bool,
    pub max_alignment_score: Option<i32>,
}

impl AlignmentForm {
    pub fn end_to_end() -> Self {
        Self::default()
    }

    pub fn ends_free(
        pattern_begin_free: bool,
        pattern_end_free: bool,
        text_begin_free: bool,
        text_end_free: bool,
    ) -> Self {
        Self {
            span: AlignmentSpan::EndsFree,
            pattern_begin_free,
            pattern_end_free,
            text_begin_free,
            text_end_free,
            max_alignment_score: None,
        }
    }

    /// Switching to `EndToEnd` clears every free-gap flag.
    pub fn set_span(&mut self, span: AlignmentSpan) {
        self.span = span;
        if span == AlignmentSpan::EndToEnd {
            self.pattern_begin_free = false;
            self.pattern_end_free = false;
            self.text_begin_free = false;
            self.text_end_free = false;
        }
    }

    pub fn set_free_gap(&mut self, boundary: Boundary, enabled: bool) -> Result<(), WavefrontError> {
        if self.span == AlignmentSpan::EndToEnd {
            return Err(WavefrontError::InvalidForm(format!(
                "cannot set {:?} free-gap on an end-to-end alignment",
                boundary
            )));
        }
        *self.flag_mut(boundary) = enabled;
        Ok(())
    }

    pub fn is_free(&self, boundary: Boundary) -> bool {
        match boundary {
            Boundary::PatternBegin => self.pattern_begin_free,
            Boundary::PatternEnd => self.pattern_end_free,
            Boundary::TextBegin => self.text_begin_free,
            Boundary::TextEnd => self.text_end_free,
        }
    }

    pub fn set_max_score(&mut self, limit: Option<i32>) -> Result<(), WavefrontError> {
        check_score_limit(limit)?;
        self.max_alignment_score = limit;
        Ok(())
    }

    pub fn any_free(&self) -> bool {
        self.pattern_begin_free || self.pattern_end_free || self.text_begin_free || self.text_end_free
    }

    pub fn validate(&self) -> Result<(), WavefrontError> {
        if self.span == AlignmentSpan::EndToEnd && self.any_free() {
            return Err(WavefrontError::InvalidForm(
                "end-to-end alignment cannot have free-gap ends".to_string(),
            ));
        }
        check_score_limit(self.max_alignment_score)
    }

    fn flag_mut(&mut self, boundary: Boundary) -> &mut bool {
        match boundary {
            Boundary::PatternBegin => &mut self.pattern_begin_free,
            Boundary::PatternEnd => &mut self.pattern_end_free,
            Boundary::TextBegin => &mut self.text_begin_free,
            Boundary::TextEnd => &mut self.text_end_free,
        }
    }
}

fn check_score_limit(limit: Option<i32>) -> Result<(), WavefrontError> {
    match limit {
        Some(score) if score < 0 => Err(WavefrontError::InvalidForm(format!(
            "max alignment score must be non-negative, got {}",
            score
        ))),
        _ => Ok(()),
    }
}
