//! ё の修正
//!
//! 辞書の読み込みと、必須・任意の2種類の修正セッション

mod dictionary;
mod session;

pub use dictionary::{normalize_key, Dictionary, DictionaryStore};
pub use session::{
    CorrectionMode, CorrectionSession, CorrectionSummary, PendingMatch, ReviewChoice,
    SessionState, WordPattern,
};

use crate::buffer::{PromptOptions, TextBuffer};
use crate::error::Result;
use crate::host::{Document, Prompt};

/// 必須修正と任意修正の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    pub necessary: CorrectionSummary,
    pub optional: CorrectionSummary,
}

impl CorrectionReport {
    /// 直した語数の合計
    pub fn corrected(&self) -> usize {
        self.necessary.corrected + self.optional.corrected
    }
}

/// 辞書と設定を保持し、バッファごとにセッションを作る
#[derive(Debug, Clone)]
pub struct Corrector {
    dictionary: Dictionary,
    pattern: WordPattern,
    options: PromptOptions,
}

impl Corrector {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary,
            pattern: WordPattern::default(),
            options: PromptOptions::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: WordPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_options(mut self, options: PromptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// セッションを作る
    pub fn session<'a, D: Document>(
        &'a self,
        buffer: &'a mut TextBuffer<D>,
        mode: CorrectionMode,
    ) -> CorrectionSession<'a, D> {
        CorrectionSession::new(buffer, &self.dictionary, mode)
            .with_pattern(self.pattern.clone())
            .with_options(self.options.clone())
    }

    /// 1種類の修正を対話的に行う
    pub fn run<D: Document>(
        &self,
        buffer: &mut TextBuffer<D>,
        prompt: &mut impl Prompt,
        mode: CorrectionMode,
    ) -> Result<CorrectionSummary> {
        self.session(buffer, mode).run(prompt)
    }

    /// 必須修正、続いて任意修正を行う
    pub fn run_all<D: Document>(
        &self,
        buffer: &mut TextBuffer<D>,
        prompt: &mut impl Prompt,
    ) -> Result<CorrectionReport> {
        let necessary = self.run(buffer, prompt, CorrectionMode::Necessary)?;
        let optional = self.run(buffer, prompt, CorrectionMode::Optional)?;
        Ok(CorrectionReport {
            necessary,
            optional,
        })
    }
}
