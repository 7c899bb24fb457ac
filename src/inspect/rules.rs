// src/inspect/rules.rs

//! Ordered `(predicate, outcome)` table driving status inference.
//!
//! Predicates are evaluated in two phases: every line of the log is offered
//! to [`Predicate::matches_line`], then [`Predicate::holds`] decides using
//! what was seen plus the last non-blank line. New markers are added as data
//! (config lists), not as new code paths.

use crate::config::StatusSection;
use crate::types::TaskStatus;

#[derive(Debug, Clone)]
pub enum Predicate {
    /// Some line contains one of these substrings (case-sensitive).
    AnyLineContains(Vec<String>),
    /// Some line contains one of these keywords, and so does the last
    /// non-blank line (case-insensitive). Keywords are stored lowercased.
    KeywordAnywhereAndLast(Vec<String>),
}

impl Predicate {
    pub fn any_line_contains<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::AnyLineContains(markers.into_iter().map(Into::into).collect())
    }

    pub fn keyword_anywhere_and_last<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::KeywordAnywhereAndLast(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        )
    }

    /// Line-level part of the predicate.
    pub fn matches_line(&self, line: &str) -> bool {
        match self {
            Predicate::AnyLineContains(markers) => {
                markers.iter().any(|m| line.contains(m.as_str()))
            }
            Predicate::KeywordAnywhereAndLast(keywords) => contains_keyword(keywords, line),
        }
    }

    /// Final decision once the whole log has been offered.
    pub fn holds(&self, seen: bool, last_line: Option<&str>) -> bool {
        match self {
            Predicate::AnyLineContains(_) => seen,
            Predicate::KeywordAnywhereAndLast(keywords) => {
                seen && last_line.is_some_and(|l| contains_keyword(keywords, l))
            }
        }
    }
}

fn contains_keyword(keywords: &[String], line: &str) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

#[derive(Debug, Clone)]
pub struct StatusRule {
    pub predicate: Predicate,
    pub outcome: TaskStatus,
}

/// Rules in priority order plus the outcome when none holds.
#[derive(Debug, Clone)]
pub struct StatusRules {
    rules: Vec<StatusRule>,
    fallback: TaskStatus,
}

impl StatusRules {
    pub fn new(rules: Vec<StatusRule>, fallback: TaskStatus) -> Self {
        Self { rules, fallback }
    }

    /// Hard failures first, then completion banners, else still running.
    pub fn from_config(section: &StatusSection) -> Self {
        Self::new(
            vec![
                StatusRule {
                    predicate: Predicate::any_line_contains(section.error_markers.iter().cloned()),
                    outcome: TaskStatus::Error,
                },
                StatusRule {
                    predicate: Predicate::keyword_anywhere_and_last(
                        section.success_keywords.iter().cloned(),
                    ),
                    outcome: TaskStatus::Success,
                },
            ],
            TaskStatus::Running,
        )
    }

    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    /// Start a streaming evaluation.
    pub fn evaluator(&self) -> RuleEvaluator<'_> {
        RuleEvaluator {
            rules: self,
            seen: vec![false; self.rules.len()],
            last_line: None,
        }
    }

    /// Convenience for in-memory text.
    pub fn classify_text(&self, text: &str) -> TaskStatus {
        let mut eval = self.evaluator();
        for line in text.lines() {
            eval.feed(line);
        }
        eval.finish()
    }
}

/// Accumulates per-rule line matches and the last non-blank line.
#[derive(Debug)]
pub struct RuleEvaluator<'a> {
    rules: &'a StatusRules,
    seen: Vec<bool>,
    last_line: Option<String>,
}

impl RuleEvaluator<'_> {
    pub fn feed(&mut self, line: &str) {
        for (seen, rule) in self.seen.iter_mut().zip(self.rules.rules.iter()) {
            if !*seen && rule.predicate.matches_line(line) {
                *seen = true;
            }
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.last_line = Some(trimmed.to_string());
        }
    }

    /// Forget the last line; used when the scan skips ahead to the tail.
    pub fn reset_last_line(&mut self) {
        self.last_line = None;
    }

    pub fn finish(self) -> TaskStatus {
        let last = self.last_line.as_deref();
        self.rules
            .rules
            .iter()
            .zip(self.seen.iter())
            .find(|(rule, seen)| rule.predicate.holds(**seen, last))
            .map(|(rule, _)| rule.outcome)
            .unwrap_or(self.rules.fallback)
    }
}
