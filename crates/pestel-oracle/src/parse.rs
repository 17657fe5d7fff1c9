//! Oracle response parsing into typed verdicts.
//!
//! Two line protocols are understood:
//!
//! - decisions: `ACTION_TYPE|DESCRIPTION|CONFIDENCE`, or `NO_ACTION`
//! - impacts: `VARIABLE:name|VALUE:text|REASON:text`, or `NO_IMPACT`
//!
//! Models rarely answer with exactly one clean line, so candidates are tried
//! in order: the whole trimmed text, the body of a markdown code block, then
//! every individual line. The first candidate that matches wins.

use pestel_agents::{ImpactProposal, ImpactVerdict, OracleVerdict};
use pestel_types::{DecisionType, FactorValue};

use crate::error::OracleServiceError;

/// Confidence used when the model gives none or an unreadable one.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Parse a decision response.
///
/// A single free-text line that matches no protocol form is taken as an
/// action description with an inferred type and [`DEFAULT_CONFIDENCE`].
///
/// # Errors
///
/// Returns [`OracleServiceError::Parse`] for empty or multi-line text that
/// matches neither form.
pub fn parse_decision(raw: &str) -> Result<OracleVerdict, OracleServiceError> {
    let trimmed = raw.trim();
    if let Some(verdict) = candidates(trimmed).find_map(decision_line) {
        return Ok(verdict);
    }

    let single = strip_quotes(trimmed);
    if !single.is_empty() && !single.contains('\n') && !single.contains('|') {
        return Ok(OracleVerdict::Act {
            description: single.to_owned(),
            decision_type: DecisionType::classify(single),
            confidence: DEFAULT_CONFIDENCE,
        });
    }

    Err(OracleServiceError::parse(format!("no decision found in: {trimmed}")))
}

/// Parse an impact response.
///
/// # Errors
///
/// Returns [`OracleServiceError::Parse`] when no candidate carries both a
/// variable and a value, and none says `NO_IMPACT`.
pub fn parse_impact(raw: &str) -> Result<ImpactVerdict, OracleServiceError> {
    let trimmed = raw.trim();
    candidates(trimmed)
        .find_map(impact_line)
        .ok_or_else(|| OracleServiceError::parse(format!("no impact found in: {trimmed}")))
}

/// Candidate strings in recovery order.
fn candidates(trimmed: &str) -> impl Iterator<Item = &str> {
    std::iter::once(trimmed)
        .chain(extract_codeblock(trimmed))
        .chain(trimmed.lines().map(str::trim))
        .filter(|c| !c.is_empty() && !c.contains('\n'))
}

/// Body of the first markdown code block, if any.
fn extract_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = text.get(start.saturating_add(3)..)?;
    // Skip an optional language tag on the fence line.
    let body_start = after.find('\n').map_or(0, |i| i.saturating_add(1));
    let body = after.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '"' | '\'' | '`')).trim()
}

/// Normalized marker: uppercase, trailing punctuation and quotes removed.
fn marker(line: &str) -> String {
    strip_quotes(line)
        .trim_end_matches(['.', '!', ','])
        .trim()
        .to_uppercase()
}

fn is_no_action(line: &str) -> bool {
    matches!(
        marker(line).as_str(),
        "NO_ACTION" | "NO ACTION" | "NO" | "NOACTION"
    )
}

fn decision_line(line: &str) -> Option<OracleVerdict> {
    if is_no_action(line) {
        return Some(OracleVerdict::NoAction);
    }
    let mut parts = strip_quotes(line).splitn(3, '|');
    let tag = parts.next()?.trim();
    let description = parts.next()?.trim();
    let confidence = parts.next()?;
    if description.is_empty() {
        return None;
    }
    Some(OracleVerdict::Act {
        description: description.to_owned(),
        decision_type: DecisionType::parse_tag(tag),
        confidence: parse_confidence(confidence),
    })
}

/// Read a confidence, tolerating trailing text such as `0.8 (high)`.
/// The result is clamped to `[0, 1]`.
fn parse_confidence(raw: &str) -> f64 {
    let numeric: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map_or(DEFAULT_CONFIDENCE, |v| v.clamp(0.0, 1.0))
}

fn impact_line(line: &str) -> Option<ImpactVerdict> {
    if matches!(marker(line).as_str(), "NO_IMPACT" | "NO IMPACT" | "NONE") {
        return Some(ImpactVerdict::NoImpact);
    }

    let mut factor = None;
    let mut value = None;
    let mut reason = String::new();
    for field in strip_quotes(line).split('|') {
        let Some((key, text)) = field.split_once(':') else {
            continue;
        };
        let text = text.trim();
        match key.trim().to_uppercase().as_str() {
            "VARIABLE" | "FACTOR" => factor = Some(normalize_factor(text)),
            "VALUE" | "NEW_VALUE" => value = Some(text.to_owned()),
            "REASON" => text.clone_into(&mut reason),
            _ => {}
        }
    }

    let factor = factor.filter(|f| !f.is_empty())?;
    let value = value.filter(|v| !v.is_empty())?;
    Some(ImpactVerdict::Change(ImpactProposal {
        factor,
        value: factor_value(&value),
        reason,
    }))
}

/// `"Investment Climate"` becomes `investment_climate`.
fn normalize_factor(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn factor_value(raw: &str) -> FactorValue {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map_or_else(|| FactorValue::text(raw), FactorValue::Number)
}
