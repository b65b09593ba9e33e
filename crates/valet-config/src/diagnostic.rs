// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rich diagnostics for configuration mistakes.
//!
//! Figment reports deserialization problems as flat error values; this
//! module turns each one into a miette diagnostic that points into the
//! TOML file that defined the bad key and, for typos, suggests the
//! closest valid key via Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity below this is noise, not a typo. 0.75 catches slips like
/// `bufer_capacity` for `buffer_capacity` without matching unrelated keys.
const MIN_SUGGESTION_SCORE: f64 = 0.75;

/// One configuration problem, renderable as a miette report.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no struct in the model declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(valet::config::unknown_key))]
    UnknownKey {
        key: String,
        /// "did you mean" plus the valid keys for the section.
        #[help]
        advice: Option<String>,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A declared key holding a value of the wrong TOML type.
    #[error("wrong type for `{key}`: {detail}")]
    #[diagnostic(code(valet::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A value that deserialized fine but fails a semantic check.
    #[error("{message}")]
    #[diagnostic(code(valet::config::validation))]
    Validation { message: String },

    /// Anything figment reports that has no richer rendering.
    #[error("configuration error: {0}")]
    #[diagnostic(code(valet::config::other))]
    Other(String),
}

impl ConfigError {
    /// Builds the diagnostic for a single figment error, attaching a source
    /// span when the offending key can be located in a loaded TOML file.
    fn from_figment(error: figment::Error, sources: &[(String, String)]) -> Self {
        use figment::error::Kind;

        match &error.kind {
            Kind::UnknownField(field, declared) => {
                let known: Vec<&str> = declared.to_vec();
                let advice = Some(match suggest_key(field, &known) {
                    Some(fix) => format!("did you mean `{fix}`? valid keys: {}", known.join(", ")),
                    None => format!("valid keys: {}", known.join(", ")),
                });
                let (span, src) = match locate_key(sources, origin(&error).as_deref(), &error.path, field)
                {
                    Some((span, src)) => (Some(span), Some(src)),
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key: field.clone(),
                    advice,
                    span,
                    src,
                }
            }
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}"),
                expected: expected.to_string(),
            },
            // Every key in the model has a default, so a missing field can
            // only come from an exotic provider; plain text is enough.
            Kind::MissingField(field) => ConfigError::Other(format!("missing key `{field}`")),
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

/// Converts every error inside a `figment::Error` into a diagnostic.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::from_figment(e, toml_sources))
        .collect()
}

/// The file path figment attributes the error to, if it has one.
fn origin(error: &figment::Error) -> Option<String> {
    match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => Some(path.display().to_string()),
        _ => None,
    }
}

/// Finds the offending key in the loaded sources and wraps it in a span.
///
/// When figment names the file, only that file is searched. String-backed
/// providers carry no file origin, so the first source stands in; the
/// inline loaders register exactly one.
fn locate_key(
    sources: &[(String, String)],
    origin: Option<&str>,
    path: &[String],
    key: &str,
) -> Option<(SourceSpan, NamedSource<String>)> {
    let (name, content) = match origin {
        Some(origin) => sources.iter().find(|(name, _)| name == origin)?,
        None => sources.first()?,
    };
    let section = path.join(".");
    let offset = key_offset(content, &section, key)?;
    let span = SourceSpan::new(offset.into(), key.len());
    Some((span, NamedSource::new(name, content.clone())))
}

/// Byte offset of `key` inside the `[section]` table of `content`.
///
/// `section` is the dotted table path (`"talents.overrides.weather"`), or
/// empty for top-level keys. A top-level key may also appear as a table
/// header (`[agnet]`), which is matched too.
fn key_offset(content: &str, section: &str, key: &str) -> Option<usize> {
    let mut offset = 0;
    let mut in_section = section.is_empty();
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();
        if trimmed.starts_with('[') {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            if section.is_empty() {
                if header == key {
                    return Some(offset + indent + 1);
                }
                // A table header ends the top-level key region.
                in_section = false;
            } else {
                in_section = header == section;
            }
        } else if in_section
            && let Some(rest) = line.trim_start().strip_prefix(key)
            && (rest.trim_start().starts_with('=') || rest.trim().is_empty())
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The declared key most similar to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > MIN_SUGGESTION_SCORE)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, key)| key.to_string())
}

/// Renders each error to stderr as a graphical miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        if handler.render_report(&mut rendered, error).is_ok() {
            eprint!("{rendered}");
        } else {
            eprintln!("config error: {error}");
        }
    }
}
