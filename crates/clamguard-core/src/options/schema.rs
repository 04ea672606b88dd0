//! Option schema
//!
//! `OPTION_SCHEMA` lists every `clamscan` option in the fixed order the compiler
//! emits them, together with its kind and an accessor into `ScanOptions`. The
//! table is generated from the struct's field names, so a field that is renamed
//! or removed stops compiling instead of being silently skipped.

use std::fmt::Display;

use serde_json::Value;

use super::{PuaCategory, ScanOptions, SizeValue};
use crate::error::ValidationError;

/// How an option is encoded on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Bare `--name` when true, absent when false.
    Flag,
    /// `--name=value` from a closed set (`yes`/`no`, symlink modes, ...).
    Choice,
    /// `--name=<integer>`; zero is a real setting.
    Number,
    /// `--name=<bytes>` or `--name=<amount><K|M>`.
    Size,
    /// `--name=<free text>` such as a path or a regular expression.
    Text,
    /// `--name=v1,v2,...` when non-empty.
    List,
}

impl OptionKind {
    /// Convert a raw `name=value` right-hand side into the JSON shape `ScanOptions`
    /// deserializes for this kind. An empty value unsets value-bearing options.
    pub(crate) fn parse_raw(self, option: &str, raw: &str) -> Result<Value, ValidationError> {
        let raw = raw.trim();
        match self {
            OptionKind::Flag => match raw {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(ValidationError::InvalidChoice {
                    kind: "flag value",
                    value: raw.to_string(),
                    allowed: "true, false",
                }),
            },
            _ if raw.is_empty() => Ok(Value::Null),
            OptionKind::Choice => Ok(match raw.parse::<u8>() {
                Ok(number) => Value::from(number),
                Err(_) => Value::String(raw.to_string()),
            }),
            OptionKind::Number => raw.parse::<u64>().map(Value::from).map_err(|_| {
                ValidationError::InvalidNumber {
                    option: option.to_string(),
                    value: raw.to_string(),
                }
            }),
            OptionKind::Size => {
                let size: SizeValue = raw.parse()?;
                Ok(serde_json::to_value(size)?)
            }
            OptionKind::Text => Ok(Value::String(raw.to_string())),
            OptionKind::List => Ok(Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
        }
    }
}

/// The current value of one option, read out of a `ScanOptions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Value(Option<String>),
    List(Vec<String>),
}

/// One row of the option schema.
pub struct OptionSpec {
    /// Field name on `ScanOptions`.
    pub name: &'static str,
    /// External name, when the field had to be named differently in Rust.
    pub alias: Option<&'static str>,
    pub kind: OptionKind,
    read: fn(&ScanOptions) -> OptionValue,
}

impl OptionSpec {
    /// Name used in configuration files and on the command line.
    pub fn external_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// `--external-name`, with underscores turned into hyphens.
    pub fn flag_name(&self) -> String {
        format!("--{}", self.external_name().replace('_', "-"))
    }

    pub fn read(&self, options: &ScanOptions) -> OptionValue {
        (self.read)(options)
    }

    /// Find an option by field or external name, accepting hyphens for underscores.
    pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
        let normalized = name.trim().trim_start_matches("--").replace('-', "_");
        OPTION_SCHEMA
            .iter()
            .find(|spec| spec.name == normalized || spec.alias == Some(normalized.as_str()))
    }
}

impl std::fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .finish()
    }
}

fn value<T: Display>(field: &Option<T>) -> OptionValue {
    OptionValue::Value(field.as_ref().map(ToString::to_string))
}

fn list(field: &Option<Vec<PuaCategory>>) -> OptionValue {
    OptionValue::List(
        field
            .iter()
            .flatten()
            .map(|category| category.as_str().to_string())
            .collect(),
    )
}

macro_rules! option {
    ($field:ident as $alias:literal, $kind:ident) => {
        OptionSpec {
            name: stringify!($field),
            alias: Some($alias),
            kind: OptionKind::$kind,
            read: |options| value(&options.$field),
        }
    };
    ($field:ident, Flag) => {
        OptionSpec {
            name: stringify!($field),
            alias: None,
            kind: OptionKind::Flag,
            read: |options| OptionValue::Flag(options.$field),
        }
    };
    ($field:ident, List) => {
        OptionSpec {
            name: stringify!($field),
            alias: None,
            kind: OptionKind::List,
            read: |options| list(&options.$field),
        }
    };
    ($field:ident, $kind:ident) => {
        OptionSpec {
            name: stringify!($field),
            alias: None,
            kind: OptionKind::$kind,
            read: |options| value(&options.$field),
        }
    };
}

/// Every scanner option in emission order. `command` is not listed: it is argv[0].
pub static OPTION_SCHEMA: &[OptionSpec] = &[
    option!(verbose, Flag),
    option!(archive_verbose, Flag),
    option!(debug, Flag),
    option!(quiet, Flag),
    option!(stdout, Flag),
    option!(no_summary, Flag),
    option!(infected, Flag),
    option!(suppress_ok_results, Flag),
    option!(bell, Flag),
    option!(tempdir, Text),
    option!(leave_temps, Flag),
    option!(gen_json, Flag),
    option!(database, Text),
    option!(log, Text),
    option!(recursive, Flag),
    option!(allmatch, Flag),
    option!(cross_fs, Choice),
    option!(follow_dir_symlinks, Choice),
    option!(follow_file_symlinks, Choice),
    option!(file_list, Text),
    option!(remove, Choice),
    option!(move_to as "move", Text),
    option!(copy_to as "copy", Text),
    option!(exclude, Text),
    option!(exclude_dir, Text),
    option!(include, Text),
    option!(include_dir, Text),
    option!(bytecode, Choice),
    option!(bytecode_unsigned, Choice),
    option!(bytecode_timeout, Number),
    option!(statistics, Choice),
    option!(detect_pua, Choice),
    option!(exclude_pua, List),
    option!(include_pua, List),
    option!(detect_structured, Choice),
    option!(structured_ssn_format, Choice),
    option!(structured_ssn_count, Number),
    option!(structured_cc_count, Number),
    option!(scan_mail, Choice),
    option!(phishing_sigs, Choice),
    option!(phishing_scan_urls, Choice),
    option!(heuristic_alerts, Choice),
    option!(heuristic_scan_precedence, Choice),
    option!(normalize, Choice),
    option!(scan_pe, Choice),
    option!(scan_elf, Choice),
    option!(scan_ole2, Choice),
    option!(scan_pdf, Choice),
    option!(scan_swf, Choice),
    option!(scan_html, Choice),
    option!(scan_xmldocs, Choice),
    option!(scan_hwp3, Choice),
    option!(scan_onenote, Choice),
    option!(scan_archive, Choice),
    option!(alert_broken, Choice),
    option!(alert_broken_media, Choice),
    option!(alert_encrypted, Choice),
    option!(alert_encrypted_archive, Choice),
    option!(alert_encrypted_doc, Choice),
    option!(alert_macros, Choice),
    option!(alert_exceeds_max, Choice),
    option!(alert_phishing_ssl, Choice),
    option!(alert_phishing_cloak, Choice),
    option!(alert_partition_intersection, Choice),
    option!(nocerts, Flag),
    option!(dumpcerts, Flag),
    option!(max_scantime, Number),
    option!(max_filesize, Size),
    option!(max_scansize, Size),
    option!(max_files, Number),
    option!(max_recursion, Number),
    option!(max_dir_recursion, Number),
    option!(max_embeddedpe, Size),
    option!(max_htmlnormalize, Size),
    option!(max_htmlnotags, Size),
    option!(max_scriptnormalize, Size),
    option!(max_ziptypercg, Size),
    option!(max_partitions, Number),
    option!(max_iconspe, Number),
    option!(max_rechwp3, Number),
    option!(pcre_match_limit, Number),
    option!(pcre_recmatch_limit, Number),
    option!(pcre_max_filesize, Size),
    option!(disable_cache, Flag),
];
