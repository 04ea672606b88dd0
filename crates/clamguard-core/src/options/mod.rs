//! Scanner option model
//!
//! `ScanOptions` mirrors the `clamscan` command line. Switches are plain `bool`s;
//! every value-bearing option is an `Option` that stays `None` until a caller
//! sets it, so a default model defers every choice to clamscan itself.
//! `ScanOptions::with_documented_defaults` fills in clamscan's documented values
//! for callers who want them pinned on the command line.

mod pua;
mod schema;
mod updater;
mod values;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::{compile, CommandLine};
use crate::error::ValidationError;

pub use pua::PuaCategory;
pub use schema::{OptionKind, OptionSpec, OptionValue, OPTION_SCHEMA};
pub use updater::UpdaterOptions;
pub use values::{SizeUnit, SizeValue, SsnFormat, Statistics, SymlinkMode, YesNo};

/// Largest value clamscan accepts for `--max-filesize`.
pub const MAX_FILESIZE_LIMIT: u64 = 2 * 1024 * 1024 * 1024;

/// Scanner executable used when none is configured.
pub const DEFAULT_SCAN_COMMAND: &str = "clamscan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Scanner executable, emitted as argv[0].
    pub command: String,

    // Output
    pub verbose: bool,
    pub archive_verbose: bool,
    pub debug: bool,
    pub quiet: bool,
    pub stdout: bool,
    pub no_summary: bool,
    pub infected: bool,
    pub suppress_ok_results: bool,
    pub bell: bool,

    // Temporary files
    pub tempdir: Option<String>,
    pub leave_temps: bool,
    pub gen_json: bool,

    /// Signature database file or directory. Resolved through `clamconf` when unset.
    pub database: Option<String>,
    pub log: Option<String>,

    // Traversal
    pub recursive: bool,
    pub allmatch: bool,
    pub cross_fs: Option<YesNo>,
    pub follow_dir_symlinks: Option<SymlinkMode>,
    pub follow_file_symlinks: Option<SymlinkMode>,
    pub file_list: Option<String>,

    // Handling of infected files
    pub remove: Option<YesNo>,
    #[serde(rename = "move", alias = "move_to")]
    pub move_to: Option<String>,
    #[serde(rename = "copy", alias = "copy_to")]
    pub copy_to: Option<String>,

    // Filters
    pub exclude: Option<String>,
    pub exclude_dir: Option<String>,
    pub include: Option<String>,
    pub include_dir: Option<String>,

    // Bytecode
    pub bytecode: Option<YesNo>,
    pub bytecode_unsigned: Option<YesNo>,
    pub bytecode_timeout: Option<u64>,
    pub statistics: Option<Statistics>,

    // Detection
    pub detect_pua: Option<YesNo>,
    pub exclude_pua: Option<Vec<PuaCategory>>,
    pub include_pua: Option<Vec<PuaCategory>>,
    pub detect_structured: Option<YesNo>,
    pub structured_ssn_format: Option<SsnFormat>,
    pub structured_ssn_count: Option<u64>,
    pub structured_cc_count: Option<u64>,

    // File type handling
    pub scan_mail: Option<YesNo>,
    pub phishing_sigs: Option<YesNo>,
    pub phishing_scan_urls: Option<YesNo>,
    pub heuristic_alerts: Option<YesNo>,
    pub heuristic_scan_precedence: Option<YesNo>,
    pub normalize: Option<YesNo>,
    pub scan_pe: Option<YesNo>,
    pub scan_elf: Option<YesNo>,
    pub scan_ole2: Option<YesNo>,
    pub scan_pdf: Option<YesNo>,
    pub scan_swf: Option<YesNo>,
    pub scan_html: Option<YesNo>,
    pub scan_xmldocs: Option<YesNo>,
    pub scan_hwp3: Option<YesNo>,
    pub scan_onenote: Option<YesNo>,
    pub scan_archive: Option<YesNo>,

    // Alerts
    pub alert_broken: Option<YesNo>,
    pub alert_broken_media: Option<YesNo>,
    pub alert_encrypted: Option<YesNo>,
    pub alert_encrypted_archive: Option<YesNo>,
    pub alert_encrypted_doc: Option<YesNo>,
    pub alert_macros: Option<YesNo>,
    pub alert_exceeds_max: Option<YesNo>,
    pub alert_phishing_ssl: Option<YesNo>,
    pub alert_phishing_cloak: Option<YesNo>,
    pub alert_partition_intersection: Option<YesNo>,

    // Certificates
    pub nocerts: bool,
    pub dumpcerts: bool,

    // Limits
    pub max_scantime: Option<u64>,
    pub max_filesize: Option<SizeValue>,
    pub max_scansize: Option<SizeValue>,
    pub max_files: Option<u64>,
    pub max_recursion: Option<u64>,
    pub max_dir_recursion: Option<u64>,
    pub max_embeddedpe: Option<SizeValue>,
    pub max_htmlnormalize: Option<SizeValue>,
    pub max_htmlnotags: Option<SizeValue>,
    pub max_scriptnormalize: Option<SizeValue>,
    pub max_ziptypercg: Option<SizeValue>,
    pub max_partitions: Option<u64>,
    pub max_iconspe: Option<u64>,
    pub max_rechwp3: Option<u64>,
    pub pcre_match_limit: Option<u64>,
    pub pcre_recmatch_limit: Option<u64>,
    pub pcre_max_filesize: Option<SizeValue>,

    pub disable_cache: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_SCAN_COMMAND.to_string(),
            verbose: false,
            archive_verbose: false,
            debug: false,
            quiet: false,
            stdout: false,
            no_summary: false,
            infected: false,
            suppress_ok_results: false,
            bell: false,
            tempdir: None,
            leave_temps: false,
            gen_json: false,
            database: None,
            log: None,
            recursive: false,
            allmatch: false,
            cross_fs: None,
            follow_dir_symlinks: None,
            follow_file_symlinks: None,
            file_list: None,
            remove: None,
            move_to: None,
            copy_to: None,
            exclude: None,
            exclude_dir: None,
            include: None,
            include_dir: None,
            bytecode: None,
            bytecode_unsigned: None,
            bytecode_timeout: None,
            statistics: None,
            detect_pua: None,
            exclude_pua: None,
            include_pua: None,
            detect_structured: None,
            structured_ssn_format: None,
            structured_ssn_count: None,
            structured_cc_count: None,
            scan_mail: None,
            phishing_sigs: None,
            phishing_scan_urls: None,
            heuristic_alerts: None,
            heuristic_scan_precedence: None,
            normalize: None,
            scan_pe: None,
            scan_elf: None,
            scan_ole2: None,
            scan_pdf: None,
            scan_swf: None,
            scan_html: None,
            scan_xmldocs: None,
            scan_hwp3: None,
            scan_onenote: None,
            scan_archive: None,
            alert_broken: None,
            alert_broken_media: None,
            alert_encrypted: None,
            alert_encrypted_archive: None,
            alert_encrypted_doc: None,
            alert_macros: None,
            alert_exceeds_max: None,
            alert_phishing_ssl: None,
            alert_phishing_cloak: None,
            alert_partition_intersection: None,
            nocerts: false,
            dumpcerts: false,
            max_scantime: None,
            max_filesize: None,
            max_scansize: None,
            max_files: None,
            max_recursion: None,
            max_dir_recursion: None,
            max_embeddedpe: None,
            max_htmlnormalize: None,
            max_htmlnotags: None,
            max_scriptnormalize: None,
            max_ziptypercg: None,
            max_partitions: None,
            max_iconspe: None,
            max_rechwp3: None,
            pcre_match_limit: None,
            pcre_recmatch_limit: None,
            pcre_max_filesize: None,
            disable_cache: false,
        }
    }
}

impl ScanOptions {
    /// Options with clamscan's documented default for every value-bearing option
    /// set explicitly. Switches stay off.
    pub fn with_documented_defaults() -> Self {
        let yes = Some(YesNo::Yes);
        let no = Some(YesNo::No);

        Self {
            cross_fs: yes,
            follow_dir_symlinks: Some(SymlinkMode::Direct),
            follow_file_symlinks: Some(SymlinkMode::Direct),
            remove: no,
            bytecode: yes,
            bytecode_unsigned: no,
            bytecode_timeout: Some(10_000),
            statistics: Some(Statistics::Disabled),
            detect_pua: no,
            detect_structured: no,
            structured_ssn_format: Some(SsnFormat::Normal),
            structured_ssn_count: Some(3),
            structured_cc_count: Some(3),
            scan_mail: yes,
            phishing_sigs: yes,
            phishing_scan_urls: yes,
            heuristic_alerts: yes,
            heuristic_scan_precedence: no,
            normalize: yes,
            scan_pe: yes,
            scan_elf: yes,
            scan_ole2: yes,
            scan_pdf: yes,
            scan_swf: yes,
            scan_html: yes,
            scan_xmldocs: yes,
            scan_hwp3: yes,
            scan_onenote: yes,
            scan_archive: yes,
            alert_broken: no,
            alert_broken_media: no,
            alert_encrypted: no,
            alert_encrypted_archive: no,
            alert_encrypted_doc: no,
            alert_macros: no,
            alert_exceeds_max: no,
            alert_phishing_ssl: no,
            alert_phishing_cloak: no,
            alert_partition_intersection: no,
            max_scantime: Some(120_000),
            max_filesize: Some(SizeValue::megabytes(100)),
            max_scansize: Some(SizeValue::megabytes(400)),
            max_files: Some(10_000),
            max_recursion: Some(17),
            max_dir_recursion: Some(15),
            max_embeddedpe: Some(SizeValue::megabytes(40)),
            max_htmlnormalize: Some(SizeValue::megabytes(40)),
            max_htmlnotags: Some(SizeValue::megabytes(8)),
            max_scriptnormalize: Some(SizeValue::megabytes(20)),
            max_ziptypercg: Some(SizeValue::megabytes(1)),
            max_partitions: Some(50),
            max_iconspe: Some(100),
            max_rechwp3: Some(16),
            pcre_match_limit: Some(100_000),
            pcre_recmatch_limit: Some(2_000),
            pcre_max_filesize: Some(SizeValue::megabytes(100)),
            ..Self::default()
        }
    }

    /// Parse a JSON document. Missing keys keep their defaults; unknown keys
    /// and out-of-domain values are rejected.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let options: ScanOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Default options with `name=value` overrides applied.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::default().with_overrides(pairs)
    }

    /// Copy of `self` with overrides applied in order; a later pair for the
    /// same option wins. Names may use hyphens, a leading `--`, or the field
    /// name of an aliased option (`move_to` for `move`). An empty value
    /// unsets a value-bearing option.
    pub fn with_overrides<I, K, V>(&self, pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut document = serde_json::to_value(self)?;
        let Some(fields) = document.as_object_mut() else {
            return Err(ValidationError::MalformedAssignment(
                "options did not serialize to an object".to_string(),
            ));
        };

        for (name, raw) in pairs {
            let name = name.as_ref();
            let raw = raw.as_ref();

            if name.trim() == "command" {
                fields.insert("command".to_string(), Value::String(raw.trim().to_string()));
                continue;
            }

            let spec = OptionSpec::lookup(name)
                .ok_or_else(|| ValidationError::UnknownOption(name.to_string()))?;
            let value = spec.kind.parse_raw(spec.name, raw)?;
            fields.insert(spec.external_name().to_string(), value);
        }

        let options: ScanOptions = serde_json::from_value(document)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.command.trim().is_empty() {
            return Err(ValidationError::EmptyValue("command".to_string()));
        }

        for spec in OPTION_SCHEMA.iter().filter(|spec| spec.kind == OptionKind::Text) {
            if let OptionValue::Value(Some(text)) = spec.read(self) {
                if text.trim().is_empty() {
                    return Err(ValidationError::EmptyValue(spec.external_name().to_string()));
                }
            }
        }

        if let Some(size) = self.max_filesize {
            if size.as_bytes() > MAX_FILESIZE_LIMIT {
                return Err(ValidationError::OutOfRange {
                    option: "max_filesize",
                    reason: format!("{} exceeds the 2GB limit", size),
                });
            }
        }

        for (option, value) in [
            ("max_partitions", self.max_partitions),
            ("max_iconspe", self.max_iconspe),
        ] {
            if value == Some(0) {
                return Err(ValidationError::OutOfRange {
                    option,
                    reason: "must be a positive integer".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Compile into a `clamscan` argument list.
    pub fn compile(&self) -> CommandLine {
        compile(self)
    }
}
