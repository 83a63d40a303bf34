// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed classification of Senzing G2 native error codes.
//!
//! The native engine signals failure with nothing more than an integer code
//! and a message. [`G2Error::build`] looks the code up in a static table
//! ([`categories_of`]) and attaches every matching [`ErrorCategory`] to the
//! resulting error. Callers then ask [`is`] / [`is_in_list`] whether an error
//! belongs to a category without knowing how deeply it has been wrapped.
//!
//! ```
//! use g2_error::{ErrorCategory, G2Error, is, is_in_list};
//!
//! let err = G2Error::build(33, "0033E|Unknown record");
//! assert!(is(&err, ErrorCategory::BadUserInput));
//! assert!(is(&err, ErrorCategory::NotFound));
//! assert!(!is_in_list(&err, &[ErrorCategory::Retryable, ErrorCategory::Unrecoverable]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod exception;
mod types;

pub use exception::{error_code, error_message};
pub use types::{categories_of, error_types};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Classification bucket a native error can belong to.
///
/// The first four variants are *base* categories and drive the caller's
/// triage (report, retry, abort). The rest are *detail* categories that
/// refine the reason and always co-occur with a base category in the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    // -- Base --
    /// Generic failure with no more specific triage.
    General,
    /// The caller supplied bad input; retrying unchanged will fail again.
    BadUserInput,
    /// Transient failure; the same call may succeed later.
    Retryable,
    /// The engine cannot continue; abort.
    Unrecoverable,

    // -- Detail --
    /// Engine configuration is invalid.
    Configuration,
    /// The database connection dropped.
    DatabaseConnectionLost,
    /// Database failure.
    Database,
    /// A record lacks required content.
    IncompleteRecord,
    /// A JSON document could not be parsed.
    MalformedJson,
    /// A message buffer could not be processed.
    MessageBuffer,
    /// No configuration has been registered.
    MissingConfiguration,
    /// The referenced data source is not configured.
    MissingDataSource,
    /// A module received an empty message.
    ModuleEmptyMessage,
    /// Module-level failure.
    Module,
    /// Unclassified module failure.
    ModuleGeneric,
    /// Module received invalid XML.
    ModuleInvalidXml,
    /// License is missing, expired, or exceeded.
    ModuleLicense,
    /// The module was used before initialisation.
    ModuleNotInitialized,
    /// Resolution referenced a resolved entity that does not exist.
    ModuleResolveMissingResEnt,
    /// The requested entity or record does not exist.
    NotFound,
    /// The repository was purged underneath the call.
    RepositoryPurged,
    /// A retry loop inside the engine gave up.
    RetryTimeoutExceeded,
    /// A JSON key holds a value the engine does not accept.
    UnacceptableJsonKeyValue,
    /// The engine hit a condition it does not handle.
    Unhandled,
}

impl ErrorCategory {
    /// Every category, base categories first.
    pub const ALL: [ErrorCategory; 24] = [
        Self::General,
        Self::BadUserInput,
        Self::Retryable,
        Self::Unrecoverable,
        Self::Configuration,
        Self::DatabaseConnectionLost,
        Self::Database,
        Self::IncompleteRecord,
        Self::MalformedJson,
        Self::MessageBuffer,
        Self::MissingConfiguration,
        Self::MissingDataSource,
        Self::ModuleEmptyMessage,
        Self::Module,
        Self::ModuleGeneric,
        Self::ModuleInvalidXml,
        Self::ModuleLicense,
        Self::ModuleNotInitialized,
        Self::ModuleResolveMissingResEnt,
        Self::NotFound,
        Self::RepositoryPurged,
        Self::RetryTimeoutExceeded,
        Self::UnacceptableJsonKeyValue,
        Self::Unhandled,
    ];

    /// The four triage categories.
    pub const BASE: [ErrorCategory; 4] = [
        Self::BadUserInput,
        Self::General,
        Self::Retryable,
        Self::Unrecoverable,
    ];

    /// The twenty refining categories.
    pub const DETAIL: [ErrorCategory; 20] = [
        Self::Configuration,
        Self::DatabaseConnectionLost,
        Self::Database,
        Self::IncompleteRecord,
        Self::MalformedJson,
        Self::MessageBuffer,
        Self::MissingConfiguration,
        Self::MissingDataSource,
        Self::ModuleEmptyMessage,
        Self::Module,
        Self::ModuleGeneric,
        Self::ModuleInvalidXml,
        Self::ModuleLicense,
        Self::ModuleNotInitialized,
        Self::ModuleResolveMissingResEnt,
        Self::NotFound,
        Self::RepositoryPurged,
        Self::RetryTimeoutExceeded,
        Self::UnacceptableJsonKeyValue,
        Self::Unhandled,
    ];

    /// Whether this is one of the four base categories.
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            Self::General | Self::BadUserInput | Self::Retryable | Self::Unrecoverable
        )
    }

    /// Whether this is a detail category.
    pub fn is_detail(&self) -> bool {
        !self.is_base()
    }

    /// Stable `snake_case` name, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::BadUserInput => "bad_user_input",
            Self::Retryable => "retryable",
            Self::Unrecoverable => "unrecoverable",
            Self::Configuration => "configuration",
            Self::DatabaseConnectionLost => "database_connection_lost",
            Self::Database => "database",
            Self::IncompleteRecord => "incomplete_record",
            Self::MalformedJson => "malformed_json",
            Self::MessageBuffer => "message_buffer",
            Self::MissingConfiguration => "missing_configuration",
            Self::MissingDataSource => "missing_data_source",
            Self::ModuleEmptyMessage => "module_empty_message",
            Self::Module => "module",
            Self::ModuleGeneric => "module_generic",
            Self::ModuleInvalidXml => "module_invalid_xml",
            Self::ModuleLicense => "module_license",
            Self::ModuleNotInitialized => "module_not_initialized",
            Self::ModuleResolveMissingResEnt => "module_resolve_missing_res_ent",
            Self::NotFound => "not_found",
            Self::RepositoryPurged => "repository_purged",
            Self::RetryTimeoutExceeded => "retry_timeout_exceeded",
            Self::UnacceptableJsonKeyValue => "unacceptable_json_key_value",
            Self::Unhandled => "unhandled",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`ErrorCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error category: {}", self.0)
    }
}

impl StdError for UnknownCategory {}

impl FromStr for ErrorCategory {
    type Err = UnknownCategory;

    /// Accepts the `snake_case` form case-insensitively, with `-` in place
    /// of `_` allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CategorySet
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free set of categories.
///
/// Iteration follows insertion order (table order for freshly built
/// errors); membership is a single mask test.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ErrorCategory>", into = "Vec<ErrorCategory>")]
pub struct CategorySet {
    ordered: Vec<ErrorCategory>,
    mask: u32,
}

impl CategorySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `category`; returns `false` if it was already present.
    pub fn insert(&mut self, category: ErrorCategory) -> bool {
        if self.contains(category) {
            return false;
        }
        self.mask |= category.bit();
        self.ordered.push(category);
        true
    }

    /// Membership test.
    pub fn contains(&self, category: ErrorCategory) -> bool {
        self.mask & category.bit() != 0
    }

    /// Number of categories held.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no category is held.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ErrorCategory> + '_ {
        self.ordered.iter().copied()
    }

    /// Categories in insertion order, as a slice.
    pub fn as_slice(&self) -> &[ErrorCategory] {
        &self.ordered
    }

    /// First base category held, if any.
    pub fn first_base(&self) -> Option<ErrorCategory> {
        self.iter().find(ErrorCategory::is_base)
    }
}

impl fmt::Debug for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ordered.iter()).finish()
    }
}

impl Extend<ErrorCategory> for CategorySet {
    fn extend<I: IntoIterator<Item = ErrorCategory>>(&mut self, iter: I) {
        for category in iter {
            self.insert(category);
        }
    }
}

impl FromIterator<ErrorCategory> for CategorySet {
    fn from_iter<I: IntoIterator<Item = ErrorCategory>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<ErrorCategory>> for CategorySet {
    fn from(v: Vec<ErrorCategory>) -> Self {
        v.into_iter().collect()
    }
}

impl From<&[ErrorCategory]> for CategorySet {
    fn from(v: &[ErrorCategory]) -> Self {
        v.iter().copied().collect()
    }
}

impl From<CategorySet> for Vec<ErrorCategory> {
    fn from(set: CategorySet) -> Self {
        set.ordered
    }
}

// ---------------------------------------------------------------------------
// G2Error
// ---------------------------------------------------------------------------

/// A native failure annotated with every category its code maps to.
///
/// Built once at the native boundary and immutable afterwards. Wrapping
/// another `G2Error` through [`G2Error::with_source`] folds the inner
/// categories into this one, so a single lookup answers membership for the
/// whole chain.
pub struct G2Error {
    code: i64,
    message: String,
    categories: CategorySet,
    context: BTreeMap<String, serde_json::Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl G2Error {
    /// Classify `code` and wrap `message`.
    ///
    /// Total over all integers: zero, negative and unknown codes produce an
    /// error with no categories. An empty message is replaced with a
    /// placeholder naming the code.
    pub fn build(code: i64, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = format!("unspecified Senzing error (code {code})");
        }
        Self {
            code,
            message,
            categories: categories_of(code).into(),
            context: BTreeMap::new(),
            source: None,
        }
    }

    /// Classify the text returned by the engine's `getLastException`,
    /// taking the code from its `NNNNx|` prefix.
    pub fn from_exception(raw: &str) -> Self {
        Self::build(error_code(raw), raw)
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// Values that fail to serialise are skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    ///
    /// If the cause (or anything in its source chain) is a `G2Error`, its
    /// categories are appended after this error's own.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        let source: Box<dyn StdError + Send + Sync> = Box::new(source);
        if let Some(inner) = find_classified(source.as_ref()) {
            self.categories.extend(inner.categories.iter());
        }
        self.source = Some(source);
        self
    }

    /// Native code the error was built from.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Message supplied at construction.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every category this error belongs to.
    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Structured diagnostic context.
    pub fn context(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.context
    }

    /// Primary triage category: the first base category held, or
    /// [`ErrorCategory::General`] when none is.
    pub fn kind(&self) -> ErrorCategory {
        self.categories
            .first_base()
            .unwrap_or(ErrorCategory::General)
    }

    /// Whether this error belongs to `category`.
    pub fn is(&self, category: ErrorCategory) -> bool {
        self.categories.contains(category)
    }

    /// Whether this error belongs to any of `categories`.
    pub fn is_in_list(&self, categories: &[ErrorCategory]) -> bool {
        categories.iter().any(|c| self.is(*c))
    }

    /// Shorthand for `self.is(ErrorCategory::Retryable)`.
    pub fn is_retryable(&self) -> bool {
        self.is(ErrorCategory::Retryable)
    }

    /// Shorthand for `self.is(ErrorCategory::BadUserInput)`.
    pub fn is_bad_user_input(&self) -> bool {
        self.is(ErrorCategory::BadUserInput)
    }

    /// Shorthand for `self.is(ErrorCategory::Unrecoverable)`.
    pub fn is_unrecoverable(&self) -> bool {
        self.is(ErrorCategory::Unrecoverable)
    }
}

impl fmt::Debug for G2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("G2Error");
        d.field("code", &self.code);
        d.field("message", &self.message);
        d.field("categories", &self.categories);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for G2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.context.is_empty() {
            // BTreeMap keeps the output deterministic.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl StdError for G2Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// ---------------------------------------------------------------------------
// Membership predicates
// ---------------------------------------------------------------------------

/// Build a classified error from a native `(code, message)` pair.
pub fn build_error(code: i64, message: impl Into<String>) -> G2Error {
    G2Error::build(code, message)
}

/// Outermost [`G2Error`] in `err`'s source chain, including `err` itself.
pub fn find_classified<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a G2Error> {
    std::iter::successors(Some(err), |&e| e.source()).find_map(|e| e.downcast_ref::<G2Error>())
}

/// Whether `err` belongs to `category`.
///
/// `err` may be a [`G2Error`] or any error wrapping one (an `anyhow`
/// context, a caller's own error type with a `source`). Errors with no
/// `G2Error` in their chain belong to no category.
pub fn is(err: &(dyn StdError + 'static), category: ErrorCategory) -> bool {
    find_classified(err).is_some_and(|e| e.is(category))
}

/// Whether `err` belongs to at least one of `categories`.
///
/// An empty list never matches.
pub fn is_in_list(err: &(dyn StdError + 'static), categories: &[ErrorCategory]) -> bool {
    find_classified(err).is_some_and(|e| e.is_in_list(categories))
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`G2Error`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct G2ErrorDto {
    /// Native error code.
    pub code: i64,
    /// Message supplied at construction.
    pub message: String,
    /// Categories in table order.
    pub categories: Vec<ErrorCategory>,
    /// Structured context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&G2Error> for G2ErrorDto {
    fn from(err: &G2Error) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            categories: err.categories.as_slice().to_vec(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<G2ErrorDto> for G2Error {
    fn from(dto: G2ErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            categories: dto.categories.into(),
            context: dto.context,
            source: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    // -- ErrorCategory ---------------------------------------------------

    #[test]
    fn all_has_every_variant_once() {
        let unique: HashSet<_> = ErrorCategory::ALL.iter().collect();
        assert_eq!(unique.len(), ErrorCategory::ALL.len());
        assert_eq!(ErrorCategory::ALL.len(), 24);
    }

    #[test]
    fn base_and_detail_partition_all() {
        let base = ErrorCategory::ALL.iter().filter(|c| c.is_base()).count();
        let detail = ErrorCategory::ALL.iter().filter(|c| c.is_detail()).count();
        assert_eq!(base, 4);
        assert_eq!(detail, 20);
        assert!(ErrorCategory::BASE.iter().all(ErrorCategory::is_base));
        assert!(ErrorCategory::DETAIL.iter().all(ErrorCategory::is_detail));
    }

    #[test]
    fn bits_fit_the_mask() {
        for c in ErrorCategory::ALL {
            assert!((c as u32) < 32, "{c:?} does not fit in a u32 mask");
        }
    }

    #[test]
    fn as_str_matches_serde() {
        for c in ErrorCategory::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ErrorCategory::ModuleInvalidXml.to_string(), "module_invalid_xml");
        assert_eq!(ErrorCategory::BadUserInput.to_string(), "bad_user_input");
    }

    #[test]
    fn from_str_accepts_variants_of_spelling() {
        assert_eq!(
            "retryable".parse::<ErrorCategory>(),
            Ok(ErrorCategory::Retryable)
        );
        assert_eq!(
            "Bad-User-Input".parse::<ErrorCategory>(),
            Ok(ErrorCategory::BadUserInput)
        );
        assert!("nope".parse::<ErrorCategory>().is_err());
    }

    // -- CategorySet -----------------------------------------------------

    #[test]
    fn set_keeps_insertion_order_and_rejects_duplicates() {
        let mut set = CategorySet::new();
        assert!(set.insert(ErrorCategory::NotFound));
        assert!(set.insert(ErrorCategory::BadUserInput));
        assert!(!set.insert(ErrorCategory::NotFound));
        assert_eq!(
            set.as_slice(),
            &[ErrorCategory::NotFound, ErrorCategory::BadUserInput]
        );
        assert_eq!(set.first_base(), Some(ErrorCategory::BadUserInput));
    }

    #[test]
    fn set_serialises_as_a_list() {
        let set: CategorySet = vec![ErrorCategory::Database, ErrorCategory::Retryable].into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["database","retryable"]"#);
        let back: CategorySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn set_deserialisation_drops_duplicates() {
        let set: CategorySet = serde_json::from_str(r#"["general","general"]"#).unwrap();
        assert_eq!(set.len(), 1);
    }

    // -- G2Error ---------------------------------------------------------

    #[test]
    fn build_attaches_table_categories() {
        let err = G2Error::build(1006, "connection lost");
        assert_eq!(err.code(), 1006);
        assert!(err.is(ErrorCategory::DatabaseConnectionLost));
        assert!(err.is_retryable());
        assert!(!err.is_unrecoverable());
        assert_eq!(err.kind(), ErrorCategory::Retryable);
    }

    #[test]
    fn unknown_code_has_no_categories_but_general_kind() {
        let err = G2Error::build(999_999, "custom");
        assert!(err.categories().is_empty());
        assert_eq!(err.kind(), ErrorCategory::General);
        assert!(!err.is(ErrorCategory::General));
    }

    #[test]
    fn zero_and_negative_codes_are_uncategorised() {
        for code in [0, -1, i64::MIN] {
            assert!(G2Error::build(code, "x").categories().is_empty());
        }
    }

    #[test]
    fn empty_message_is_replaced() {
        let err = G2Error::build(7, "   ");
        assert!(err.message().contains("code 7"));
    }

    #[test]
    fn display_is_message() {
        assert_eq!(G2Error::build(4001, "boom").to_string(), "boom");
    }

    #[test]
    fn display_with_context() {
        let err = G2Error::build(4001, "boom").with_context("return_code", -2);
        let s = err.to_string();
        assert!(s.starts_with("boom"));
        assert!(s.contains(r#""return_code":-2"#));
    }

    #[test]
    fn debug_lists_categories() {
        let dbg = format!("{:?}", G2Error::build(33, "missing"));
        assert!(dbg.contains("NotFound"));
        assert!(dbg.contains("BadUserInput"));
    }

    #[test]
    fn with_source_merges_inner_categories() {
        let inner = G2Error::build(1006, "lost");
        let outer = G2Error::build(33, "lookup failed").with_source(inner);
        assert_eq!(
            outer.categories().as_slice(),
            &[
                ErrorCategory::NotFound,
                ErrorCategory::BadUserInput,
                ErrorCategory::DatabaseConnectionLost,
                ErrorCategory::Retryable,
            ]
        );
        assert_eq!(outer.kind(), ErrorCategory::BadUserInput);
    }

    #[test]
    fn with_foreign_source_keeps_categories() {
        let src = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let err = G2Error::build(1006, "lost").with_source(src);
        assert_eq!(err.categories().len(), 2);
        assert_eq!(StdError::source(&err).unwrap().to_string(), "pipe");
    }

    #[test]
    fn from_exception_parses_code() {
        let err = G2Error::from_exception("0037E|Unknown resolved entity value '-4'");
        assert_eq!(err.code(), 37);
        assert!(err.is(ErrorCategory::NotFound));
        assert!(err.message().contains("Unknown resolved entity"));
    }

    // -- Predicates ------------------------------------------------------

    #[test]
    fn predicates_on_plain_error() {
        let err = build_error(1006, "lost");
        assert_eq!(
            is(&err, ErrorCategory::Database),
            err.is(ErrorCategory::Database)
        );
        assert!(is_in_list(&err, &[ErrorCategory::NotFound, ErrorCategory::Retryable]));
        assert!(!is_in_list(&err, &[]));
    }

    #[test]
    fn predicates_on_foreign_error() {
        let err = io::Error::other("not ours");
        for c in ErrorCategory::ALL {
            assert!(!is(&err, c));
        }
        assert!(!is_in_list(&err, &ErrorCategory::ALL));
    }

    #[test]
    fn find_classified_walks_sources() {
        let err = G2Error::build(48, "fatal");
        let wrapped = anyhow::Error::from(err).context("while initialising");
        let found = find_classified(wrapped.as_ref()).unwrap();
        assert_eq!(found.code(), 48);
    }

    #[test]
    fn find_classified_reaches_deep_sources() {
        let mut err = anyhow::Error::from(G2Error::build(1009, "retry later"));
        for depth in 0..5 {
            err = err.context(format!("layer {depth}"));
        }
        let found = find_classified(err.as_ref()).unwrap();
        assert_eq!(found.code(), 1009);
        assert!(is(err.as_ref(), ErrorCategory::Retryable));
        assert!(find_classified(&io::Error::other("plain")).is_none());
    }

    // -- DTO -------------------------------------------------------------

    #[test]
    fn dto_preserves_categories_and_source_text() {
        let err = G2Error::build(1006, "lost")
            .with_context("method", "addRecord")
            .with_source(io::Error::other("socket closed"));
        let dto = G2ErrorDto::from(&err);
        assert_eq!(
            dto.categories,
            vec![ErrorCategory::DatabaseConnectionLost, ErrorCategory::Retryable]
        );
        assert_eq!(dto.source_message.as_deref(), Some("socket closed"));

        let back: G2Error = dto.into();
        assert!(back.is_retryable());
        assert!(StdError::source(&back).is_none());
    }

    #[test]
    fn dto_json_shape() {
        let dto = G2ErrorDto::from(&G2Error::build(4001, "boom"));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": 4001, "message": "boom", "categories": ["general"]})
        );
    }
}
