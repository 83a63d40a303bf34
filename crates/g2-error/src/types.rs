// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static native-code → category table.

use crate::ErrorCategory::{self, *};

/// Native code → categories, sorted by code. Detail categories come before
/// the base category they refine.
static ERROR_TYPES: &[(i64, &[ErrorCategory])] = &[
    // Input validation.
    (2, &[BadUserInput]),
    (7, &[BadUserInput]),
    (10, &[RetryTimeoutExceeded, Retryable]),
    (14, &[Configuration, Unrecoverable]),
    (19, &[Configuration, Unrecoverable]),
    (20, &[Configuration, Unrecoverable]),
    (21, &[Configuration, Unrecoverable]),
    (22, &[BadUserInput]),
    (23, &[MissingDataSource, BadUserInput]),
    (24, &[BadUserInput]),
    (25, &[BadUserInput]),
    (26, &[BadUserInput]),
    (27, &[NotFound, BadUserInput]),
    (28, &[BadUserInput]),
    (29, &[BadUserInput]),
    (30, &[IncompleteRecord, BadUserInput]),
    (31, &[BadUserInput]),
    (32, &[UnacceptableJsonKeyValue, BadUserInput]),
    (33, &[NotFound, BadUserInput]),
    (34, &[Configuration, Unrecoverable]),
    (35, &[Configuration, Unrecoverable]),
    (36, &[Configuration, Unrecoverable]),
    (37, &[NotFound, BadUserInput]),
    (38, &[Retryable]),
    (39, &[Retryable]),
    (40, &[Retryable]),
    (41, &[BadUserInput]),
    (42, &[BadUserInput]),
    (43, &[BadUserInput]),
    (44, &[Configuration, Unrecoverable]),
    (45, &[Unrecoverable]),
    (46, &[BadUserInput]),
    (47, &[General]),
    (48, &[Unrecoverable]),
    (49, &[Unrecoverable]),
    (50, &[Unrecoverable]),
    (51, &[MissingDataSource, BadUserInput]),
    (53, &[Unrecoverable]),
    (54, &[Database, Unrecoverable]),
    (61, &[Configuration, Unrecoverable]),
    (62, &[Configuration, Unrecoverable]),
    (63, &[ModuleNotInitialized, Unrecoverable]),
    (64, &[Configuration, Unrecoverable]),
    (70, &[RepositoryPurged, Retryable]),
    (87, &[Unhandled, Unrecoverable]),
    (88, &[BadUserInput]),
    (120, &[MalformedJson, BadUserInput]),
    (121, &[MalformedJson, BadUserInput]),
    (122, &[BadUserInput]),
    (123, &[BadUserInput]),
    (131, &[MessageBuffer, BadUserInput]),
    (999, &[ModuleLicense, Unrecoverable]),
    // Database.
    (1000, &[Database, Unrecoverable]),
    (1001, &[Database, Unrecoverable]),
    (1002, &[Database, Unrecoverable]),
    (1003, &[Database, Unrecoverable]),
    (1004, &[Database, Unrecoverable]),
    (1005, &[Database, Unrecoverable]),
    (1006, &[DatabaseConnectionLost, Retryable]),
    (1007, &[DatabaseConnectionLost, Retryable]),
    (1008, &[Database, Retryable]),
    (1009, &[Database, Retryable]),
    (1010, &[Database, Unrecoverable]),
    // Module.
    (2001, &[Module, Unrecoverable]),
    (2002, &[ModuleGeneric, Unrecoverable]),
    (2003, &[ModuleInvalidXml, BadUserInput]),
    (2004, &[ModuleEmptyMessage, General, Unrecoverable]),
    (2005, &[ModuleResolveMissingResEnt, Retryable]),
    (2006, &[MissingConfiguration, Unrecoverable]),
    (2007, &[ModuleNotInitialized, Unrecoverable]),
    // Binding-level call failures.
    (4001, &[General]),
    // Load/startup.
    (7213, &[MessageBuffer, Retryable]),
    (7216, &[BadUserInput]),
    (7217, &[ModuleLicense, Unrecoverable]),
    (7218, &[MissingConfiguration, Unrecoverable]),
    (7220, &[MissingConfiguration, Unrecoverable]),
    (7221, &[MissingConfiguration, Unrecoverable]),
    (7426, &[BadUserInput]),
    (7511, &[Unhandled, Unrecoverable]),
    (9000, &[ModuleLicense, Unrecoverable]),
    // Reserved for SDK self-tests.
    (99900, &[General]),
    (99901, &[BadUserInput]),
    (99902, &[Retryable]),
    (99903, &[Unrecoverable]),
];

/// Categories `code` maps to, in table order.
///
/// Unknown codes (including zero and negatives) map to an empty slice; the
/// engine may introduce codes this table has not caught up with.
pub fn categories_of(code: i64) -> &'static [ErrorCategory] {
    ERROR_TYPES
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|i| ERROR_TYPES[i].1)
        .unwrap_or(&[])
}

/// The whole table in ascending code order.
pub fn error_types() -> impl Iterator<Item = (i64, &'static [ErrorCategory])> {
    ERROR_TYPES.iter().copied()
}
