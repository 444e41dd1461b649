//! Switch intent and its persisted key/value layout.

use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::catalog::IconIdentifier;

/// Persisted key holding the requested icon of the pending intent.
pub const PENDING_ICON_KEY: &str = "pendingIcon";
/// Persisted key holding the consecutive apply-failure count.
pub const ERROR_COUNT_KEY: &str = "errorCount";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Single-slot record of the icon the user last asked for and has not yet seen applied.
pub struct SwitchIntent {
    /// Icon the coordinator is trying to make active.
    pub requested_icon: IconIdentifier,
    /// Creation time in unix milliseconds.
    pub created_at_unix_ms: u64,
}

impl SwitchIntent {
    /// Creates an intent stamped with the current wall-clock time.
    ///
    /// A clock set before 1970 stamps `0`; the timestamp is diagnostic only.
    pub fn new(requested_icon: IconIdentifier) -> Self {
        let created_at_unix_ms = UNIX_EPOCH
            .elapsed()
            .map(|since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self {
            requested_icon,
            created_at_unix_ms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Serialized shape of the intent namespace.
///
/// Keys are `pendingIcon`, `pendingCreatedAtUnixMs`, and `errorCount`. The pending icon is kept as
/// raw text so a value written by an older catalog can still be read and abandoned.
pub struct IntentRecord {
    /// Requested icon of the pending intent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_icon: Option<String>,
    /// Creation time of the pending intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_created_at_unix_ms: Option<u64>,
    /// Consecutive apply failures for the pending intent.
    #[serde(default)]
    pub error_count: u32,
}

impl IntentRecord {
    /// Returns the pending intent, treating blank stored names as absent.
    pub fn pending_intent(&self) -> Option<SwitchIntent> {
        let requested_icon = IconIdentifier::new(self.pending_icon.as_deref()?).ok()?;
        Some(SwitchIntent {
            requested_icon,
            created_at_unix_ms: self.pending_created_at_unix_ms.unwrap_or_default(),
        })
    }

    /// Overwrites the pending slot with `intent`.
    pub fn set_pending(&mut self, intent: &SwitchIntent) {
        self.pending_icon = Some(intent.requested_icon.to_string());
        self.pending_created_at_unix_ms = Some(intent.created_at_unix_ms);
    }

    /// Empties the pending slot.
    pub fn clear_pending(&mut self) {
        self.pending_icon = None;
        self.pending_created_at_unix_ms = None;
    }
}
