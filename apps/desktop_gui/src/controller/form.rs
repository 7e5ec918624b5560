//! Form state: the editable draft, its raw input buffers, and the busy guard
//! that keeps predictions serialized.

use std::collections::{BTreeMap, BTreeSet};

use crossbeam_channel::Sender;
use shared::{
    domain::{Amenity, FieldEditError, PropertyDraft, PropertyField},
    error::ApiError,
    protocol::PredictionEnvelope,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::orchestration::dispatch_backend_command;

#[derive(Debug, Clone)]
pub struct FormController {
    draft: PropertyDraft,
    inputs: BTreeMap<PropertyField, String>,
    rejected: BTreeSet<PropertyField>,
    busy: bool,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        let draft = PropertyDraft::default();
        let inputs = PropertyField::numeric()
            .map(|field| (field, draft.get(field).to_string()))
            .collect();
        Self {
            draft,
            inputs,
            rejected: BTreeSet::new(),
            busy: false,
        }
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Raw text currently shown in a numeric input.
    pub fn input(&self, field: PropertyField) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Stores the raw text and, when it parses, the coerced value for that
    /// field only. Text that does not parse keeps the previous draft value.
    pub fn edit_numeric(&mut self, field: PropertyField, raw: String) -> Result<(), FieldEditError> {
        let outcome = self.draft.apply_raw(field, &raw);
        self.inputs.insert(field, raw);
        match outcome {
            Ok(_) => {
                self.rejected.remove(&field);
                Ok(())
            }
            Err(err) => {
                self.rejected.insert(field);
                Err(err)
            }
        }
    }

    pub fn toggle_amenity(&mut self, amenity: Amenity, checked: bool) {
        self.draft.set_amenity(amenity, checked);
    }

    /// Advisory hint for a numeric input. Never blocks submission.
    pub fn advisory(&self, field: PropertyField) -> Option<String> {
        if self.rejected.contains(&field) {
            return Some("Not a number; the previous value is kept".to_string());
        }
        let spec = field.spec();
        let value = self.draft.get(field).as_f64();
        (!spec.contains(value)).then(|| format!("Expected {} to {}", spec.min, spec.max))
    }

    /// Queues a prediction for the current draft. A no-op while a previous
    /// prediction is still in flight.
    pub fn submit(&mut self, cmd_tx: &Sender<BackendCommand>, status: &mut String) -> bool {
        if self.busy {
            tracing::debug!("ignoring submit while a prediction is in flight");
            return false;
        }

        self.busy = true;
        let queued = dispatch_backend_command(
            cmd_tx,
            BackendCommand::Predict {
                draft: self.draft.clone(),
            },
            status,
        );
        if !queued {
            self.busy = false;
        } else {
            *status = "Predicting...".to_string();
        }
        queued
    }

    /// Restores every field to its default. Disabled while busy.
    pub fn reset(&mut self) -> bool {
        if self.busy {
            return false;
        }
        *self = Self::new();
        true
    }

    /// Settles the in-flight prediction. The busy flag is cleared first in
    /// both cases; a success is handed to `on_complete`, a failure is returned
    /// for the caller to surface. The draft is left as the user entered it.
    pub fn settle(
        &mut self,
        outcome: Result<PredictionEnvelope, ApiError>,
        on_complete: impl FnOnce(PredictionEnvelope),
    ) -> Result<(), ApiError> {
        self.busy = false;
        outcome.map(on_complete)
    }
}
