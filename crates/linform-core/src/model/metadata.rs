//! Names and provenance metadata for variables and constraints.
//!
//! The linearization engine tags everything it creates in one step: a
//! deterministic name plus a JSON provenance record. Storage is lazy, so a
//! model that is never annotated allocates none of the maps.

use std::collections::BTreeMap;

use linform_expr::ids::{ConstraintId, VariableId};

use crate::model::error::ModelError;
use crate::model::Model;

impl Model {
    /// Name a variable and record its provenance in one step.
    pub fn annotate_variable(
        &mut self,
        id: VariableId,
        name: String,
        provenance: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_variable_exists(id)?;
        self.variable_names
            .get_or_insert_with(BTreeMap::new)
            .insert(id, name);
        self.variable_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, provenance);
        Ok(())
    }

    /// Name a constraint and record its provenance in one step.
    pub fn annotate_constraint(
        &mut self,
        id: ConstraintId,
        name: String,
        provenance: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_constraint_exists(id)?;
        self.constraint_names
            .get_or_insert_with(BTreeMap::new)
            .insert(id, name);
        self.constraint_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, provenance);
        Ok(())
    }

    /// Record provenance for a constraint without touching its name.
    ///
    /// Rewritten rows keep the name they were authored with.
    pub fn set_constraint_metadata(
        &mut self,
        id: ConstraintId,
        provenance: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_constraint_exists(id)?;
        self.constraint_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, provenance);
        Ok(())
    }

    pub fn get_variable_name(&self, id: VariableId) -> Option<&str> {
        self.variable_names
            .as_ref()
            .and_then(|names| names.get(&id).map(|s| s.as_str()))
    }

    pub fn get_constraint_name(&self, id: ConstraintId) -> Option<&str> {
        self.constraint_names
            .as_ref()
            .and_then(|names| names.get(&id).map(|s| s.as_str()))
    }

    pub fn get_variable_metadata(&self, id: VariableId) -> Option<&serde_json::Value> {
        self.variable_metadata
            .as_ref()
            .and_then(|meta| meta.get(&id))
    }

    pub fn get_constraint_metadata(&self, id: ConstraintId) -> Option<&serde_json::Value> {
        self.constraint_metadata
            .as_ref()
            .and_then(|meta| meta.get(&id))
    }

    /// Set objective name.
    pub fn set_objective_name(&mut self, name: Option<String>) {
        self.objective_name = name;
    }

    /// Get objective name.
    pub fn get_objective_name(&self) -> Option<&str> {
        self.objective_name.as_deref()
    }
}
