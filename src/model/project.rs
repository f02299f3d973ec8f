//! Project Container
//!
//! Owns the frequency axis, materials, subsystems, junctions and loads.
//! Every mutation re-validates referential integrity and leaves the project
//! untouched when it fails.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::junction::{Junction, JunctionKind};
use super::load::Load;
use super::material::Material;
use super::subsystem::{Subsystem, SubsystemId, SubsystemKind};
use super::view::{GeometryView, JunctionShape, SubsystemShape};
use crate::coupling;
use crate::error::{Result, SeaError, ValidationError};
use crate::frequency::FrequencyAxis;
use crate::templates::TemplateModel;

/// Identifier returned by the `add_*` operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    Material(String),
    Subsystem(SubsystemId),
    Junction(String),
    Load(String),
}

/// Descriptive project information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: "Untitled Project".to_string(),
            description: String::new(),
            author: String::new(),
            version: "1.0.0".to_string(),
            created: now,
            modified: now,
        }
    }
}

/// Serialized shape of a project, validated on the way in
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectDocument {
    #[serde(default)]
    metadata: ProjectMetadata,
    frequency_axis: FrequencyAxis,
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    subsystems: Vec<Subsystem>,
    #[serde(default)]
    junctions: Vec<Junction>,
    #[serde(default)]
    loads: Vec<Load>,
}

/// SEA project: topology, materials and frequency configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProjectDocument")]
pub struct Project {
    metadata: ProjectMetadata,
    frequency_axis: FrequencyAxis,
    materials: Vec<Material>,
    subsystems: Vec<Subsystem>,
    junctions: Vec<Junction>,
    loads: Vec<Load>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Create an empty project on the default third-octave axis
    pub fn new() -> Self {
        Self::with_axis(FrequencyAxis::default())
    }

    pub fn with_axis(frequency_axis: FrequencyAxis) -> Self {
        Self {
            metadata: ProjectMetadata::default(),
            frequency_axis,
            materials: Vec::new(),
            subsystems: Vec::new(),
            junctions: Vec::new(),
            loads: Vec::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        let mut project = Self::new();
        project.metadata.name = name.to_string();
        project
    }

    // === Accessors ===

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ProjectMetadata {
        &mut self.metadata
    }

    pub fn frequency_axis(&self) -> &FrequencyAxis {
        &self.frequency_axis
    }

    pub fn set_frequency_axis(&mut self, axis: FrequencyAxis) {
        self.frequency_axis = axis;
        self.touch();
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Subsystems in insertion order
    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn subsystem(&self, id: SubsystemId) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.id == id)
    }

    pub fn junction(&self, name: &str) -> Option<&Junction> {
        self.junctions.iter().find(|j| j.name == name)
    }

    pub fn load_named(&self, name: &str) -> Option<&Load> {
        self.loads.iter().find(|l| l.name == name)
    }

    /// Smallest id greater than every id in use
    pub fn next_subsystem_id(&self) -> SubsystemId {
        let max = self.subsystems.iter().map(|s| s.id.0).max().unwrap_or(0);
        SubsystemId(max + 1)
    }

    // === Materials ===

    pub fn add_material(&mut self, material: Material) -> Result<EntityId> {
        material.validate()?;
        if self.material(&material.name).is_some() {
            return Err(ValidationError::DuplicateName {
                kind: "material",
                name: material.name,
            }
            .into());
        }
        let id = EntityId::Material(material.name.clone());
        self.materials.push(material);
        self.touch();
        Ok(id)
    }

    /// Remove an unreferenced material
    pub fn remove_material(&mut self, name: &str) -> Result<Material> {
        let index = self
            .materials
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| not_found("material", name))?;

        let dependents: Vec<String> = self
            .subsystems
            .iter()
            .filter(|s| s.material == name)
            .map(|s| format!("subsystem {}", s.id))
            .collect();
        if !dependents.is_empty() {
            return Err(ValidationError::InUse {
                entity: format!("material '{}'", name),
                dependents,
            }
            .into());
        }

        self.touch();
        Ok(self.materials.remove(index))
    }

    // === Subsystems ===

    pub fn add_subsystem(&mut self, subsystem: Subsystem) -> Result<EntityId> {
        if self.subsystem(subsystem.id).is_some() {
            return Err(ValidationError::DuplicateSubsystem(subsystem.id).into());
        }
        self.check_subsystem(&subsystem)?;

        let id = subsystem.id;
        debug!("Adding {} subsystem {} '{}'", subsystem.kind(), id, subsystem.name);
        self.subsystems.push(subsystem);
        self.touch();
        Ok(EntityId::Subsystem(id))
    }

    /// Replace the subsystem with the same id
    ///
    /// Junctions and loads attached to it must stay valid for the new record.
    pub fn update_subsystem(&mut self, subsystem: Subsystem) -> Result<()> {
        let index = self
            .subsystems
            .iter()
            .position(|s| s.id == subsystem.id)
            .ok_or(ValidationError::UnknownSubsystem(subsystem.id))?;
        self.check_subsystem(&subsystem)?;

        let previous = std::mem::replace(&mut self.subsystems[index], subsystem);
        let id = previous.id;
        let dependents_ok = self
            .junctions
            .iter()
            .filter(|j| j.involves(id))
            .try_for_each(|j| self.check_junction(j))
            .and_then(|_| {
                self.loads
                    .iter()
                    .filter(|l| l.target == id)
                    .try_for_each(|l| self.check_load(l))
            });

        match dependents_ok {
            Ok(()) => {
                self.touch();
                Ok(())
            }
            Err(err) => {
                self.subsystems[index] = previous;
                Err(err)
            }
        }
    }

    /// Remove a subsystem that no junction or load refers to
    ///
    /// Dependents are never removed implicitly.
    pub fn remove_subsystem(&mut self, id: SubsystemId) -> Result<Subsystem> {
        let index = self
            .subsystems
            .iter()
            .position(|s| s.id == id)
            .ok_or(ValidationError::UnknownSubsystem(id))?;

        let dependents: Vec<String> = self
            .junctions
            .iter()
            .filter(|j| j.involves(id))
            .map(|j| format!("junction '{}'", j.name))
            .chain(
                self.loads
                    .iter()
                    .filter(|l| l.target == id)
                    .map(|l| format!("load '{}'", l.name)),
            )
            .collect();
        if !dependents.is_empty() {
            return Err(ValidationError::InUse {
                entity: format!("subsystem {}", id),
                dependents,
            }
            .into());
        }

        self.touch();
        Ok(self.subsystems.remove(index))
    }

    // === Junctions ===

    pub fn add_junction(&mut self, junction: Junction) -> Result<EntityId> {
        if self.junction(&junction.name).is_some() {
            return Err(ValidationError::DuplicateName {
                kind: "junction",
                name: junction.name,
            }
            .into());
        }
        self.check_junction(&junction)?;

        let id = EntityId::Junction(junction.name.clone());
        debug!(
            "Adding {} junction '{}' between {:?}",
            junction.kind.as_str(),
            junction.name,
            junction.systems
        );
        self.junctions.push(junction);
        self.touch();
        Ok(id)
    }

    /// Append a junction without any checks
    #[cfg(test)]
    pub(crate) fn push_junction_unchecked(&mut self, junction: Junction) {
        self.junctions.push(junction);
    }

    pub fn remove_junction(&mut self, name: &str) -> Result<Junction> {
        let index = self
            .junctions
            .iter()
            .position(|j| j.name == name)
            .ok_or_else(|| not_found("junction", name))?;
        self.touch();
        Ok(self.junctions.remove(index))
    }

    // === Loads ===

    pub fn add_load(&mut self, load: Load) -> Result<EntityId> {
        if self.load_named(&load.name).is_some() {
            return Err(ValidationError::DuplicateName {
                kind: "load",
                name: load.name,
            }
            .into());
        }
        self.check_load(&load)?;

        let id = EntityId::Load(load.name.clone());
        self.loads.push(load);
        self.touch();
        Ok(id)
    }

    pub fn remove_load(&mut self, name: &str) -> Result<Load> {
        let index = self
            .loads
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| not_found("load", name))?;
        self.touch();
        Ok(self.loads.remove(index))
    }

    // === Templates ===

    /// Insert every entity of a template, or none of them
    ///
    /// A material already present under the same name is reused when it is
    /// identical and rejected otherwise.
    pub fn insert_template(&mut self, model: &TemplateModel) -> Result<Vec<EntityId>> {
        let mut staged = self.clone();
        let mut ids = Vec::new();

        for material in &model.materials {
            match staged.material(&material.name) {
                Some(existing) if existing == material => {}
                _ => ids.push(staged.add_material(material.clone())?),
            }
        }
        for subsystem in &model.subsystems {
            ids.push(staged.add_subsystem(subsystem.clone())?);
        }
        for junction in &model.junctions {
            ids.push(staged.add_junction(junction.clone())?);
        }

        *self = staged;
        Ok(ids)
    }

    // === Views ===

    /// Geometry and connectivity for visualization
    pub fn geometry(&self) -> GeometryView {
        GeometryView {
            subsystems: self
                .subsystems
                .iter()
                .map(SubsystemShape::from_subsystem)
                .collect(),
            junctions: self
                .junctions
                .iter()
                .map(JunctionShape::from_junction)
                .collect(),
        }
    }

    // === Persistence ===

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and fully re-validate a project document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: ProjectDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving project '{}' to {}", self.metadata.name, path.display());
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading project from {}", path.display());
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let document: ProjectDocument = serde_json::from_reader(reader)?;
        Self::try_from(document)
    }

    // === Validation ===

    fn check_subsystem(&self, subsystem: &Subsystem) -> Result<()> {
        subsystem.geometry.validate(&subsystem.name)?;

        let material = self
            .material(&subsystem.material)
            .ok_or_else(|| ValidationError::UnknownMaterial(subsystem.material.clone()))?;
        let kind = subsystem.kind();
        if material.is_fluid() == kind.is_structural() {
            return Err(ValidationError::InvalidMaterial {
                name: material.name.clone(),
                reason: format!(
                    "a {} needs a {} material",
                    kind,
                    if kind.is_structural() { "solid" } else { "fluid" }
                ),
            }
            .into());
        }

        if let Some(eta) = subsystem.damping_loss_factor {
            if !(eta.is_finite() && eta >= 0.0) {
                return Err(SeaError::InvalidGeometry {
                    subsystem: subsystem.name.clone(),
                    reason: format!("damping loss factor must be non-negative, got {}", eta),
                });
            }
        }
        if let Some(area) = subsystem.absorption_area {
            if kind != SubsystemKind::Cavity {
                return Err(SeaError::InvalidGeometry {
                    subsystem: subsystem.name.clone(),
                    reason: "absorption area only applies to cavities".to_string(),
                });
            }
            if !(area.is_finite() && area >= 0.0) {
                return Err(SeaError::InvalidGeometry {
                    subsystem: subsystem.name.clone(),
                    reason: format!("absorption area must be non-negative, got {}", area),
                });
            }
        }
        Ok(())
    }

    fn check_junction(&self, junction: &Junction) -> Result<()> {
        let count = junction.systems.len();
        if !(2..=3).contains(&count) {
            return Err(ValidationError::MemberCount {
                junction: junction.name.clone(),
                count,
            }
            .into());
        }
        for (i, id) in junction.systems.iter().enumerate() {
            if junction.systems[..i].contains(id) {
                return Err(ValidationError::RepeatedMember {
                    junction: junction.name.clone(),
                    id: *id,
                }
                .into());
            }
            if self.subsystem(*id).is_none() {
                return Err(ValidationError::UnknownSubsystem(*id).into());
            }
        }

        let invalid = |reason: String| -> SeaError {
            ValidationError::InvalidJunction {
                name: junction.name.clone(),
                reason,
            }
            .into()
        };
        for (label, value) in [("area", junction.area), ("length", junction.length)] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(invalid(format!("{} must be positive, got {}", label, v)));
                }
            }
        }
        if let Some(angles) = &junction.angles {
            if angles.len() != count || angles.iter().any(|a| !a.is_finite()) {
                return Err(invalid(format!(
                    "expected {} finite angles, got {:?}",
                    count, angles
                )));
            }
        }

        self.check_junction_support(junction)?;

        let all_cavities = junction.systems.iter().all(|id| {
            self.subsystem(*id)
                .map_or(false, |s| s.kind() == SubsystemKind::Cavity)
        });
        if junction.kind == JunctionKind::Area && all_cavities && junction.area.is_none() {
            return Err(invalid("cavity-to-cavity coupling needs a shared area".to_string()));
        }
        Ok(())
    }

    fn check_junction_support(&self, junction: &Junction) -> Result<()> {
        let kinds: Vec<SubsystemKind> = junction
            .systems
            .iter()
            .filter_map(|id| self.subsystem(*id).map(Subsystem::kind))
            .collect();
        coupling::check_supported(junction, &kinds)
    }

    fn check_load(&self, load: &Load) -> Result<()> {
        load.validate()?;
        let target = self
            .subsystem(load.target)
            .ok_or(ValidationError::UnknownSubsystem(load.target))?;
        if !load.kind.accepts(target.kind()) {
            return Err(ValidationError::InvalidLoad {
                name: load.name.clone(),
                reason: format!("a {:?} load cannot drive a {}", load.kind, target.kind()),
            }
            .into());
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.metadata.modified = Utc::now();
    }
}

impl TryFrom<ProjectDocument> for Project {
    type Error = SeaError;

    fn try_from(document: ProjectDocument) -> Result<Self> {
        let mut project = Project::with_axis(document.frequency_axis);
        for material in document.materials {
            project.add_material(material)?;
        }
        for subsystem in document.subsystems {
            project.add_subsystem(subsystem)?;
        }
        for junction in document.junctions {
            project.add_junction(junction)?;
        }
        for load in document.loads {
            project.add_load(load)?;
        }
        // Restore stored timestamps; the inserts above touched them
        project.metadata = document.metadata;
        Ok(project)
    }
}

fn not_found(kind: &'static str, name: &str) -> SeaError {
    ValidationError::NotFound {
        kind,
        name: name.to_string(),
    }
    .into()
}
