//! Topology and Project Model
//!
//! Entities are plain serializable records. Junctions and loads refer to
//! subsystems by id and subsystems refer to materials by name; the
//! [`Project`] owns every collection and keeps those references valid.

mod junction;
mod load;
mod material;
mod project;
mod subsystem;
mod view;

pub use junction::{Junction, JunctionKind};
pub use load::{Load, LoadKind, SpectrumPoint};
pub use material::{Elasticity, Material};
pub use project::{EntityId, Project, ProjectMetadata};
pub use subsystem::{Geometry, Subsystem, SubsystemId, SubsystemKind};
pub use view::{GeometryView, JunctionShape, SubsystemShape};
