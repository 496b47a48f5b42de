//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - One curve function shared by geometry and physics
//! - Stable iteration order (platforms in level order)
//! - No rendering or platform dependencies

pub mod curve;
pub mod path;
pub mod state;
pub mod tick;
pub mod traversal;

pub use curve::{CurveParams, curve_height};
pub use path::{PathResolution, PathSample, SampledPath, sample_path};
pub use state::{GameEvent, PlayerState, SessionPhase, WordProgress};
pub use tick::{TickInput, tick};
pub use traversal::{Support, find_support, resolve_contact, word_index_at};
