//! Destructuring lowering for esdown.
//!
//! The pass walks a parsed and bound file, rewrites every object/array
//! destructuring site in declarations and assignments into plain member
//! accesses, and records the rewrites as range edits in an
//! `AlterationBuffer`. Applying the buffer yields the lowered source.

pub mod alter;
pub use alter::AlterationBuffer;

pub mod destructuring;
pub use destructuring::{
    DestructuringLowering, FlattenedBinding, LoweredSite, SiteContext, classifier,
};

mod error;
pub use error::LoweringError;

pub mod lowering_pass;
pub use lowering_pass::LoweringPass;

mod temp_declarations;

pub mod transform_context;
pub use transform_context::{LoweringOptions, TransformContext, UnsupportedContextPolicy};
