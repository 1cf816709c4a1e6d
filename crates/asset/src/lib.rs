//! Asset loading/parsers.
//! Minimal Wavefront OBJ loader producing flat, triangle-expanded attribute arrays.

pub mod error;
pub mod model;
pub mod obj;

pub use error::{IndexKind, ObjError, PreconditionFailure};
pub use model::Model;
pub use obj::{load_obj_from_reader, load_obj_from_str, load_obj_model};
