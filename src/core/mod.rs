//! Core types shared by every chain operation

pub mod compare;
pub mod error;
pub mod error_code;
pub mod opaque;

pub use compare::safe_equal;
pub use error::*;
pub use opaque::Opaque;
