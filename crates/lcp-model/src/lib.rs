//! Domain types shared by the multi-tile least-cost-path workspace.
//!
//! Nothing in here performs IO; the types describe tiles, tasks and the
//! boundary information that flows between them.

mod domain;
pub use domain::*;

mod kind;
pub use kind::*;

mod error;
pub use error::ModelError;
