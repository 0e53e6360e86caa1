//! Resource-producing infrastructure.

use serde::{Deserialize, Serialize};

use crate::types::Resources;

use super::Workforce;

/// Infrastructure both consumes (via the shared building consumption) and
/// produces resources. Each cycle evaluation applies the two separately:
/// consumption is subtracted from the city pool, production added back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utility {
    pub jobs: Workforce,
    pub production: Resources,
}
