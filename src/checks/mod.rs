// src/checks/mod.rs
//! Built-in checks and the name registry.
//!
//! The registry lets external configuration deserializers reference checks
//! by stable identifier; the compiled-in default pipeline below is what
//! runs when no user configuration is supplied.

pub mod barrels;
pub mod external;
pub mod imports;

use crate::config::{StageSpec, ValidatorConfig};
use crate::context::Check;
use std::sync::Arc;

/// All registered check identifiers in canonical order.
pub const CHECK_NAMES: &[&str] = &["no-barrels", "hex-imports", "eslint", "typescript", "e2e"];

/// Constructs a check by registry identifier.
#[must_use]
pub fn build(name: &str) -> Option<Arc<dyn Check>> {
    match name {
        "no-barrels" => Some(Arc::new(barrels::NoBarrels)),
        "hex-imports" => Some(Arc::new(imports::HexImports)),
        "eslint" => Some(Arc::new(external::ToolCheck::eslint())),
        "typescript" => Some(Arc::new(external::ToolCheck::typescript())),
        "e2e" => Some(Arc::new(external::ToolCheck::playwright())),
        _ => None,
    }
}

/// The built-in default stage list: structural rules first, then external
/// tooling, then the e2e suite on its own.
#[must_use]
pub fn default_pipeline() -> ValidatorConfig {
    ValidatorConfig::empty()
        .with_stage(StageSpec::new(
            "structure",
            true,
            vec![
                Arc::new(barrels::NoBarrels) as Arc<dyn Check>,
                Arc::new(imports::HexImports),
            ],
        ))
        .with_stage(StageSpec::new(
            "tools",
            true,
            vec![
                Arc::new(external::ToolCheck::eslint()) as Arc<dyn Check>,
                Arc::new(external::ToolCheck::typescript()),
            ],
        ))
        .with_stage(StageSpec::new(
            "e2e",
            false,
            vec![Arc::new(external::ToolCheck::playwright()) as Arc<dyn Check>],
        ))
}
