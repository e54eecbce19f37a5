pub mod stage0_registries;
pub mod stage1_extract;
pub mod stage2_scan;
pub mod stage3_resolve;
pub mod stage4_render;

pub use stage0_registries::*;
pub use stage1_extract::*;
pub use stage2_scan::*;
pub use stage3_resolve::*;
pub use stage4_render::*;
