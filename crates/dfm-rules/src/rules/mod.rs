//! Concrete manufacturability rules.

mod draft;
mod rib_boss;
mod sharp_corner;
mod thickness;
mod thin_part;
mod topology;
mod undercut;

pub use draft::DraftAngleRule;
pub use rib_boss::RibBossRule;
pub use sharp_corner::SharpCornerRule;
pub use thickness::ThicknessRule;
pub use thin_part::ThinPartRule;
pub use topology::TopologyRule;
pub use undercut::UndercutRule;
