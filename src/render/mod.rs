pub mod annotate;
pub mod skeleton;

pub use annotate::{annotate_frame, draw_label, draw_skeleton, draw_zone_guides};
pub use skeleton::POSE_CONNECTIONS;
