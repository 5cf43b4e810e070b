//! Core-side configuration types (resolved, no serde).

use mtt_traits::Register;

/// Control-table registers the tool touches, resolved to address + width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub torque_enable: Register,
    pub goal_position: Register,
    pub torque_limit: Register,
    pub present_position: Register,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            torque_enable: Register::byte(24),
            goal_position: Register::word(30),
            torque_limit: Register::word(34),
            present_position: Register::word(36),
        }
    }
}
