//! `From` implementations bridging `mtt_config` types to `mtt_core` types.

use std::time::Duration;

use mtt_config::RegisterEntry;
use mtt_traits::{RegWidth, Register};

use crate::config::RegisterMap;
use crate::poller::MoveRequest;

fn resolve(entry: RegisterEntry, role_default: RegWidth) -> Register {
    let width = entry
        .width
        .and_then(RegWidth::from_bytes)
        .unwrap_or(role_default);
    Register::new(entry.addr, width)
}

impl From<&mtt_config::Registers> for RegisterMap {
    fn from(r: &mtt_config::Registers) -> Self {
        Self {
            torque_enable: resolve(r.torque_enable, RegWidth::Byte),
            goal_position: resolve(r.goal_position, RegWidth::Word),
            torque_limit: resolve(r.torque_limit, RegWidth::Word),
            present_position: resolve(r.present_position, RegWidth::Word),
        }
    }
}

impl MoveRequest {
    /// Request for `target` using the config's timeouts and threshold.
    pub fn from_config(target: u32, cfg: &mtt_config::Config) -> Self {
        Self {
            target,
            goal_timeout: Duration::from_secs(cfg.timeouts.goal_s),
            slip_timeout: Duration::from_secs(cfg.timeouts.slip_s),
            moving_threshold: cfg.motor.moving_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_to_mx28_map() {
        let map = RegisterMap::from(&mtt_config::Registers::default());
        assert_eq!(map, RegisterMap::default());
    }

    #[test]
    fn explicit_width_wins_over_role_default() {
        let regs = mtt_config::Registers {
            goal_position: RegisterEntry {
                addr: 116,
                width: Some(4),
            },
            ..mtt_config::Registers::default()
        };
        let map = RegisterMap::from(&regs);
        assert_eq!(map.goal_position, Register::new(116, RegWidth::Long));
        assert_eq!(map.torque_enable, Register::byte(24));
    }
}
