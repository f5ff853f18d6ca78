//! Rig decision policy
//!
//! Decides, per draw, whether the outcome engine should bias the result
//! against the player. Pure function of the player's flags and the global
//! rig mode; settlement reads both fresh on every call because either can be
//! flipped between requests.

use serde::{Deserialize, Serialize};

use crate::models::Player;

/// The two player attributes the policy consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigProfile {
    pub privileged: bool,
    pub rigged: bool,
}

impl From<&Player> for RigProfile {
    fn from(player: &Player) -> Self {
        Self {
            privileged: player.is_privileged(),
            rigged: player.rigged,
        }
    }
}

/// Whether the upcoming draw should be biased against the player.
///
/// Privileged accounts are categorically exempt, overriding both the
/// individual flag and the global mode. An individually rigged player is
/// rigged unconditionally. Everyone else, including anonymous contexts,
/// follows the global rig mode.
pub fn should_rig(profile: Option<RigProfile>, global_on: bool) -> bool {
    match profile {
        None => global_on,
        Some(p) if p.privileged => false,
        Some(p) if p.rigged => true,
        Some(_) => global_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn privileged_is_never_rigged() {
        for rigged in [false, true] {
            for global_on in [false, true] {
                let profile = RigProfile {
                    privileged: true,
                    rigged,
                };
                assert!(
                    !should_rig(Some(profile), global_on),
                    "privileged rigged={} global={}",
                    rigged,
                    global_on
                );
            }
        }
    }

    #[test]
    fn individual_flag_wins_over_global_off() {
        let profile = RigProfile {
            privileged: false,
            rigged: true,
        };
        assert!(should_rig(Some(profile), false));
        assert!(should_rig(Some(profile), true));
    }

    #[test]
    fn unflagged_player_follows_global_mode() {
        let profile = RigProfile {
            privileged: false,
            rigged: false,
        };
        assert!(!should_rig(Some(profile), false));
        assert!(should_rig(Some(profile), true));
    }

    #[test]
    fn anonymous_context_follows_global_mode() {
        assert!(!should_rig(None, false));
        assert!(should_rig(None, true));
    }

    #[test]
    fn profile_derives_from_player_record() {
        let mut player = Player::new("casey");
        player.rigged = true;
        let profile = RigProfile::from(&player);
        assert!(profile.rigged);
        assert!(!profile.privileged);

        player.role = Role::Owner;
        let profile = RigProfile::from(&player);
        assert!(profile.privileged);
        assert!(!should_rig(Some(profile), true));
    }
}
