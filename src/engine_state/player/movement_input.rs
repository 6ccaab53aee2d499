use crate::engine_state::PlayerAction;

/// Movement keys currently held by a player.
///
/// `sprint` is latched: it turns on with the sprint key and stays on until the
/// player stops moving forward or runs into a wall.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
}

impl MovementInput {
    /// Copies the held movement keys from this frame's actions.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.forward = actions.move_forward;
        self.backward = actions.move_backward;
        self.left = actions.move_left;
        self.right = actions.move_right;
        self.jump = actions.jump;
        if actions.sprint {
            self.sprint = true;
        }
    }

    /// Whether any direction key is held.
    #[cfg(test)]
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprint_latches_until_cleared() {
        let mut input = MovementInput::default();

        input.intake_actions(&PlayerAction {
            move_forward: true,
            sprint: true,
            ..PlayerAction::default()
        });
        assert!(input.forward && input.sprint);

        input.intake_actions(&PlayerAction {
            move_forward: true,
            ..PlayerAction::default()
        });
        assert!(input.sprint);
        assert!(input.is_moving());

        input.intake_actions(&PlayerAction::default());
        assert!(!input.is_moving());
        assert!(!input.jump);
    }
}
