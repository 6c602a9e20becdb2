use serde::{Deserialize, Serialize};

use crate::force::Force;


// What a connection may do for its whole lifetime. Assigned once on connect.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Role {
    White,
    Black,
    Spectator,
}

impl Role {
    pub fn from_force(force: Force) -> Self {
        match force {
            Force::White => Role::White,
            Force::Black => Role::Black,
        }
    }

    // The seat this role holds, if any.
    pub fn force(self) -> Option<Force> {
        match self {
            Role::White => Some(Force::White),
            Role::Black => Some(Force::Black),
            Role::Spectator => None,
        }
    }
}
