//! The transport collaborator (`spec.md` §6): wire framing, the actual
//! socket, and message codecs are explicitly out of scope — the core only
//! depends on this trait.

use crate::delta::GameStateDelta;
use crate::ids::PlayerId;
use crate::input::InputMessage;

pub trait Transport: Send + Sync {
    fn on_player_connect(&self, id: &PlayerId, display_name: &str);
    fn on_player_disconnect(&self, id: &PlayerId);
    fn on_input(&self, id: &PlayerId, input: InputMessage);
    /// Delivers one viewer's delta. Per `spec.md` §5, a full outbound queue
    /// drops the delta for that connection rather than back-pressuring the
    /// simulator — so this returns nothing for the core to react to.
    fn send_delta(&self, id: &PlayerId, delta: GameStateDelta);
}
