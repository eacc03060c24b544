use tickwatch_core::Mode;

use crate::app::Session;

/// Switch the live engine. Switching to the current mode prints the snapshot.
pub fn run(mode: Mode) -> Result<(), Box<dyn std::error::Error>> {
    Session::with(|session| {
        let event = session.controller.switch_to(mode);
        session.print_outcome(event.as_ref())
    })
}
