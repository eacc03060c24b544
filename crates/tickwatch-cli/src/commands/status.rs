use crate::app::Session;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    Session::with(|session| session.print_snapshot())
}
