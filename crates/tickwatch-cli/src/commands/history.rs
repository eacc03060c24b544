use tickwatch_core::Database;

/// Print recent finished countdowns and stopwatch sessions, newest first.
pub fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let runs = db.recent_runs(limit)?;
    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
