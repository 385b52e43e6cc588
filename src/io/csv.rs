use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::sim::SessionResult;

/// Write a session record to CSV format.
///
/// Columns: step, time, x, y, steering_deg
pub fn write_trajectory<W: Write>(writer: &mut W, result: &SessionResult) -> Result<()> {
    writeln!(writer, "step,time,x,y,steering_deg")?;

    let rows = result.times.iter().zip(&result.trajectory).zip(&result.steering);
    for (step, ((time, pos), steering)) in rows.enumerate() {
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.4},{:.4}",
            step, time, pos.x, pos.y, steering
        )?;
    }

    Ok(())
}

/// Write a session record to a CSV file at the given path.
pub fn write_trajectory_file<P: AsRef<Path>>(path: P, result: &SessionResult) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, result)
}
