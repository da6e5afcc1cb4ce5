use std::{fmt::Write, time::Duration};

/// Pretty-print the elapsed time (used in progress bars)
pub fn elapsed_subsec(state: &indicatif::ProgressState, writer: &mut dyn Write) {
    let seconds = state.elapsed().as_secs();
    let sub_seconds = (state.elapsed().as_millis() % 1000) / 100;
    let _ = writer.write_str(&format!("{}.{}s", seconds, sub_seconds));
}

/// Pretty-print the elapsed time (used in logs)
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();

    match seconds {
        0 => match duration.as_millis() {
            0 => format!("{:.3}μs", duration.as_nanos() as f64 / 1_000.0),
            _ => format!("{:.3}ms", duration.as_micros() as f64 / 1_000.0),
        },
        1..=59 => format!("{:.3}s", duration.as_secs_f64()),
        60..=3_599 => format!("{:.3}m", duration.as_secs_f64() / 60.0),
        3_600..=86_399 => format!("{:.3}h", duration.as_secs_f64() / 3_600.0),
        _ => format!("{}d", seconds / 86_400),
    }
}
