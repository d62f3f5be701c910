/// Win percentage rounded to two decimals; zero when nothing was played.
pub fn win_rate(wins: i64, total_matches: i64) -> f64 {
    if total_matches <= 0 {
        return 0.0;
    }
    let percentage = wins as f64 / total_matches as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSummary {
    /// Positive for consecutive wins, negative for consecutive losses.
    pub current: i32,
    pub longest_win: u32,
}

/// Summarises results given in chronological order (`true` = win).
pub fn summarize_streaks(results: &[bool]) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let mut run_of_wins = 0u32;

    for &won in results {
        if won {
            run_of_wins += 1;
            summary.longest_win = summary.longest_win.max(run_of_wins);
            summary.current = if summary.current > 0 { summary.current + 1 } else { 1 };
        } else {
            run_of_wins = 0;
            summary.current = if summary.current < 0 { summary.current - 1 } else { -1 };
        }
    }

    summary
}
