use std::fmt::Write;

use chrono::{DateTime, TimeZone};
use ranker_core::{DashboardView, ResultCardView, StageStatus, StageView};

const SCORE_BAR_WIDTH: usize = 20;

fn status_label(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Idle => "Idle",
        StageStatus::Submitting => "Submitting",
        StageStatus::Polling => "Processing",
        StageStatus::Ready => "Ready",
        StageStatus::Failed => "Failed",
    }
}

fn stage_line(label: &str, stage: &StageView) -> String {
    let mut line = format!("{}: {}", label, status_label(stage.status));
    if let Some(name) = &stage.file_name {
        let _ = write!(line, " ({})", name);
    }
    if let Some(id) = stage.job_id {
        let _ = write!(line, " [job {}]", id);
    }
    line
}

fn score_bar(score: u8) -> String {
    let filled = usize::from(score) * SCORE_BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(SCORE_BAR_WIDTH - filled),
        score
    )
}

fn render_card(out: &mut String, rank: usize, card: &ResultCardView) {
    let _ = writeln!(out, "{:>3}. {}  {}", rank, card.candidate_name, score_bar(card.score));
    if !card.file_name.is_empty() {
        let _ = writeln!(out, "     File: {}", card.file_name);
    }
    if !card.strengths.is_empty() {
        let _ = writeln!(out, "     Strengths: {}", card.strengths.join("; "));
    }
    for (label, value) in &card.details {
        let _ = writeln!(out, "     {}: {}", label, value);
    }
}

/// Text report for one dashboard snapshot. Ranks continue across pages when
/// the page size is known from the first page.
pub fn render<Tz>(view: &DashboardView, page_size: usize, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "Candidate ranking ({})", generated_at.format("%Y-%m-%d %H:%M:%S %Z"));
    let _ = writeln!(out, "{}", stage_line("Requirement", &view.requirement));
    if let Some(title) = &view.title {
        let _ = writeln!(out, "  Title: {}", title);
    }
    let _ = writeln!(out, "{}", stage_line("Batch", &view.batch));

    if let Some(banner) = &view.banner {
        let prefix = if banner.is_error() { "Error" } else { "Note" };
        let _ = writeln!(out, "{}: {}", prefix, banner.message());
    }

    if view.batch.status != StageStatus::Ready {
        return out;
    }

    let _ = writeln!(out);
    if view.results.is_empty() {
        let _ = writeln!(out, "No ranked candidates on page {}.", view.current_page);
        return out;
    }

    let offset = (view.current_page.saturating_sub(1) as usize).saturating_mul(page_size);
    for (index, card) in view.results.iter().enumerate() {
        render_card(&mut out, offset + index + 1, card);
    }

    let mut footer = format!("Page {}", view.current_page);
    if let Some(total) = view.page_info.total_count {
        let _ = write!(footer, " of {} candidates", total);
    }
    if view.page_info.has_previous {
        footer.push_str(", previous available");
    }
    if view.page_info.has_next {
        let _ = write!(footer, ", next: --page {}", view.current_page + 1);
    }
    let _ = writeln!(out, "\n{}", footer);
    out
}
