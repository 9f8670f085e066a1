use crate::{Banner, JobId, PageInfo, RankedItem, StageStatus};

/// Extracted attributes shown on a result card, in display order.
const LIST_DETAILS: &[(&str, &str)] = &[
    ("JobTitles", "Job Titles"),
    ("Companies", "Companies"),
    ("Skills", "Skills"),
    ("Degree", "Degrees"),
    ("GraduationYears", "Graduation Year"),
    ("EducationalInstitutions", "Educational Institutions"),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageView {
    pub status: StageStatus,
    pub job_id: Option<JobId>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub requirement: StageView,
    pub batch: StageView,
    pub title: Option<String>,
    pub can_submit_batch: bool,
    pub results: Vec<ResultCardView>,
    pub current_page: u32,
    pub page_info: PageInfo,
    pub banner: Option<Banner>,
    pub scheduler_armed: bool,
}

impl DashboardView {
    /// Both stages settled: nothing left to poll or upload.
    pub fn is_settled(&self) -> bool {
        !self.requirement.status.is_busy() && !self.batch.status.is_busy()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCardView {
    pub id: u64,
    pub candidate_name: String,
    pub score: u8,
    pub file_name: String,
    pub strengths: Vec<String>,
    pub details: Vec<(String, String)>,
}

impl ResultCardView {
    pub(crate) fn from_item(item: &RankedItem) -> Self {
        let mut details = Vec::new();
        for (key, label) in LIST_DETAILS.iter().take(2) {
            push_list(&mut details, item, key, label);
        }
        if let Some(years) = item.extracted_text("YearsOfExperience") {
            details.push(("Experience".to_string(), years));
        }
        for (key, label) in LIST_DETAILS.iter().skip(2) {
            push_list(&mut details, item, key, label);
        }
        if let Some(email) = item.candidate_email.as_ref().filter(|email| !email.is_empty()) {
            details.push(("Email".to_string(), email.clone()));
        }
        for key in ["Phone", "Location"] {
            if let Some(value) = item.extracted_text(key) {
                details.push((key.to_string(), value));
            }
        }

        Self {
            id: item.id,
            candidate_name: item
                .candidate_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            score: item.score(),
            file_name: item.file_name.clone(),
            strengths: item.ranking_analysis.strengths.clone(),
            details,
        }
    }
}

fn push_list(details: &mut Vec<(String, String)>, item: &RankedItem, key: &str, label: &str) {
    let values = item.extracted_list(key);
    if !values.is_empty() {
        details.push((label.to_string(), values.join(", ")));
    }
}
