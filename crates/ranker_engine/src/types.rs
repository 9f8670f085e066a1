use ranker_core::{JobId, PageInfo, RankedItem, ResultsPage};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitResponse {
    pub(crate) id: JobId,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RequirementStatusBody {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchStatusBody {
    pub(crate) status: String,
}

/// Body of the ranked-results endpoint. Older deployments return a bare list,
/// paginated ones wrap it in an envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RankedPayload {
    LegacyList(Vec<RankedItem>),
    Paginated {
        #[serde(default)]
        results: Vec<RankedItem>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
}

impl From<RankedPayload> for ResultsPage {
    fn from(payload: RankedPayload) -> Self {
        match payload {
            RankedPayload::LegacyList(items) => ResultsPage {
                items,
                info: PageInfo::default(),
            },
            RankedPayload::Paginated {
                results,
                count,
                next,
                previous,
            } => ResultsPage {
                items: results,
                info: PageInfo {
                    total_count: count,
                    has_next: next.is_some(),
                    has_previous: previous.is_some(),
                },
            },
        }
    }
}
