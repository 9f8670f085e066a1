use proptest::prelude::*;
use ranker_core::{
    update, BatchStatusReport, Effect, Msg, OrchestratorState, PageInfo, RankedItem,
    RequirementStatusReport, ResultsPage, ServiceError, StageKind, StageStatus, Ticket,
    UploadFile,
};

/// One step of a session; answers are bound to the tickets issued so far.
#[derive(Debug, Clone, Copy)]
enum Step {
    ChooseRequirement,
    ChooseBatch,
    Reset,
    Tick,
    RequirementAccepted,
    BatchAccepted,
    BatchRejected,
    RequirementParsed,
    RequirementPollFailed,
    BatchCompleted,
    BatchPollFailed,
    ResultsArrived,
    RequestFirstPage,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::ChooseRequirement),
        Just(Step::ChooseBatch),
        Just(Step::Reset),
        Just(Step::Tick),
        Just(Step::RequirementAccepted),
        Just(Step::BatchAccepted),
        Just(Step::BatchRejected),
        Just(Step::RequirementParsed),
        Just(Step::RequirementPollFailed),
        Just(Step::BatchCompleted),
        Just(Step::BatchPollFailed),
        Just(Step::ResultsArrived),
        Just(Step::RequestFirstPage),
    ]
}

#[derive(Default)]
struct Issued {
    requirement_ticket: Option<Ticket>,
    batch_ticket: Option<Ticket>,
}

impl Issued {
    fn record(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::UploadRequirement { ticket, .. } => self.requirement_ticket = Some(*ticket),
                Effect::UploadBatch { ticket, .. } => self.batch_ticket = Some(*ticket),
                _ => {}
            }
        }
    }
}

fn item() -> RankedItem {
    serde_json::from_value(serde_json::json!({ "id": 1, "compatibility_score": 70 })).unwrap()
}

fn to_msg(step: Step, issued: &Issued) -> Msg {
    let requirement_ticket = issued.requirement_ticket.unwrap_or(Ticket(0));
    let batch_ticket = issued.batch_ticket.unwrap_or(Ticket(0));
    match step {
        Step::ChooseRequirement => Msg::RequirementChosen(UploadFile::new("a.pdf", b"a".to_vec())),
        Step::ChooseBatch => Msg::BatchChosen(UploadFile::new("b.zip", b"b".to_vec())),
        Step::Reset => Msg::ResetClicked,
        Step::Tick => Msg::Tick,
        Step::RequirementAccepted => Msg::RequirementUploaded {
            ticket: requirement_ticket,
            result: Ok(1),
        },
        Step::BatchAccepted => Msg::BatchUploaded {
            ticket: batch_ticket,
            result: Ok(2),
        },
        Step::BatchRejected => Msg::BatchUploaded {
            ticket: batch_ticket,
            result: Err(ServiceError::validation(400, "bad zip")),
        },
        Step::RequirementParsed => Msg::RequirementPolled {
            job_id: 1,
            result: Ok(RequirementStatusReport {
                status: "processed_jd".to_string(),
                title: None,
            }),
        },
        Step::RequirementPollFailed => Msg::RequirementPolled {
            job_id: 1,
            result: Err(ServiceError::transport("down")),
        },
        Step::BatchCompleted => Msg::BatchPolled {
            job_id: 2,
            result: Ok(BatchStatusReport {
                status: "completed".to_string(),
            }),
        },
        Step::BatchPollFailed => Msg::BatchPolled {
            job_id: 2,
            result: Err(ServiceError::transport("down")),
        },
        Step::ResultsArrived => Msg::ResultsFetched {
            batch_id: 2,
            page: 1,
            result: Ok(ResultsPage {
                items: vec![item()],
                info: PageInfo::default(),
            }),
        },
        Step::RequestFirstPage => Msg::PageRequested(1),
    }
}

fn check(state: &OrchestratorState) -> Result<(), TestCaseError> {
    let requirement = state.stage_status(StageKind::Requirement);
    let batch = state.stage_status(StageKind::Batch);

    if matches!(
        batch,
        StageStatus::Submitting | StageStatus::Polling | StageStatus::Ready
    ) {
        prop_assert_eq!(requirement, StageStatus::Ready, "batch {:?} without requirement", batch);
    }
    if !state.results().is_empty() {
        prop_assert_eq!(batch, StageStatus::Ready);
    }
    if state.any_polling() {
        prop_assert!(state.is_scheduler_armed());
    }
    if let Some(banner) = state.banner() {
        prop_assert!(!banner.message().is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn message_sequences_preserve_invariants(
        steps in prop::collection::vec(step_strategy(), 0..40)
    ) {
        let mut state = OrchestratorState::new();
        let mut issued = Issued::default();
        for step in steps {
            let (next, effects) = update(state, to_msg(step, &issued));
            issued.record(&effects);
            check(&next)?;
            state = next;
        }
    }
}

#[test]
fn happy_sequence_reaches_ranked_results() {
    let steps = [
        Step::ChooseRequirement,
        Step::RequirementAccepted,
        Step::Tick,
        Step::RequirementParsed,
        Step::ChooseBatch,
        Step::BatchAccepted,
        Step::Tick,
        Step::BatchCompleted,
        Step::ResultsArrived,
    ];
    let mut state = OrchestratorState::new();
    let mut issued = Issued::default();
    for step in steps {
        let (next, effects) = update(state, to_msg(step, &issued));
        issued.record(&effects);
        state = next;
    }
    assert_eq!(state.results().len(), 1);
    assert_eq!(state.stage_status(StageKind::Batch), StageStatus::Ready);
}
