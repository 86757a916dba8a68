use async_trait::async_trait;
use stackrelay_core::{
    ApiError, Bounded, Capability, Deployer, DeploymentError, ErrorCode, FixedInterval,
    ProgressSink, StackApi, StackRequest, StackSnapshot, StackStatus,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// In-memory stand-in for CloudFormation.
///
/// Each describe call pops the next scripted response; names that were
/// created and not yet settled reject a second CreateStack.
#[derive(Default)]
struct ScriptedApi {
    responses: Mutex<VecDeque<Result<StackSnapshot, ApiError>>>,
    reject_create: Mutex<Option<ApiError>>,
    live_stacks: Mutex<HashSet<String>>,
    create_calls: Mutex<u32>,
    describe_calls: Mutex<u32>,
}

impl ScriptedApi {
    fn with_statuses(statuses: &[&str]) -> Self {
        let api = Self::default();
        {
            let mut responses = api.responses.lock().unwrap();
            for status in statuses {
                responses.push_back(Ok(StackSnapshot::new(StackStatus::from(*status))));
            }
        }
        api
    }

    fn push(&self, response: Result<StackSnapshot, ApiError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn reject_create_with(&self, error: ApiError) {
        *self.reject_create.lock().unwrap() = Some(error);
    }

    fn create_calls(&self) -> u32 {
        *self.create_calls.lock().unwrap()
    }

    fn describe_calls(&self) -> u32 {
        *self.describe_calls.lock().unwrap()
    }
}

#[async_trait]
impl StackApi for ScriptedApi {
    async fn create_stack(&self, request: &StackRequest) -> Result<Option<String>, ApiError> {
        *self.create_calls.lock().unwrap() += 1;

        if let Some(error) = self.reject_create.lock().unwrap().clone() {
            return Err(error);
        }

        let mut live = self.live_stacks.lock().unwrap();
        if !live.insert(request.name().to_string()) {
            return Err(ApiError::AlreadyExists {
                stack_name: request.name().to_string(),
            });
        }

        Ok(Some(format!(
            "arn:aws:cloudformation:us-east-1:123456789012:stack/{}/0001",
            request.name()
        )))
    }

    async fn describe_stack(&self, stack_name: &str) -> Result<StackSnapshot, ApiError> {
        *self.describe_calls.lock().unwrap() += 1;

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::NotFound {
                    stack_name: stack_name.to_string(),
                })
            })
    }
}

#[derive(Default)]
struct RecordingProgress {
    seen: Mutex<Vec<(u32, StackStatus)>>,
}

impl RecordingProgress {
    fn statuses(&self) -> Vec<StackStatus> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, status)| status.clone())
            .collect()
    }

    fn attempts(&self) -> Vec<u32> {
        self.seen.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_status(&self, _stack_name: &str, attempt: u32, snapshot: &StackSnapshot) {
        self.seen
            .lock()
            .unwrap()
            .push((attempt, snapshot.status.clone()));
    }
}

fn demos3_request() -> StackRequest {
    StackRequest::new(
        "demos3",
        "AWSTemplateFormatVersion: '2010-09-09'\nResources: {}\n",
        [Capability::NamedIam],
    )
    .unwrap()
}

fn deployer(api: &Arc<ScriptedApi>, progress: &Arc<RecordingProgress>) -> Deployer {
    Deployer::new(api.clone()).with_progress(progress.clone())
}

#[tokio::test(start_paused = true)]
async fn demos3_completes_after_two_in_progress_polls() {
    let api = Arc::new(ScriptedApi::with_statuses(&[
        "CREATE_IN_PROGRESS",
        "CREATE_IN_PROGRESS",
        "CREATE_COMPLETE",
    ]));
    let progress = Arc::new(RecordingProgress::default());
    let started = Instant::now();

    let outcome = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .expect("deployment succeeds");

    assert_eq!(outcome.stack_name, "demos3");
    assert_eq!(outcome.polls, 3);
    assert_eq!(outcome.snapshot.status, StackStatus::CreateComplete);
    assert!(outcome.stack_id.unwrap().contains("stack/demos3/"));

    assert_eq!(api.create_calls(), 1);
    assert_eq!(api.describe_calls(), 3);
    assert_eq!(
        progress.statuses(),
        vec![
            StackStatus::CreateInProgress,
            StackStatus::CreateInProgress,
            StackStatus::CreateComplete,
        ]
    );
    assert_eq!(progress.attempts(), vec![1, 2, 3]);

    // Two fixed 10 second sleeps between three polls
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(20), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(21), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn create_failed_stops_polling() {
    let api = Arc::new(ScriptedApi::with_statuses(&[
        "CREATE_IN_PROGRESS",
        "CREATE_FAILED",
        "CREATE_COMPLETE",
    ]));
    let progress = Arc::new(RecordingProgress::default());

    let err = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E003CreationFailed);
    match err {
        DeploymentError::CreationFailed { status, .. } => {
            assert_eq!(status, StackStatus::CreateFailed)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(api.describe_calls(), 2);
    assert_eq!(progress.statuses().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn immediate_success_polls_once() {
    let api = Arc::new(ScriptedApi::with_statuses(&["CREATE_COMPLETE", "CREATE_FAILED"]));
    let progress = Arc::new(RecordingProgress::default());
    let started = Instant::now();

    let outcome = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .unwrap();

    assert_eq!(outcome.polls, 1);
    assert_eq!(api.describe_calls(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_never_polls() {
    let api = Arc::new(ScriptedApi::with_statuses(&["CREATE_COMPLETE"]));
    api.reject_create_with(ApiError::Service {
        code: "ValidationError".to_string(),
        message: "Template format error: YAML not well-formed".to_string(),
    });
    let progress = Arc::new(RecordingProgress::default());

    let err = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E001SubmissionRejected);
    assert!(err.to_string().contains("Template format error"));
    assert_eq!(api.describe_calls(), 0);
    assert!(progress.statuses().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_submission_of_same_name_is_rejected() {
    let api = Arc::new(ScriptedApi::with_statuses(&["CREATE_IN_PROGRESS"]));
    let progress = Arc::new(RecordingProgress::default());
    let deployer = Deployer::new(api.clone())
        .with_progress(progress.clone())
        .with_wait_strategy(Box::new(Bounded::new(FixedInterval::default()).max_attempts(1)));

    // First submission is accepted and left in progress
    let first = deployer.deploy(&demos3_request()).await.unwrap_err();
    assert_eq!(first.code(), ErrorCode::E004TimedOut);

    let describes_before = api.describe_calls();
    let second = deployer.deploy(&demos3_request()).await.unwrap_err();

    match &second {
        DeploymentError::SubmissionRejected { source, .. } => assert_eq!(
            source,
            &ApiError::AlreadyExists {
                stack_name: "demos3".to_string()
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(api.create_calls(), 2);
    assert_eq!(api.describe_calls(), describes_before);
}

#[tokio::test(start_paused = true)]
async fn lookup_failure_mid_poll_is_status_query_failed() {
    let api = Arc::new(ScriptedApi::with_statuses(&["CREATE_IN_PROGRESS"]));
    api.push(Err(ApiError::NotFound {
        stack_name: "demos3".to_string(),
    }));
    let progress = Arc::new(RecordingProgress::default());

    let err = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E002StatusQueryFailed);
    assert_eq!(api.describe_calls(), 2);
    assert_eq!(progress.statuses(), vec![StackStatus::CreateInProgress]);
}

#[tokio::test(start_paused = true)]
async fn rollback_complete_is_reported_with_reason() {
    let api = Arc::new(ScriptedApi::default());
    api.push(Ok(StackSnapshot::new(StackStatus::CreateInProgress)));
    api.push(Ok(StackSnapshot::new(StackStatus::RollbackInProgress)
        .with_reason("The following resource(s) failed to create: [SourceBucket].")));
    api.push(Ok(StackSnapshot::new(StackStatus::RollbackComplete)
        .with_reason("The following resource(s) failed to create: [SourceBucket].")));
    let progress = Arc::new(RecordingProgress::default());

    let err = deployer(&api, &progress)
        .deploy(&demos3_request())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E003CreationFailed);
    assert!(err.to_string().contains("ROLLBACK_COMPLETE"));
    assert!(err.to_string().contains("[SourceBucket]"));
    assert_eq!(api.describe_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn bounded_strategy_times_out_on_stuck_stack() {
    let api = Arc::new(ScriptedApi::with_statuses(&[
        "CREATE_IN_PROGRESS",
        "CREATE_IN_PROGRESS",
        "CREATE_IN_PROGRESS",
        "CREATE_IN_PROGRESS",
    ]));
    let progress = Arc::new(RecordingProgress::default());
    let started = Instant::now();

    let err = deployer(&api, &progress)
        .with_wait_strategy(Box::new(
            Bounded::new(FixedInterval(Duration::from_secs(10))).budget(Duration::from_secs(15)),
        ))
        .deploy(&demos3_request())
        .await
        .unwrap_err();

    match err {
        DeploymentError::TimedOut {
            attempts,
            last_status,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_status, StackStatus::CreateInProgress);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(api.describe_calls(), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(15), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(16), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn wait_for_create_observes_existing_stack() {
    let api = Arc::new(ScriptedApi::with_statuses(&["CREATE_IN_PROGRESS", "CREATE_COMPLETE"]));
    api.push(Ok(StackSnapshot::new(StackStatus::CreateComplete)));
    let progress = Arc::new(RecordingProgress::default());
    let deployer = deployer(&api, &progress);

    let snapshot = deployer.wait_for_create("demos3").await.unwrap();
    assert_eq!(snapshot.status, StackStatus::CreateComplete);
    assert_eq!(api.create_calls(), 0);

    // describe() is a single query and bypasses the progress sink
    let again = deployer.describe("demos3").await.unwrap();
    assert_eq!(again.status, StackStatus::CreateComplete);
    assert_eq!(progress.statuses().len(), 2);
}
