//! End-to-end tests for the compliance pipeline.
//!
//! These tests drive the `RunCoordinator` through complete runs with a
//! scripted model and verify:
//! 1. Suspension at the human-input gate and resumption with user input
//! 2. Structured extraction feeding both analysers
//! 3. Retrieval round-trips per analyser
//! 4. The summary embedding both analyses
//! 5. Checkpoints surviving a restart
//! 6. The HTTP surface over the coordinator

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use compliance_adviser::adapters::ai::MockAIProvider;
use compliance_adviser::adapters::http::app_router;
use compliance_adviser::adapters::retrieval::{
    HashingEmbedder, IndexLoader, TextSplitter, VectorStoreRetriever,
};
use compliance_adviser::adapters::storage::{FileCheckpointStore, InMemoryCheckpointStore};
use compliance_adviser::application::{PipelineError, RunCoordinator};
use compliance_adviser::config::ServerConfig;
use compliance_adviser::domain::compliance::{
    prompts, ComplianceDomain, NodeName, Role, RunStatus, FACT_SCHEMA_TOOL,
};
use compliance_adviser::domain::foundation::ThreadId;
use compliance_adviser::ports::{
    CheckpointStore, Embedder, RetrievalError, RetrievedSnippet, Retriever,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const ACME: &str =
    "Acme Corp, a 50-person French retail company processing customer purchase history";

/// Retriever returning one fixed passage and recording queries
struct StubRetriever {
    name: &'static str,
    queries: Mutex<Vec<String>>,
}

impl StubRetriever {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedSnippet>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![RetrievedSnippet {
            text: format!("{} passage about {}", self.name, query),
            source: format!("{}.txt", self.name),
            chunk_index: 0,
            score: 0.8,
        }])
    }

    fn index_name(&self) -> &str {
        self.name
    }
}

fn thread(id: &str) -> ThreadId {
    ThreadId::new(id).unwrap()
}

fn acme_facts() -> Value {
    json!({
        "company_name": "Acme Corp",
        "country": "France",
        "industry": "retail",
        "company_size": 50,
        "data_types_collected": ["customer purchase history"]
    })
}

/// Provider scripted for a complete run after one clarifying question.
fn scripted_provider() -> MockAIProvider {
    MockAIProvider::new()
        .with_response_for(NodeName::Dialogue, "What is your company called and where is it based?")
        .with_response_for(
            NodeName::Dialogue,
            format!("Thanks! **{}**", prompts::COMPLETION_SENTINEL),
        )
        .with_tool_call_for(NodeName::Extractor, FACT_SCHEMA_TOOL, acme_facts())
        .with_tool_call_for(
            NodeName::GdprAnalyser,
            "gdpr_retriever",
            json!({"query": "lawful basis for purchase history"}),
        )
        .with_tool_call_for(
            NodeName::GdprAnalyser,
            "gdpr_retriever",
            json!({"query": "retention of customer data"}),
        )
        .with_response_for(NodeName::GdprAnalyser, "Document a lawful basis (Art. 6).")
        .with_response_for(NodeName::AiActAnalyser, "No high-risk AI use (Art. 6 AI Act).")
}

fn coordinator_with(
    provider: Arc<MockAIProvider>,
    store: Arc<dyn CheckpointStore>,
    gdpr: Arc<StubRetriever>,
    ai_act: Arc<StubRetriever>,
) -> RunCoordinator {
    RunCoordinator::new(store, provider, gdpr, ai_act, 5)
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[tokio::test]
async fn complete_run_from_greeting_to_summary() {
    let provider = Arc::new(scripted_provider().with_echo());
    let gdpr = StubRetriever::new("gdpr");
    let ai_act = StubRetriever::new("act");
    let coordinator = coordinator_with(
        provider.clone(),
        Arc::new(InMemoryCheckpointStore::new()),
        gdpr.clone(),
        ai_act.clone(),
    );
    let thread_id = thread("acme");

    let first = coordinator.advance(&thread_id, Some("Hello")).await.unwrap();
    assert!(first.is_suspended());
    assert_eq!(first.outputs.len(), 1);

    let done = coordinator.advance(&thread_id, Some(ACME)).await.unwrap();
    assert_eq!(done.status, RunStatus::Completed);

    let state = coordinator.state(&thread_id).await.unwrap();
    let facts = state.facts.clone().unwrap();
    assert_eq!(facts.country, "France");
    assert_eq!(facts.company_size, 50);
    assert!(!facts.data_types_collected.unwrap().is_empty());

    // The extractor saw exactly the confirming user message.
    let extractor_calls = provider.calls_for(NodeName::Extractor);
    assert_eq!(extractor_calls.len(), 1);
    assert_eq!(extractor_calls[0].last_user_content(), Some(ACME));

    // Two retrieval requests, two round-trips, then Done.
    let gdpr_rounds = done
        .outputs
        .iter()
        .filter(|o| o.node == NodeName::GdprRetriever)
        .count();
    assert_eq!(gdpr_rounds, 2);
    assert_eq!(gdpr.queries().len(), 2);
    assert!(ai_act.queries().is_empty());
    assert_eq!(
        state.analyses.get(ComplianceDomain::Gdpr).unwrap().retrieval_rounds,
        2
    );

    // The echoing summarizer returns its input, which embeds both analyses verbatim.
    let summary = done.summary.unwrap();
    assert!(summary.contains("Document a lawful basis (Art. 6)."));
    assert!(summary.contains("No high-risk AI use (Art. 6 AI Act)."));
    assert!(summary.find("Document a lawful basis") < summary.find("No high-risk AI use"));
    assert_eq!(done.outputs.last().unwrap().node, NodeName::Summary);
}

#[tokio::test]
async fn analysers_see_facts_but_not_each_others_branch() {
    let provider = Arc::new(scripted_provider());
    let coordinator = coordinator_with(
        provider.clone(),
        Arc::new(InMemoryCheckpointStore::new()),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    );
    let thread_id = thread("branches");

    coordinator.advance(&thread_id, Some("Hello")).await.unwrap();
    coordinator.advance(&thread_id, Some(ACME)).await.unwrap();

    let ai_act_call = &provider.calls_for(NodeName::AiActAnalyser)[0];
    assert!(ai_act_call
        .messages
        .iter()
        .any(|m| m.content.contains("Company information")));
    assert!(ai_act_call
        .messages
        .iter()
        .all(|m| !m.content.contains("gdpr passage")));
    assert_eq!(ai_act_call.tools[0].name(), "ai_act_retriever");
}

#[tokio::test]
async fn resume_after_restart_appends_one_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let thread_id = thread("restart");

    let before = {
        let provider = Arc::new(
            MockAIProvider::new().with_response_for(NodeName::Dialogue, "Which country?"),
        );
        let coordinator = coordinator_with(
            provider,
            Arc::new(FileCheckpointStore::new(dir.path())),
            StubRetriever::new("gdpr"),
            StubRetriever::new("act"),
        );
        coordinator.advance(&thread_id, Some("Hello")).await.unwrap();
        coordinator.state(&thread_id).await.unwrap()
    };
    assert_eq!(before.current_node, NodeName::AskHuman);

    // A fresh coordinator and store over the same directory, as after a restart.
    let provider = Arc::new(
        MockAIProvider::new().with_response_for(NodeName::Dialogue, "What industry are you in?"),
    );
    let coordinator = coordinator_with(
        provider.clone(),
        Arc::new(FileCheckpointStore::new(dir.path())),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    );

    let outcome = coordinator.advance(&thread_id, Some("France")).await.unwrap();
    assert!(outcome.is_suspended());

    let after = coordinator.state(&thread_id).await.unwrap();
    let pre = before.transcript.messages();
    let post = after.transcript.messages();
    assert_eq!(post.len(), pre.len() + 2);
    assert_eq!(&post[..pre.len()], pre);
    assert_eq!(post[pre.len()].role, Role::User);
    assert_eq!(post[pre.len()].content, "France");
    assert_eq!(post[pre.len() + 1].role, Role::Assistant);

    // The restarted dialogue turn saw the whole pre-suspend transcript.
    let call = &provider.calls_for(NodeName::Dialogue)[0];
    assert_eq!(call.messages.len(), 3);
}

#[tokio::test]
async fn finished_run_rejects_input() {
    let coordinator = coordinator_with(
        Arc::new(scripted_provider()),
        Arc::new(InMemoryCheckpointStore::new()),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    );
    let thread_id = thread("finished");
    coordinator.advance(&thread_id, Some("Hello")).await.unwrap();
    coordinator.advance(&thread_id, Some(ACME)).await.unwrap();

    let err = coordinator.advance(&thread_id, Some("One more thing")).await.unwrap_err();

    assert!(matches!(err, PipelineError::RunFinished(_)));
}

#[tokio::test]
async fn threads_are_independent() {
    let provider = Arc::new(MockAIProvider::new().with_echo());
    let coordinator = coordinator_with(
        provider,
        Arc::new(InMemoryCheckpointStore::new()),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    );

    coordinator.advance(&thread("one"), Some("First")).await.unwrap();
    coordinator.advance(&thread("two"), Some("Second")).await.unwrap();

    let one = coordinator.state(&thread("one")).await.unwrap();
    let two = coordinator.state(&thread("two")).await.unwrap();
    assert_eq!(one.transcript.messages()[0].content, "First");
    assert_eq!(two.transcript.messages()[0].content, "Second");
    assert_eq!(one.transcript.len(), 2);
}

#[tokio::test]
async fn retrieval_over_a_built_index() {
    let data = tempfile::tempdir().unwrap();
    let indices = tempfile::tempdir().unwrap();
    tokio::fs::write(
        data.path().join("gdpr.txt"),
        "Article 17 Right to erasure. The data subject shall have the right to obtain \
         the erasure of personal data concerning him or her without undue delay.\n\n\
         Article 37 Designation of the data protection officer. The controller shall \
         designate a data protection officer where core activities require monitoring.",
    )
    .await
    .unwrap();

    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(256));
    let loader = IndexLoader::new(
        data.path(),
        indices.path(),
        TextSplitter::new(100, 20),
        embedder.clone(),
    );
    let store = loader.load_or_build(ComplianceDomain::Gdpr).await.unwrap();
    assert!(indices.path().join("gdpr_index").join("index.json").exists());

    let retriever = VectorStoreRetriever::new(store, embedder).with_top_k(2);
    let snippets = retriever.retrieve("right to erasure of personal data").await.unwrap();

    assert_eq!(snippets.len(), 2);
    assert!(snippets[0].score >= snippets[1].score);
    assert_eq!(snippets[0].source, "gdpr.txt");
    assert!(snippets.iter().any(|s| s.text.contains("erasure")));
}

// =============================================================================
// HTTP Tests
// =============================================================================

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_message(thread_id: &str, content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/threads/{}/messages", thread_id))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": content }).to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn http_thread_lifecycle() {
    let coordinator = Arc::new(coordinator_with(
        Arc::new(MockAIProvider::new().with_response_for(NodeName::Dialogue, "Which country?")),
        Arc::new(InMemoryCheckpointStore::new()),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    ));
    let app = app_router(coordinator, &ServerConfig::default());

    let (status, body) = send(&app, request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, post_message("web-1", "Hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suspended"], true);
    assert_eq!(body["status"], "suspended");
    assert_eq!(body["messages"][0]["node"], "dialogue");
    assert_eq!(body["messages"][0]["content"], "Which country?");

    let (status, body) = send(&app, request("POST", "/threads/web-1/resume")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suspended"], true);
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);

    let (status, body) = send(&app, request("GET", "/threads/web-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_node"], "ask_human");
    assert_eq!(body["transcript"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, request("DELETE", "/threads/web-1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, request("GET", "/threads/web-1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "THREAD_NOT_FOUND");
}

#[tokio::test]
async fn http_rejects_bad_input() {
    let coordinator = Arc::new(coordinator_with(
        Arc::new(MockAIProvider::new()),
        Arc::new(InMemoryCheckpointStore::new()),
        StubRetriever::new("gdpr"),
        StubRetriever::new("act"),
    ));
    let app = app_router(coordinator, &ServerConfig::default());

    let (status, body) = send(&app, post_message("web-2", "   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_INPUT");

    let (status, body) = send(&app, post_message("bad%20id", "Hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = send(&app, request("POST", "/threads/unknown/resume")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
