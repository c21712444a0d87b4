// TestDependencies - in-process doubles for every collaborator
//
// Lets the whole chat pipeline run without network or database. The scheme
// store enforces uniqueness per normalized title under one lock, mirroring the
// unique index the Postgres store relies on.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use super::{
    AssistantMessage, BaseAssistant, BaseChatLog, BaseEmbeddingService, BaseResourceStore,
    BaseSchemeStore, PipelineSettings, RunState, ServerDeps,
};
use crate::common::ResourceId;
use crate::domains::chat::models::{ChatExchange, ChatRole};
use crate::domains::resources::CanonicalResource;
use crate::domains::schemes::models::{
    normalize_title, CandidateScheme, PersistedScheme, SchemeUpsert,
};

// =============================================================================
// Mock Assistant (generation service)
// =============================================================================

pub struct MockAssistant {
    states: Mutex<VecDeque<RunState>>,
    pending_forever: bool,
    reply: Option<String>,
    fail_create: bool,
    stall_create: bool,
    stall_status: bool,
    prompts: Mutex<Vec<String>>,
    creates: Mutex<usize>,
    polls: Mutex<usize>,
}

impl MockAssistant {
    /// Completes on the first poll with no reply unless configured otherwise.
    pub fn new() -> Self {
        Self {
            states: Mutex::new(VecDeque::new()),
            pending_forever: false,
            reply: None,
            fail_create: false,
            stall_create: false,
            stall_status: false,
            prompts: Mutex::new(Vec::new()),
            creates: Mutex::new(0),
            polls: Mutex::new(0),
        }
    }

    /// Statuses returned by successive polls; `Completed` once exhausted
    pub fn with_states(self, states: Vec<RunState>) -> Self {
        *self.states.lock().unwrap() = states.into();
        self
    }

    pub fn with_pending_forever(mut self) -> Self {
        self.pending_forever = true;
        self
    }

    /// Assistant message the thread holds once the run completes
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn failing_on_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Thread creation never resolves
    pub fn stalling_on_create(mut self) -> Self {
        self.stall_create = true;
        self
    }

    /// Status checks never resolve
    pub fn with_stalled_status(mut self) -> Self {
        self.stall_status = true;
        self
    }

    /// Prompts appended to threads, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn create_count(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    pub fn poll_count(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAssistant for MockAssistant {
    async fn create_thread(&self) -> Result<String> {
        *self.creates.lock().unwrap() += 1;
        if self.stall_create {
            std::future::pending::<()>().await;
        }
        if self.fail_create {
            anyhow::bail!("mock generation service unavailable");
        }
        Ok(format!("thread_{}", self.create_count()))
    }

    async fn add_user_message(&self, _thread_id: &str, content: &str) -> Result<()> {
        self.prompts.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn start_run(&self, thread_id: &str) -> Result<String> {
        Ok(format!("run_for_{}", thread_id))
    }

    async fn run_state(&self, _thread_id: &str, _run_id: &str) -> Result<RunState> {
        *self.polls.lock().unwrap() += 1;
        if self.stall_status {
            std::future::pending::<()>().await;
        }
        if let Some(state) = self.states.lock().unwrap().pop_front() {
            return Ok(state);
        }
        if self.pending_forever {
            Ok(RunState::Pending)
        } else {
            Ok(RunState::Completed)
        }
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<AssistantMessage>> {
        let mut messages = Vec::new();
        if let Some(reply) = &self.reply {
            messages.push(AssistantMessage {
                role: "assistant".to_string(),
                text: reply.clone(),
                created_at: 2,
            });
        }
        if let Some(prompt) = self.last_prompt() {
            messages.push(AssistantMessage {
                role: "user".to_string(),
                text: prompt,
                created_at: 1,
            });
        }
        Ok(messages)
    }
}

// =============================================================================
// Mock Embedding Service
// =============================================================================

pub struct MockEmbeddingService {
    embedding: Option<Vec<f32>>,
    calls: Mutex<Vec<String>>,
}

impl MockEmbeddingService {
    /// Returns `embedding` for every input
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding: Some(embedding),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call, like an unreachable embedding endpoint
    pub fn failing() -> Self {
        Self {
            embedding: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseEmbeddingService for MockEmbeddingService {
    async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().unwrap().push(text.to_string());
        self.embedding
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mock embedding service unavailable"))
    }
}

// =============================================================================
// In-memory Canonical Resource Store
// =============================================================================

/// Build a canonical resource for tests.
pub fn resource_fixture(title: &str, link: &str, category: &str, tags: &[&str]) -> CanonicalResource {
    let now = Utc::now();
    CanonicalResource {
        id: ResourceId::new(),
        title: title.to_string(),
        description: format!("{} for caregivers", title),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        link: link.to_string(),
        source: "Test Agency".to_string(),
        verified: true,
        embedding: None,
        created_at: now,
        updated_at: now,
    }
}

pub struct InMemoryResourceStore {
    resources: Vec<CanonicalResource>,
    failing: bool,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            failing: false,
        }
    }

    pub fn with_resource(mut self, resource: CanonicalResource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_embedded_resource(mut self, mut resource: CanonicalResource, embedding: Vec<f32>) -> Self {
        resource.embedding = Some(pgvector::Vector::from(embedding));
        self.resources.push(resource);
        self
    }

    /// Every read fails, like a lost database connection
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            anyhow::bail!("mock resource store unavailable");
        }
        Ok(())
    }
}

impl Default for InMemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl BaseResourceStore for InMemoryResourceStore {
    async fn has_embeddings(&self) -> Result<bool> {
        self.check()?;
        Ok(self.resources.iter().any(|r| r.embedding.is_some()))
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<(CanonicalResource, f32)>> {
        self.check()?;
        let mut scored: Vec<(CanonicalResource, f32)> = self
            .resources
            .iter()
            .filter_map(|r| {
                r.embedding
                    .as_ref()
                    .map(|e| (r.clone(), cosine_similarity(e.as_slice(), embedding)))
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<CanonicalResource>> {
        self.check()?;
        let needle = query.trim().to_lowercase();
        Ok(self
            .resources
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
                    || r.category.to_lowercase().contains(&needle)
                    || r.tags.iter().any(|t| t.to_lowercase() == needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<CanonicalResource>> {
        self.check()?;
        Ok(self.resources.iter().find(|r| r.link == link).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<CanonicalResource>> {
        self.check()?;
        let key = normalize_title(title);
        Ok(self
            .resources
            .iter()
            .find(|r| r.title.to_lowercase() == key)
            .cloned())
    }
}

// =============================================================================
// In-memory Persisted Scheme Store
// =============================================================================

pub struct InMemorySchemeStore {
    schemes: Mutex<HashMap<String, PersistedScheme>>,
    failing_titles: HashSet<String>,
    upserts: Mutex<usize>,
}

impl InMemorySchemeStore {
    pub fn new() -> Self {
        Self {
            schemes: Mutex::new(HashMap::new()),
            failing_titles: HashSet::new(),
            upserts: Mutex::new(0),
        }
    }

    /// Upserts for this title fail, like a constraint or connection error
    pub fn failing_for(mut self, title: &str) -> Self {
        self.failing_titles.insert(normalize_title(title));
        self
    }

    pub fn len(&self) -> usize {
        self.schemes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn upsert_count(&self) -> usize {
        *self.upserts.lock().unwrap()
    }

    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .schemes
            .lock()
            .unwrap()
            .values()
            .map(|s| s.title.clone())
            .collect();
        titles.sort();
        titles
    }
}

impl Default for InMemorySchemeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSchemeStore for InMemorySchemeStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<PersistedScheme>> {
        Ok(self
            .schemes
            .lock()
            .unwrap()
            .get(&normalize_title(title))
            .cloned())
    }

    async fn upsert(&self, candidate: &CandidateScheme) -> Result<SchemeUpsert> {
        *self.upserts.lock().unwrap() += 1;
        let key = candidate.normalized_title();
        if self.failing_titles.contains(&key) {
            anyhow::bail!("mock scheme store rejected '{}'", candidate.title);
        }

        let mut schemes = self.schemes.lock().unwrap();
        let mut created = false;
        let scheme = schemes
            .entry(key)
            .or_insert_with(|| {
                created = true;
                PersistedScheme::from_candidate(candidate)
            })
            .clone();
        Ok(SchemeUpsert { scheme, created })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PersistedScheme>> {
        let mut schemes: Vec<PersistedScheme> =
            self.schemes.lock().unwrap().values().cloned().collect();
        schemes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        schemes.truncate(limit);
        Ok(schemes)
    }
}

// =============================================================================
// In-memory Chat Exchange Log
// =============================================================================

pub struct InMemoryChatLog {
    exchanges: Mutex<Vec<ChatExchange>>,
    failing: bool,
}

impl InMemoryChatLog {
    pub fn new() -> Self {
        Self {
            exchanges: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn entries(&self) -> Vec<ChatExchange> {
        self.exchanges.lock().unwrap().clone()
    }
}

impl Default for InMemoryChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseChatLog for InMemoryChatLog {
    async fn append(&self, user_id: &str, role: ChatRole, content: &str) -> Result<ChatExchange> {
        if self.failing {
            anyhow::bail!("mock chat log unavailable");
        }
        let exchange = ChatExchange::new(user_id, role, content);
        self.exchanges.lock().unwrap().push(exchange.clone());
        Ok(exchange)
    }

    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatExchange>> {
        let exchanges = self.exchanges.lock().unwrap();
        let mine: Vec<ChatExchange> = exchanges
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        let skip = mine.len().saturating_sub(limit);
        Ok(mine.into_iter().skip(skip).collect())
    }
}

// =============================================================================
// TestDependencies - bundle of doubles wired into ServerDeps
// =============================================================================

/// Holds the concrete doubles so tests can inspect them after a run.
pub struct TestDependencies {
    pub assistant: Arc<MockAssistant>,
    pub embedding_service: Arc<MockEmbeddingService>,
    pub resources: Arc<InMemoryResourceStore>,
    pub schemes: Arc<InMemorySchemeStore>,
    pub chat_log: Arc<InMemoryChatLog>,
    pub settings: PipelineSettings,
}

impl TestDependencies {
    /// No resources, failing embeddings, and an assistant that completes at once
    pub fn new() -> Self {
        Self {
            assistant: Arc::new(MockAssistant::new()),
            embedding_service: Arc::new(MockEmbeddingService::failing()),
            resources: Arc::new(InMemoryResourceStore::new()),
            schemes: Arc::new(InMemorySchemeStore::new()),
            chat_log: Arc::new(InMemoryChatLog::new()),
            settings: PipelineSettings::for_tests(),
        }
    }

    pub fn with_assistant(mut self, assistant: MockAssistant) -> Self {
        self.assistant = Arc::new(assistant);
        self
    }

    pub fn with_embedding_service(mut self, service: MockEmbeddingService) -> Self {
        self.embedding_service = Arc::new(service);
        self
    }

    pub fn with_resources(mut self, store: InMemoryResourceStore) -> Self {
        self.resources = Arc::new(store);
        self
    }

    pub fn with_schemes(mut self, store: InMemorySchemeStore) -> Self {
        self.schemes = Arc::new(store);
        self
    }

    pub fn with_chat_log(mut self, log: InMemoryChatLog) -> Self {
        self.chat_log = Arc::new(log);
        self
    }

    /// Wire the doubles into a `ServerDeps`
    pub fn into_server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.resources.clone(),
            self.schemes.clone(),
            self.chat_log.clone(),
            self.assistant.clone(),
            self.embedding_service.clone(),
            self.settings,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
