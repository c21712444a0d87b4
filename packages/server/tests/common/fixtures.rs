//! Shared fixtures for integration tests.

use std::collections::BTreeSet;

use careguide_core::domains::resources::CanonicalResource;
use careguide_core::domains::schemes::CandidateScheme;
use careguide_core::kernel::test_dependencies::resource_fixture;
use sqlx::PgPool;
use uuid::Uuid;

/// Suffix that keeps titles unique across tests sharing one database.
pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

pub async fn insert_resource(
    pool: &PgPool,
    title: &str,
    link: &str,
    category: &str,
    tags: &[&str],
) -> CanonicalResource {
    let resource = resource_fixture(title, link, category, tags);
    CanonicalResource::upsert(&resource, pool)
        .await
        .expect("Failed to insert canonical resource")
}

pub fn candidate(title: &str) -> CandidateScheme {
    CandidateScheme {
        title: title.to_string(),
        description: "Found by the assistant".to_string(),
        eligibility: vec!["Caregiver of a senior".to_string()],
        steps: vec!["Apply online".to_string()],
        link: String::new(),
        category: "General".to_string(),
        tags: BTreeSet::from(["caregiver".to_string()]),
        note: None,
    }
}
