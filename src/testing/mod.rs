//! In-process doubles for the store and identity provider so handlers and
//! repositories can be exercised without PostgreSQL or Google.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{AuthError, IdentityProvider, Profile};
use crate::config::AppConfig;
use crate::database::models::{ActiveToken, Entity, Project, ProjectFile, User};
use crate::database::{DatabaseError, EntityStore, HealthCheck, Repository};
use crate::filter::{Condition, Filter, FilterOp, SortDirection, SqlValue};
use crate::state::AppState;

/// Entities the in-memory store can key. PostgreSQL assigns keys itself,
/// so this only exists for tests.
pub trait Keyed: Entity {
    fn assign_id(&mut self, id: i64);
}

impl Keyed for User {
    fn assign_id(&mut self, id: i64) {
        self.user_id = Some(id);
    }
}

impl Keyed for ActiveToken {
    fn assign_id(&mut self, id: i64) {
        self.token_id = Some(id);
    }
}

impl Keyed for Project {
    fn assign_id(&mut self, id: i64) {
        self.project_id = Some(id);
    }
}

impl Keyed for ProjectFile {
    fn assign_id(&mut self, id: i64) {
        self.file_id = Some(id);
    }
}

/// Value of one column of `entity`, key included.
pub fn column_value<E: Entity>(entity: &E, column: &str) -> Option<SqlValue> {
    if column == E::ID_COLUMN {
        return Some(SqlValue::Int(entity.id()));
    }
    entity.values().into_iter().find(|(c, _)| *c == column).map(|(_, v)| v)
}

fn is_null(value: &SqlValue) -> bool {
    match value {
        SqlValue::Int(v) => v.is_none(),
        SqlValue::Text(v) => v.is_none(),
        SqlValue::Bool(v) => v.is_none(),
        SqlValue::Timestamp(v) => v.is_none(),
    }
}

/// Ordering between two non-null values of the same kind, `None` otherwise.
fn compare(a: &SqlValue, b: &SqlValue) -> Option<Ordering> {
    match (a, b) {
        (SqlValue::Int(Some(a)), SqlValue::Int(Some(b))) => Some(a.cmp(b)),
        (SqlValue::Text(Some(a)), SqlValue::Text(Some(b))) => Some(a.cmp(b)),
        (SqlValue::Bool(Some(a)), SqlValue::Bool(Some(b))) => Some(a.cmp(b)),
        (SqlValue::Timestamp(Some(a)), SqlValue::Timestamp(Some(b))) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Evaluate a condition the way PostgreSQL would, with unknown as `false`.
pub fn condition_matches(condition: &Condition, row: &SqlValue) -> bool {
    let first = condition.values.first();
    let cmp = |v: &SqlValue| compare(row, v);
    match condition.op {
        FilterOp::IsNull => is_null(row),
        FilterOp::NotNull => !is_null(row),
        FilterOp::Eq => first.map_or(false, |v| cmp(v) == Some(Ordering::Equal)),
        FilterOp::Ne => first.map_or(false, |v| matches!(cmp(v), Some(o) if o != Ordering::Equal)),
        FilterOp::Gt => first.map_or(false, |v| cmp(v) == Some(Ordering::Greater)),
        FilterOp::Gte => first.map_or(false, |v| matches!(cmp(v), Some(Ordering::Greater | Ordering::Equal))),
        FilterOp::Lt => first.map_or(false, |v| cmp(v) == Some(Ordering::Less)),
        FilterOp::Lte => first.map_or(false, |v| matches!(cmp(v), Some(Ordering::Less | Ordering::Equal))),
        FilterOp::In => condition.values.iter().any(|v| cmp(v) == Some(Ordering::Equal)),
        FilterOp::NIn => !is_null(row) && condition.values.iter().all(|v| cmp(v) != Some(Ordering::Equal)),
        FilterOp::Like | FilterOp::ILike => match (row, first) {
            (SqlValue::Text(Some(text)), Some(SqlValue::Text(Some(pattern)))) => {
                like_match(text, pattern, condition.op == FilterOp::ILike)
            }
            _ => false,
        },
    }
}

/// SQL `LIKE`: `%` is any run, `_` any single character. One pass per
/// pattern character over the text, so `O(text * pattern)`.
pub fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let fold = |s: &str| -> Vec<char> {
        if case_insensitive { s.to_lowercase().chars().collect() } else { s.chars().collect() }
    };
    let (text, pattern) = (fold(text), fold(pattern));

    // reachable[j]: the pattern prefix consumed so far matches text[..j]
    let mut reachable = vec![false; text.len() + 1];
    reachable[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= reachable[j];
                    next[j] = seen;
                }
            }
            '_' => {
                for j in 1..=text.len() {
                    next[j] = reachable[j - 1];
                }
            }
            c => {
                for j in 1..=text.len() {
                    next[j] = reachable[j - 1] && text[j - 1] == *c;
                }
            }
        }
        reachable = next;
    }
    reachable[text.len()]
}

/// Vec-backed [`EntityStore`] that counts calls and can be told to fail.
pub struct MemoryStore<E> {
    rows: Mutex<Vec<E>>,
    next_id: AtomicI64,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
    unique: Option<&'static str>,
}

impl<E: Keyed> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            unique: None,
        }
    }

    /// Reject writes that would duplicate `column`, like a UNIQUE index.
    pub fn unique_on(mut self, column: &'static str) -> Self {
        self.unique = Some(column);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Every call made so far, reads and writes.
    pub fn calls(&self) -> usize {
        self.reads() + self.writes()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn read(&self) -> Result<(), DatabaseError> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        self.check()
    }

    fn write(&self) -> Result<(), DatabaseError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.check()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(DatabaseError::QueryError("memory store switched to fail".into()));
        }
        Ok(())
    }

    fn check_unique(&self, rows: &[E], entity: &E) -> Result<(), DatabaseError> {
        let Some(column) = self.unique else {
            return Ok(());
        };
        let value = column_value(entity, column);
        let taken = rows
            .iter()
            .filter(|row| row.id().is_none() || row.id() != entity.id())
            .any(|row| column_value(row, column) == value);
        if taken {
            return Err(DatabaseError::Conflict(format!("{}_{}_key", E::TABLE, column)));
        }
        Ok(())
    }

    fn matching(&self, filter: &Filter) -> Vec<E> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .filter(|row| {
                filter.conditions.iter().all(|c| {
                    column_value(*row, c.column).map_or(false, |v| condition_matches(c, &v))
                })
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<E: Keyed> EntityStore<E> for MemoryStore<E> {
    async fn fetch(&self, id: i64) -> Result<Option<E>, DatabaseError> {
        self.read()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id() == Some(id)).cloned())
    }

    async fn fetch_page(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError> {
        self.read()?;
        let mut rows = self.matching(filter);
        let (column, direction) = filter
            .order
            .map(|o| (o.column, o.direction))
            .unwrap_or((E::ID_COLUMN, SortDirection::Asc));
        rows.sort_by(|a, b| {
            let ordering = match (column_value(a, column), column_value(b, column)) {
                (Some(x), Some(y)) => compare(&x, &y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then(a.id().cmp(&b.id()))
        });
        let rows = match filter.page {
            Some(page) => rows
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect(),
            None => rows,
        };
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        self.read()?;
        Ok(self.matching(filter).len() as i64)
    }

    async fn insert(&self, entity: &E) -> Result<E, DatabaseError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        self.check_unique(&rows, entity)?;
        let mut stored = entity.clone();
        stored.assign_id(self.next_id.fetch_add(1, AtomicOrdering::SeqCst));
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, entity: &E) -> Result<E, DatabaseError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        self.check_unique(&rows, entity)?;
        match rows.iter_mut().find(|r| r.id().is_some() && r.id() == entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(entity.clone())
            }
            None => Err(DatabaseError::NotFound(format!("{} {:?}", E::KIND, entity.id()))),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.write()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id() != Some(id));
        Ok(rows.len() < before)
    }
}

#[async_trait]
impl<E: Keyed> HealthCheck for MemoryStore<E> {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

/// Accepts the code `"good-code"` as the profile it was built with.
pub struct StubIdentity {
    pub profile: Profile,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/authorize?state={}", state)
    }

    async fn verify_identity(&self, code: &str) -> Result<Profile, AuthError> {
        if code == "good-code" {
            Ok(self.profile.clone())
        } else {
            Err(AuthError::Provider("invalid authorization code".into()))
        }
    }
}

pub fn test_profile() -> Profile {
    Profile {
        sub: "google-oauth2|1001".into(),
        email: "ada@example.com".into(),
        name: "Ada".into(),
        picture: "https://example.com/ada.png".into(),
    }
}

/// Handles on the stores behind a [`test_state`] so tests can seed data
/// and inspect call counts.
pub struct TestStores {
    pub users: Arc<MemoryStore<User>>,
    pub tokens: Arc<MemoryStore<ActiveToken>>,
    pub projects: Arc<MemoryStore<Project>>,
    pub files: Arc<MemoryStore<ProjectFile>>,
}

pub fn test_state() -> (AppState, TestStores) {
    let stores = TestStores {
        users: Arc::new(MemoryStore::new().unique_on("sub")),
        tokens: Arc::new(MemoryStore::new()),
        projects: Arc::new(MemoryStore::new()),
        files: Arc::new(MemoryStore::new()),
    };
    let state = AppState {
        config: Arc::new(AppConfig::development()),
        users: Repository::<User>::new(stores.users.clone()),
        tokens: Repository::<ActiveToken>::new(stores.tokens.clone()),
        projects: Repository::<Project>::new(stores.projects.clone()),
        files: Repository::<ProjectFile>::new(stores.files.clone()),
        identity: Arc::new(StubIdentity { profile: test_profile() }),
        health: stores.users.clone(),
    };
    (state, stores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns() {
        assert!(like_match("main.rs", "%.rs", false));
        assert!(like_match("main.rs", "m_in%", false));
        assert!(!like_match("Main.rs", "main%", false));
        assert!(like_match("Main.rs", "main%", true));
        assert!(!like_match("lib.rs", "%.toml", false));
        assert!(like_match("", "%", false));
        assert!(!like_match("", "_", false));
    }

    #[test]
    fn like_with_many_wildcards_stays_fast() {
        let text = "a".repeat(2_000);
        let pattern = format!("{}b", "%a".repeat(30));
        assert!(!like_match(&text, &pattern, false));
        assert!(like_match(&text, &"%a".repeat(30), false));
    }

    #[test]
    fn null_rows_never_match_comparisons() {
        let null = SqlValue::Int(None);
        let cond = Condition { column: "parent_directory", op: FilterOp::Ne, values: vec![SqlValue::Int(Some(1))] };
        assert!(!condition_matches(&cond, &null));
        let cond = Condition { column: "parent_directory", op: FilterOp::IsNull, values: vec![] };
        assert!(condition_matches(&cond, &null));
    }

    #[tokio::test]
    async fn unique_column_rejects_duplicates() {
        let store = MemoryStore::<User>::new().unique_on("sub");
        let first = store.insert(&User::new("s1", "a@x", "A", "")).await.unwrap();
        assert!(matches!(
            store.insert(&User::new("s1", "b@x", "B", "")).await,
            Err(DatabaseError::Conflict(_))
        ));

        // Rewriting a row with its own value is fine
        assert!(store.update(&first).await.is_ok());
        assert_eq!(store.len(), 1);
    }
}
