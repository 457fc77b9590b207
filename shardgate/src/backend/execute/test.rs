use std::thread::{self, ThreadId};
use std::time::Duration;

use tokio::time::sleep;

use super::*;

/// Group index, whether it ran on the caller, and the thread it ran on.
#[derive(Debug)]
struct Tagged {
    group: usize,
    is_first: bool,
    thread: ThreadId,
    thread_name: Option<String>,
}

struct Tagger {
    fail: Option<usize>,
}

#[async_trait]
impl ExecuteCallback<usize, Tagged> for Tagger {
    async fn execute(
        &self,
        inputs: Vec<usize>,
        is_first: bool,
        _context: &ExecuteContext,
    ) -> Result<Vec<Tagged>, Error> {
        let mut outputs = vec![];
        for group in inputs {
            // Earlier groups finish last.
            sleep(Duration::from_millis(10 * (5 - group as u64))).await;
            if self.fail == Some(group) {
                return Err(Error::statement("ds_0", "relation does not exist"));
            }
            outputs.push(Tagged {
                group,
                is_first,
                thread: thread::current().id(),
                thread_name: thread::current().name().map(String::from),
            });
        }
        Ok(outputs)
    }
}

fn groups(count: usize) -> Vec<ExecuteGroup<usize>> {
    (0..count)
        .map(|i| ExecuteGroup::new(&format!("ds_{}", i), ConnectionMode::MemoryStrictly, vec![i]))
        .collect()
}

#[tokio::test]
async fn test_parallel_order() {
    let engine = ExecuteEngine::new(2).unwrap();
    let caller = thread::current().id();

    let results = engine
        .execute(
            groups(5),
            Arc::new(Tagger { fail: None }),
            ExecuteContext::default(),
            false,
        )
        .await
        .unwrap();

    assert_eq!(
        results.iter().map(|r| r.group).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
    assert!(results[0].is_first);
    assert_eq!(results[0].thread, caller);
    for result in &results[1..] {
        assert!(!result.is_first);
        assert_ne!(result.thread, caller);
        assert_eq!(result.thread_name.as_deref(), Some("shard-exec"));
    }
}

#[tokio::test]
async fn test_parallel_failure() {
    let engine = ExecuteEngine::new(2).unwrap();

    let result = engine
        .execute(
            groups(5),
            Arc::new(Tagger { fail: Some(3) }),
            ExecuteContext::default(),
            false,
        )
        .await;

    match result {
        Err(Error::Statement { message, .. }) => assert_eq!(message, "relation does not exist"),
        other => panic!("expected statement error, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_serial() {
    let engine = ExecuteEngine::new(1).unwrap();
    let caller = thread::current().id();

    let results = engine
        .execute(
            groups(3),
            Arc::new(Tagger { fail: None }),
            ExecuteContext::default(),
            true,
        )
        .await
        .unwrap();

    assert_eq!(
        results.iter().map(|r| r.group).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(results.iter().all(|r| r.thread == caller));
    assert!(results[0].is_first);
    assert!(!results[2].is_first);

    let result = engine
        .execute(
            groups(3),
            Arc::new(Tagger { fail: Some(1) }),
            ExecuteContext::default(),
            true,
        )
        .await;
    assert!(matches!(result, Err(Error::Statement { .. })));
}

struct ContextReader;

#[async_trait]
impl ExecuteCallback<usize, Option<String>> for ContextReader {
    async fn execute(
        &self,
        inputs: Vec<usize>,
        _is_first: bool,
        context: &ExecuteContext,
    ) -> Result<Vec<Option<String>>, Error> {
        Ok(inputs
            .iter()
            .map(|_| {
                context
                    .get("trace_id")
                    .and_then(|v| v.as_str())
                    .map(String::from)
            })
            .collect())
    }
}

#[tokio::test]
async fn test_context_propagation() {
    let engine = ExecuteEngine::new(2).unwrap();
    let context: ExecuteContext = [("trace_id".to_string(), serde_json::json!("abc-123"))]
        .into_iter()
        .collect();

    let results = engine
        .execute(groups(4), Arc::new(ContextReader), context, false)
        .await
        .unwrap();

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.as_deref() == Some("abc-123")));
}

#[tokio::test]
async fn test_empty_groups() {
    let engine = ExecuteEngine::new(1).unwrap();
    let results = engine
        .execute(
            vec![],
            Arc::new(Tagger { fail: None }),
            ExecuteContext::default(),
            false,
        )
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_shutdown_idempotent() {
    let engine = ExecuteEngine::new(1).unwrap();
    assert!(!engine.is_shutdown());

    engine.shutdown();
    engine.shutdown();
    assert!(engine.is_shutdown());

    let result = engine
        .execute(
            groups(2),
            Arc::new(Tagger { fail: None }),
            ExecuteContext::default(),
            false,
        )
        .await;
    assert!(matches!(result, Err(Error::Shutdown)));

    let result = engine
        .execute(
            groups(2),
            Arc::new(Tagger { fail: None }),
            ExecuteContext::default(),
            true,
        )
        .await;
    assert!(matches!(result, Err(Error::Shutdown)));
}

#[test]
fn test_global() {
    let first = ExecuteEngine::global().unwrap() as *const ExecuteEngine;
    let second = ExecuteEngine::global().unwrap() as *const ExecuteEngine;
    assert_eq!(first, second);
}
