use std::future::Future;

use tokio::task::JoinSet;

use crate::error::TimelineError;

/// Fetch the children of every parent concurrently and attach them.
///
/// One task is spawned per parent, with no cap on the fan-out width. Results
/// are consumed in completion order; the first error is returned and the
/// `JoinSet` is dropped, which aborts the siblings still in flight. Partial
/// results are never returned.
pub async fn attach_children<P, C, F, Fut, A>(
    mut parents: Vec<P>,
    fetch: F,
    attach: A,
) -> Result<Vec<P>, TimelineError>
where
    F: Fn(&P) -> Fut,
    Fut: Future<Output = Result<Vec<C>, TimelineError>> + Send + 'static,
    C: Send + 'static,
    A: Fn(&mut P, Vec<C>),
{
    let mut tasks = JoinSet::new();
    for (index, parent) in parents.iter().enumerate() {
        let pending = fetch(parent);
        tasks.spawn(async move { (index, pending.await) });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, children) = joined.map_err(|e| TimelineError::Join(e.to_string()))?;
        attach(&mut parents[index], children?);
    }

    Ok(parents)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::RepoError;

    #[derive(Debug)]
    struct Parent {
        id: u32,
        children: Vec<u32>,
    }

    fn parents(n: u32) -> Vec<Parent> {
        (0..n)
            .map(|id| Parent {
                id,
                children: Vec::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_children_attached_to_matching_parent() {
        let result = attach_children(
            parents(4),
            |p| {
                let id = p.id;
                async move { Ok(vec![id * 10, id * 10 + 1]) }
            },
            |p, c| p.children = c,
        )
        .await
        .unwrap();

        let ids: Vec<_> = result.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(result[2].children, vec![20, 21]);
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_batch() {
        let result = attach_children(
            parents(5),
            |p| {
                let id = p.id;
                async move {
                    if id == 3 {
                        Err(TimelineError::Store(RepoError::Query("boom".to_string())))
                    } else {
                        Ok(vec![id])
                    }
                }
            },
            |p, c| p.children = c,
        )
        .await;

        assert!(matches!(result, Err(TimelineError::Store(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_fetches_run_concurrently() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let result = attach_children(
            parents(6),
            |_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(Vec::<u32>::new())
                }
            },
            |p, c| p.children = c,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(peak.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_empty_batch_spawns_nothing() {
        let result = attach_children(
            Vec::<Parent>::new(),
            |_| async { Ok(vec![1u32]) },
            |p, c| p.children = c,
        )
        .await
        .unwrap();

        assert!(result.is_empty());
    }
}
