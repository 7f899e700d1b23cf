use super::{only, perf, rec};
use crate::{
    health_score, CategoryFilter, MoveOutcome, NewServer, ProbeSample, RankManager, ServerId,
    ServerStatus,
};
use bdixdir_base::Result;
use test_log::test;

fn ids<'a>(it: impl Iterator<Item = &'a crate::ServerRecord>) -> Vec<i64> {
    it.map(|r| r.id.0).collect()
}

fn ranks(m: &RankManager, filter: &CategoryFilter) -> Vec<i64> {
    m.filtered_ordered(filter).map(|r| r.rank).collect()
}

fn rank_of(m: &RankManager, id: i64) -> i64 {
    m.get(ServerId(id)).map(|r| r.rank).unwrap_or(-1)
}

fn mixed() -> RankManager {
    RankManager::new(vec![
        rec(1, "FTP One", &["movies"], 5),
        rec(2, "Live TV", &["tv"], 2),
        rec(3, "Circle", &["movies", "tv"], 9),
        rec(4, "Ice", &["movies"], 5),
        rec(5, "Sam", &["software"], 1),
    ])
}

#[test]
fn test_filtered_ordered_stable_by_rank() {
    let m = mixed();
    assert_eq!(ids(m.filtered_ordered(&CategoryFilter::All)), vec![5, 2, 1, 4, 3]);
    // 1 and 4 tie on rank 5 and keep collection order.
    assert_eq!(ids(m.filtered_ordered(&only("movies"))), vec![1, 4, 3]);
    assert_eq!(ids(m.filtered_ordered(&only("tv"))), vec![2, 3]);
    assert_eq!(ids(m.filtered_ordered(&only("nothing"))), Vec::<i64>::new());
}

#[test]
fn test_commit_sequential_ranks() {
    for filter in [
        CategoryFilter::All,
        only("movies"),
        only("tv"),
        only("software"),
        only("nothing"),
    ] {
        let mut m = mixed();
        let before = ids(m.filtered_ordered(&filter));
        m.commit_sequential_ranks(&filter);
        let n = before.len() as i64;
        assert_eq!(ranks(&m, &filter), (1..=n).collect::<Vec<_>>());
        assert_eq!(ids(m.filtered_ordered(&filter)), before);
    }
}

#[test]
fn test_commit_leaves_other_views_alone() {
    let mut m = mixed();
    m.commit_sequential_ranks(&only("movies"));
    assert_eq!(rank_of(&m, 1), 1);
    assert_eq!(rank_of(&m, 4), 2);
    assert_eq!(rank_of(&m, 3), 3);
    assert_eq!(rank_of(&m, 2), 2);
    assert_eq!(rank_of(&m, 5), 1);
}

#[test]
fn test_move_up_then_down_restores() {
    let mut m = mixed();
    m.set_active_category(only("movies"));
    m.commit_sequential_ranks(&only("movies"));
    let before: Vec<i64> = m.records().iter().map(|r| r.rank).collect();
    assert_eq!(
        m.move_up(ServerId(4)),
        MoveOutcome::Moved { swapped_with: ServerId(1) }
    );
    assert_eq!(ids(m.view()), vec![4, 1, 3]);
    assert_eq!(
        m.move_down(ServerId(4)),
        MoveOutcome::Moved { swapped_with: ServerId(1) }
    );
    let after: Vec<i64> = m.records().iter().map(|r| r.rank).collect();
    assert_eq!(before, after);
}

#[test]
fn test_move_swaps_values_not_positions() {
    let mut m = mixed();
    m.set_active_category(only("tv"));
    // tv view is [2 (rank 2), 3 (rank 9)]
    assert_eq!(
        m.move_up(ServerId(3)),
        MoveOutcome::Moved { swapped_with: ServerId(2) }
    );
    assert_eq!(rank_of(&m, 3), 2);
    assert_eq!(rank_of(&m, 2), 9);
    // Untouched by the swap.
    assert_eq!(rank_of(&m, 1), 5);
    assert_eq!(rank_of(&m, 4), 5);
    assert_eq!(rank_of(&m, 5), 1);
    let order: Vec<i64> = m.records().iter().map(|r| r.id.0).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_move_boundaries_and_unknown() {
    let mut m = mixed();
    m.set_active_category(only("movies"));
    let before = m.clone();
    assert_eq!(m.move_up(ServerId(1)), MoveOutcome::AtBoundary);
    assert_eq!(m.move_down(ServerId(3)), MoveOutcome::AtBoundary);
    assert_eq!(m.move_up(ServerId(42)), MoveOutcome::NotFound);
    // Present in the collection but not in the active view.
    assert_eq!(m.move_down(ServerId(2)), MoveOutcome::NotFound);
    assert_eq!(m, before);
}

#[test]
fn test_manual_reorder() {
    let mut m = RankManager::new(vec![
        rec(1, "a", &["movies"], 1),
        rec(2, "b", &["movies"], 2),
        rec(3, "c", &["movies"], 3),
        rec(4, "d", &["tv"], 7),
    ]);
    let touched = m.apply_manual_reorder(&[ServerId(3), ServerId(1), ServerId(2)]);
    assert_eq!(touched, 3);
    assert_eq!(rank_of(&m, 3), 1);
    assert_eq!(rank_of(&m, 1), 2);
    assert_eq!(rank_of(&m, 2), 3);
    assert_eq!(rank_of(&m, 4), 7);
    assert_eq!(m.apply_manual_reorder(&[ServerId(99), ServerId(4)]), 1);
    assert_eq!(rank_of(&m, 4), 2);
}

#[test]
fn test_reset_alphabetical() {
    let mut m = RankManager::new(vec![
        rec(1, "Charlie", &["tv"], 1),
        rec(2, "alpha", &["movies"], 2),
        rec(3, "Bravo", &["tv"], 3),
    ]);
    m.set_active_category(only("tv"));
    m.reset_alphabetical();
    assert_eq!(rank_of(&m, 2), 1);
    assert_eq!(rank_of(&m, 3), 2);
    assert_eq!(rank_of(&m, 1), 3);
    assert_eq!(ids(m.filtered_ordered(&CategoryFilter::All)), vec![2, 3, 1]);
    // The filter is unaffected.
    assert_eq!(m.active_category(), &only("tv"));
}

#[test]
fn test_performance_ranking() {
    let mut records = vec![
        rec(1, "ninety", &["movies"], 1),
        rec(2, "forty", &["tv"], 2),
        rec(3, "seventy", &["movies"], 3),
    ];
    records[0].performance = perf(100.0, Some(333.0));
    records[1].performance = perf(50.0, Some(833.0));
    records[2].performance = perf(100.0, None);
    let scores: Vec<u8> = records.iter().map(|r| health_score(&r.performance)).collect();
    assert_eq!(scores, vec![90, 40, 70]);

    let mut m = RankManager::new(records);
    m.apply_performance_ranking();
    assert_eq!(rank_of(&m, 1), 1);
    assert_eq!(rank_of(&m, 3), 2);
    assert_eq!(rank_of(&m, 2), 3);
}

#[test]
fn test_performance_ranking_ties() {
    let mut records = vec![
        rec(1, "no-latency", &["x"], 1),
        rec(2, "slow", &["x"], 2),
        rec(3, "fast", &["x"], 3),
        rec(4, "instant", &["x"], 4),
    ];
    records[0].performance = perf(100.0, None);
    records[1].performance = perf(80.0, Some(110.0));
    records[2].performance = perf(80.0, Some(100.0));
    records[3].performance = perf(57.142857, Some(0.0));
    let mut m = RankManager::new(records);
    m.apply_performance_ranking();
    assert_eq!(ids(m.filtered_ordered(&CategoryFilter::All)), vec![3, 2, 4, 1]);
}

#[test]
fn test_add_and_remove() -> Result<()> {
    let mut m = RankManager::new(vec![rec(7, "seven", &["tv"], 3)]);
    let id = m.add_record(NewServer {
        name: "  Dhaka FTP ".to_string(),
        address: "http://172.16.50.4".to_string(),
        categories: vec![" ftp ".to_string(), "".to_string(), "ftp".to_string()],
        ..NewServer::default()
    })?;
    assert_eq!(id, ServerId(8));
    let added = m.get(id).cloned().unwrap_or_else(|| rec(0, "", &[], 0));
    assert_eq!(added.name, "Dhaka FTP");
    assert_eq!(added.categories, vec!["ftp".to_string()]);
    assert_eq!(added.rank, 4);
    assert_eq!(added.performance.sample_count, 0);

    let id = m.add_record(NewServer {
        name: "bare".to_string(),
        ..NewServer::default()
    })?;
    assert_eq!(m.get(id).map(|r| r.primary_category()), Some("others"));

    assert!(m
        .add_record(NewServer {
            name: "   ".to_string(),
            ..NewServer::default()
        })
        .is_err());

    assert_eq!(m.remove_record(ServerId(7)).map(|r| r.name), Some("seven".to_string()));
    assert!(m.remove_record(ServerId(7)).is_none());
    assert_eq!(m.len(), 2);
    Ok(())
}

#[test]
fn test_record_sample() {
    let mut m = RankManager::new(vec![rec(1, "a", &["tv"], 1)]);
    assert!(m.record_sample(
        ServerId(1),
        ProbeSample {
            reachable: true,
            response_ms: Some(100.0),
        }
    ));
    assert!(m.record_sample(
        ServerId(1),
        ProbeSample {
            reachable: false,
            response_ms: None,
        }
    ));
    assert!(!m.record_sample(
        ServerId(2),
        ProbeSample {
            reachable: true,
            response_ms: None,
        }
    ));
    let r = m.get(ServerId(1)).cloned().unwrap_or_else(|| rec(0, "", &[], 0));
    assert_eq!(r.performance.sample_count, 2);
    assert_eq!(r.performance.uptime_percent, 50.0);
    assert_eq!(r.performance.avg_response_time_ms, Some(100.0));
    assert_eq!(r.status, ServerStatus::Inactive);
}

#[test]
fn test_response_mean_skips_silent_samples() {
    let mut m = RankManager::new(vec![rec(1, "a", &["tv"], 1)]);
    let samples = [(false, None), (true, Some(100.0)), (true, Some(400.0))];
    for (reachable, response_ms) in samples {
        assert!(m.record_sample(ServerId(1), ProbeSample { reachable, response_ms }));
    }
    let p = m.get(ServerId(1)).map(|r| r.performance.clone()).unwrap_or_default();
    assert_eq!(p.sample_count, 3);
    assert_eq!(p.response_count, 2);
    assert_eq!(p.avg_response_time_ms, Some(250.0));

    // A saved average with no count weighs as one sample.
    let mut legacy = rec(2, "b", &["tv"], 2);
    legacy.performance.avg_response_time_ms = Some(300.0);
    legacy.performance.sample_count = 9;
    let mut m = RankManager::new(vec![legacy]);
    m.record_sample(
        ServerId(2),
        ProbeSample {
            reachable: true,
            response_ms: Some(100.0),
        },
    );
    assert_eq!(
        m.get(ServerId(2)).and_then(|r| r.performance.avg_response_time_ms),
        Some(200.0)
    );
}

#[test]
fn test_move_preview_changes_nothing() {
    let mut m = mixed();
    m.set_active_category(only("movies"));
    let before: Vec<i64> = m.records().iter().map(|r| r.rank).collect();
    assert_eq!(
        m.move_preview(ServerId(4), true),
        MoveOutcome::Moved {
            swapped_with: ServerId(1)
        }
    );
    assert_eq!(m.move_preview(ServerId(1), true), MoveOutcome::AtBoundary);
    assert_eq!(m.move_preview(ServerId(3), false), MoveOutcome::AtBoundary);
    assert_eq!(m.move_preview(ServerId(2), false), MoveOutcome::NotFound);
    let after: Vec<i64> = m.records().iter().map(|r| r.rank).collect();
    assert_eq!(before, after);
}

#[test]
fn test_add_record_at_rank_limit() {
    let mut m = RankManager::new(vec![rec(1, "top", &["tv"], i64::MAX)]);
    assert!(m
        .add_record(NewServer {
            name: "next".to_string(),
            ..NewServer::default()
        })
        .is_err());
    assert_eq!(m.len(), 1);

    let mut m = RankManager::new(vec![rec(i64::MAX, "last id", &["tv"], 1)]);
    assert!(m
        .add_record(NewServer {
            name: "next".to_string(),
            ..NewServer::default()
        })
        .is_err());
}

#[test]
fn test_categories_and_setters() {
    let mut m = mixed();
    assert_eq!(m.categories(), vec!["movies", "tv", "software"]);
    assert!(m.set_categories(ServerId(5), vec!["tv".to_string(), "tv".to_string()]));
    assert_eq!(m.categories(), vec!["movies", "tv"]);
    assert!(m.set_status(ServerId(5), ServerStatus::Inactive));
    assert!(!m.set_status(ServerId(50), ServerStatus::Inactive));
    assert_eq!(m.get(ServerId(5)).map(|r| r.status), Some(ServerStatus::Inactive));
}

#[test]
fn test_category_filter_parse() {
    assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
    assert_eq!(CategoryFilter::from(""), CategoryFilter::All);
    assert_eq!(CategoryFilter::from(" tv "), only("tv"));
    assert_eq!(only("tv").to_string(), "tv");
    assert_eq!(CategoryFilter::All.to_string(), "all");
}
