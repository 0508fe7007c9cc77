// Integration tests for top-K snippet selection
//
// These tests use real files so that the deletion discipline can be checked
// on disk: every candidate that falls out of the retained set must have its
// file removed by the time offer() returns.

use anyhow::Result;
use chrono::Utc;
use snippet_keeper::snippets::{Candidate, TopSnippets};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn make_candidate(dir: &Path, seq: u64, score: f64) -> Result<Candidate> {
    let path = dir.join(format!("snippet-{seq:04}.wav"));
    std::fs::write(&path, b"RIFF")?;
    Ok(Candidate::new(path, score, Utc::now(), seq))
}

fn files_in(dir: &Path) -> Result<HashSet<PathBuf>> {
    let mut out = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        out.insert(entry?.path());
    }
    Ok(out)
}

fn scores(candidates: &[Candidate]) -> Vec<f64> {
    candidates.iter().map(|c| c.score).collect()
}

/// Small deterministic generator so the property checks are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    /// Scores drawn from a small set so ties are common
    fn score(&mut self) -> f64 {
        (self.next() % 8) as f64 / 8.0
    }
}

#[test]
fn test_top_three_of_six_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(3);

    let input = [0.1, 0.5, 0.2, 0.9, 0.05, 0.6];
    let mut candidates = Vec::new();
    for (i, &score) in input.iter().enumerate() {
        let candidate = make_candidate(temp_dir.path(), i as u64, score)?;
        candidates.push(candidate.clone());
        top.offer(candidate);
        assert!(top.count() <= 3);
    }

    let kept = top.finalize();
    assert_eq!(scores(&kept), vec![0.9, 0.6, 0.5]);

    // 0.1, 0.2 and 0.05 were evicted or rejected, and their files are gone
    for dropped in [0usize, 2, 4] {
        assert!(!candidates[dropped].path.exists(), "{:?} should be deleted", candidates[dropped].path);
    }
    for survivor in &kept {
        assert!(survivor.path.exists());
    }
    assert_eq!(files_in(temp_dir.path())?.len(), 3);

    Ok(())
}

#[test]
fn test_offer_results_for_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(3);

    let accepted: Vec<bool> = [0.1, 0.5, 0.2, 0.9, 0.05, 0.6]
        .iter()
        .enumerate()
        .map(|(i, &s)| top.offer(make_candidate(temp_dir.path(), i as u64, s).unwrap()))
        .collect();

    assert_eq!(accepted, vec![true, true, true, true, false, true]);
    Ok(())
}

#[test]
fn test_fewer_candidates_than_capacity() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(5);

    assert!(top.offer(make_candidate(temp_dir.path(), 0, 0.3)?));
    assert!(top.offer(make_candidate(temp_dir.path(), 1, 0.7)?));
    assert_eq!(top.count(), 2);

    let kept = top.finalize();
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].sequence_number, 1);
    assert_eq!(kept[1].sequence_number, 0);
    Ok(())
}

#[test]
fn test_silence_participates_in_ranking() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(2);

    assert!(top.offer(make_candidate(temp_dir.path(), 0, 0.0)?));
    assert!(top.offer(make_candidate(temp_dir.path(), 1, 0.0)?));
    assert!(!top.offer(make_candidate(temp_dir.path(), 2, 0.0)?));
    assert!(top.offer(make_candidate(temp_dir.path(), 3, 0.01)?));

    let kept = top.finalize();
    assert_eq!(scores(&kept), vec![0.01, 0.0]);
    // The earlier of the two silent chunks survives
    assert_eq!(kept[1].sequence_number, 0);
    Ok(())
}

#[test]
fn test_snapshot_is_non_destructive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(3);

    for (i, score) in [0.4, 0.8, 0.1].into_iter().enumerate() {
        top.offer(make_candidate(temp_dir.path(), i as u64, score)?);
    }

    let first = top.snapshot();
    let second = top.snapshot();
    assert_eq!(first, second);
    assert_eq!(scores(&first), vec![0.8, 0.4, 0.1]);
    assert_eq!(top.count(), 3);
    assert_eq!(top.finalize(), first);
    Ok(())
}

#[test]
fn test_finalize_keeps_files_for_the_caller() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(2);

    top.offer(make_candidate(temp_dir.path(), 0, 0.2)?);
    top.offer(make_candidate(temp_dir.path(), 1, 0.3)?);

    let kept = top.finalize();
    assert_eq!(top.count(), 0);
    for candidate in kept {
        assert!(candidate.path.exists());
    }
    Ok(())
}

#[test]
fn test_clear_with_and_without_deletion() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let mut top = TopSnippets::new(2);
    let keep = make_candidate(temp_dir.path(), 0, 0.5)?;
    top.offer(keep.clone());
    top.clear(false);
    assert_eq!(top.count(), 0);
    assert!(keep.path.exists());

    let doomed = make_candidate(temp_dir.path(), 1, 0.5)?;
    top.offer(doomed.clone());
    top.clear(true);
    assert_eq!(top.count(), 0);
    assert!(!doomed.path.exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_deletion_failure_is_counted_not_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut top = TopSnippets::new(1);

    top.offer(make_candidate(temp_dir.path(), 0, 0.9)?);

    // A non-empty directory cannot be removed with remove_file
    let stubborn = temp_dir.path().join("stubborn.wav");
    std::fs::create_dir(&stubborn)?;
    std::fs::write(stubborn.join("inner"), b"x")?;

    let accepted = top.offer(Candidate::new(stubborn.clone(), 0.1, Utc::now(), 1));
    assert!(!accepted);
    assert_eq!(top.deletion_failures(), 1);
    assert!(stubborn.exists());
    assert_eq!(top.count(), 1);
    Ok(())
}

#[test]
fn test_retained_set_matches_reference_ranking() -> Result<()> {
    let mut rng = Lcg(0x5eed);

    for capacity in 1..=6 {
        for round in 0..8 {
            let temp_dir = TempDir::new()?;
            let mut top = TopSnippets::new(capacity);
            let total = 1 + (rng.next() % 30) as usize;

            let mut offered = Vec::new();
            for seq in 0..total {
                let candidate = make_candidate(temp_dir.path(), seq as u64, rng.score())?;
                offered.push(candidate.clone());
                top.offer(candidate);

                assert_eq!(top.count(), (seq + 1).min(capacity));
                // Never more than N retained files on disk between offers
                assert!(files_in(temp_dir.path())?.len() <= capacity);
            }

            // Reference: stable sort by descending score keeps earlier inserts first on ties
            let mut expected = offered.clone();
            expected.sort_by(|a, b| b.score.total_cmp(&a.score));
            expected.truncate(capacity);

            let kept = top.finalize();
            let kept_ids: Vec<u64> = kept.iter().map(|c| c.sequence_number).collect();
            let expected_ids: Vec<u64> = expected.iter().map(|c| c.sequence_number).collect();
            assert_eq!(kept_ids, expected_ids, "capacity {} round {}", capacity, round);

            for pair in kept.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }

            let on_disk = files_in(temp_dir.path())?;
            let kept_paths: HashSet<PathBuf> = kept.iter().map(|c| c.path.clone()).collect();
            assert_eq!(on_disk, kept_paths, "only survivors remain on disk");
        }
    }

    Ok(())
}
