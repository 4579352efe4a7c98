use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::{metrics, state::AppState, time::primitive_now_utc};
use crate::db::models::QuizAttempt;
use crate::db::types::DifficultyLevel;
use crate::repositories;
use crate::repositories::questions::QuestionFilter;
use crate::services::errors::QuizError;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AttemptFilters {
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) num_questions: Option<i32>,
    pub(crate) randomize: bool,
    pub(crate) total_time_limit: Option<i32>,
}

impl AttemptFilters {
    fn validate(&self, max_questions: i32) -> Result<(), QuizError> {
        if let Some(count) = self.num_questions {
            if count < 1 {
                return Err(QuizError::InvalidArgument(
                    "num_questions must be at least 1".to_string(),
                ));
            }
            if count > max_questions {
                return Err(QuizError::InvalidArgument(format!(
                    "num_questions must not exceed {max_questions}"
                )));
            }
        }
        if matches!(self.total_time_limit, Some(limit) if limit < 1) {
            return Err(QuizError::InvalidArgument(
                "total_time_limit must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Orders and truncates the candidate ids into the attempt's question sequence.
///
/// Candidates arrive in catalog order. With `randomize` they are shuffled
/// uniformly first; `num_questions` keeps a prefix, and a smaller pool is
/// taken whole.
pub(crate) fn select_snapshot<R: Rng + ?Sized>(
    mut candidates: Vec<i64>,
    randomize: bool,
    num_questions: Option<i32>,
    rng: &mut R,
) -> Vec<i64> {
    if randomize {
        candidates.shuffle(rng);
    }
    if let Some(count) = num_questions {
        candidates.truncate(usize::try_from(count).unwrap_or(0));
    }
    candidates
}

pub(crate) fn encode_snapshot(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}

/// Decodes a stored snapshot. `None` when the column is unset or any element
/// is not an integer; an empty string is a valid empty snapshot.
pub(crate) fn parse_snapshot(raw: Option<&str>) -> Option<Vec<i64>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    raw.split(',').map(|part| part.trim().parse::<i64>().ok()).collect()
}

pub(crate) async fn start_attempt(
    state: &AppState,
    user_id: &str,
    filters: AttemptFilters,
) -> Result<QuizAttempt, QuizError> {
    filters.validate(state.settings().quiz().max_questions_per_attempt)?;

    if let Some(category_id) = filters.category_id {
        repositories::categories::find_by_id(state.db(), category_id)
            .await?
            .ok_or_else(|| QuizError::not_found("Category"))?;
    }

    let candidates = repositories::questions::list_ids(
        state.db(),
        QuestionFilter { category_id: filters.category_id, difficulty: filters.difficulty },
    )
    .await?;
    let candidate_count = candidates.len();

    let snapshot = {
        let mut rng = rand::thread_rng();
        select_snapshot(candidates, filters.randomize, filters.num_questions, &mut rng)
    };

    let attempt = repositories::attempts::create(
        state.db(),
        repositories::attempts::CreateAttempt {
            user_id,
            category_id: filters.category_id,
            started_at: primitive_now_utc(),
            total_time_limit: filters.total_time_limit,
            difficulty_filter: filters.difficulty,
            num_questions: filters.num_questions,
            randomize: filters.randomize,
            selected_question_ids: encode_snapshot(&snapshot),
        },
    )
    .await?;

    metrics::attempt_started(filters.randomize);
    tracing::info!(
        attempt_id = attempt.id,
        user_id,
        category_id = ?filters.category_id,
        candidates = candidate_count,
        selected = snapshot.len(),
        randomize = filters.randomize,
        "Quiz attempt started"
    );

    Ok(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn takes_catalog_prefix_without_randomize() {
        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_snapshot(vec![1, 2, 3, 4, 5], false, Some(2), &mut rng);
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn small_pool_is_taken_whole() {
        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_snapshot(vec![4, 9], false, Some(10), &mut rng);
        assert_eq!(selected, vec![4, 9]);

        let selected = select_snapshot(Vec::new(), true, Some(3), &mut rng);
        assert!(selected.is_empty());
    }

    #[test]
    fn randomize_keeps_a_subset_of_candidates() {
        let candidates: Vec<i64> = (1..=20).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let selected = select_snapshot(candidates.clone(), true, Some(5), &mut rng);

        assert_eq!(selected.len(), 5);
        for id in &selected {
            assert!(candidates.contains(id));
        }
        let mut unique = selected.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn randomize_without_limit_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut selected = select_snapshot((1..=8).collect(), true, None, &mut rng);
        selected.sort_unstable();
        assert_eq!(selected, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn snapshot_text_roundtrip_and_edge_cases() {
        assert_eq!(encode_snapshot(&[3, 1, 2]), "3,1,2");
        assert_eq!(encode_snapshot(&[]), "");

        assert_eq!(parse_snapshot(Some("3,1,2")), Some(vec![3, 1, 2]));
        assert_eq!(parse_snapshot(Some(" 5 , 6 ")), Some(vec![5, 6]));
        assert_eq!(parse_snapshot(Some("")), Some(Vec::new()));
        assert_eq!(parse_snapshot(None), None);
        assert_eq!(parse_snapshot(Some("1,x,3")), None);
        assert_eq!(parse_snapshot(Some("1,,3")), None);
    }

    #[test]
    fn filters_reject_non_positive_values() {
        let filters = AttemptFilters { num_questions: Some(0), ..Default::default() };
        assert!(matches!(filters.validate(200), Err(QuizError::InvalidArgument(_))));

        let filters = AttemptFilters { total_time_limit: Some(0), ..Default::default() };
        assert!(matches!(filters.validate(200), Err(QuizError::InvalidArgument(_))));

        let filters = AttemptFilters { num_questions: Some(201), ..Default::default() };
        assert!(matches!(filters.validate(200), Err(QuizError::InvalidArgument(_))));

        let filters = AttemptFilters {
            num_questions: Some(5),
            total_time_limit: Some(60),
            ..Default::default()
        };
        assert!(filters.validate(200).is_ok());
    }
}
