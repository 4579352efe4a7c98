use std::collections::{HashMap, HashSet};

use sqlx::PgConnection;

use crate::core::time::{elapsed_whole_seconds, primitive_now_utc};
use crate::core::{metrics, state::AppState};
use crate::db::models::{QuizAttempt, QuizResult};
use crate::repositories;
use crate::repositories::questions::QuestionFilter;
use crate::repositories::user_answers::SubmissionRow;
use crate::services::attempt_builder::parse_snapshot;
use crate::services::errors::QuizError;
use crate::services::statistics::{self, ResultOutcome};

/// Which question ids an attempt is scored against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScoredSet {
    /// The sequence recorded when the attempt started.
    Snapshot(Vec<i64>),
    /// No usable snapshot: every question of the attempt's category, or of
    /// the whole catalog for uncategorised attempts.
    LegacyFallback,
}

impl ScoredSet {
    pub(crate) fn for_attempt(attempt: &QuizAttempt) -> Self {
        match parse_snapshot(attempt.selected_question_ids.as_deref()) {
            Some(ids) => Self::Snapshot(ids),
            None => Self::LegacyFallback,
        }
    }

    async fn resolve(
        self,
        conn: &mut PgConnection,
        attempt: &QuizAttempt,
    ) -> Result<Vec<i64>, sqlx::Error> {
        match self {
            Self::Snapshot(ids) => Ok(ids),
            Self::LegacyFallback => {
                repositories::questions::list_ids(
                    &mut *conn,
                    QuestionFilter { category_id: attempt.category_id, difficulty: None },
                )
                .await
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeOutcome {
    pub(crate) time_spent: i32,
    pub(crate) timed_out: bool,
}

/// Caps the elapsed time at the attempt's limit.
pub(crate) fn apply_time_policy(elapsed_seconds: i64, limit: Option<i32>) -> TimeOutcome {
    match limit {
        Some(limit) if elapsed_seconds >= i64::from(limit) => {
            TimeOutcome { time_spent: limit, timed_out: true }
        }
        _ => TimeOutcome {
            time_spent: i32::try_from(elapsed_seconds).unwrap_or(i32::MAX),
            timed_out: false,
        },
    }
}

/// A question counts once any of the user's submissions for it picked a
/// correct answer, whatever came before or after.
pub(crate) fn count_correct(question_ids: &[i64], submissions: &[SubmissionRow]) -> i32 {
    let credited = credited_questions(submissions);
    let correct = question_ids.iter().filter(|id| credited.contains(id)).count();
    i32::try_from(correct).unwrap_or(i32::MAX)
}

pub(crate) fn compute_score(correct: i32, total: i32) -> f64 {
    if total > 0 {
        f64::from(correct) / f64::from(total) * 100.0
    } else {
        0.0
    }
}

fn credited_questions(submissions: &[SubmissionRow]) -> HashSet<i64> {
    submissions.iter().filter(|row| row.is_correct).map(|row| row.question_id).collect()
}

#[derive(Debug)]
pub(crate) struct CompletedAttempt {
    pub(crate) result: QuizResult,
    pub(crate) time_spent: i32,
}

pub(crate) async fn complete_attempt(
    state: &AppState,
    attempt_id: i64,
    user_id: &str,
) -> Result<CompletedAttempt, QuizError> {
    let mut tx = state.db().begin().await?;

    let attempt = repositories::attempts::lock_for_user(&mut *tx, attempt_id, user_id)
        .await?
        .ok_or_else(|| QuizError::not_found("Quiz attempt"))?;
    if attempt.completed_at.is_some() {
        return Err(QuizError::AlreadyCompleted);
    }

    let scored_set = ScoredSet::for_attempt(&attempt);
    let legacy_fallback = scored_set == ScoredSet::LegacyFallback;
    let question_ids = scored_set.resolve(&mut tx, &attempt).await?;
    let submissions =
        repositories::user_answers::list_for_questions(&mut *tx, user_id, &question_ids).await?;

    let total_questions = i32::try_from(question_ids.len()).unwrap_or(i32::MAX);
    let correct_answers = count_correct(&question_ids, &submissions);
    let score = compute_score(correct_answers, total_questions);

    let now = primitive_now_utc();
    let timing =
        apply_time_policy(elapsed_whole_seconds(attempt.started_at, now), attempt.total_time_limit);

    let marked =
        repositories::attempts::mark_completed(&mut *tx, attempt.id, now, timing.time_spent)
            .await?;
    if !marked {
        return Err(QuizError::AlreadyCompleted);
    }

    let result = repositories::results::create(
        &mut *tx,
        repositories::results::CreateResult {
            attempt_id: attempt.id,
            user_id,
            total_questions,
            correct_answers,
            score,
            timed_out: timing.timed_out,
            completed_at: now,
        },
    )
    .await
    .map_err(|err| match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => QuizError::AlreadyCompleted,
        other => QuizError::Storage(other),
    })?;

    let stats = statistics::record_result(
        &mut tx,
        user_id,
        ResultOutcome {
            score,
            total_questions,
            correct_answers,
            time_spent: timing.time_spent,
            completed_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    // Reviews resolve the same set without counting it.
    if legacy_fallback {
        tracing::warn!(
            attempt_id = attempt.id,
            category_id = ?attempt.category_id,
            "Attempt had no usable question snapshot; scored against the catalog"
        );
        metrics::scoring_fallback();
    }
    metrics::attempt_completed(timing.timed_out, score);
    tracing::info!(
        attempt_id = attempt.id,
        user_id,
        total_questions,
        correct_answers,
        score,
        timed_out = timing.timed_out,
        time_spent = timing.time_spent,
        running_average = stats.average_score,
        "Quiz attempt completed"
    );

    Ok(CompletedAttempt { result, time_spent: timing.time_spent })
}

/// Per-question breakdown shown after (or during) an attempt.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReviewEntry {
    pub(crate) question_id: i64,
    pub(crate) question_text: String,
    pub(crate) user_answer_id: Option<i64>,
    pub(crate) user_answer_text: Option<String>,
    pub(crate) correct_answer_ids: Vec<i64>,
    pub(crate) correct_answer_texts: Vec<String>,
    pub(crate) is_correct: bool,
}

pub(crate) async fn review_attempt(
    state: &AppState,
    attempt_id: i64,
    user_id: &str,
) -> Result<Vec<ReviewEntry>, QuizError> {
    let attempt = repositories::attempts::find_for_user(state.db(), attempt_id, user_id)
        .await?
        .ok_or_else(|| QuizError::not_found("Quiz attempt"))?;

    let mut conn = state.db().acquire().await?;
    let question_ids = ScoredSet::for_attempt(&attempt).resolve(&mut conn, &attempt).await?;

    let questions = repositories::questions::find_by_ids(&mut *conn, &question_ids).await?;
    let answers = repositories::answers::list_by_questions(&mut *conn, &question_ids).await?;
    let submissions =
        repositories::user_answers::list_for_questions(&mut *conn, user_id, &question_ids).await?;

    let texts: HashMap<i64, String> =
        questions.into_iter().map(|question| (question.id, question.text)).collect();
    let mut correct_by_question: HashMap<i64, (Vec<i64>, Vec<String>)> = HashMap::new();
    for answer in answers.into_iter().filter(|answer| answer.is_correct) {
        let entry = correct_by_question.entry(answer.question_id).or_default();
        entry.0.push(answer.id);
        entry.1.push(answer.text);
    }

    Ok(build_review(&question_ids, texts, correct_by_question, &submissions))
}

/// Questions deleted since the attempt started are skipped. The shown answer
/// is the one that earned credit, otherwise the most recent submission.
fn build_review(
    question_ids: &[i64],
    mut texts: HashMap<i64, String>,
    mut correct_by_question: HashMap<i64, (Vec<i64>, Vec<String>)>,
    submissions: &[SubmissionRow],
) -> Vec<ReviewEntry> {
    let mut shown: HashMap<i64, &SubmissionRow> = HashMap::new();
    for row in submissions {
        match shown.get(&row.question_id) {
            Some(current) if current.is_correct => {}
            _ => {
                shown.insert(row.question_id, row);
            }
        }
    }

    question_ids
        .iter()
        .filter_map(|id| {
            let question_text = texts.remove(id)?;
            let (correct_answer_ids, correct_answer_texts) =
                correct_by_question.remove(id).unwrap_or_default();
            let submission = shown.get(id);
            Some(ReviewEntry {
                question_id: *id,
                question_text,
                user_answer_id: submission.map(|row| row.answer_id),
                user_answer_text: submission.map(|row| row.answer_text.clone()),
                correct_answer_ids,
                correct_answer_texts,
                is_correct: submission.is_some_and(|row| row.is_correct),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, PrimitiveDateTime, Time};

    fn at(second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::May, 10).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(12, 0, second).unwrap())
    }

    fn submission(question_id: i64, answer_id: i64, is_correct: bool) -> SubmissionRow {
        SubmissionRow {
            question_id,
            answer_id,
            answer_text: format!("answer {answer_id}"),
            is_correct,
        }
    }

    fn attempt_with_snapshot(snapshot: Option<&str>) -> QuizAttempt {
        QuizAttempt {
            id: 1,
            user_id: "user".to_string(),
            category_id: None,
            started_at: at(0),
            completed_at: None,
            time_spent: None,
            total_time_limit: None,
            difficulty_filter: None,
            num_questions: None,
            randomize: false,
            selected_question_ids: snapshot.map(str::to_string),
        }
    }

    #[test]
    fn time_policy_caps_at_limit() {
        assert_eq!(apply_time_policy(120, Some(60)), TimeOutcome { time_spent: 60, timed_out: true });
        assert_eq!(apply_time_policy(60, Some(60)), TimeOutcome { time_spent: 60, timed_out: true });
        assert_eq!(apply_time_policy(59, Some(60)), TimeOutcome { time_spent: 59, timed_out: false });
        assert_eq!(apply_time_policy(0, Some(1)), TimeOutcome { time_spent: 0, timed_out: false });
    }

    #[test]
    fn time_policy_without_limit_never_times_out() {
        assert_eq!(
            apply_time_policy(86_400, None),
            TimeOutcome { time_spent: 86_400, timed_out: false }
        );
    }

    #[test]
    fn score_is_percentage_or_zero() {
        assert_eq!(compute_score(0, 0), 0.0);
        assert_eq!(compute_score(3, 4), 75.0);
        assert_eq!(compute_score(5, 5), 100.0);
        assert!((compute_score(1, 3) - 33.333_333).abs() < 1e-4);
    }

    #[test]
    fn wrong_then_right_counts_as_correct() {
        let submissions = vec![submission(1, 10, false), submission(1, 11, true)];
        assert_eq!(count_correct(&[1], &submissions), 1);
    }

    #[test]
    fn right_then_wrong_still_counts() {
        let submissions = vec![submission(1, 11, true), submission(1, 10, false)];
        assert_eq!(count_correct(&[1], &submissions), 1);
    }

    #[test]
    fn only_wrong_or_unanswered_is_incorrect() {
        let submissions = vec![submission(1, 10, false), submission(1, 12, false)];
        assert_eq!(count_correct(&[1, 2], &submissions), 0);
    }

    #[test]
    fn answers_outside_the_scored_set_are_ignored() {
        let submissions = vec![submission(7, 70, true), submission(2, 20, true)];
        assert_eq!(count_correct(&[1, 2, 3], &submissions), 1);
    }

    #[test]
    fn scored_set_follows_stored_snapshot() {
        assert_eq!(
            ScoredSet::for_attempt(&attempt_with_snapshot(Some("4,2"))),
            ScoredSet::Snapshot(vec![4, 2])
        );
        assert_eq!(
            ScoredSet::for_attempt(&attempt_with_snapshot(Some(""))),
            ScoredSet::Snapshot(Vec::new())
        );
        assert_eq!(ScoredSet::for_attempt(&attempt_with_snapshot(None)), ScoredSet::LegacyFallback);
        assert_eq!(
            ScoredSet::for_attempt(&attempt_with_snapshot(Some("4,oops"))),
            ScoredSet::LegacyFallback
        );
    }

    #[test]
    fn review_prefers_crediting_answer_and_skips_deleted_questions() {
        let texts = HashMap::from([(1, "Q1".to_string()), (2, "Q2".to_string())]);
        let correct = HashMap::from([(1, (vec![11], vec!["right".to_string()]))]);
        let submissions = vec![
            submission(1, 11, true),
            submission(1, 10, false),
            submission(2, 20, false),
            submission(2, 21, false),
        ];

        let review = build_review(&[2, 3, 1], texts, correct, &submissions);

        assert_eq!(review.len(), 2);
        assert_eq!(review[0].question_id, 2);
        assert_eq!(review[0].user_answer_id, Some(21));
        assert!(!review[0].is_correct);
        assert!(review[0].correct_answer_ids.is_empty());

        assert_eq!(review[1].question_id, 1);
        assert_eq!(review[1].user_answer_id, Some(11));
        assert_eq!(review[1].user_answer_text.as_deref(), Some("answer 11"));
        assert_eq!(review[1].correct_answer_texts, vec!["right".to_string()]);
        assert!(review[1].is_correct);
    }

    #[test]
    fn review_of_unanswered_question_has_no_user_answer() {
        let texts = HashMap::from([(5, "Q5".to_string())]);
        let review = build_review(&[5], texts, HashMap::new(), &[]);
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].user_answer_id, None);
        assert_eq!(review[0].user_answer_text, None);
        assert!(!review[0].is_correct);
    }
}
