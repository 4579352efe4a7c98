use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::UserStatistics;
use crate::db::types::StatisticsPeriod;
use crate::repositories::statistics::LeaderboardRow;
use crate::services::statistics::{CategoryStatistics, PeriodStatistics};

#[derive(Debug, Serialize)]
pub(crate) struct UserStatisticsResponse {
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) total_time_spent: i32,
    pub(crate) last_quiz_date: Option<String>,
}

impl UserStatisticsResponse {
    pub(crate) fn from_db(stats: UserStatistics) -> Self {
        Self {
            total_quizzes: stats.total_quizzes,
            total_questions_answered: stats.total_questions_answered,
            correct_answers: stats.correct_answers,
            average_score: stats.average_score,
            total_time_spent: stats.total_time_spent,
            last_quiz_date: stats.last_quiz_date.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryStatisticsResponse {
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) best_score: f64,
    pub(crate) worst_score: f64,
    pub(crate) total_time_spent: i32,
}

impl From<CategoryStatistics> for CategoryStatisticsResponse {
    fn from(value: CategoryStatistics) -> Self {
        Self {
            category_id: value.category_id,
            category_name: value.category_name,
            total_quizzes: value.total_quizzes,
            total_questions_answered: value.total_questions_answered,
            correct_answers: value.correct_answers,
            average_score: value.average_score,
            best_score: value.best_score,
            worst_score: value.worst_score,
            total_time_spent: value.total_time_spent,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DatePeriodStatisticsResponse {
    pub(crate) period: StatisticsPeriod,
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) total_time_spent: i32,
    pub(crate) quizzes_by_date: BTreeMap<String, i32>,
}

impl From<PeriodStatistics> for DatePeriodStatisticsResponse {
    fn from(value: PeriodStatistics) -> Self {
        Self {
            period: value.period,
            total_quizzes: value.total_quizzes,
            total_questions_answered: value.total_questions_answered,
            correct_answers: value.correct_answers,
            average_score: value.average_score,
            total_time_spent: value.total_time_spent,
            quizzes_by_date: value.quizzes_by_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardEntry {
    pub(crate) username: String,
    pub(crate) total_quizzes: i32,
    pub(crate) average_score: f64,
    pub(crate) total_questions_answered: i32,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            username: row.username,
            total_quizzes: row.total_quizzes,
            average_score: row.average_score,
            total_questions_answered: row.total_questions_answered,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PeriodQuery {
    #[serde(default)]
    pub(crate) period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardQuery {
    #[serde(default)]
    pub(crate) limit: Option<i64>,
}
