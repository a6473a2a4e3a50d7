// src/db/memory.rs

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::Store;
use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz},
        stock::{NewStock, Stock},
        user::User,
        user_score::{AnswerRecord, AnswerTally, NewUserScore, UserScore},
    },
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    stocks: HashMap<String, Stock>,
    quizzes: HashMap<Uuid, Quiz>,
    /// Insertion order doubles as scan order for tallies.
    answers: Vec<UserScore>,
    answered: HashSet<(Uuid, Uuid)>,
}

/// In-process store. Every operation runs under one lock, so the
/// (user, quiz) check-and-insert is atomic just like the Postgres constraint.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".to_string()))
    }

    /// Number of stock rows, mainly for tests.
    pub fn stock_count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.stocks.len())
    }

    /// Number of quiz rows, mainly for tests.
    pub fn quiz_count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.quizzes.len())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut inner = self.lock()?;
        if inner.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn upsert_stock(&self, stock: &NewStock) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        if inner.stocks.contains_key(&stock.symbol) {
            return Ok(false);
        }

        inner.stocks.insert(
            stock.symbol.clone(),
            Stock {
                symbol: stock.symbol.clone(),
                name: stock.name.clone(),
                exchange: stock.exchange.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            kind: quiz.kind,
            symbol: quiz.symbol,
            correct_answer: quiz.correct_answer,
            payload: quiz.payload,
            created_at: Utc::now(),
        };
        self.lock()?.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError> {
        Ok(self.lock()?.quizzes.get(&id).cloned())
    }

    async fn find_answer(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<UserScore>, AppError> {
        Ok(self
            .lock()?
            .answers
            .iter()
            .find(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .cloned())
    }

    async fn create_answer(&self, answer: NewUserScore) -> Result<UserScore, AppError> {
        let mut inner = self.lock()?;
        if !inner.answered.insert((answer.user_id, answer.quiz_id)) {
            return Err(AppError::Conflict("Quiz already answered".to_string()));
        }

        let score = UserScore {
            id: Uuid::new_v4(),
            user_id: answer.user_id,
            quiz_id: answer.quiz_id,
            answer: answer.answer,
            correct: answer.correct,
            created_at: Utc::now(),
        };
        inner.answers.push(score.clone());
        Ok(score)
    }

    async fn answer_tallies(&self) -> Result<Vec<AnswerTally>, AppError> {
        let inner = self.lock()?;
        let mut tallies: Vec<AnswerTally> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();

        for answer in &inner.answers {
            let slot = *index.entry(answer.user_id).or_insert_with(|| {
                tallies.push(AnswerTally {
                    user_id: answer.user_id,
                    username: inner.users.get(&answer.user_id).map(|u| u.username.clone()),
                    total: 0,
                    correct: 0,
                });
                tallies.len() - 1
            });
            let tally = &mut tallies[slot];
            tally.total += 1;
            if answer.correct {
                tally.correct += 1;
            }
        }

        Ok(tallies)
    }

    async fn answers_for_user(&self, user_id: Uuid) -> Result<Vec<AnswerRecord>, AppError> {
        let inner = self.lock()?;
        let mut records: Vec<AnswerRecord> = inner
            .answers
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                inner.quizzes.get(&a.quiz_id).map(|quiz| AnswerRecord {
                    quiz_id: a.quiz_id,
                    kind: quiz.kind,
                    symbol: quiz.symbol.clone(),
                    answer: a.answer,
                    correct: a.correct,
                    answered_at: a.created_at,
                })
            })
            .collect();

        // Newest first; equal timestamps keep reverse insertion order.
        records.reverse();
        records.sort_by(|a, b| b.answered_at.cmp(&a.answered_at));
        Ok(records)
    }
}
