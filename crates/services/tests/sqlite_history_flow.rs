use std::sync::Arc;

use quiz_core::model::{CompletedAttempt, QuestionBank, QuizSettings, SessionPhase};
use quiz_core::time::fixed_now;
use services::{AppServices, Clock};

#[tokio::test]
async fn sqlite_history_is_shared_across_service_instances() {
    let url = "sqlite:file:memdb_quiz_history_flow?mode=memory&cache=shared";
    let clock = Clock::fixed(fixed_now());
    let first = AppServices::new_sqlite(url, clock)
        .await
        .expect("connect sqlite");
    let bank = Arc::new(QuestionBank::general_knowledge().expect("bank"));

    let quiz = first.spawn_quiz(Arc::clone(&bank), QuizSettings::default());
    quiz.start().unwrap();
    quiz.select_option(1).unwrap();
    for _ in 0..10 {
        quiz.advance().unwrap();
    }
    let view = quiz
        .wait_for(|v| v.phase == SessionPhase::Completed && v.history.len() == 1)
        .await
        .unwrap();
    assert_eq!(view.score, 1);
    assert_eq!(view.history[0].completed_at, fixed_now());
    quiz.shutdown();

    // A second instance on the same database sees the stored attempt at startup.
    let second = AppServices::new_sqlite(url, clock)
        .await
        .expect("reconnect sqlite");
    let quiz = second.spawn_quiz(bank, QuizSettings::default());
    let view = quiz.wait_for(|v| v.history.len() == 1).await.unwrap();
    assert_eq!(view.phase, SessionPhase::NotStarted);
    assert_eq!(view.history[0].score, 1);
    assert_eq!(view.history[0].total_questions, 10);

    drop(first);
}

#[tokio::test]
async fn history_service_rejects_impossible_scores_before_storage() {
    let url = "sqlite:file:memdb_quiz_history_reject?mode=memory&cache=shared";
    let services = AppServices::new_sqlite(url, Clock::fixed(fixed_now()))
        .await
        .expect("connect sqlite");

    let err = services
        .history()
        .record(&CompletedAttempt {
            score: 4,
            total_questions: 3,
            started_at: fixed_now(),
            completed_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, services::HistoryError::Attempt(_)));
    assert!(services.history().list_sorted().await.unwrap().is_empty());
}
