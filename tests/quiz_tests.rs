// tests/quiz_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn quiz_routes_require_a_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/quiz/start"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unknown_paths_are_404_even_with_a_token() {
    let app = spawn_app().await;
    let (_, token) = app.player("Lost", 0, 0);

    for path in ["/anything", "/api/admin/questions/generate/extra", "/api/nothing"] {
        let response = app
            .client
            .get(app.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 404, "path {}", path);
    }
}

#[tokio::test]
async fn perfect_attempt_flow() {
    // Arrange
    let app = spawn_app().await;
    app.seed_questions(6);
    let (user_id, token) = app.player("Sachin", 100, 1);

    // 1. Status before playing
    let status: Value = app
        .client
        .get(app.url("/api/quiz/status"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["attempts_remaining"], 4);
    assert_eq!(status["daily_attempt_limit"], 5);

    // 2. Start: at most five questions, no answers exposed
    let response = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let started: Value = response.json().await.unwrap();
    let session_id = started["session_id"].as_str().unwrap().to_string();
    let questions = started["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert!(questions[0].get("correct_option").is_none());
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);

    // 3. Answer every question correctly
    for i in 0..5 {
        let answered: Value = app
            .client
            .post(app.url("/api/quiz/answer"))
            .bearer_auth(&token)
            .json(&json!({ "session_id": session_id, "selected": 0 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(answered["correct"], true);
        assert_eq!(answered["correct_index"], 0);
        assert_eq!(answered["completed"], i == 4);
    }

    // 4. Complete
    let response = app
        .client
        .post(app.url("/api/quiz/complete"))
        .bearer_auth(&token)
        .json(&json!({ "session_id": session_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 70);
    assert_eq!(result["perfect_bonus"], true);
    assert_eq!(result["total_points"], 170);
    assert_eq!(result["daily_quiz_count"], 2);
    assert_eq!(result["attempts_remaining"], 3);

    // 5. Leaderboard row for today
    let entries = app.store.leaderboard_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, user_id);
    assert_eq!(entries[0].daily_score, 70);
    assert_eq!(entries[0].total_score, 170);
}

#[tokio::test]
async fn wrong_answers_score_ten_each_without_bonus() {
    let app = spawn_app().await;
    app.seed_questions(5);
    let (_, token) = app.player("Rahul", 0, 0);

    let started: Value = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_str().unwrap().to_string();

    // Three right, two wrong
    for selected in [0, 0, 0, 1, 2] {
        let response = app
            .client
            .post(app.url("/api/quiz/answer"))
            .bearer_auth(&token)
            .json(&json!({ "session_id": session_id, "selected": selected }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let result: Value = app
        .client
        .post(app.url("/api/quiz/complete"))
        .bearer_auth(&token)
        .json(&json!({ "session_id": session_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["score"], 30);
    assert_eq!(result["perfect_bonus"], false);
    assert_eq!(result["total_points"], 30);
}

#[tokio::test]
async fn start_is_refused_after_five_attempts() {
    let app = spawn_app().await;
    app.seed_questions(5);
    let (_, token) = app.player("Virat", 250, 5);

    let response = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("No attempts left today"));
}

#[tokio::test]
async fn start_without_questions_is_404() {
    let app = spawn_app().await;
    let (_, token) = app.player("Anil", 0, 0);

    let response = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("No questions available"));
}

#[tokio::test]
async fn complete_before_last_answer_is_conflict() {
    let app = spawn_app().await;
    app.seed_questions(2);
    let (_, token) = app.player("Kapil", 0, 0);

    let started: Value = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["total_questions"], 2);
    let session_id = started["session_id"].as_str().unwrap().to_string();

    let response = app
        .client
        .post(app.url("/api/quiz/complete"))
        .bearer_auth(&token)
        .json(&json!({ "session_id": session_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn sessions_belong_to_their_player() {
    let app = spawn_app().await;
    app.seed_questions(5);
    let (_, owner) = app.player("Owner", 0, 0);
    let (_, stranger) = app.player("Stranger", 0, 0);

    let started: Value = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_str().unwrap().to_string();

    let response = app
        .client
        .post(app.url("/api/quiz/answer"))
        .bearer_auth(&stranger)
        .json(&json!({ "session_id": session_id, "selected": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn failed_profile_write_reports_generic_message() {
    let app = spawn_app().await;
    app.seed_questions(1);
    let (_, token) = app.player("Zaheer", 0, 0);

    let started: Value = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_str().unwrap().to_string();

    app.client
        .post(app.url("/api/quiz/answer"))
        .bearer_auth(&token)
        .json(&json!({ "session_id": session_id, "selected": 0 }))
        .send()
        .await
        .unwrap();

    app.store.fail_profile_writes(true);
    let response = app
        .client
        .post(app.url("/api/quiz/complete"))
        .bearer_auth(&token)
        .json(&json!({ "session_id": session_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to save results");
    assert!(app.store.leaderboard_entries().is_empty());
}
