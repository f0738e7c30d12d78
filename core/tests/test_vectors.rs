//! Verify request building and response decoding against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each vector describes typed inputs, the expected request (verb, path and
//! exactly the form fields sent), a simulated response body, and the entity
//! it should decode to. Cases with `expected_error` must fail validation.

use std::sync::Arc;

use inquire_core::{
    decode_question, ApiResponse, Coordinate, HttpMethod, HttpRequest, Limits, Question,
    RequestBuilder, UserId, ValidationError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080/api";

fn builder(vectors: &Value) -> RequestBuilder {
    let limits = &vectors["limits"];
    RequestBuilder::new(
        BASE_URL,
        Limits {
            max_question_length: limits["max_question_length"].as_u64().unwrap() as usize,
            max_answer_length: limits["max_answer_length"].as_u64().unwrap() as usize,
        },
    )
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    let path = expected["path"].as_str().unwrap();
    let url = req.url.split('?').next().unwrap();
    assert_eq!(url, format!("{BASE_URL}{path}"), "{name}: path");

    let expected_fields: Vec<(String, String)> = expected["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(req.form_fields(), expected_fields, "{name}: fields");

    match req.method {
        HttpMethod::Post => assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded"),
            "{name}: content type"
        ),
        HttpMethod::Get => assert!(req.body.is_none(), "{name}: GET has no body"),
    }
}

fn simulated(case: &Value) -> ApiResponse {
    let sim = &case["simulated_response"];
    assert_eq!(sim["status"], 200);
    ApiResponse::parse(sim["body"].as_str().unwrap()).unwrap()
}

fn check_error(name: &str, err: ValidationError, expected: &str) {
    let matched = match expected {
        "Empty" => matches!(err, ValidationError::Empty { .. }),
        "TooLong" => matches!(err, ValidationError::TooLong { .. }),
        "MissingPaymentToken" => matches!(err, ValidationError::MissingPaymentToken),
        "InvalidCoordinate" => matches!(err, ValidationError::InvalidCoordinate { .. }),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

fn parent(vectors: &Value) -> Arc<Question> {
    let record = vectors["question"].as_object().unwrap();
    Arc::new(decode_question(record, UserId(0)).unwrap())
}

fn acting(case: &Value) -> UserId {
    UserId(case["acting_user_id"].as_i64().unwrap())
}

// ---------------------------------------------------------------------------
// Auth / register
// ---------------------------------------------------------------------------

#[test]
fn auth_test_vectors() {
    let raw = include_str!("../../test-vectors/auth.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let b = builder(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let email = case["input"]["email"].as_str().unwrap();
        let password = case["input"]["password"].as_str().unwrap();

        let result = match case["method"].as_str().unwrap() {
            "auth" => b.build_auth(email, password),
            "register" => b.build_register(email, password),
            other => panic!("{name}: unknown method {other}"),
        };

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected.as_str().unwrap());
            continue;
        }
        check_request(name, &result.unwrap(), &case["expected_request"]);

        let user = simulated(case).user().unwrap();
        let expected = &case["expected_user"];
        match user {
            Some(user) => {
                assert_eq!(user.user_id, UserId(expected["user_id"].as_i64().unwrap()), "{name}");
                assert_eq!(user.email, expected["email"].as_str().unwrap(), "{name}");
                assert_eq!(user.karma, expected["karma"].as_i64().unwrap(), "{name}");
            }
            None => assert!(expected.is_null(), "{name}: expected a user"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ask
// ---------------------------------------------------------------------------

#[test]
fn ask_test_vectors() {
    let raw = include_str!("../../test-vectors/ask.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let b = builder(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let location = Coordinate::new(
            input["latitude"].as_f64().unwrap(),
            input["longitude"].as_f64().unwrap(),
        );
        let result = b.build_ask(
            input["question"].as_str().unwrap(),
            Some(location),
            input["pay_key"].as_str().unwrap(),
        );

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected.as_str().unwrap());
            continue;
        }
        check_request(name, &result.unwrap(), &case["expected_request"]);

        let question = simulated(case).question(acting(case)).unwrap().unwrap();
        let expected = &case["expected_question"];
        assert_eq!(question.question_id.0, expected["question_id"].as_i64().unwrap(), "{name}");
        assert_eq!(question.user_id.0, expected["user_id"].as_i64().unwrap(), "{name}");
        assert_eq!(question.is_owner, expected["is_owner"].as_bool().unwrap(), "{name}");
        assert_eq!(question.text, expected["text"].as_str().unwrap(), "{name}");
        assert_eq!(
            question.location,
            Coordinate::new(
                expected["latitude"].as_f64().unwrap(),
                expected["longitude"].as_f64().unwrap()
            ),
            "{name}"
        );
        assert_eq!(question.closed, expected["closed"].as_bool().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

#[test]
fn answer_test_vectors() {
    let raw = include_str!("../../test-vectors/answer.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let b = builder(&vectors);
    let question = parent(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = b.build_answer(&question, case["input"]["answer"].as_str().unwrap());

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected.as_str().unwrap());
            continue;
        }
        check_request(name, &result.unwrap(), &case["expected_request"]);

        let response = simulated(case);
        let record = response.record("answer").unwrap().unwrap();
        let answer =
            inquire_core::decode_answer(record, acting(case), Arc::clone(&question)).unwrap();
        let expected = &case["expected_answer"];
        assert_eq!(answer.answer_id.0, expected["answer_id"].as_i64().unwrap(), "{name}");
        assert_eq!(answer.user_id.0, expected["user_id"].as_i64().unwrap(), "{name}");
        assert_eq!(answer.is_owner, expected["is_owner"].as_bool().unwrap(), "{name}");
        assert_eq!(answer.is_accepted, expected["is_accepted"].as_bool().unwrap(), "{name}");
        assert_eq!(answer.text, expected["text"].as_str().unwrap(), "{name}");
        assert_eq!(answer.question().question_id, question.question_id, "{name}");
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/lists.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let b = builder(&vectors);
    let question = parent(&vectors);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_ids: Vec<i64> = case["expected_ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|id| id.as_i64().unwrap())
            .collect();
        let expected_owned: Vec<bool> = case["expected_owned"]
            .as_array()
            .unwrap()
            .iter()
            .map(|flag| flag.as_bool().unwrap())
            .collect();

        let response = simulated(case);
        let (ids, owned): (Vec<i64>, Vec<bool>) = match case["method"].as_str().unwrap() {
            "listQuestionsNear" => {
                let input = &case["input"];
                let location = Coordinate::new(
                    input["latitude"].as_f64().unwrap(),
                    input["longitude"].as_f64().unwrap(),
                );
                let req = b.build_list_questions_near(Some(location)).unwrap();
                check_request(name, &req, &case["expected_request"]);
                response
                    .questions(acting(case))
                    .unwrap()
                    .iter()
                    .map(|q| (q.question_id.0, q.is_owner))
                    .unzip()
            }
            "listAnswersFor" => {
                let req = b.build_list_answers_for(&question).unwrap();
                check_request(name, &req, &case["expected_request"]);
                response
                    .answers(acting(case), &question)
                    .unwrap()
                    .iter()
                    .map(|a| (a.answer_id.0, a.is_owner))
                    .unzip()
            }
            other => panic!("{name}: unknown method {other}"),
        };
        assert_eq!(ids, expected_ids, "{name}: ids");
        assert_eq!(owned, expected_owned, "{name}: ownership");
    }
}
