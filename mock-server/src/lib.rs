//! In-memory implementation of the Inquire HTTP API.
//!
//! Every reply is a JSON envelope `{"success": bool, "msg": string, ...}`.
//! Parameter problems and rule violations answer 200 with `success: false`;
//! protected methods without a session cookie answer 401.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const DEFAULT_MAX_RESULTS: usize = 25;
pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 50.0;
const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Clone, Debug)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub karma: i64,
}

#[derive(Clone, Debug)]
pub struct QuestionRow {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub closed: bool,
}

#[derive(Clone, Debug)]
pub struct AnswerRow {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub text: String,
    pub accepted: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: HashMap<i64, UserRow>,
    pub questions: HashMap<i64, QuestionRow>,
    pub answers: HashMap<i64, AnswerRow>,
    sessions: HashMap<Uuid, i64>,
    last_id: i64,
}

impl Store {
    /// Ids come from one counter shared by all tables. Rows inserted
    /// directly into the maps move the counter past their ids.
    fn next_id(&mut self) -> i64 {
        let seeded = self
            .users
            .keys()
            .chain(self.questions.keys())
            .chain(self.answers.keys())
            .copied()
            .max()
            .unwrap_or(0);
        self.last_id = self.last_id.max(seeded) + 1;
        self.last_id
    }

    fn session_user(&self, jar: &CookieJar) -> Option<i64> {
        session_id(jar).and_then(|id| self.sessions.get(&id).copied())
    }
}

pub type Db = Arc<RwLock<Store>>;
type Params = HashMap<String, String>;
/// Handlers reject with a complete response, so both arms render as-is.
type Reply = Result<Response, Response>;

pub fn app() -> Router {
    router(Db::default())
}

/// Build the router over an existing store, so tests can seed or inspect it.
pub fn router(db: Db) -> Router {
    let api = Router::new()
        .route("/register", post(register))
        .route("/auth", post(auth))
        .route("/logout", get(logout))
        .route("/ask", post(ask))
        .route("/answer", post(answer))
        .route("/accept", post(accept))
        .route("/questions", get(questions))
        .route("/answers", get(answers));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn envelope(success: bool, msg: &str, payload: Value) -> Json<Value> {
    let mut body = json!({ "success": success, "msg": msg });
    if let (Some(body), Value::Object(payload)) = (body.as_object_mut(), payload) {
        body.extend(payload);
    }
    Json(body)
}

fn ok(payload: Value) -> Response {
    envelope(true, "OK", payload).into_response()
}

fn reject(msg: &str) -> Response {
    envelope(false, msg, Value::Null).into_response()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, envelope(false, "Unauthorized", Value::Null)).into_response()
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// The first required parameter that is absent or empty.
fn missing<'a>(params: &Params, required: &[&'a str]) -> Option<&'a str> {
    required
        .iter()
        .copied()
        .find(|name| params.get(*name).map_or(true, String::is_empty))
}

fn require(params: &Params, required: &[&str]) -> Result<(), Response> {
    match missing(params, required) {
        Some(name) => Err(reject(&format!("'{name}' is required."))),
        None => Ok(()),
    }
}

fn parse<T: std::str::FromStr>(params: &Params, name: &str) -> Result<T, Response> {
    params
        .get(name)
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| reject(&format!("'{name}' is invalid.")))
}

fn user_json(user: &UserRow) -> Value {
    json!({ "user_id": user.id, "email": user.email, "karma": user.karma })
}

fn question_json(question: &QuestionRow) -> Value {
    json!({
        "user_id": question.user_id,
        "question_id": question.id,
        "question": question.text,
        "latitude": question.latitude,
        "longitude": question.longitude,
        "closed": question.closed,
    })
}

fn answer_json(answer: &AnswerRow) -> Value {
    json!({
        "user_id": answer.user_id,
        "answer_id": answer.id,
        "question_id": answer.question_id,
        "answer": answer.text,
        "accepted_answer": answer.accepted,
    })
}

fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}

async fn register(State(db): State<Db>, Form(params): Form<Params>) -> Reply {
    require(&params, &["email", "password"])?;
    let email = params["email"].trim().to_string();

    let mut store = db.write().await;
    let taken = store.users.values().filter(|u| u.email == email).count();
    if taken != 0 {
        return Err(envelope(
            false,
            "Email address already exists.",
            json!({ "users": taken }),
        )
        .into_response());
    }

    let id = store.next_id();
    store.users.insert(
        id,
        UserRow {
            id,
            email: email.clone(),
            password_hash: hash_password(&params["password"]),
            karma: 0,
        },
    );
    info!(user_id = id, %email, "registered");
    Ok(ok(Value::Null))
}

async fn auth(State(db): State<Db>, jar: CookieJar, Form(params): Form<Params>) -> Reply {
    require(&params, &["email", "password"])?;
    let email = params["email"].trim();
    let hash = hash_password(&params["password"]);

    let mut store = db.write().await;
    let matches: Vec<UserRow> = store
        .users
        .values()
        .filter(|u| u.email == email && u.password_hash == hash)
        .cloned()
        .collect();
    let user = match matches.as_slice() {
        [] => return Err(reject("Email or password is invalid.")),
        [user] => user.clone(),
        _ => return Err(reject("Internal security error. Contact an administrator")),
    };

    let session = Uuid::new_v4();
    store.sessions.insert(session, user.id);
    info!(user_id = user.id, "authenticated");

    let cookie = Cookie::build((SESSION_COOKIE, session.to_string()))
        .path("/")
        .http_only(true);
    Ok((jar.add(cookie), ok(json!({ "user": user_json(&user) }))).into_response())
}

async fn logout(State(db): State<Db>, jar: CookieJar) -> Response {
    if let Some(id) = session_id(&jar) {
        if let Some(user_id) = db.write().await.sessions.remove(&id) {
            info!(user_id, "logged out");
        }
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, envelope(true, "User has been logged out.", Value::Null)).into_response()
}

async fn ask(State(db): State<Db>, jar: CookieJar, Form(params): Form<Params>) -> Reply {
    let mut store = db.write().await;
    let user_id = store.session_user(&jar).ok_or_else(unauthorized)?;
    require(&params, &["question", "latitude", "longitude", "pay_key"])?;
    let latitude: f64 = parse(&params, "latitude")?;
    let longitude: f64 = parse(&params, "longitude")?;

    let id = store.next_id();
    let question = QuestionRow {
        id,
        user_id,
        text: params["question"].clone(),
        latitude,
        longitude,
        closed: false,
    };
    store.questions.insert(id, question.clone());
    info!(question_id = id, user_id, "question asked");

    let user = store.users.get(&user_id).map(user_json).unwrap_or(Value::Null);
    Ok(ok(json!({ "question": question_json(&question), "user": user })))
}

async fn answer(State(db): State<Db>, jar: CookieJar, Form(params): Form<Params>) -> Reply {
    let mut store = db.write().await;
    let user_id = store.session_user(&jar).ok_or_else(unauthorized)?;
    require(&params, &["question_id", "answer"])?;
    let question_id: i64 = parse(&params, "question_id")?;

    let question = store
        .questions
        .get(&question_id)
        .ok_or_else(|| reject("Question does not exist."))?;
    if question.closed {
        return Err(reject("Question has an accepted answer and is now closed."));
    }

    let id = store.next_id();
    let answer = AnswerRow {
        id,
        user_id,
        question_id,
        text: params["answer"].clone(),
        accepted: false,
    };
    store.answers.insert(id, answer.clone());
    info!(answer_id = id, question_id, user_id, "question answered");
    Ok(ok(json!({ "answer": answer_json(&answer) })))
}

async fn accept(State(db): State<Db>, jar: CookieJar, Form(params): Form<Params>) -> Reply {
    let mut store = db.write().await;
    let user_id = store.session_user(&jar).ok_or_else(unauthorized)?;
    require(&params, &["answer_id"])?;
    let answer_id: i64 = parse(&params, "answer_id")?;

    let answer = store
        .answers
        .get(&answer_id)
        .cloned()
        .ok_or_else(|| reject("Answer does not exist."))?;
    let question = store
        .questions
        .get(&answer.question_id)
        .cloned()
        .ok_or_else(|| reject("Question does not exist."))?;
    if question.user_id != user_id {
        return Err(reject(
            "You must be the owner of the question to accept an answer.",
        ));
    }
    if question.closed {
        return Err(reject("Question already has an accepted answer."));
    }

    if let Some(row) = store.answers.get_mut(&answer_id) {
        row.accepted = true;
    }
    if let Some(row) = store.questions.get_mut(&question.id) {
        row.closed = true;
    }
    if let Some(row) = store.users.get_mut(&answer.user_id) {
        row.karma += 1;
    }
    info!(answer_id, question_id = question.id, "answer accepted");
    Ok(ok(Value::Null))
}

async fn questions(
    State(db): State<Db>,
    jar: CookieJar,
    Query(params): Query<Params>,
) -> Reply {
    let store = db.read().await;
    store.session_user(&jar).ok_or_else(unauthorized)?;
    require(&params, &["latitude", "longitude"])?;
    let latitude: f64 = parse(&params, "latitude")?;
    let longitude: f64 = parse(&params, "longitude")?;
    let max_results = match params.get("max_results") {
        Some(_) => parse::<usize>(&params, "max_results")?,
        None => DEFAULT_MAX_RESULTS,
    };
    let max_distance = match params.get("max_distance") {
        Some(_) => parse::<f64>(&params, "max_distance")?,
        None => DEFAULT_MAX_DISTANCE_MILES,
    };

    let mut nearby: Vec<(f64, &QuestionRow)> = store
        .questions
        .values()
        .filter(|q| !q.closed)
        .map(|q| (distance_miles(latitude, longitude, q.latitude, q.longitude), q))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));

    let list: Vec<Value> = nearby
        .into_iter()
        .take(max_results)
        .map(|(_, q)| question_json(q))
        .collect();
    info!(latitude, longitude, found = list.len(), "questions listed");
    Ok(ok(json!({ "questions": list })))
}

async fn answers(State(db): State<Db>, jar: CookieJar, Query(params): Query<Params>) -> Reply {
    let store = db.read().await;
    store.session_user(&jar).ok_or_else(unauthorized)?;
    require(&params, &["question_id"])?;
    let question_id: i64 = parse(&params, "question_id")?;
    if !store.questions.contains_key(&question_id) {
        return Err(reject("Question does not exist!"));
    }

    let mut list: Vec<&AnswerRow> = store
        .answers
        .values()
        .filter(|a| a.question_id == question_id)
        .collect();
    list.sort_by_key(|a| a.id);
    let list: Vec<Value> = list.into_iter().map(answer_json).collect();
    info!(question_id, found = list.len(), "answers listed");
    Ok(ok(json!({ "answers": list })))
}
