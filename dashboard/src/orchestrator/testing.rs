use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::HttpError;
use crate::remote::{ApiRequest, Remote};

struct Reply {
    result: Result<Value, HttpError>,
    delay: Duration,
}

/// A [`Remote`] that answers from a script keyed by `"METHOD path?query"`.
#[derive(Default)]
pub struct ScriptedRemote {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<String>>,
}

fn route(request: &ApiRequest) -> String {
    let mut route = format!("{} {}", request.method, request.path);
    for (i, (key, value)) in request.query.iter().enumerate() {
        route.push(if i == 0 { '?' } else { '&' });
        route.push_str(&format!("{key}={value}"));
    }
    route
}

impl ScriptedRemote {
    pub fn reply(&self, route: &str, result: Result<Value, HttpError>) -> &Self {
        self.reply_after(route, Duration::ZERO, result)
    }

    pub fn reply_after(
        &self,
        route: &str,
        delay: Duration,
        result: Result<Value, HttpError>,
    ) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(Reply { result, delay });
        self
    }

    pub fn calls(&self, route: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|r| *r == route).count()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Remote for ScriptedRemote {
    async fn send(&self, request: ApiRequest) -> Result<Value, HttpError> {
        let route = route(&request);
        self.log.lock().unwrap().push(route.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply { result, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(HttpError::ServerRejected {
                status: 501,
                message: format!("nothing scripted for {route}"),
            }),
        }
    }
}

pub fn rejected(status: u16, message: &str) -> Result<Value, HttpError> {
    Err(HttpError::ServerRejected {
        status,
        message: message.to_string(),
    })
}

pub fn ack(message: &str) -> Result<Value, HttpError> {
    Ok(json!({ "message": message }))
}

pub fn budget_json(year: i32, total: f64, spent: f64) -> Value {
    json!({
        "budget": {
            "budget_id": 7,
            "fiscal_year": year,
            "total_budget": total,
            "spent_amount": spent,
            "remaining_amount": total - spent,
        }
    })
}

pub fn expense_json(id: i64, name: &str, amount: f64, date: &str) -> Value {
    json!({
        "expense_id": id,
        "expense_name": name,
        "expense_amount": amount,
        "expense_date": date,
        "description": null,
        "category": "Supplies",
    })
}

pub fn member_json(id: &str, major: Option<&str>, year: Option<i32>) -> Value {
    json!({
        "student_id": id,
        "first_name": format!("First{id}"),
        "last_name": format!("Last{id}"),
        "email": format!("{id}@example.edu"),
        "phone_number": null,
        "major": major,
        "graduation_year": year,
    })
}

/// Scripts every read `select_club(1)` issues, with nothing in any list and
/// no fiscal years.
pub fn script_empty_club(remote: &ScriptedRemote, club: i64) {
    remote
        .reply(&format!("GET clubs/{club}/members"), Ok(json!({ "members": [] })))
        .reply(&format!("GET clubs/{club}/officers"), Ok(json!({ "officers": [] })))
        .reply(&format!("GET clubs/{club}/events/upcoming"), Ok(json!([])))
        .reply(&format!("GET clubs/{club}/events/past"), Ok(json!([])))
        .reply(&format!("GET clubs/{club}/sponsors"), Ok(json!({ "sponsors": [] })))
        .reply(
            &format!("GET clubs/{club}/budget/years"),
            Ok(json!({ "fiscal_years": [] })),
        );
}
