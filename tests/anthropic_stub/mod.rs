use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub const API_KEY: &str = "test-key";

pub const TITLES: [&str; 5] = [
    "The Ultimate Guide to Project Management Software",
    "Project Management Software Compared: 10 Tools for 2025",
    "How to Choose Project Management Software for Your Team",
    "Project Management Software Mistakes to Avoid",
    "Free vs Paid Project Management Software",
];

pub const SECTION_HEADINGS: [&str; 4] = [
    "What Project Management Software Does",
    "Key Features to Compare",
    "Pricing and Plans",
    "Rolling It Out to Your Team",
];

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    Healthy,
    /// Outline and scoring requests get a 500; everything else succeeds.
    FailStructureAndScore,
    /// Every request gets a 500.
    FailAll,
}

pub struct AnthropicStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AnthropicStub {
    pub fn spawn(behavior: StubBehavior) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start anthropic stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                if request.method() != &tiny_http::Method::Post || path != "/v1/messages" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let header = |name: &str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.to_string().eq_ignore_ascii_case(name))
                        .map(|h| h.value.to_string())
                };
                if header("x-api-key").as_deref() != Some(API_KEY)
                    || header("anthropic-version").is_none()
                {
                    let _ = request.respond(json_response(
                        401,
                        serde_json::json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}),
                    ));
                    continue;
                }

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let parsed: Value = match serde_json::from_str(&body) {
                    Ok(value) => value,
                    Err(_) => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("invalid json").with_status_code(400),
                        );
                        continue;
                    }
                };
                recorded.lock().expect("lock requests").push(parsed.clone());

                let system = parsed.get("system").and_then(Value::as_str).unwrap_or("");
                let user = parsed
                    .pointer("/messages/0/content")
                    .and_then(Value::as_str)
                    .unwrap_or("");

                let Some(kind) = prompt_kind(system) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("unknown prompt mode")
                            .with_status_code(400),
                    );
                    continue;
                };

                let fails = match behavior {
                    StubBehavior::Healthy => false,
                    StubBehavior::FailStructureAndScore => {
                        matches!(kind, PromptKind::Structure | PromptKind::Score)
                    }
                    StubBehavior::FailAll => true,
                };
                if fails {
                    let _ = request.respond(json_response(
                        500,
                        serde_json::json!({"type": "error", "error": {"type": "api_error", "message": "stub failure"}}),
                    ));
                    continue;
                }

                let text = match kind {
                    PromptKind::Titles => TITLES
                        .iter()
                        .enumerate()
                        .map(|(idx, title)| format!("{}. {title}", idx + 1))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    PromptKind::Keywords => "- project management tools\n- task tracking\n- team collaboration\n- gantt chart software".to_owned(),
                    PromptKind::Structure => structure_response(user),
                    PromptKind::Part => part_response(user),
                    PromptKind::Score => "Here is my analysis:\n{\"keyword_density\": 85, \"title_optimization\": 90, \"headings\": 80, \"internal_links\": 70, \"content_quality\": 85, \"readability\": 90, \"overall_score\": 83}".to_owned(),
                };

                let model = parsed
                    .get("model")
                    .cloned()
                    .unwrap_or(Value::String("stub-model".to_owned()));
                let _ = request.respond(json_response(
                    200,
                    serde_json::json!({
                        "id": "msg_stub",
                        "type": "message",
                        "role": "assistant",
                        "model": model,
                        "content": [{"type": "text", "text": text}],
                        "stop_reason": "end_turn",
                    }),
                ));
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Request bodies received so far, in arrival order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("lock requests").clone()
    }
}

impl Drop for AnthropicStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PromptKind {
    Titles,
    Keywords,
    Structure,
    Part,
    Score,
}

fn prompt_kind(system: &str) -> Option<PromptKind> {
    if system.contains("Propose five") {
        Some(PromptKind::Titles)
    } else if system.contains("keyword research") {
        Some(PromptKind::Keywords)
    } else if system.contains("article structure") {
        Some(PromptKind::Structure)
    } else if system.contains("blog writer") {
        Some(PromptKind::Part)
    } else if system.contains("SEO analysis") {
        Some(PromptKind::Score)
    } else {
        None
    }
}

fn field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines().find_map(|line| line.strip_prefix(prefix)).map(str::trim)
}

fn structure_response(user: &str) -> String {
    let title = field(user, "Title: ").unwrap_or("untitled");
    let keyword = field(user, "Keyword: ").unwrap_or("keyword");
    let sections = SECTION_HEADINGS
        .iter()
        .map(|heading| {
            serde_json::json!({
                "heading": heading,
                "subheadings": ["Overview", "Tips"],
                "keywords": [keyword],
                "content_brief": format!("Explain {heading}."),
            })
        })
        .collect::<Vec<_>>();
    let outline = serde_json::json!({
        "meta": {
            "title": title,
            "keyword": keyword,
            "target_audience": "team leads",
            "word_count": "2000",
        },
        "introduction": "Why teams need a tool.",
        "sections": sections,
        "conclusion": "Recap and next steps.",
    });
    format!("Here is the outline you asked for:\n```json\n{outline}\n```")
}

fn part_response(user: &str) -> String {
    if let Some(heading) = field(user, "Section heading: ") {
        return format!("## {heading}\n\nBody for {heading}.");
    }
    if user.contains("ONLY the conclusion") {
        return "## Conclusion\n\nPick a tool and start today.".to_owned();
    }
    "Teams lose hours every week to scattered tasks.".to_owned()
}

fn json_response(status: u16, body: Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("build header");
    tiny_http::Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(header)
}
